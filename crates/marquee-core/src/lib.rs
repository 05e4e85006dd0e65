// Everything between the HTTP clients and the screen
pub mod config;
pub mod context;
pub mod dates;
pub mod error;
pub mod repository;
pub mod resource;
pub mod session;
pub mod usecase;
pub mod viewmodel;

pub use config::Config;
pub use error::Error;
pub use resource::{resource_stream, ErrorKind, Resource, ResourceStream};
pub use session::{SessionInfo, SessionStore, TokenApprover};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
