use marquee_api::ApiError;
use thiserror::Error;

/// Failures outside the request/response path: config, local storage, wiring.
///
/// API call outcomes never end up here. Repositories turn those into
/// [`Resource`](crate::Resource) values instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("API client error: {0}")]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Session store error: {0}")]
    SessionError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
