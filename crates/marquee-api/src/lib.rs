// HTTP clients for the APIs Marquee talks to
pub mod error;
pub mod http;
pub mod media;
pub mod news;
pub mod retry;
pub mod tmdb;
pub mod upload;
pub mod users;

// Re-export common types
pub use error::{ApiError, Result};
pub use http::{map_empty, map_response};
pub use media::{MediaType, Paged, RatingRequest, SessionKind, UploadResponse};
pub use news::{Article, ArticleSource, NewsClient, NewsOptions, NewsResponse};
pub use retry::RetryConfig;
pub use tmdb::{approval_url, TmdbAuth, TmdbClient};
pub use users::{Post, User, UserProfile, UsersClient, UsersClientConfig};
