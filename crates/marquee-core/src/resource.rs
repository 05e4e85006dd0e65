// The tagged result every repository call ends in
use futures::stream::{self, BoxStream, StreamExt};
use marquee_api::ApiError;
use serde::Serialize;
use std::fmt;
use std::future::Future;

/// Why a call failed locally (as opposed to the server saying no)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Timeout,
    EmptyBody,
    Decode,
    InvalidRequest,
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "network",
            ErrorKind::Timeout => "timeout",
            ErrorKind::EmptyBody => "empty body",
            ErrorKind::Decode => "decode",
            ErrorKind::InvalidRequest => "invalid request",
            ErrorKind::Unexpected => "unexpected",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum Resource<T> {
    Loading,
    Success(T),
    Error {
        kind: ErrorKind,
        message: String,
    },
    ServerError {
        status_code: u16,
        status: String,
        server_message: String,
    },
}

impl<T> Resource<T> {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Resource::Error {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Resource::Success(_))
    }

    /// Both local errors and server errors
    pub fn is_error(&self) -> bool {
        matches!(self, Resource::Error { .. } | Resource::ServerError { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Resource::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Resource::Success(data) => Some(data),
            _ => None,
        }
    }

    /// What the user gets to read. Server errors show the server's own words.
    pub fn error_message(&self) -> Option<String> {
        match self {
            Resource::Error { message, .. } => Some(message.clone()),
            Resource::ServerError {
                status_code,
                server_message,
                ..
            } => Some(format!("{}: {}", status_code, server_message)),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resource<U> {
        match self {
            Resource::Loading => Resource::Loading,
            Resource::Success(data) => Resource::Success(f(data)),
            Resource::Error { kind, message } => Resource::Error { kind, message },
            Resource::ServerError {
                status_code,
                status,
                server_message,
            } => Resource::ServerError {
                status_code,
                status,
                server_message,
            },
        }
    }

    /// Carry a failure (or Loading) over to another payload type.
    ///
    /// A success has nothing to carry, so it turns into an unexpected error.
    /// Callers match `Success` out first.
    pub fn failure<U>(self) -> Resource<U> {
        match self {
            Resource::Loading => Resource::Loading,
            Resource::Success(_) => {
                Resource::error(ErrorKind::Unexpected, "Expected a failure, got a success")
            }
            Resource::Error { kind, message } => Resource::Error { kind, message },
            Resource::ServerError {
                status_code,
                status,
                server_message,
            } => Resource::ServerError {
                status_code,
                status,
                server_message,
            },
        }
    }
}

impl<T> From<Result<T, ApiError>> for Resource<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => Resource::Success(data),
            Err(err) => err.into(),
        }
    }
}

impl<T> From<ApiError> for Resource<T> {
    fn from(err: ApiError) -> Self {
        let kind = match &err {
            ApiError::Server {
                status_code,
                status,
                message,
            } => {
                return Resource::ServerError {
                    status_code: *status_code,
                    status: status.clone(),
                    server_message: message.clone(),
                }
            }
            ApiError::EmptyBody => ErrorKind::EmptyBody,
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Timeout(_) => ErrorKind::Timeout,
            ApiError::Decode(_) => ErrorKind::Decode,
            ApiError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ApiError::Unexpected(_) => ErrorKind::Unexpected,
        };
        Resource::error(kind, err.to_string())
    }
}

pub type ResourceStream<'a, T> = BoxStream<'a, Resource<T>>;

/// `Loading`, then whatever the call settles on, then done.
pub fn resource_stream<'a, T, F>(call: F) -> ResourceStream<'a, T>
where
    F: Future<Output = Resource<T>> + Send + 'a,
    T: Send + 'a,
{
    stream::once(async { Resource::Loading })
        .chain(stream::once(call))
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_from_ok() {
        let resource = Resource::from(Ok::<u32, ApiError>(5));
        assert_eq!(resource, Resource::Success(5));
        assert!(resource.is_success());
        assert_eq!(resource.data(), Some(&5));
        assert_eq!(resource.error_message(), None);
    }

    #[test]
    fn test_server_error_keeps_status_and_message() {
        let resource = Resource::<u32>::from(ApiError::Server {
            status_code: 401,
            status: "Unauthorized".into(),
            message: "Invalid API key: You must be granted a valid key.".into(),
        });

        assert_eq!(
            resource,
            Resource::ServerError {
                status_code: 401,
                status: "Unauthorized".into(),
                server_message: "Invalid API key: You must be granted a valid key.".into(),
            }
        );
        assert!(resource.is_error());
        assert_eq!(
            resource.error_message().as_deref(),
            Some("401: Invalid API key: You must be granted a valid key.")
        );
    }

    #[test]
    fn test_transport_errors_are_classified() {
        let cases = [
            (ApiError::Network("refused".into()), ErrorKind::Network),
            (ApiError::Timeout("slow".into()), ErrorKind::Timeout),
            (ApiError::EmptyBody, ErrorKind::EmptyBody),
            (ApiError::Decode("eof".into()), ErrorKind::Decode),
            (ApiError::Unexpected("?".into()), ErrorKind::Unexpected),
        ];

        for (err, expected) in cases {
            let resource: Resource<()> = err.into();
            match &resource {
                Resource::Error { kind, message } => {
                    assert_eq!(*kind, expected);
                    assert!(!message.is_empty());
                }
                other => panic!("expected Error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_map_and_failure() {
        assert_eq!(Resource::Success(2).map(|n| n * 10), Resource::Success(20));

        let err: Resource<i32> = Resource::error(ErrorKind::Timeout, "slow");
        let moved: Resource<String> = err.clone().failure();
        assert_eq!(moved, Resource::error(ErrorKind::Timeout, "slow"));

        let odd: Resource<String> = Resource::Success(1).failure();
        assert!(matches!(odd, Resource::Error { kind: ErrorKind::Unexpected, .. }));
    }

    #[tokio::test]
    async fn test_stream_emits_loading_then_one_terminal() {
        let emitted: Vec<Resource<&str>> =
            resource_stream(async { Resource::Success("done") }).collect().await;
        assert_eq!(emitted, vec![Resource::Loading, Resource::Success("done")]);

        let emitted: Vec<Resource<()>> =
            resource_stream(async { Resource::error(ErrorKind::Network, "offline") })
                .collect()
                .await;
        assert_eq!(emitted.len(), 2);
        assert!(emitted[0].is_loading());
        assert!(emitted[1].is_error());
    }
}
