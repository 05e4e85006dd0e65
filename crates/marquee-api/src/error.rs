use thiserror::Error;

/// Everything a single API call can end in besides a decoded body.
///
/// `Server` is the only variant that comes from the remote side answering;
/// the rest are local classifications of what went wrong on the way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{status_code} {status}: {message}")]
    Server {
        status_code: u16,
        status: String,
        message: String,
    },

    #[error("Empty response body")]
    EmptyBody,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Classify a transport-level reqwest failure
    pub fn from_transport(err: reqwest::Error) -> Self {
        // reqwest's Display includes the URL, which carries api_key/session_id
        let err = err.without_url();
        if err.is_timeout() {
            ApiError::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() {
            ApiError::Network(err.to_string())
        } else if err.is_decode() || err.is_body() {
            ApiError::Decode(err.to_string())
        } else if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else {
            ApiError::Unexpected(err.to_string())
        }
    }

    pub fn is_connection_failure(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Server { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::from_transport(err)
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::InvalidRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display() {
        let err = ApiError::Server {
            status_code: 401,
            status: "Unauthorized".to_string(),
            message: "Invalid API key: You must be granted a valid key.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "401 Unauthorized: Invalid API key: You must be granted a valid key."
        );
        assert_eq!(err.status_code(), Some(401));
    }

    #[test]
    fn test_every_variant_has_a_message() {
        let errors = vec![
            ApiError::EmptyBody,
            ApiError::Network(String::new()),
            ApiError::Timeout(String::new()),
            ApiError::Decode(String::new()),
            ApiError::InvalidRequest(String::new()),
            ApiError::Unexpected(String::new()),
        ];
        for err in errors {
            assert!(!err.to_string().is_empty());
            assert_eq!(err.status_code(), None);
        }
    }

    #[test]
    fn test_only_network_counts_as_connection_failure() {
        assert!(ApiError::Network("refused".into()).is_connection_failure());
        assert!(!ApiError::Timeout("slow".into()).is_connection_failure());
        assert!(!ApiError::EmptyBody.is_connection_failure());
    }
}
