//! Client error types

use thiserror::Error;

/// Client error type
///
/// `Validation` and `Conflict` are raised by local guards before any
/// network call. `Network`/`Server` are mapped at the REST boundary and
/// returned, never thrown past it. Benign event-ordering noise (stale or
/// duplicate events) is logged and dropped where it occurs and never
/// becomes an error.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Bad input caught before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// A local guard refused the action
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Request failed to complete (timeout, connection refused)
    #[error("Network error: {0}")]
    Network(String),

    /// Backend returned 4xx/5xx with a structured message
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The operation was abandoned by its cancellation token
    #[error("Operation cancelled")]
    Cancelled,
}

impl ClientError {
    /// Stable message key for the UI's localization layer
    pub fn user_message(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => "error.validation",
            ClientError::Conflict(_) => "error.conflict",
            ClientError::Network(_) => "error.network",
            ClientError::Server { status, .. } => match *status {
                401 => "error.auth",
                403 => "error.forbidden",
                404 => "error.not_found",
                422 => "error.bad_payload",
                500..=599 => "error.server",
                _ => "error.server",
            },
            ClientError::Cancelled => "error.cancelled",
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Network(format!("request timed out: {}", err))
        } else if err.is_connect() {
            ClientError::Network(format!("connection failed: {}", err))
        } else if let Some(status) = err.status() {
            ClientError::Server {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_status_mapping() {
        let err = ClientError::Server {
            status: 401,
            message: "token expired".to_string(),
        };
        assert_eq!(err.user_message(), "error.auth");

        let err = ClientError::Server {
            status: 404,
            message: "no such order".to_string(),
        };
        assert_eq!(err.user_message(), "error.not_found");

        let err = ClientError::Server {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.user_message(), "error.server");
    }

    #[test]
    fn test_local_guard_messages() {
        assert_eq!(
            ClientError::Validation("empty cart".to_string()).user_message(),
            "error.validation"
        );
        assert_eq!(
            ClientError::Conflict("table busy".to_string()).user_message(),
            "error.conflict"
        );
    }
}
