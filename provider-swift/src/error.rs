//! Error types for the Swift provider

use store_traits::StoreError;
use thiserror::Error;

/// Swift provider errors
#[derive(Error, Debug)]
pub enum SwiftError {
    /// The auth endpoint rejected the supplied credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API returned an unexpected status
    #[error("Swift API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The provider name does not map to a known auth endpoint
    #[error("Unknown storage provider: {0}")]
    UnknownProvider(String),

    /// Failed to parse an API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Store-level error
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for Swift operations
pub type Result<T> = std::result::Result<T, SwiftError>;

impl From<SwiftError> for StoreError {
    fn from(error: SwiftError) -> Self {
        match error {
            SwiftError::AuthenticationFailed(msg) => StoreError::InvalidCredentials(msg),
            SwiftError::ApiError { status, message } => {
                StoreError::Transfer(format!("Swift API error (status {}): {}", status, message))
            }
            SwiftError::UnknownProvider(name) => {
                StoreError::Transfer(format!("unknown storage provider: {}", name))
            }
            SwiftError::ParseError(msg) => StoreError::Transfer(format!("parse error: {}", msg)),
            SwiftError::Store(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = SwiftError::ApiError {
            status: 404,
            message: "container missing".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Swift API error (status 404): container missing"
        );
    }

    #[test]
    fn test_auth_failure_maps_to_invalid_credentials() {
        let error = SwiftError::AuthenticationFailed("key rejected".to_string());
        let store_error: StoreError = error.into();
        assert!(store_error.is_credentials());
    }

    #[test]
    fn test_not_found_passes_through() {
        let error = SwiftError::Store(StoreError::ObjectNotFound {
            name: "index.html".to_string(),
        });
        let store_error: StoreError = error.into();
        assert!(store_error.is_not_found());
    }
}
