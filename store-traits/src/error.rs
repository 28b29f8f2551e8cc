use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Authentication was rejected. Terminal: never retried.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The requested object does not exist in the container.
    #[error("Object not found: {name}")]
    ObjectNotFound { name: String },

    /// Any network or server side failure; retryable at the operation level.
    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn is_credentials(&self) -> bool {
        matches!(self, StoreError::InvalidCredentials(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::ObjectNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_classes() {
        assert!(StoreError::InvalidCredentials("denied".to_string()).is_credentials());
        assert!(!StoreError::Transfer("timeout".to_string()).is_credentials());
        assert!(StoreError::ObjectNotFound {
            name: "metadata.json".to_string()
        }
        .is_not_found());
    }
}
