//! Session error types

/// Errors that can occur during session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The store could not be built from the supplied options
    #[error("Session store configuration error: {0}")]
    Config(String),

    /// Error from a session store backend
    #[error("Session store error: {0}")]
    Store(String),

    /// Error during JSON serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error raised by a custom session codec
    #[error("Codec error: {0}")]
    Codec(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Redis error (when redis-store feature is enabled)
    #[cfg(feature = "redis-store")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

impl SessionError {
    /// Whether this error came from store configuration rather than an operation
    pub fn is_config(&self) -> bool {
        matches!(self, SessionError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_error_is_wrapped() {
        let err: SessionError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, SessionError::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error:"));
        assert!(!err.is_config());
    }

    #[test]
    fn test_config_error_message() {
        let err = SessionError::Config("missing client".to_string());
        assert!(err.is_config());
        assert_eq!(
            err.to_string(),
            "Session store configuration error: missing client"
        );
    }
}
