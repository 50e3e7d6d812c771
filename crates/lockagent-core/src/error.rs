use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("lock service returned status code {status}")]
    Service { status: u16 },

    #[error("lock not found: {0}")]
    NotFound(String),

    #[error("failed to decode lock service payload: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("lock service response exceeds {limit} bytes")]
    ResponseTooLarge { limit: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl LockError {
    /// Status code carried by a [`LockError::Service`], if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            LockError::Service { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LockError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LockError::Transport(format!("request timed out: {err}"))
        } else {
            LockError::Transport(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, LockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_exposes_status() {
        let err = LockError::Service { status: 404 };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "lock service returned status code 404");
    }

    #[test]
    fn non_service_errors_have_no_status() {
        assert_eq!(LockError::Transport("refused".into()).status(), None);
        assert_eq!(LockError::NotFound("a".into()).status(), None);
    }

    #[test]
    fn json_error_converts_to_encoding() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: LockError = json_err.into();
        assert!(matches!(err, LockError::Encoding(_)));
    }
}
