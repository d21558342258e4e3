//! Boundary error type.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] formcheck_core::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

impl ApiError {
    /// Whether the request itself was malformed, as opposed to the frame
    /// or the service's own setup.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApiError::MissingField(_)
                | ApiError::Core(formcheck_core::Error::InvalidSnapshot { .. })
                | ApiError::Core(formcheck_core::Error::UnknownJoint(_))
                | ApiError::Core(formcheck_core::Error::NoInstructions(_))
        )
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let err = ApiError::MissingField("exercise_type");
        assert_eq!(err.to_string(), "Missing required field: exercise_type");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_core_errors_pass_through() {
        let err: ApiError = formcheck_core::Error::NoInstructions("burpee".into()).into();
        assert_eq!(err.to_string(), "No instructions available for burpee");
        assert!(err.is_client_error());

        let err: ApiError = formcheck_core::Error::DegenerateGeometry {
            vertex: "left_knee".into(),
        }
        .into();
        assert!(!err.is_client_error());
    }
}
