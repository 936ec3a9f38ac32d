//! Error taxonomy shared by all domain services.

/// Input rejected before anything is written
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please provide all required fields: {0} is missing")]
    MissingField(&'static str),
    #[error("{field} must be between 0 and {max}, got {value}")]
    ScoreOutOfRange {
        field: &'static str,
        value: f64,
        max: f64,
    },
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Credits must not be negative, got {0}")]
    NegativeCredits(i64),
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
}

impl ValidationError {
    /// Unwrap a required text field, treating blank as missing
    pub fn require(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
        match value {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(ValidationError::MissingField(field)),
        }
    }
}

/// Errors surfaced by domain services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    /// No valid identity: missing, unknown or expired token, bad credentials
    #[error("{0}")]
    Unauthenticated(String),
    /// Valid identity without the required role or course assignment
    #[error("{0}")]
    Unauthorized(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Conflict(String),
    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ServiceError::Unauthorized(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::Conflict(message.into())
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_blank() {
        assert_eq!(ValidationError::require(Some("x".to_string()), "name"), Ok("x".to_string()));
        assert_eq!(
            ValidationError::require(Some("  ".to_string()), "name"),
            Err(ValidationError::MissingField("name"))
        );
        assert_eq!(
            ValidationError::require(None, "email"),
            Err(ValidationError::MissingField("email"))
        );
    }
}
