//! Service error handling
//!
//! This module provides the error taxonomy every service returns, and the
//! mapping a request layer uses to turn those errors into responses.

use crate::repositories::StoreError;
use thiserror::Error;
use tracing::error;
use wellness_tracker_shared::types::{ErrorDetail, ErrorResponse};
use wellness_tracker_shared::CalculationError;

/// Error type returned by every service operation
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    DuplicateEntity(String),

    #[error("Invalid credentials")]
    InvalidCredential,

    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    /// HTTP-equivalent status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 400,
            ServiceError::InvalidCredential => 401,
            ServiceError::NotFound(_) => 404,
            ServiceError::DuplicateEntity(_) => 409,
            ServiceError::DivisionByZero(_) => 422,
            ServiceError::Internal(_) | ServiceError::Database(_) => 500,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::DuplicateEntity(_) => "DUPLICATE_ENTITY",
            ServiceError::InvalidCredential => "INVALID_CREDENTIAL",
            ServiceError::DivisionByZero(_) => "DIVISION_BY_ZERO",
            ServiceError::Internal(_) => "INTERNAL_ERROR",
            ServiceError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Build the response body a request layer sends back
    ///
    /// Internal and database errors are logged here and replaced by a
    /// generic message.
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            ServiceError::Internal(err) => {
                error!("Internal error: {:?}", err);
                "An internal error occurred".to_string()
            }
            ServiceError::Database(err) => {
                error!("Database error: {:?}", err);
                "A database error occurred".to_string()
            }
            ServiceError::Validation(msg)
            | ServiceError::NotFound(msg)
            | ServiceError::DuplicateEntity(msg)
            | ServiceError::DivisionByZero(msg) => msg.clone(),
            ServiceError::InvalidCredential => "Invalid username or password".to_string(),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
                field: None,
            },
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(what) => {
                ServiceError::DuplicateEntity(format!("{} already exists", what))
            }
            StoreError::Database(e) => ServiceError::Database(e),
            StoreError::Corrupt(msg) => {
                ServiceError::Internal(anyhow::anyhow!("Corrupt row: {}", msg))
            }
        }
    }
}

impl From<CalculationError> for ServiceError {
    fn from(err: CalculationError) -> Self {
        match err {
            CalculationError::DivisionByZero(what) => ServiceError::DivisionByZero(what.to_string()),
            other => ServiceError::Validation(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::Validation(errors.to_string())
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_status() {
        let error = ServiceError::Validation("Invalid input".to_string());
        assert_eq!(error.status_code(), 400);
        assert_eq!(error.to_response().error.code, "VALIDATION_ERROR");
    }

    #[test]
    fn test_not_found_error_status() {
        let error = ServiceError::NotFound("User not found".to_string());
        assert_eq!(error.status_code(), 404);
        assert_eq!(error.to_response().error.message, "User not found");
    }

    #[test]
    fn test_invalid_credential_hides_detail() {
        let error = ServiceError::InvalidCredential;
        assert_eq!(error.status_code(), 401);
        assert_eq!(
            error.to_response().error.message,
            "Invalid username or password"
        );
    }

    #[test]
    fn test_internal_error_is_masked() {
        let error = ServiceError::Internal(anyhow::anyhow!("pool exhausted at 10.0.0.3"));
        let response = error.to_response();
        assert_eq!(response.error.code, "INTERNAL_ERROR");
        assert!(!response.error.message.contains("10.0.0.3"));
    }

    #[test]
    fn test_unique_violation_becomes_duplicate() {
        let error: ServiceError = StoreError::UniqueViolation("username".to_string()).into();
        assert!(matches!(error, ServiceError::DuplicateEntity(_)));
        assert_eq!(error.status_code(), 409);
    }

    #[test]
    fn test_calculation_errors_map_by_kind() {
        let error: ServiceError = CalculationError::DivisionByZero("plan spans zero days").into();
        assert!(matches!(error, ServiceError::DivisionByZero(_)));

        let error: ServiceError = CalculationError::InvalidHeight.into();
        assert!(matches!(error, ServiceError::Validation(_)));
    }
}
