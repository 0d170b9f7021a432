//! # Error Types
//!
//! Domain-specific error types for catalog-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  catalog-core errors (this file)                                       │
//! │  ├── CoreError          - General domain errors                        │
//! │  ├── ValidationFailure  - Aggregate rejection of a submission          │
//! │  └── ValidationError    - One field rejected by one validator          │
//! │                                                                         │
//! │  catalog app errors (separate crate)                                   │
//! │  ├── AppError           - Config, file read, stream failures           │
//! │  └── ApiError           - What the presentation layer sees             │
//! │                                                                         │
//! │  Flow: ValidationError* → ValidationFailure → ApiError → Frontend      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT An Error
//! - A non-numeric price: degrades to an empty total.
//! - An unrecognized validator name: vacuously satisfied.

use thiserror::Error;

use crate::validation::ValidatorName;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The submitted form did not pass validation.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
}

// =============================================================================
// Validation Errors
// =============================================================================

/// One field rejected by one registered validator.
///
/// Never shown to the user directly; the UI only sees the errored flag
/// on the field and the aggregate [`ValidationFailure`] message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} failed '{validator}'")]
pub struct ValidationError {
    pub field: String,
    pub validator: ValidatorName,
}

/// Aggregate rejection of a whole form submission.
///
/// ## Submission Rule
/// ```text
/// fields ──► validate each ──► any invalid? ──► ValidationFailure
///                                   │              (store untouched)
///                                   ▼
///                              all valid ──► Product appended
/// ```
///
/// `Display` gives the default banner text; the app shows its configured
/// failure message instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", crate::DEFAULT_FAILURE_MESSAGE)]
pub struct ValidationFailure {
    /// Every individual rejection, in field order.
    pub errors: Vec<ValidationError>,
}

impl ValidationFailure {
    /// Names of the invalid fields, deduplicated, in field order.
    pub fn invalid_fields(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for err in &self.errors {
            if !names.contains(&err.field.as_str()) {
                names.push(err.field.as_str());
            }
        }
        names
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> ValidationFailure {
        ValidationFailure {
            errors: vec![
                ValidationError {
                    field: "barcode".to_string(),
                    validator: ValidatorName::Required,
                },
                ValidationError {
                    field: "barcode".to_string(),
                    validator: ValidatorName::Number,
                },
                ValidationError {
                    field: "price".to_string(),
                    validator: ValidatorName::Number,
                },
            ],
        }
    }

    #[test]
    fn test_validation_error_message() {
        let err = ValidationError {
            field: "price".to_string(),
            validator: ValidatorName::Number,
        };
        assert_eq!(err.to_string(), "price failed 'number'");
    }

    #[test]
    fn test_invalid_fields_are_deduplicated() {
        assert_eq!(failure().invalid_fields(), vec!["barcode", "price"]);
    }

    #[test]
    fn test_failure_converts_to_core_error() {
        let core_err: CoreError = failure().into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Forma nije validna");
    }
}
