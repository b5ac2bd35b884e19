//! Centralized error handling.
//!
//! One error type for the whole data-access layer. Store rejections are
//! folded into [`ValidationFailure`]; anything else from the store is carried
//! unchanged in [`AppError::Database`].

use std::fmt;

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// The store rejected a change against schema or business constraints.
    #[error("{0}")]
    Validation(ValidationFailure),

    /// Unclassified store failure (connectivity, serialization, ...).
    #[error("Database error: {0}")]
    Database(DbErr),

    /// The store handle backing a repository was already disposed.
    #[error("Store handle has already been released")]
    Released,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message))
            | Some(SqlErr::ForeignKeyConstraintViolation(message)) => {
                AppError::Validation(ValidationFailure::single("constraint", message))
            }
            _ => AppError::Database(err),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn validation(failure: impl Into<ValidationFailure>) -> Self {
        AppError::Validation(failure.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Returns the aggregated violations when this is a validation failure.
    pub fn as_validation(&self) -> Option<&ValidationFailure> {
        match self {
            AppError::Validation(failure) => Some(failure),
            _ => None,
        }
    }
}

/// A single field-level rejection reported by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every violation reported for one rejected operation, in reported order.
///
/// Displays as `"field: message; field: message"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationFailure {
    violations: Vec<FieldViolation>,
}

impl ValidationFailure {
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldViolation::new(field, message)])
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Violations rendered as `"field: message"` strings.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn extend(&mut self, other: ValidationFailure) {
        self.violations.extend(other.violations);
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

/// Fields are reported alphabetically; validator keeps them in a hash map.
impl From<&validator::ValidationErrors> for ValidationFailure {
    fn from(errors: &validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| (field.to_string(), errs))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let violations = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    FieldViolation::new(field.clone(), message)
                })
            })
            .collect();

        Self::new(violations)
    }
}

impl From<validator::ValidationErrors> for ValidationFailure {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::from(&errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_violations_in_reported_order() {
        let failure = ValidationFailure::new(vec![
            FieldViolation::new("staff_id", "must reference a staff member"),
            FieldViolation::new("order_status", "must be between 1 and 4"),
        ]);

        assert_eq!(
            failure.to_string(),
            "staff_id: must reference a staff member; order_status: must be between 1 and 4"
        );
        assert_eq!(failure.messages().len(), 2);
    }

    #[test]
    fn validation_error_displays_aggregated_message() {
        let err = AppError::validation(ValidationFailure::single("store_id", "must reference a store"));
        assert_eq!(err.to_string(), "store_id: must reference a store");
        assert!(err.as_validation().is_some());
    }

    #[test]
    fn unclassified_db_error_is_kept() {
        let err = AppError::from(DbErr::Custom("connection reset".into()));
        assert!(matches!(err, AppError::Database(_)));
    }
}
