//! Audit subsystem error taxonomy

use thiserror::Error;

/// Result type alias for audit operations
pub type AuditResult<T> = std::result::Result<T, AuditError>;

/// Errors raised by the audit subsystem
///
/// None of these are retried internally. An append that fails must surface
/// to the collaborator; silently dropping a compliance record is worse than
/// failing the parent operation.
#[derive(Error, Debug)]
pub enum AuditError {
    /// An attempt to overwrite or delete an existing audit event
    #[error("Audit events are immutable and cannot be modified or deleted")]
    ImmutabilityViolation,

    /// Malformed or missing required fields on write
    #[error("Validation error: {0}")]
    Validation(String),

    /// The durable store could not be reached or the write failed
    #[error("Audit storage unavailable: {0}")]
    Storage(#[from] sqlx::Error),

    /// A non-admin caller attempted search or export
    #[error("Not authorized to access audit data")]
    AuthorizationDenied,
}

impl AuditError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
