//! Error types for the gatehouse-groups crate.
//!
//! Provides the unified error type returned by every engine operation.

use thiserror::Error;

/// Result type alias for group-engine operations.
pub type Result<T> = std::result::Result<T, GroupsError>;

/// Errors surfaced by the membership enumeration engine.
///
/// Infrastructure failures abort the whole operation: the engine never
/// returns a partially computed result alongside an error. A detected
/// hierarchy cycle is not an error, it is a normal `true` return from the
/// cycle guard.
///
/// # Example
///
/// ```rust
/// use gatehouse_groups::GroupsError;
///
/// fn handle_error(err: GroupsError) {
///     match err {
///         GroupsError::Repository(msg) => eprintln!("Storage failed: {msg}"),
///         GroupsError::Cancelled => eprintln!("Caller gave up"),
///         GroupsError::NotFound { resource, id } => eprintln!("{resource} {id} missing"),
///     }
/// }
/// ```
#[derive(Debug, Clone, Error)]
pub enum GroupsError {
    /// The storage collaborator failed to serve a read or write.
    ///
    /// Covers connectivity loss, timeouts, and query failures. Retry policy,
    /// if any, belongs to the caller; the engine performs no internal retries.
    #[error("Repository unavailable: {0}")]
    Repository(String),

    /// The caller-supplied cancellation signal fired before the operation
    /// completed.
    #[error("Operation cancelled by caller")]
    Cancelled,

    /// A required entity does not exist in storage.
    ///
    /// Enumeration over an unknown group or user yields an empty result, not
    /// this error; store backends raise it only when a lookup that must
    /// succeed cannot.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// The type of resource that was not found (e.g., "Group", "User")
        resource: String,
        /// Identifier of the missing resource
        id: String,
    },
}
