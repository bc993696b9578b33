//! Service layer for the membership enumeration engine.
//!
//! Four services, all stateless per call: closure enumeration, hierarchy
//! cycle guarding, snapshot diffing, and result hydration.

pub mod cycle_guard;
pub mod diff;
pub mod enumeration;
pub mod hydration;

// Re-export commonly used types
pub use cycle_guard::CycleGuard;
pub use diff::diff_memberships;
pub use enumeration::MembershipEnumerator;
pub use hydration::MembershipHydrator;

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{GroupsError, Result};

/// Race a storage operation against the caller's cancellation token.
///
/// Every storage await in the engine goes through here: a token cancelled
/// while the read is in flight drops the read and surfaces
/// [`GroupsError::Cancelled`] promptly, so a hung store cannot hang the
/// operation. The select is biased so an already-cancelled token wins even
/// when the operation is immediately ready.
pub(crate) async fn abort_on_cancel<T>(
    cancel: &CancellationToken,
    op: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(GroupsError::Cancelled),
        result = op => result,
    }
}
