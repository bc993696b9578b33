//! Group membership enumeration engine.
//!
//! This crate computes, for a graph of nested groups, the complete set of
//! direct and inherited user memberships, keeps the hierarchy acyclic, and
//! diffs membership snapshots.
//!
//! # Features
//!
//! - Transitive membership closure over nested groups (whole system, per
//!   user, per group)
//! - Direct-wins aggregation: admin rights and expiries come from direct
//!   memberships only and never propagate through nesting
//! - Pre-commit cycle guard for hierarchy-edge writes
//! - Whole-value diffing between enumeration snapshots
//! - Batch hydration of results with full group/user records
//! - Soft-deleted groups drop out of every graph operation
//!
//! # Services
//!
//! The [`services`] module provides:
//! - [`services::MembershipEnumerator`] - membership closure queries
//! - [`services::CycleGuard`] - acyclicity check for edge inserts
//! - [`services::diff_memberships`] - snapshot set difference
//! - [`services::MembershipHydrator`] - batch record attachment
//!
//! # Storage
//!
//! The engine owns no persistence. It reads graph snapshots through the
//! [`store::GroupGraphStore`] trait; [`store::InMemoryGroupGraphStore`]
//! backs the tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gatehouse_groups::{MembershipEnumerator, InMemoryGroupGraphStore};
//! use tokio_util::sync::CancellationToken;
//!
//! let store = Arc::new(InMemoryGroupGraphStore::new());
//! let enumerator = MembershipEnumerator::new(store);
//! let memberships = enumerator.enumerate_all(&CancellationToken::new()).await?;
//! ```

pub mod error;
pub mod services;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{GroupsError, Result};
pub use services::{
    diff_memberships, CycleGuard, MembershipEnumerator, MembershipHydrator,
};
pub use store::{GroupGraphStore, InMemoryGroupGraphStore};
pub use types::{
    DirectMembership, EnumeratedMembership, Group, HierarchyEdge, MembershipFilter, User,
};
