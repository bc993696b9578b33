//! gatehouse Core Library
//!
//! Shared types for gatehouse.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (GroupId, UserId)
//!
//! # Example
//!
//! ```
//! use gatehouse_core::{GroupId, UserId};
//!
//! let group_id = GroupId::new();
//! let user_id = UserId::new();
//! assert_ne!(group_id.to_string(), user_id.to_string());
//! ```

pub mod ids;

// Re-export main types for convenient access
pub use ids::{GroupId, ParseIdError, UserId};
