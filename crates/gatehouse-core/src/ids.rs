//! Strongly Typed Identifiers
//!
//! Type-safe identifier newtypes for gatehouse. Every entity id in the
//! platform is a UUID at rest; the newtype pattern keeps the compiler from
//! letting a `UserId` slip into a slot that expects a `GroupId`.
//!
//! # Example
//!
//! ```
//! use gatehouse_core::{GroupId, UserId};
//!
//! let group = GroupId::new();
//! let user = UserId::new();
//!
//! fn requires_group(id: GroupId) -> String {
//!     id.to_string()
//! }
//!
//! let result = requires_group(group);
//! // requires_group(user); // This would not compile!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Error type for ID parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse
    pub id_type: &'static str,
    /// The underlying UUID parse error message
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to define a strongly-typed ID type
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID using UUID v4.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns a reference to the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        message: e.to_string(),
                    })
            }
        }
    };
}

define_id!(
    /// Strongly typed identifier for groups.
    ///
    /// Groups are the nodes of the membership hierarchy graph.
    ///
    /// # Example
    ///
    /// ```
    /// use gatehouse_core::GroupId;
    /// use uuid::Uuid;
    ///
    /// // Create a new random GroupId
    /// let group_id = GroupId::new();
    /// println!("Group: {}", group_id);
    ///
    /// // Create from existing UUID
    /// let uuid = Uuid::new_v4();
    /// let group_id = GroupId::from_uuid(uuid);
    /// assert_eq!(group_id.as_uuid(), &uuid);
    ///
    /// // Parse from string
    /// let group_id: GroupId = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
    /// ```
    GroupId
);

define_id!(
    /// Strongly typed identifier for users.
    ///
    /// Users are the leaf participants in group membership.
    ///
    /// # Example
    ///
    /// ```
    /// use gatehouse_core::UserId;
    ///
    /// let user_id = UserId::new();
    /// println!("User: {}", user_id);
    /// ```
    UserId
);
