//! Domain types for the group membership graph.
//!
//! Groups form the nodes of the hierarchy graph; direct memberships and
//! hierarchy edges are its two edge kinds. [`EnumeratedMembership`] is the
//! computed output: one row per (group, user) pair reachable through the
//! closure, never persisted.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatehouse_core::{GroupId, UserId};

/// A group of users, possibly nested inside other groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier.
    pub id: GroupId,
    /// Display name.
    pub name: String,
    /// URL-safe short name.
    pub slug: String,
    /// Soft-delete marker. A deleted group stays in storage but drops out of
    /// every graph operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Group {
    /// Whether the group has been soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Minimal identity attributes for a membership participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Display name, if the user has set one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Primary email address.
    pub email: String,
}

/// An explicit user-to-group assignment.
///
/// This is the only membership form that may carry admin rights or a finite
/// expiry; inherited membership never does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectMembership {
    /// The group the user was added to.
    pub group_id: GroupId,
    /// The member.
    pub user_id: UserId,
    /// Whether the user administers the group.
    pub is_admin: bool,
    /// When the membership lapses. `None` means it never expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// A directed "nested-inside" relationship between two groups.
///
/// Every member of `member_group_id`, direct or inherited, is an inherited
/// member of `parent_group_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyEdge {
    /// The enclosing group.
    pub parent_group_id: GroupId,
    /// The nested group.
    pub member_group_id: GroupId,
    /// When the nesting lapses. `None` means it never expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Scope for a direct-membership listing.
///
/// An empty filter selects every direct membership in the system.
#[derive(Debug, Clone, Default)]
pub struct MembershipFilter {
    /// Restrict to one user's memberships.
    pub user_id: Option<UserId>,
    /// Restrict to one group's memberships.
    pub group_id: Option<GroupId>,
}

impl MembershipFilter {
    /// Filter matching every direct membership.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter matching one user's direct memberships.
    #[must_use]
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            group_id: None,
        }
    }

    /// Filter matching one group's direct memberships.
    #[must_use]
    pub fn for_group(group_id: GroupId) -> Self {
        Self {
            user_id: None,
            group_id: Some(group_id),
        }
    }

    /// Whether a membership row falls inside this scope.
    #[must_use]
    pub fn matches(&self, membership: &DirectMembership) -> bool {
        self.user_id.is_none_or(|u| u == membership.user_id)
            && self.group_id.is_none_or(|g| g == membership.group_id)
    }
}

/// One computed membership fact: user belongs to group, directly or through
/// nesting.
///
/// Equality and hashing cover the five value fields only, never the hydrated
/// [`Group`]/[`User`] records, so a hydrated and an unhydrated row with the
/// same facts compare equal. Membership diffing relies on this whole-value
/// identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumeratedMembership {
    /// The group the user belongs to.
    pub group_id: GroupId,
    /// The member.
    pub user_id: UserId,
    /// True only when some direct membership for this exact pair carries
    /// admin rights. Admin status never propagates through hierarchy edges.
    pub is_admin: bool,
    /// The direct membership's expiry when `direct` is true; always `None`
    /// for purely inherited membership.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// True iff a direct membership exists for this exact (group, user) pair.
    pub direct: bool,
    /// Full group record, attached by hydration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Group>,
    /// Full user record, attached by hydration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl EnumeratedMembership {
    /// Build an unhydrated membership fact.
    #[must_use]
    pub fn new(
        group_id: GroupId,
        user_id: UserId,
        is_admin: bool,
        expires_at: Option<DateTime<Utc>>,
        direct: bool,
    ) -> Self {
        Self {
            group_id,
            user_id,
            is_admin,
            expires_at,
            direct,
            group: None,
            user: None,
        }
    }
}

impl PartialEq for EnumeratedMembership {
    fn eq(&self, other: &Self) -> bool {
        self.group_id == other.group_id
            && self.user_id == other.user_id
            && self.is_admin == other.is_admin
            && self.expires_at == other.expires_at
            && self.direct == other.direct
    }
}

impl Eq for EnumeratedMembership {}

impl Hash for EnumeratedMembership {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group_id.hash(state);
        self.user_id.hash(state);
        self.is_admin.hash(state);
        self.expires_at.hash(state);
        self.direct.hash(state);
    }
}
