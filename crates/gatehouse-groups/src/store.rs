//! Storage seam for the membership graph.
//!
//! The engine never owns persistence: it reads snapshots of the graph
//! through [`GroupGraphStore`] and derives results in memory. Production
//! wires a relational backend behind this trait; tests use
//! [`InMemoryGroupGraphStore`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use gatehouse_core::{GroupId, UserId};

use crate::error::Result;
use crate::types::{DirectMembership, Group, HierarchyEdge, MembershipFilter, User};

/// Read-only access to the membership graph.
///
/// Every method returns a consistent snapshot as of the call; an empty
/// result set is a valid outcome, not an error. Infrastructure failures
/// surface as [`crate::GroupsError::Repository`].
#[async_trait::async_trait]
pub trait GroupGraphStore: Send + Sync {
    /// List direct memberships, optionally scoped to one user or group.
    async fn list_direct_memberships(
        &self,
        filter: &MembershipFilter,
    ) -> Result<Vec<DirectMembership>>;

    /// List hierarchy edges whose parent and member groups are both
    /// non-deleted. Edges touching a soft-deleted group must not appear.
    async fn list_hierarchy_edges(&self) -> Result<Vec<HierarchyEdge>>;

    /// Bulk-fetch groups by id. Missing ids are silently absent from the
    /// result.
    async fn fetch_groups_by_ids(&self, ids: &[GroupId]) -> Result<Vec<Group>>;

    /// Bulk-fetch users by id. Missing ids are silently absent from the
    /// result.
    async fn fetch_users_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>>;
}

// ============================================================================
// In-Memory Store (for testing)
// ============================================================================

/// In-memory graph store for testing.
#[derive(Debug, Default)]
pub struct InMemoryGroupGraphStore {
    groups: Arc<RwLock<HashMap<GroupId, Group>>>,
    users: Arc<RwLock<HashMap<UserId, User>>>,
    memberships: Arc<RwLock<Vec<DirectMembership>>>,
    edges: Arc<RwLock<Vec<HierarchyEdge>>>,
}

impl InMemoryGroupGraphStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group and return its id.
    pub async fn add_group(&self, name: &str) -> GroupId {
        let group = Group {
            id: GroupId::new(),
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            deleted_at: None,
        };
        let id = group.id;
        self.groups.write().await.insert(id, group);
        id
    }

    /// Register a user and return their id.
    pub async fn add_user(&self, email: &str) -> UserId {
        let user = User {
            id: UserId::new(),
            display_name: None,
            email: email.to_string(),
        };
        let id = user.id;
        self.users.write().await.insert(id, user);
        id
    }

    /// Record a direct membership.
    pub async fn add_membership(&self, membership: DirectMembership) {
        self.memberships.write().await.push(membership);
    }

    /// Remove the direct membership for a (group, user) pair, if present.
    pub async fn remove_membership(&self, group_id: GroupId, user_id: UserId) {
        self.memberships
            .write()
            .await
            .retain(|m| !(m.group_id == group_id && m.user_id == user_id));
    }

    /// Record a hierarchy edge nesting `member` inside `parent`.
    pub async fn add_edge(&self, parent: GroupId, member: GroupId) {
        self.edges.write().await.push(HierarchyEdge {
            parent_group_id: parent,
            member_group_id: member,
            expires_at: None,
        });
    }

    /// Mark a group soft-deleted. Its rows stay; the graph reads stop
    /// returning edges that touch it.
    pub async fn soft_delete_group(&self, group_id: GroupId) {
        if let Some(group) = self.groups.write().await.get_mut(&group_id) {
            group.deleted_at = Some(Utc::now());
        }
    }

    /// Clear all data.
    pub async fn clear(&self) {
        self.groups.write().await.clear();
        self.users.write().await.clear();
        self.memberships.write().await.clear();
        self.edges.write().await.clear();
    }
}

#[async_trait::async_trait]
impl GroupGraphStore for InMemoryGroupGraphStore {
    async fn list_direct_memberships(
        &self,
        filter: &MembershipFilter,
    ) -> Result<Vec<DirectMembership>> {
        let memberships = self.memberships.read().await;
        Ok(memberships
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }

    async fn list_hierarchy_edges(&self) -> Result<Vec<HierarchyEdge>> {
        let groups = self.groups.read().await;
        let live = |id: &GroupId| groups.get(id).is_some_and(|g| !g.is_deleted());

        let edges = self.edges.read().await;
        Ok(edges
            .iter()
            .filter(|e| live(&e.parent_group_id) && live(&e.member_group_id))
            .cloned()
            .collect())
    }

    async fn fetch_groups_by_ids(&self, ids: &[GroupId]) -> Result<Vec<Group>> {
        let groups = self.groups.read().await;
        Ok(ids.iter().filter_map(|id| groups.get(id).cloned()).collect())
    }

    async fn fetch_users_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }
}

// ============================================================================
// Misbehaving stores (shared test doubles)
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_edge_listing_excludes_deleted_groups() {
        let store = InMemoryGroupGraphStore::new();
        let parent = store.add_group("Parent").await;
        let member = store.add_group("Member").await;
        store.add_edge(parent, member).await;

        assert_eq!(store.list_hierarchy_edges().await.unwrap().len(), 1);

        store.soft_delete_group(member).await;
        assert!(store.list_hierarchy_edges().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_membership_filter_scopes_listing() {
        let store = InMemoryGroupGraphStore::new();
        let group = store.add_group("Staff").await;
        let alice = store.add_user("alice@example.com").await;
        let bob = store.add_user("bob@example.com").await;
        store
            .add_membership(DirectMembership {
                group_id: group,
                user_id: alice,
                is_admin: true,
                expires_at: None,
            })
            .await;
        store
            .add_membership(DirectMembership {
                group_id: group,
                user_id: bob,
                is_admin: false,
                expires_at: None,
            })
            .await;

        let all = store
            .list_direct_memberships(&MembershipFilter::all())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let just_alice = store
            .list_direct_memberships(&MembershipFilter::for_user(alice))
            .await
            .unwrap();
        assert_eq!(just_alice.len(), 1);
        assert!(just_alice[0].is_admin);
    }

    #[tokio::test]
    async fn test_bulk_fetch_skips_unknown_ids() {
        let store = InMemoryGroupGraphStore::new();
        let known = store.add_group("Known").await;

        let fetched = store
            .fetch_groups_by_ids(&[known, GroupId::new()])
            .await
            .unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].id, known);
    }
}
