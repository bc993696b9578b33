//! Acyclicity guard for hierarchy-edge writes.
//!
//! The hierarchy graph, restricted to non-deleted groups, must stay a DAG.
//! [`CycleGuard::would_create_cycle`] is the pure predicate the write path
//! consults before committing a new or modified edge.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use gatehouse_core::GroupId;

use crate::error::Result;
use crate::services::abort_on_cancel;
use crate::store::GroupGraphStore;

/// Validates that a hierarchy-edge insert keeps the group graph acyclic.
pub struct CycleGuard {
    store: Arc<dyn GroupGraphStore>,
}

impl CycleGuard {
    /// Create a new guard over the given graph store.
    pub fn new(store: Arc<dyn GroupGraphStore>) -> Self {
        Self { store }
    }

    /// Whether nesting `member_group_id` inside `parent_group_id` would
    /// close a directed cycle.
    ///
    /// A detected cycle is a normal `Ok(true)`, never an error; only
    /// infrastructure failures are errors. Edges touching soft-deleted
    /// groups are excluded, so a formerly cyclic configuration whose
    /// participant was since deleted reports cycle-free.
    ///
    /// The caller must run this check under the same isolation scope as the
    /// edge insert it guards. Two concurrent inserts checked independently
    /// can each pass and jointly close a cycle.
    pub async fn would_create_cycle(
        &self,
        parent_group_id: GroupId,
        member_group_id: GroupId,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        // A group nested inside itself is always a cycle.
        if parent_group_id == member_group_id {
            return Ok(true);
        }

        let edges = abort_on_cancel(cancel, self.store.list_hierarchy_edges()).await?;

        let mut adjacency: HashMap<GroupId, Vec<GroupId>> = HashMap::new();
        for edge in &edges {
            adjacency
                .entry(edge.parent_group_id)
                .or_default()
                .push(edge.member_group_id);
        }
        adjacency
            .entry(parent_group_id)
            .or_default()
            .push(member_group_id);

        let nodes: Vec<GroupId> = adjacency.keys().copied().collect();
        for start in nodes {
            let mut on_path = HashSet::new();
            if walk_finds_cycle(start, &adjacency, &mut on_path) {
                tracing::debug!(
                    parent_group_id = %parent_group_id,
                    member_group_id = %member_group_id,
                    "Hierarchy edge rejected: would create cycle"
                );
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Depth-first search tracking the active path. Revisiting a node already on
/// the path signals a cycle; nodes are released on backtrack so sibling
/// branches can share ancestors.
fn walk_finds_cycle(
    node: GroupId,
    adjacency: &HashMap<GroupId, Vec<GroupId>>,
    on_path: &mut HashSet<GroupId>,
) -> bool {
    if !on_path.insert(node) {
        return true;
    }
    for next in adjacency.get(&node).into_iter().flatten() {
        if walk_finds_cycle(*next, adjacency, on_path) {
            return true;
        }
    }
    on_path.remove(&node);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{doubles, InMemoryGroupGraphStore};

    async fn chain_fixture(store: &InMemoryGroupGraphStore) -> (GroupId, GroupId, GroupId) {
        let a = store.add_group("A").await;
        let b = store.add_group("B").await;
        let c = store.add_group("C").await;
        store.add_edge(a, b).await;
        store.add_edge(b, c).await;
        (a, b, c)
    }

    #[tokio::test]
    async fn test_closing_the_loop_is_a_cycle() {
        let store = Arc::new(InMemoryGroupGraphStore::new());
        let (a, _b, c) = chain_fixture(&store).await;
        let guard = CycleGuard::new(store);

        let cyclic = guard
            .would_create_cycle(c, a, &CancellationToken::new())
            .await
            .unwrap();
        assert!(cyclic);
    }

    #[tokio::test]
    async fn test_unrelated_edge_is_not_a_cycle() {
        let store = Arc::new(InMemoryGroupGraphStore::new());
        let (a, _b, _c) = chain_fixture(&store).await;
        let unrelated = store.add_group("D").await;
        let guard = CycleGuard::new(store);

        let cyclic = guard
            .would_create_cycle(a, unrelated, &CancellationToken::new())
            .await
            .unwrap();
        assert!(!cyclic);
    }

    #[tokio::test]
    async fn test_self_edge_is_always_a_cycle() {
        let store = Arc::new(InMemoryGroupGraphStore::new());
        let group = store.add_group("Solo").await;
        let guard = CycleGuard::new(store);

        let cyclic = guard
            .would_create_cycle(group, group, &CancellationToken::new())
            .await
            .unwrap();
        assert!(cyclic);
    }

    #[tokio::test]
    async fn test_deleted_participant_clears_the_cycle() {
        let store = Arc::new(InMemoryGroupGraphStore::new());
        let (a, b, c) = chain_fixture(&store).await;
        let guard = CycleGuard::new(store.clone());
        let cancel = CancellationToken::new();

        assert!(guard.would_create_cycle(c, a, &cancel).await.unwrap());

        // Deleting B drops both chain edges from the graph, so C -> A no
        // longer closes anything even though the edge rows still exist.
        store.soft_delete_group(b).await;
        assert!(!guard.would_create_cycle(c, a, &cancel).await.unwrap());
    }

    #[tokio::test]
    async fn test_longer_loop_through_new_edge() {
        let store = Arc::new(InMemoryGroupGraphStore::new());
        let (a, b, _c) = chain_fixture(&store).await;
        let guard = CycleGuard::new(store);

        // B -> A would close A -> B -> A.
        let cyclic = guard
            .would_create_cycle(b, a, &CancellationToken::new())
            .await
            .unwrap();
        assert!(cyclic);
    }

    #[tokio::test]
    async fn test_cancelled_token_aborts_guard() {
        let store = Arc::new(InMemoryGroupGraphStore::new());
        let (a, _b, c) = chain_fixture(&store).await;
        let guard = CycleGuard::new(store);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = guard.would_create_cycle(c, a, &cancel).await.unwrap_err();
        assert!(matches!(err, crate::GroupsError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_during_inflight_read_aborts_guard() {
        let guard = CycleGuard::new(Arc::new(doubles::HangingStore));
        let cancel = CancellationToken::new();

        let (result, ()) = tokio::time::timeout(std::time::Duration::from_secs(1), async {
            tokio::join!(
                guard.would_create_cycle(GroupId::new(), GroupId::new(), &cancel),
                async {
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                    cancel.cancel();
                }
            )
        })
        .await
        .expect("cancellation did not interrupt the hung read");

        assert!(matches!(result.unwrap_err(), crate::GroupsError::Cancelled));
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces_unchanged() {
        let guard = CycleGuard::new(Arc::new(doubles::FailingStore));

        let err = guard
            .would_create_cycle(GroupId::new(), GroupId::new(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::GroupsError::Repository(_)));
    }
}
