//! Batch hydration of enumeration results.
//!
//! Attaches full [`Group`](crate::types::Group) and
//! [`User`](crate::types::User) records to enumerated memberships with
//! exactly two bulk lookups regardless of entry count, joined in memory.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use gatehouse_core::{GroupId, UserId};

use crate::error::Result;
use crate::services::abort_on_cancel;
use crate::store::GroupGraphStore;
use crate::types::EnumeratedMembership;

/// Attaches group and user records to enumeration results.
pub struct MembershipHydrator {
    store: Arc<dyn GroupGraphStore>,
}

impl MembershipHydrator {
    /// Create a new hydrator over the given graph store.
    pub fn new(store: Arc<dyn GroupGraphStore>) -> Self {
        Self { store }
    }

    /// Attach full records to each entry.
    ///
    /// Issues one bulk group fetch and one bulk user fetch, run
    /// concurrently; the first storage error aborts the whole call. An entry
    /// whose group or user is missing from storage keeps `None` slots —
    /// storage is eventually consistent, a transient miss is not an error.
    pub async fn hydrate(
        &self,
        entries: Vec<EnumeratedMembership>,
        cancel: &CancellationToken,
    ) -> Result<Vec<EnumeratedMembership>> {
        if entries.is_empty() {
            return Ok(entries);
        }

        let group_ids: Vec<GroupId> = entries
            .iter()
            .map(|e| e.group_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let user_ids: Vec<UserId> = entries
            .iter()
            .map(|e| e.user_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let (groups, users) = abort_on_cancel(cancel, async {
            let (groups, users) = tokio::join!(
                self.store.fetch_groups_by_ids(&group_ids),
                self.store.fetch_users_by_ids(&user_ids),
            );
            Ok((groups?, users?))
        })
        .await?;
        let groups: HashMap<GroupId, _> = groups.into_iter().map(|g| (g.id, g)).collect();
        let users: HashMap<UserId, _> = users.into_iter().map(|u| (u.id, u)).collect();

        let mut misses = 0usize;
        let hydrated: Vec<EnumeratedMembership> = entries
            .into_iter()
            .map(|mut entry| {
                entry.group = groups.get(&entry.group_id).cloned();
                entry.user = users.get(&entry.user_id).cloned();
                if entry.group.is_none() || entry.user.is_none() {
                    misses += 1;
                }
                entry
            })
            .collect();

        if misses > 0 {
            tracing::debug!(misses, "Hydration left entries without full records");
        }
        Ok(hydrated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{doubles, InMemoryGroupGraphStore};

    #[tokio::test]
    async fn test_hydrate_attaches_records() {
        let store = Arc::new(InMemoryGroupGraphStore::new());
        let group = store.add_group("Engineering").await;
        let user = store.add_user("dev@example.com").await;

        let hydrator = MembershipHydrator::new(store);
        let entries = vec![EnumeratedMembership::new(group, user, false, None, true)];

        let hydrated = hydrator
            .hydrate(entries, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(hydrated.len(), 1);
        assert_eq!(hydrated[0].group.as_ref().unwrap().name, "Engineering");
        assert_eq!(hydrated[0].user.as_ref().unwrap().email, "dev@example.com");
    }

    #[tokio::test]
    async fn test_unknown_records_stay_none() {
        let store = Arc::new(InMemoryGroupGraphStore::new());
        let group = store.add_group("Engineering").await;

        let hydrator = MembershipHydrator::new(store);
        // The user id points at nothing in storage.
        let entries = vec![EnumeratedMembership::new(
            group,
            UserId::new(),
            false,
            None,
            true,
        )];

        let hydrated = hydrator
            .hydrate(entries, &CancellationToken::new())
            .await
            .unwrap();

        assert!(hydrated[0].group.is_some());
        assert!(hydrated[0].user.is_none());
    }

    #[tokio::test]
    async fn test_empty_input_short_circuits() {
        let store = Arc::new(InMemoryGroupGraphStore::new());
        let hydrator = MembershipHydrator::new(store);

        let hydrated = hydrator
            .hydrate(Vec::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(hydrated.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_token_aborts_hydration() {
        let store = Arc::new(InMemoryGroupGraphStore::new());
        let group = store.add_group("Engineering").await;
        let user = store.add_user("dev@example.com").await;
        let hydrator = MembershipHydrator::new(store);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = hydrator
            .hydrate(
                vec![EnumeratedMembership::new(group, user, false, None, true)],
                &cancel,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, crate::GroupsError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_during_inflight_lookups_aborts_hydration() {
        let hydrator = MembershipHydrator::new(Arc::new(doubles::HangingStore));
        let cancel = CancellationToken::new();
        let entries = vec![EnumeratedMembership::new(
            GroupId::new(),
            UserId::new(),
            false,
            None,
            true,
        )];

        let (result, ()) = tokio::time::timeout(std::time::Duration::from_secs(1), async {
            tokio::join!(hydrator.hydrate(entries, &cancel), async {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                cancel.cancel();
            })
        })
        .await
        .expect("cancellation did not interrupt the hung lookups");

        assert!(matches!(result.unwrap_err(), crate::GroupsError::Cancelled));
    }

    #[tokio::test]
    async fn test_storage_failure_aborts_hydration() {
        let hydrator = MembershipHydrator::new(Arc::new(doubles::FailingStore));

        let err = hydrator
            .hydrate(
                vec![EnumeratedMembership::new(
                    GroupId::new(),
                    UserId::new(),
                    false,
                    None,
                    true,
                )],
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, crate::GroupsError::Repository(_)));
    }
}
