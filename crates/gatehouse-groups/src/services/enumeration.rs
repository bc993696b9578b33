//! Membership closure enumeration.
//!
//! Computes, for a graph of nested groups, the full set of direct and
//! inherited user memberships. Three query shapes are offered: the whole
//! system, one user's memberships, and one group's member roster. All three
//! share the same seed/expand/collapse core:
//!
//! 1. Seed facts from direct-membership rows (scoped per shape).
//! 2. Expand along hierarchy edges until no new (group, user) pair appears.
//! 3. Collapse facts per (group, user) pair, direct attributes winning.
//!
//! Inherited membership never carries admin rights or an expiry; those come
//! from direct rows only.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use gatehouse_core::{GroupId, UserId};

use crate::error::Result;
use crate::services::abort_on_cancel;
use crate::store::GroupGraphStore;
use crate::types::{DirectMembership, EnumeratedMembership, HierarchyEdge, MembershipFilter};

/// Computes transitive membership closures over the group hierarchy.
///
/// Stateless per call: every enumeration reads a fresh snapshot from the
/// store, so results are never stale at the cost of recomputation. Storage
/// failures and cancellation abort the whole call; partial results are never
/// returned.
pub struct MembershipEnumerator {
    store: Arc<dyn GroupGraphStore>,
}

impl MembershipEnumerator {
    /// Create a new enumerator over the given graph store.
    pub fn new(store: Arc<dyn GroupGraphStore>) -> Self {
        Self { store }
    }

    /// Enumerate the closure over every group/user pair in the system.
    pub async fn enumerate_all(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<EnumeratedMembership>> {
        let seeds = abort_on_cancel(
            cancel,
            self.store.list_direct_memberships(&MembershipFilter::all()),
        )
        .await?;
        let edges = abort_on_cancel(cancel, self.store.list_hierarchy_edges()).await?;

        let results = collapse(expand(&seeds, &parents_by_member(&edges)));
        tracing::debug!(
            seeds = seeds.len(),
            results = results.len(),
            "Enumerated full membership closure"
        );
        Ok(results)
    }

    /// Enumerate the closure restricted to paths originating at one user's
    /// direct memberships.
    ///
    /// A user with no direct memberships yields an empty list, not an error.
    pub async fn enumerate_for_user(
        &self,
        user_id: UserId,
        cancel: &CancellationToken,
    ) -> Result<Vec<EnumeratedMembership>> {
        let seeds = abort_on_cancel(
            cancel,
            self.store
                .list_direct_memberships(&MembershipFilter::for_user(user_id)),
        )
        .await?;
        if seeds.is_empty() {
            return Ok(Vec::new());
        }
        let edges = abort_on_cancel(cancel, self.store.list_hierarchy_edges()).await?;

        let results = collapse(expand(&seeds, &parents_by_member(&edges)));
        tracing::debug!(
            user_id = %user_id,
            results = results.len(),
            "Enumerated membership closure for user"
        );
        Ok(results)
    }

    /// Enumerate every user who is a member of `group_id` or of any group
    /// nested under it, directly or transitively.
    ///
    /// The queried group is a valid root even with zero inbound edges; a
    /// group with no members yields an empty list, not an error.
    pub async fn enumerate_for_group(
        &self,
        group_id: GroupId,
        cancel: &CancellationToken,
    ) -> Result<Vec<EnumeratedMembership>> {
        let edges = abort_on_cancel(cancel, self.store.list_hierarchy_edges()).await?;
        let nested = nested_under(group_id, &edges);

        let memberships = abort_on_cancel(
            cancel,
            self.store.list_direct_memberships(&MembershipFilter::all()),
        )
        .await?;

        // Every group in `nested` reaches the queried group, so each of its
        // direct members is a member of the queried group. Seats in the
        // queried group itself keep their direct attributes; the rest
        // project to inherited facts.
        let facts = memberships
            .iter()
            .filter(|m| nested.contains(&m.group_id))
            .map(|m| {
                if m.group_id == group_id {
                    EnumeratedMembership::new(group_id, m.user_id, m.is_admin, m.expires_at, true)
                } else {
                    EnumeratedMembership::new(group_id, m.user_id, false, None, false)
                }
            })
            .collect();

        let results = collapse(facts);
        tracing::debug!(
            group_id = %group_id,
            results = results.len(),
            "Enumerated membership closure for group"
        );
        Ok(results)
    }
}

/// Adjacency of the hierarchy graph keyed by member group: which parents
/// does each group feed memberships into.
fn parents_by_member(edges: &[HierarchyEdge]) -> HashMap<GroupId, Vec<GroupId>> {
    let mut adjacency: HashMap<GroupId, Vec<GroupId>> = HashMap::new();
    for edge in edges {
        adjacency
            .entry(edge.member_group_id)
            .or_default()
            .push(edge.parent_group_id);
    }
    adjacency
}

/// The queried group plus every group transitively nested under it.
fn nested_under(group_id: GroupId, edges: &[HierarchyEdge]) -> HashSet<GroupId> {
    let mut members_by_parent: HashMap<GroupId, Vec<GroupId>> = HashMap::new();
    for edge in edges {
        members_by_parent
            .entry(edge.parent_group_id)
            .or_default()
            .push(edge.member_group_id);
    }

    let mut nested = HashSet::from([group_id]);
    let mut queue = VecDeque::from([group_id]);
    while let Some(current) = queue.pop_front() {
        for member in members_by_parent.get(&current).into_iter().flatten() {
            if nested.insert(*member) {
                queue.push_back(*member);
            }
        }
    }
    nested
}

/// Fixed-point expansion of direct seeds along member-to-parent edges.
///
/// Each seed contributes a direct fact for its own group and an inherited
/// fact for every ancestor group. The per-user visited set stops the walk as
/// soon as no new (group, user) pair appears, so the expansion terminates
/// even if storage hands over a cyclic graph.
fn expand(
    seeds: &[DirectMembership],
    parents: &HashMap<GroupId, Vec<GroupId>>,
) -> Vec<EnumeratedMembership> {
    let mut seed_groups_by_user: HashMap<UserId, Vec<GroupId>> = HashMap::new();
    let mut facts: Vec<EnumeratedMembership> = Vec::with_capacity(seeds.len());

    for seed in seeds {
        facts.push(EnumeratedMembership::new(
            seed.group_id,
            seed.user_id,
            seed.is_admin,
            seed.expires_at,
            true,
        ));
        seed_groups_by_user
            .entry(seed.user_id)
            .or_default()
            .push(seed.group_id);
    }

    for (user_id, seed_groups) in seed_groups_by_user {
        let mut visited: HashSet<GroupId> = seed_groups.iter().copied().collect();
        let mut queue: VecDeque<GroupId> = seed_groups.into();

        while let Some(group) = queue.pop_front() {
            for parent in parents.get(&group).into_iter().flatten() {
                if visited.insert(*parent) {
                    facts.push(EnumeratedMembership::new(
                        *parent, user_id, false, None, false,
                    ));
                    queue.push_back(*parent);
                }
            }
        }
    }

    facts
}

/// Collapse accumulated facts to exactly one membership per (group, user).
///
/// Direct attributes win over inherited ones: `direct` and `is_admin` are
/// ORed across facts, the expiry is taken from direct facts only. Should
/// storage hand over several direct rows for one pair, a never-expiring row
/// dominates the collapsed expiry.
fn collapse(facts: Vec<EnumeratedMembership>) -> Vec<EnumeratedMembership> {
    let mut collapsed: HashMap<(GroupId, UserId), EnumeratedMembership> = HashMap::new();

    for fact in facts {
        let entry = collapsed
            .entry((fact.group_id, fact.user_id))
            .or_insert_with(|| {
                EnumeratedMembership::new(fact.group_id, fact.user_id, false, None, false)
            });

        if fact.direct {
            entry.expires_at = if entry.direct {
                match (entry.expires_at, fact.expires_at) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    _ => None,
                }
            } else {
                fact.expires_at
            };
            entry.direct = true;
            entry.is_admin |= fact.is_admin;
        }
    }

    collapsed.into_values().collect()
}
