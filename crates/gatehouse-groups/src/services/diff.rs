//! Set difference between two enumeration snapshots.
//!
//! Callers hold a before/after pair of enumeration results, typically taken
//! around a hierarchy change, and use the diff to find newly gained
//! memberships for notification and audit fan-out.

use std::collections::HashSet;

use crate::types::EnumeratedMembership;

/// Entries of `after` whose whole value occurs nowhere in `before`.
///
/// Equality is by full value, not by (group, user) key: an entry whose
/// `is_admin` or `expires_at` changed counts as new even though the pair
/// already existed. Output order is unspecified; treat the result as a set.
#[must_use]
pub fn diff_memberships(
    before: &[EnumeratedMembership],
    after: &[EnumeratedMembership],
) -> Vec<EnumeratedMembership> {
    let known: HashSet<&EnumeratedMembership> = before.iter().collect();
    after
        .iter()
        .filter(|entry| !known.contains(entry))
        .cloned()
        .collect()
}
