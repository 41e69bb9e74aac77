//! Priority Pool
//!
//! Every node stores its dependents in a pool partitioned by priority
//! tier. The pool provides the engine's only ordering guarantee, which
//! must be exact and reproducible:
//!
//! 1. The highest tier fires first.
//! 2. Numeric tiers fire in ascending order (smaller numbers earlier).
//! 3. The lowest tier fires last.
//! 4. Within a tier, dependents fire in registration order.
//!
//! Buckets are insertion-ordered sets; numeric buckets emptied by
//! removals are pruned so a stale tier is never visited.

use std::collections::BTreeMap;

use indexmap::IndexSet;

use super::node::DependentKey;

/// Notification priority tier for a dependent registration.
///
/// Most dependents sit on the default numeric base tier. The sentinel
/// tiers bracket the numeric range: `Highest` fires before any numeric
/// tier, `Lowest` after all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    /// Fires before every numeric tier.
    Highest,
    /// Plain numeric tier. Smaller numbers fire earlier.
    Numeric(i64),
    /// Fires after every numeric tier.
    Lowest,
}

impl Priority {
    /// The default tier for new derivations and listeners.
    pub const BASE: Priority = Priority::Numeric(0);
}

impl Default for Priority {
    fn default() -> Self {
        Self::BASE
    }
}

impl From<i64> for Priority {
    fn from(tier: i64) -> Self {
        Self::Numeric(tier)
    }
}

type Bucket = IndexSet<DependentKey>;

/// Dependent registrations for one node, partitioned by priority tier.
#[derive(Default)]
pub(crate) struct PriorityPool {
    highest: Option<Bucket>,
    tiers: BTreeMap<i64, Bucket>,
    lowest: Option<Bucket>,
}

impl PriorityPool {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn bucket_mut(&mut self, priority: Priority) -> &mut Bucket {
        match priority {
            Priority::Highest => self.highest.get_or_insert_with(Bucket::new),
            Priority::Numeric(tier) => self.tiers.entry(tier).or_default(),
            Priority::Lowest => self.lowest.get_or_insert_with(Bucket::new),
        }
    }

    /// Register a dependent, creating the tier's bucket if absent.
    /// Re-registering an existing key keeps its original position.
    pub(crate) fn insert(&mut self, priority: Priority, key: DependentKey) {
        self.bucket_mut(priority).insert(key);
    }

    /// Remove a dependent. Removing a missing entry is a no-op, and the
    /// registration order of the remaining entries is preserved.
    pub(crate) fn remove(&mut self, priority: Priority, key: DependentKey) {
        match priority {
            Priority::Highest => {
                if let Some(bucket) = self.highest.as_mut() {
                    bucket.shift_remove(&key);
                    if bucket.is_empty() {
                        self.highest = None;
                    }
                }
            }
            Priority::Numeric(tier) => {
                if let Some(bucket) = self.tiers.get_mut(&tier) {
                    bucket.shift_remove(&key);
                    if bucket.is_empty() {
                        self.tiers.remove(&tier);
                    }
                }
            }
            Priority::Lowest => {
                if let Some(bucket) = self.lowest.as_mut() {
                    bucket.shift_remove(&key);
                    if bucket.is_empty() {
                        self.lowest = None;
                    }
                }
            }
        }
    }

    /// Whether a dependent is currently registered at the given tier.
    pub(crate) fn contains(&self, priority: Priority, key: DependentKey) -> bool {
        match priority {
            Priority::Highest => self.highest.as_ref().is_some_and(|b| b.contains(&key)),
            Priority::Numeric(tier) => self.tiers.get(&tier).is_some_and(|b| b.contains(&key)),
            Priority::Lowest => self.lowest.as_ref().is_some_and(|b| b.contains(&key)),
        }
    }

    /// Snapshot every registration in firing order.
    pub(crate) fn snapshot(&self) -> Vec<(Priority, DependentKey)> {
        let mut out = Vec::with_capacity(self.len());
        if let Some(bucket) = &self.highest {
            out.extend(bucket.iter().map(|key| (Priority::Highest, *key)));
        }
        for (tier, bucket) in &self.tiers {
            out.extend(bucket.iter().map(|key| (Priority::Numeric(*tier), *key)));
        }
        if let Some(bucket) = &self.lowest {
            out.extend(bucket.iter().map(|key| (Priority::Lowest, *key)));
        }
        out
    }

    /// Smallest occupied numeric tier.
    pub(crate) fn first_tier(&self) -> Option<i64> {
        self.tiers.keys().next().copied()
    }

    /// Largest occupied numeric tier.
    pub(crate) fn last_tier(&self) -> Option<i64> {
        self.tiers.keys().next_back().copied()
    }

    /// Total number of registrations across all tiers.
    pub(crate) fn len(&self) -> usize {
        let sentinels = self.highest.as_ref().map_or(0, Bucket::len)
            + self.lowest.as_ref().map_or(0, Bucket::len);
        sentinels + self.tiers.values().map(Bucket::len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::NodeId;

    fn key() -> DependentKey {
        DependentKey::Derivation(NodeId::new())
    }

    #[test]
    fn fires_highest_then_numeric_ascending_then_lowest() {
        let mut pool = PriorityPool::new();
        let lowest = key();
        let five = key();
        let one = key();
        let high = key();

        pool.insert(Priority::Lowest, lowest);
        pool.insert(Priority::Numeric(5), five);
        pool.insert(Priority::Numeric(1), one);
        pool.insert(Priority::Highest, high);

        let order: Vec<DependentKey> = pool.snapshot().into_iter().map(|(_, k)| k).collect();
        assert_eq!(order, vec![high, one, five, lowest]);
    }

    #[test]
    fn same_tier_fires_in_registration_order() {
        let mut pool = PriorityPool::new();
        let first = key();
        let second = key();
        let third = key();

        pool.insert(Priority::BASE, first);
        pool.insert(Priority::BASE, second);
        pool.insert(Priority::BASE, third);

        let order: Vec<DependentKey> = pool.snapshot().into_iter().map(|(_, k)| k).collect();
        assert_eq!(order, vec![first, second, third]);
    }

    #[test]
    fn removal_is_idempotent_and_keeps_order() {
        let mut pool = PriorityPool::new();
        let first = key();
        let second = key();
        let third = key();

        pool.insert(Priority::BASE, first);
        pool.insert(Priority::BASE, second);
        pool.insert(Priority::BASE, third);

        pool.remove(Priority::BASE, second);
        pool.remove(Priority::BASE, second);

        let order: Vec<DependentKey> = pool.snapshot().into_iter().map(|(_, k)| k).collect();
        assert_eq!(order, vec![first, third]);
    }

    #[test]
    fn emptied_numeric_bucket_is_pruned() {
        let mut pool = PriorityPool::new();
        let only = key();

        pool.insert(Priority::Numeric(7), only);
        assert_eq!(pool.first_tier(), Some(7));

        pool.remove(Priority::Numeric(7), only);
        assert_eq!(pool.first_tier(), None);
        assert!(pool.snapshot().is_empty());
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn tier_bounds_track_occupied_numeric_tiers() {
        let mut pool = PriorityPool::new();
        pool.insert(Priority::Numeric(-3), key());
        pool.insert(Priority::Numeric(12), key());
        pool.insert(Priority::Highest, key());
        pool.insert(Priority::Lowest, key());

        assert_eq!(pool.first_tier(), Some(-3));
        assert_eq!(pool.last_tier(), Some(12));
    }
}
