//! Append-only historical value index
//!
//! Each entity owns a sparse, ordered log of `(period, value_before)` entries.
//! An entry is written the first time the entity changes inside a period, and
//! records the value as it stood when the preceding snapshot was taken. Entries
//! are never removed.

use std::collections::HashMap;
use std::hash::Hash;

use dao_core::{Amount, SnapshotId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Checkpoint {
    period: SnapshotId,
    value: Amount,
}

/// Historical index over entities of type `K`
#[derive(Debug, Clone)]
pub struct SnapshotStore<K> {
    logs: HashMap<K, Vec<Checkpoint>>,
}

impl<K: Eq + Hash> SnapshotStore<K> {
    pub fn new() -> Self {
        Self {
            logs: HashMap::new(),
        }
    }

    /// Record `value_being_replaced` for `entity` in `period`.
    ///
    /// Must be called before the entity is mutated. Only the first write per
    /// period is kept.
    pub fn write(&mut self, entity: K, period: SnapshotId, value_being_replaced: Amount) {
        let log = self.logs.entry(entity).or_default();
        if log.last().is_some_and(|last| last.period >= period) {
            return;
        }
        log.push(Checkpoint {
            period,
            value: value_being_replaced,
        });
    }

    /// Value of `entity` as of `snapshot_id`.
    ///
    /// Finds the first entry whose period is strictly greater than
    /// `snapshot_id`; if there is none the entity has not changed since that
    /// boundary and `live` supplies the answer.
    pub fn query(&self, entity: &K, snapshot_id: SnapshotId, live: impl FnOnce() -> Amount) -> Amount {
        let Some(log) = self.logs.get(entity) else {
            return live();
        };
        let idx = log.partition_point(|checkpoint| checkpoint.period <= snapshot_id);
        match log.get(idx) {
            Some(checkpoint) => checkpoint.value,
            None => live(),
        }
    }

    /// Number of entries recorded for `entity`
    pub fn len(&self, entity: &K) -> usize {
        self.logs.get(entity).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.logs.values().all(Vec::is_empty)
    }
}

impl<K: Eq + Hash> Default for SnapshotStore<K> {
    fn default() -> Self {
        Self::new()
    }
}
