//! Desired/observed diff

use std::collections::BTreeMap;

use super::codec;
use crate::config::DEFAULT_TTL;
use crate::types::{OwnedIndex, ReconciliationPlan, Record, RecordKey};

/// Knobs that change how records are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Compare an unset declared TTL as [`DEFAULT_TTL`] instead of ignoring it.
    pub enforce_default_ttl: bool,
}

/// Partitions `declared` against `owned` into creates, updates and deletes.
///
/// Duplicate keys in `declared` resolve to the last occurrence. Every list in the
/// returned plan is sorted by key. `orphan_markers` is left empty.
pub fn diff(owned: &OwnedIndex, declared: &[Record], options: DiffOptions) -> ReconciliationPlan {
    let declared: BTreeMap<RecordKey, &Record> =
        declared.iter().map(|record| (record.key(), record)).collect();

    let to_delete = owned
        .keys()
        .filter(|key| !declared.contains_key(*key))
        .cloned()
        .collect();

    let mut to_create = Vec::new();
    let mut to_update = Vec::new();
    for (key, wanted) in declared {
        match owned.get(&key) {
            None => to_create.push(wanted.clone()),
            Some(current) if needs_update(current, wanted, options) => {
                to_update.push(wanted.clone());
            }
            Some(_) => {}
        }
    }

    ReconciliationPlan {
        to_create,
        to_update,
        to_delete,
        orphan_markers: Vec::new(),
    }
}

fn needs_update(current: &Record, wanted: &Record, options: DiffOptions) -> bool {
    if current.value != codec::canonical_value(&wanted.record_type, &wanted.value) {
        return true;
    }

    let wanted_ttl = match wanted.explicit_ttl() {
        Some(ttl) => ttl,
        None if options.enforce_default_ttl => DEFAULT_TTL,
        None => return false,
    };
    current.ttl != Some(wanted_ttl)
}
