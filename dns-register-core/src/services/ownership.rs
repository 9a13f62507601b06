//! Ownership classification
//!
//! A record is owned by this instance when a TXT marker named
//! `<prefix><record name>` carries this instance's payload. Markers may appear
//! anywhere in the snapshot, so classification makes two passes: one to collect
//! claimed names, one to pick the records carrying them.
//!
//! A marker guards a name, not a single type. A name that also carries another
//! owner's marker is contested: none of its records are owned and nothing new is
//! written there.

use std::collections::{BTreeMap, BTreeSet};

use dns_register_provider::{ProviderRecord, RecordType};

use super::codec;
use crate::config::MarkerFormat;
use crate::types::OwnedIndex;

/// Result of classifying one zone snapshot.
#[derive(Debug, Clone, Default)]
pub struct Ownership {
    /// Records owned by this instance.
    pub owned: OwnedIndex,
    /// This instance's markers as observed, keyed by target name.
    pub markers: BTreeMap<String, ProviderRecord>,
    /// Target names carrying a marker of another owner or tool.
    pub foreign: BTreeSet<String>,
}

impl Ownership {
    /// Markers of this instance whose target name has no record left in the zone.
    ///
    /// Markers at contested names are never orphans.
    pub fn orphan_markers(&self) -> Vec<ProviderRecord> {
        self.markers
            .iter()
            .filter(|(target, _)| !self.foreign.contains(*target) && !self.owns_name(target))
            .map(|(_, marker)| marker.clone())
            .collect()
    }

    /// Whether any owned record is named `name`.
    pub fn owns_name(&self, name: &str) -> bool {
        self.owned.keys().any(|key| key.name == name)
    }

    /// Whether another owner's marker claims `name`.
    pub fn is_foreign(&self, name: &str) -> bool {
        self.foreign.contains(name)
    }
}

/// Splits `snapshot` into the records this instance owns and its markers.
///
/// Records without a matching marker, records at contested names, markers of
/// other owners and markers of other tools are never owned.
pub fn classify(snapshot: &[ProviderRecord], format: &MarkerFormat) -> Ownership {
    let mut markers = BTreeMap::new();
    let mut foreign = BTreeSet::new();
    for record in snapshot {
        if record.record_type() != RecordType::Txt {
            continue;
        }
        let Some(target) = format.target_name(record.name()) else {
            continue;
        };
        if format.is_own_payload(&codec::extract_value(record)) {
            markers.insert(target.to_string(), record.clone());
        } else {
            foreign.insert(target.to_string());
        }
    }

    for name in markers.keys().filter(|name| foreign.contains(*name)) {
        log::warn!("Name '{name}' is claimed by another marker too, leaving it untouched");
    }

    let mut owned = OwnedIndex::new();
    for record in snapshot {
        let name = record.name();
        if format.is_marker_name(name) || !markers.contains_key(name) || foreign.contains(name) {
            continue;
        }
        let record = codec::from_provider_record(record);
        owned.insert(record.key(), record);
    }

    log::debug!(
        "Classified {} record(s): {} owned, {} marker(s), {} foreign marker name(s)",
        snapshot.len(),
        owned.len(),
        markers.len(),
        foreign.len()
    );

    Ownership {
        owned,
        markers,
        foreign,
    }
}
