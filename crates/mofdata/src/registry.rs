//! Bidirectional mapping between MOF structural triples and canonical IDs.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;

use anyhow::bail;

use crate::types::{MofKey, MofRecord};

/// Which descriptive columns a caller wants reported alongside the registry.
///
/// This selector only affects the reported column names, never the mapping
/// itself. Parsing an unrecognized value is a fatal invalid-argument error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MofColumnSet {
    /// Canonical ID only.
    Id,
    /// The categorical triple.
    Cats,
    /// Triple plus canonical ID.
    All,
}

impl MofColumnSet {
    /// Column names described by this selector.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Id => &["id2mof"],
            Self::Cats => &["metal_node", "organic_core", "topology"],
            Self::All => &["metal_node", "organic_core", "topology", "id2mof"],
        }
    }
}

impl FromStr for MofColumnSet {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "cats" => Ok(Self::Cats),
            "all" => Ok(Self::All),
            other => bail!("mof column set '{other}' not understood (expected 'id', 'cats', or 'all')"),
        }
    }
}

/// Immutable bidirectional registry of MOF identities.
///
/// Built once from a reference table: the first occurrence of each distinct
/// `id2mof` is selected (stable in input row order), the subset is sorted by
/// ID, and both directions are populated in that order. Contents are
/// therefore deterministic regardless of the table's row order beyond
/// first-occurrence selection.
#[derive(Debug, Clone, Default)]
pub struct MofRegistry {
    id_to_key: BTreeMap<u32, MofKey>,
    key_to_id: HashMap<MofKey, u32>,
}

impl MofRegistry {
    /// Build the registry from reference records.
    ///
    /// Every record must carry an `id2mof`. Two distinct IDs claiming the
    /// same structural triple would break the bijection and fail loudly.
    pub fn from_records(records: &[MofRecord]) -> anyhow::Result<Self> {
        let mut seen = HashSet::new();
        let mut subset: Vec<(u32, &MofKey)> = Vec::new();
        for (row_idx, record) in records.iter().enumerate() {
            let id = match record.id2mof {
                Some(id) => id,
                None => bail!("reference row {row_idx} has no id2mof; cannot build registry"),
            };
            if seen.insert(id) {
                subset.push((id, &record.key));
            }
        }
        subset.sort_by_key(|(id, _)| *id);

        let mut id_to_key = BTreeMap::new();
        let mut key_to_id = HashMap::with_capacity(subset.len());
        for (id, key) in subset {
            if let Some(existing) = key_to_id.insert(key.clone(), id) {
                bail!("MOF triple {key} is claimed by both id {existing} and id {id}");
            }
            id_to_key.insert(id, key.clone());
        }

        tracing::info!(unique_mofs = id_to_key.len(), "Built MOF identity registry");
        Ok(Self { id_to_key, key_to_id })
    }

    /// Canonical ID for a structural triple, if registered.
    pub fn id_for(&self, key: &MofKey) -> Option<u32> {
        self.key_to_id.get(key).copied()
    }

    /// Structural triple for a canonical ID, if registered.
    pub fn key_for(&self, id: u32) -> Option<&MofKey> {
        self.id_to_key.get(&id)
    }

    pub fn contains(&self, key: &MofKey) -> bool {
        self.key_to_id.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.id_to_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_key.is_empty()
    }

    /// Iterate entries in ascending ID order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &MofKey)> {
        self.id_to_key.iter().map(|(id, key)| (*id, key))
    }
}
