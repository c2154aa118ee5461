//! Record types shared across loaders, the registry, and the filter pipeline.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Structural identity of a MOF: metal node, organic core, and topology.
///
/// Within a reference table each distinct triple maps to exactly one
/// canonical `id2mof` value and vice versa (see [`crate::MofRegistry`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MofKey {
    pub metal_node: String,
    pub organic_core: String,
    pub topology: String,
}

impl MofKey {
    pub fn new(
        metal_node: impl Into<String>,
        organic_core: impl Into<String>,
        topology: impl Into<String>,
    ) -> Self {
        Self {
            metal_node: metal_node.into(),
            organic_core: organic_core.into(),
            topology: topology.into(),
        }
    }
}

impl fmt::Display for MofKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.metal_node, self.organic_core, self.topology)
    }
}

/// One row of a MOF property table.
///
/// Created on load; filter stages either drop the row or extend it (canonical
/// ID, synthesizability score). Numeric columns that are not structural land
/// in `properties`, keyed by source column name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MofRecord {
    /// Linker molecule as a SMILES string.
    pub smiles: String,
    /// Structural identity triple.
    pub key: MofKey,
    /// Data-quality flag; rows with `mask == false` are dropped by the pipeline.
    pub mask: bool,
    /// Canonical MOF ID. Present in reference tables; attached to property
    /// rows by the identity filter stage.
    pub id2mof: Option<u32>,
    /// Synthesizability score, attached by the scoring stage when requested.
    pub scscore: Option<f64>,
    /// All numeric property columns from the source file.
    pub properties: HashMap<String, f64>,
}

impl MofRecord {
    /// Look up a numeric property by source column name.
    pub fn property(&self, name: &str) -> Option<f64> {
        self.properties.get(name).copied()
    }
}

/// Whether a loader operates on the full dataset or a small representative
/// subset. Threaded explicitly through every loader and pipeline call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Real,
    Test,
}

impl RunMode {
    pub fn is_test(self) -> bool {
        matches!(self, Self::Test)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real => write!(f, "real"),
            Self::Test => write!(f, "test"),
        }
    }
}

impl FromStr for RunMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "real" => Ok(Self::Real),
            "test" => Ok(Self::Test),
            other => anyhow::bail!("run mode '{other}' not understood (expected 'real' or 'test')"),
        }
    }
}
