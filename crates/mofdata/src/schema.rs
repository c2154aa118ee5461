//! Explicit column-name mapping from source CSV headers to the fields the
//! pipeline expects.
//!
//! Replaces silent rename fallbacks with an eager, named validation step: a
//! missing required column fails at load time, not on first downstream access.

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// Maps expected logical columns to the names used in a source file.
///
/// Defaults match the vocabulary of the generator/property CSVs; callers with
/// differently named columns override individual fields. `smiles_fallbacks`
/// lists alternate headers tried when the primary SMILES name is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSchema {
    #[serde(default = "default_smiles")]
    pub smiles: String,
    #[serde(default = "default_smiles_fallbacks")]
    pub smiles_fallbacks: Vec<String>,
    #[serde(default = "default_metal_node")]
    pub metal_node: String,
    #[serde(default = "default_organic_core")]
    pub organic_core: String,
    #[serde(default = "default_topology")]
    pub topology: String,
    #[serde(default = "default_mask")]
    pub mask: String,
    #[serde(default = "default_id2mof")]
    pub id2mof: String,
    #[serde(default = "default_scscore")]
    pub scscore: String,
}

fn default_smiles() -> String {
    "smiles".to_string()
}
fn default_smiles_fallbacks() -> Vec<String> {
    vec!["SMILES".to_string()]
}
fn default_metal_node() -> String {
    "metal_node".to_string()
}
fn default_organic_core() -> String {
    "organic_core".to_string()
}
fn default_topology() -> String {
    "topology".to_string()
}
fn default_mask() -> String {
    "mask".to_string()
}
fn default_id2mof() -> String {
    "id2mof".to_string()
}
fn default_scscore() -> String {
    "scscore".to_string()
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            smiles: default_smiles(),
            smiles_fallbacks: default_smiles_fallbacks(),
            metal_node: default_metal_node(),
            organic_core: default_organic_core(),
            topology: default_topology(),
            mask: default_mask(),
            id2mof: default_id2mof(),
            scscore: default_scscore(),
        }
    }
}

/// Column indices resolved against one file's header row.
#[derive(Debug, Clone)]
pub struct ResolvedColumns {
    pub smiles: usize,
    pub metal_node: usize,
    pub organic_core: usize,
    pub topology: usize,
    /// Absent in files that carry no quality flag.
    pub mask: Option<usize>,
    /// Absent in property files that have not been reconciled yet.
    pub id2mof: Option<usize>,
    pub scscore: Option<usize>,
    /// Every remaining column, parsed as a numeric property where possible.
    pub numeric: Vec<(String, usize)>,
}

impl ColumnSchema {
    /// Resolve this schema against a header row.
    ///
    /// The SMILES column is tried under its primary name, then each fallback.
    /// Structural columns (`metal_node`, `organic_core`, `topology`) are
    /// required; `mask`, `id2mof`, and `scscore` are optional here and
    /// demanded by the consumers that need them.
    pub fn resolve(&self, headers: &[String]) -> anyhow::Result<ResolvedColumns> {
        let find = |name: &str| headers.iter().position(|h| h.as_str() == name);

        let smiles = match find(&self.smiles) {
            Some(idx) => idx,
            None => {
                let fallback = self
                    .smiles_fallbacks
                    .iter()
                    .find_map(|alt| find(alt));
                match fallback {
                    Some(idx) => {
                        tracing::debug!(
                            expected = %self.smiles,
                            found = %headers[idx],
                            "SMILES column resolved via fallback name"
                        );
                        idx
                    }
                    None => bail!(
                        "missing SMILES column: none of [{}] present in header",
                        std::iter::once(self.smiles.as_str())
                            .chain(self.smiles_fallbacks.iter().map(String::as_str))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                }
            }
        };

        let require = |name: &str| {
            find(name).ok_or_else(|| anyhow::anyhow!("missing required column '{name}' in header"))
        };
        let metal_node = require(&self.metal_node)?;
        let organic_core = require(&self.organic_core)?;
        let topology = require(&self.topology)?;
        let mask = find(&self.mask);
        let id2mof = find(&self.id2mof);
        let scscore = find(&self.scscore);

        let known = [
            Some(smiles),
            Some(metal_node),
            Some(organic_core),
            Some(topology),
            mask,
            id2mof,
            scscore,
        ];
        let numeric = headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| !known.contains(&Some(*idx)))
            .map(|(idx, name)| (name.clone(), idx))
            .collect();

        Ok(ResolvedColumns {
            smiles,
            metal_node,
            organic_core,
            topology,
            mask,
            id2mof,
            scscore,
            numeric,
        })
    }
}
