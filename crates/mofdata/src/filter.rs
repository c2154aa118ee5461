//! Multi-stage validation and filter pipeline for property tables.
//!
//! Rows flow through strictly ordered stages — optional test-mode subsample,
//! optional synthesizability scoring, target precondition, mask filter,
//! identity filter, outlier filter — and each filter stage records how many
//! rows it removed. Every stage produces a fresh `Vec`, so downstream stages
//! always see a contiguous, 0-based row order.

use std::path::Path;

use anyhow::ensure;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use scscore::SynthScorer;

use crate::reader::read_records;
use crate::registry::MofRegistry;
use crate::schema::ColumnSchema;
use crate::types::{MofRecord, RunMode};

/// Upper bound on one named selectivity property. Rows are kept only while
/// the value is strictly below the bound; rows with no value for the column
/// are dropped unless `keep_missing` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectivityBound {
    pub column: String,
    pub upper: f64,
    /// Keep rows that have no value for `column` instead of dropping them.
    #[serde(default)]
    pub keep_missing: bool,
}

/// Configuration for the filter pipeline, loadable from TOML.
///
/// The bound values are domain knowledge for CO2 separation data; override
/// them for other property families.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Outlier bounds applied in order by the selectivity stage.
    #[serde(default = "default_selectivity_bounds")]
    pub selectivity_bounds: Vec<SelectivityBound>,

    /// Number of rows kept by the test-mode subsample.
    #[serde(default = "default_test_sample_size")]
    pub test_sample_size: usize,

    /// Seed for the test-mode subsample. Unseeded runs use thread randomness.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_selectivity_bounds() -> Vec<SelectivityBound> {
    vec![
        SelectivityBound {
            column: "co2n2_selectivity".to_string(),
            upper: 200.0,
            keep_missing: false,
        },
        SelectivityBound {
            column: "co2ch4_selectivity".to_string(),
            upper: 200.0,
            keep_missing: false,
        },
    ]
}

fn default_test_sample_size() -> usize {
    1000
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            selectivity_bounds: default_selectivity_bounds(),
            test_sample_size: default_test_sample_size(),
            seed: None,
        }
    }
}

/// Removal count for one filter stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageCount {
    pub stage: String,
    pub removed: usize,
}

/// Ledger of rows through the pipeline: rows loaded (after any subsample),
/// per-stage removals in stage order, and rows surviving at the end.
///
/// Invariant: `loaded == kept + total_removed()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterReport {
    pub loaded: usize,
    pub stages: Vec<StageCount>,
    pub kept: usize,
}

impl FilterReport {
    fn new(loaded: usize) -> Self {
        Self {
            loaded,
            stages: Vec::new(),
            kept: loaded,
        }
    }

    fn record(&mut self, stage: &str, removed: usize) {
        tracing::info!(stage, removed, "Removed datapoints");
        self.stages.push(StageCount {
            stage: stage.to_string(),
            removed,
        });
        self.kept -= removed;
    }

    /// Sum of removals across all stages.
    pub fn total_removed(&self) -> usize {
        self.stages.iter().map(|s| s.removed).sum()
    }

    /// Whether the count ledger balances.
    pub fn is_balanced(&self) -> bool {
        self.loaded == self.kept + self.total_removed()
    }
}

/// Load a property table and run the full validation/filter pipeline.
///
/// Stage order:
/// 1. load, with a `config.test_sample_size` subsample in test mode
/// 2. optional sequential synthesizability scoring
/// 3. precondition: every requested target column exists (fatal otherwise)
/// 4. mask filter
/// 5. identity filter against `registry` (attaches canonical `id2mof`)
/// 6. selectivity outlier filter per `config.selectivity_bounds`
///
/// Returns the surviving records and the removal-count ledger.
pub fn clean_property_set(
    path: &Path,
    targets: &[String],
    registry: &MofRegistry,
    config: &FilterConfig,
    mode: RunMode,
    schema: &ColumnSchema,
    scorer: Option<&dyn SynthScorer>,
) -> anyhow::Result<(Vec<MofRecord>, FilterReport)> {
    let table = read_records(path, schema)?;
    let mut records = table.records;
    tracing::info!(mode = %mode, rows = records.len(), "Property set loaded");

    if mode.is_test() && records.len() > config.test_sample_size {
        records = subsample(records, config.test_sample_size, config.seed);
        tracing::info!(rows = records.len(), "Subsampled property set for test run");
    }

    let mut report = FilterReport::new(records.len());

    if let Some(scorer) = scorer {
        for record in &mut records {
            let scored = scorer.score(&record.smiles)?;
            record.scscore = Some(scored.score);
        }
        tracing::info!(rows = records.len(), "Attached synthesizability scores");
    }

    let missing: Vec<&String> = targets
        .iter()
        .filter(|t| !table.property_columns.contains(t))
        .collect();
    ensure!(
        missing.is_empty(),
        "target columns {missing:?} not in {}",
        path.display()
    );

    // Mask filter.
    let before = records.len();
    records.retain(|r| r.mask);
    report.record("mask", before - records.len());

    // Identity filter: survivors get their canonical ID attached.
    let before = records.len();
    records = records
        .into_iter()
        .filter_map(|mut record| {
            let id = registry.id_for(&record.key)?;
            record.id2mof = Some(id);
            Some(record)
        })
        .collect();
    report.record("identity", before - records.len());

    // Outlier filter: one combined count across all configured bounds.
    let before = records.len();
    records.retain(|r| {
        config.selectivity_bounds.iter().all(|bound| {
            match r.property(&bound.column) {
                Some(v) => v < bound.upper,
                None => bound.keep_missing,
            }
        })
    });
    report.record("selectivity", before - records.len());

    tracing::info!(kept = report.kept, loaded = report.loaded, "Filter pipeline finished");
    Ok((records, report))
}

/// Sample `n` rows without replacement, preserving relative row order.
fn subsample(records: Vec<MofRecord>, n: usize, seed: Option<u64>) -> Vec<MofRecord> {
    let mut indices = match seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            rand::seq::index::sample(&mut rng, records.len(), n).into_vec()
        }
        None => {
            let mut rng = rand::thread_rng();
            rand::seq::index::sample(&mut rng, records.len(), n).into_vec()
        }
    };
    indices.sort_unstable();

    let mut keep = vec![false; records.len()];
    for idx in indices {
        keep[idx] = true;
    }
    records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, kept)| kept.then_some(record))
        .collect()
}
