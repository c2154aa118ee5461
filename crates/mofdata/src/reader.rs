//! Reads MofRecords from CSV property tables.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context};

use crate::schema::ColumnSchema;
use crate::types::{MofKey, MofRecord, RunMode};

/// A loaded CSV table: parsed records plus the names of the numeric property
/// columns seen in the header (used for target-presence preconditions).
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub records: Vec<MofRecord>,
    pub property_columns: Vec<String>,
}

/// Read all records from a CSV file, resolving columns through `schema`.
///
/// Structural and SMILES columns are required (schema validation fails the
/// load with a named error otherwise). Non-empty cells in property columns
/// must parse as numbers; parse failures are hard errors with row context.
pub fn read_records(path: &Path, schema: &ColumnSchema) -> anyhow::Result<LoadedTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening dataset {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV header")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let cols = schema
        .resolve(&headers)
        .with_context(|| format!("validating header of {}", path.display()))?;

    let mut records = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("reading row {row_idx}"))?;
        records.push(parse_row(&row, &cols, row_idx)?);
    }

    tracing::info!(
        rows = records.len(),
        columns = ?headers,
        path = %path.display(),
        "Loaded dataset"
    );

    Ok(LoadedTable {
        records,
        property_columns: cols.numeric.iter().map(|(name, _)| name.clone()).collect(),
    })
}

fn parse_row(
    row: &csv::StringRecord,
    cols: &crate::schema::ResolvedColumns,
    row_idx: usize,
) -> anyhow::Result<MofRecord> {
    let cell = |idx: usize| row.get(idx).unwrap_or("").trim();

    let mask = match cols.mask {
        Some(idx) => parse_bool(cell(idx))
            .with_context(|| format!("row {row_idx}: bad mask value '{}'", cell(idx)))?,
        // Files without a quality flag are treated as fully usable.
        None => true,
    };

    let id2mof = match cols.id2mof {
        Some(idx) if !cell(idx).is_empty() => Some(
            cell(idx)
                .parse::<u32>()
                .with_context(|| format!("row {row_idx}: bad id2mof '{}'", cell(idx)))?,
        ),
        _ => None,
    };

    let scscore = match cols.scscore {
        Some(idx) if !cell(idx).is_empty() => Some(
            cell(idx)
                .parse::<f64>()
                .with_context(|| format!("row {row_idx}: bad scscore '{}'", cell(idx)))?,
        ),
        _ => None,
    };

    let mut properties = std::collections::HashMap::with_capacity(cols.numeric.len());
    for (name, idx) in &cols.numeric {
        let value = cell(*idx);
        if value.is_empty() {
            continue;
        }
        let parsed = value
            .parse::<f64>()
            .with_context(|| format!("row {row_idx}: column '{name}' is not numeric: '{value}'"))?;
        properties.insert(name.clone(), parsed);
    }

    Ok(MofRecord {
        smiles: cell(cols.smiles).to_string(),
        key: MofKey::new(cell(cols.metal_node), cell(cols.organic_core), cell(cols.topology)),
        mask,
        id2mof,
        scscore,
        properties,
    })
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value {
        "true" | "True" | "TRUE" | "1" => Ok(true),
        "false" | "False" | "FALSE" | "0" => Ok(false),
        other => bail!("'{other}' is not a boolean"),
    }
}

/// Load the reference (generator) table that defines the MOF vocabulary.
///
/// Drops duplicate SMILES rows (keeping the first) unless `keep_duplicates`
/// is set. In test mode the table is subsampled to one row per distinct
/// `id2mof` — first occurrence, deterministic — so every distinct identity
/// survives while the table stays small.
pub fn load_reference_set(
    path: &Path,
    schema: &ColumnSchema,
    keep_duplicates: bool,
    mode: RunMode,
) -> anyhow::Result<Vec<MofRecord>> {
    let table = read_records(path, schema)?;
    let mut records = table.records;

    if !keep_duplicates {
        let before = records.len();
        let mut seen = HashSet::new();
        records.retain(|r| seen.insert(r.smiles.clone()));
        tracing::info!(removed = before - records.len(), "Dropped duplicate SMILES rows");
    }

    if mode.is_test() {
        if records.iter().any(|r| r.id2mof.is_none()) {
            bail!(
                "reference table {} has rows without id2mof; cannot subsample per identity",
                path.display()
            );
        }
        let before = records.len();
        let mut seen_ids = HashSet::new();
        records.retain(|r| seen_ids.insert(r.id2mof));
        tracing::info!(
            kept = records.len(),
            removed = before - records.len(),
            mode = %mode,
            "Subsampled reference set to one row per MOF identity"
        );
    }

    Ok(records)
}
