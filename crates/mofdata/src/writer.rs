//! Writes MofRecords back to CSV, for cleaned-dataset export.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;

use crate::schema::ColumnSchema;
use crate::types::MofRecord;

/// Write records as CSV using `schema` for the fixed column names.
///
/// Property columns are emitted in sorted name order so output is
/// deterministic; the `scscore` column appears only when at least one record
/// carries a score. Round-trips with [`crate::read_records`].
pub fn write_records(
    path: &Path,
    records: &[MofRecord],
    schema: &ColumnSchema,
) -> anyhow::Result<()> {
    let property_columns: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.properties.keys().map(String::as_str))
        .collect();
    let any_score = records.iter().any(|r| r.scscore.is_some());

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating output CSV {}", path.display()))?;

    let mut header = vec![
        schema.smiles.as_str(),
        schema.metal_node.as_str(),
        schema.organic_core.as_str(),
        schema.topology.as_str(),
        schema.mask.as_str(),
        schema.id2mof.as_str(),
    ];
    if any_score {
        header.push(schema.scscore.as_str());
    }
    header.extend(property_columns.iter().copied());
    writer.write_record(&header)?;

    for record in records {
        let mut row = vec![
            record.smiles.clone(),
            record.key.metal_node.clone(),
            record.key.organic_core.clone(),
            record.key.topology.clone(),
            record.mask.to_string(),
            record.id2mof.map(|id| id.to_string()).unwrap_or_default(),
        ];
        if any_score {
            row.push(record.scscore.map(|s| s.to_string()).unwrap_or_default());
        }
        for column in &property_columns {
            row.push(
                record
                    .property(column)
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    tracing::info!(rows = records.len(), path = %path.display(), "Wrote dataset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_records;
    use crate::types::MofKey;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_roundtrip_write_read() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.csv");

        let records: Vec<MofRecord> = (0..10)
            .map(|i| MofRecord {
                smiles: format!("C{i}"),
                key: MofKey::new("Cu", "benzene", "pcu"),
                mask: i % 2 == 0,
                id2mof: Some(i),
                scscore: Some(1.0 + i as f64 * 0.1),
                properties: HashMap::from([
                    ("co2_uptake".to_string(), i as f64),
                    ("co2n2_selectivity".to_string(), 10.0 * i as f64),
                ]),
            })
            .collect();

        let schema = ColumnSchema::default();
        write_records(&path, &records, &schema).unwrap();
        let table = read_records(&path, &schema).unwrap();

        assert_eq!(table.records.len(), 10);
        assert_eq!(
            table.property_columns,
            vec!["co2_uptake".to_string(), "co2n2_selectivity".to_string()]
        );
        assert_eq!(table.records[3].smiles, "C3");
        assert_eq!(table.records[3].id2mof, Some(3));
        assert!(!table.records[3].mask);
        assert_eq!(table.records[3].scscore, Some(1.3));
        assert_eq!(table.records[3].property("co2n2_selectivity"), Some(30.0));
    }

    #[test]
    fn test_score_column_omitted_when_unscored() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("plain.csv");

        let records = vec![MofRecord {
            smiles: "CCO".to_string(),
            key: MofKey::new("Zn", "imidazole", "sod"),
            mask: true,
            id2mof: None,
            scscore: None,
            properties: HashMap::new(),
        }];

        let schema = ColumnSchema::default();
        write_records(&path, &records, &schema).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("scscore"));
    }
}
