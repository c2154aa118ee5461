//! Report and table export for the mof-screen binary.

use std::path::Path;

use anyhow::{ensure, Context};
use ndarray::Array2;

use mofdata::FilterReport;
use propmodel::RegressionTable;

/// Write the filter pipeline's removal ledger as pretty JSON.
pub fn write_report_json(path: &Path, report: &FilterReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("writing filter report {}", path.display()))?;
    tracing::info!(path = %path.display(), "Wrote filter report");
    Ok(())
}

/// Write a diagnostics table as CSV: `label, {prefix}R2, {prefix}MAE, {prefix}RMSE`.
pub fn write_regression_csv(path: &Path, table: &RegressionTable) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating diagnostics CSV {}", path.display()))?;

    let [r2, mae, rmse] = table.metric_columns();
    writer.write_record(["label", r2.as_str(), mae.as_str(), rmse.as_str()])?;
    for row in &table.rows {
        writer.write_record([
            row.label.as_str(),
            &row.r2.to_string(),
            &row.mae.to_string(),
            &row.rmse.to_string(),
        ])?;
    }
    writer.flush()?;
    tracing::info!(rows = table.rows.len(), path = %path.display(), "Wrote diagnostics table");
    Ok(())
}

/// Read a predictions CSV with `{target}_true` / `{target}_pred` column pairs
/// into row-aligned ground-truth and prediction matrices.
pub fn read_predictions_csv(
    path: &Path,
    targets: &[String],
) -> anyhow::Result<(Array2<f64>, Array2<f64>)> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening predictions CSV {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut true_cols = Vec::with_capacity(targets.len());
    let mut pred_cols = Vec::with_capacity(targets.len());
    for target in targets {
        let find = |suffix: &str| {
            let name = format!("{target}_{suffix}");
            headers
                .iter()
                .position(|h| *h == name)
                .with_context(|| format!("missing column '{name}' in {}", path.display()))
        };
        true_cols.push(find("true")?);
        pred_cols.push(find("pred")?);
    }

    let mut y_true = Vec::new();
    let mut y_pred = Vec::new();
    let mut rows = 0usize;
    for (row_idx, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("reading row {row_idx}"))?;
        let parse = |idx: usize| -> anyhow::Result<f64> {
            row.get(idx)
                .unwrap_or("")
                .trim()
                .parse::<f64>()
                .with_context(|| format!("row {row_idx}: non-numeric value in column {idx}"))
        };
        for idx in &true_cols {
            y_true.push(parse(*idx)?);
        }
        for idx in &pred_cols {
            y_pred.push(parse(*idx)?);
        }
        rows += 1;
    }
    ensure!(rows > 0, "predictions CSV {} has no data rows", path.display());

    let shape = (rows, targets.len());
    Ok((
        Array2::from_shape_vec(shape, y_true).context("assembling y_true")?,
        Array2::from_shape_vec(shape, y_pred).context("assembling y_pred")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use propmodel::regression_statistics;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_predictions_roundtrip_to_statistics() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("preds.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            "co2_uptake_true,co2_uptake_pred,extra\n1.0,1.0,x\n2.0,2.5,y\n3.0,3.0,z\n"
        )
        .unwrap();

        let targets = vec!["co2_uptake".to_string()];
        let (y_true, y_pred) = read_predictions_csv(&path, &targets).unwrap();
        assert_eq!(y_true.dim(), (3, 1));
        assert_eq!(y_pred[[1, 0]], 2.5);

        let table =
            regression_statistics(y_true.view(), y_pred.view(), &targets, "test_").unwrap();
        let out = tmp.path().join("stats.csv");
        write_regression_csv(&out, &table).unwrap();
        let contents = std::fs::read_to_string(&out).unwrap();
        assert!(contents.starts_with("label,test_R2,test_MAE,test_RMSE"));
        assert!(contents.contains("co2_uptake"));
    }

    #[test]
    fn test_missing_pair_column_is_named_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("preds.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "co2_uptake_true\n1.0\n").unwrap();

        let err =
            read_predictions_csv(&path, &["co2_uptake".to_string()]).unwrap_err();
        assert!(format!("{err:#}").contains("co2_uptake_pred"));
    }

    #[test]
    fn test_report_json_export() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("report.json");

        let report: FilterReport = serde_json::from_value(serde_json::json!({
            "loaded": 10,
            "stages": [{"stage": "mask", "removed": 4}],
            "kept": 6
        }))
        .unwrap();
        write_report_json(&path, &report).unwrap();

        let restored: FilterReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(restored.is_balanced());
        assert_eq!(restored.kept, 6);
    }
}
