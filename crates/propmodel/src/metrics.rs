//! Per-target regression diagnostics: R², MAE, RMSE.

use anyhow::ensure;
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

/// Diagnostics for one target property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionRow {
    pub label: String,
    pub r2: f64,
    pub mae: f64,
    pub rmse: f64,
}

/// One row per target, in the order the target names were given. The prefix
/// is carried along for metric-column naming on export (`{prefix}R2`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTable {
    pub prefix: String,
    pub rows: Vec<RegressionRow>,
}

impl RegressionTable {
    /// Metric column headers with the prefix applied.
    pub fn metric_columns(&self) -> [String; 3] {
        [
            format!("{}R2", self.prefix),
            format!("{}MAE", self.prefix),
            format!("{}RMSE", self.prefix),
        ]
    }
}

/// Compute R², MAE, and RMSE for each target column independently.
///
/// `targets[i]` labels column `i` of both matrices. Identical arrays give
/// R² = 1, MAE = 0, RMSE = 0 for every column; a constant ground-truth column
/// has no variance to explain, so R² is 1 for an exact fit and 0 otherwise.
pub fn regression_statistics(
    y_true: ArrayView2<'_, f64>,
    y_pred: ArrayView2<'_, f64>,
    targets: &[String],
    prefix: &str,
) -> anyhow::Result<RegressionTable> {
    ensure!(
        y_true.dim() == y_pred.dim(),
        "shape mismatch: y_true is {:?}, y_pred is {:?}",
        y_true.dim(),
        y_pred.dim()
    );
    ensure!(
        targets.len() == y_true.ncols(),
        "{} target names for {} columns",
        targets.len(),
        y_true.ncols()
    );
    ensure!(y_true.nrows() > 0, "cannot compute statistics on zero rows");

    let n = y_true.nrows() as f64;
    let mut rows = Vec::with_capacity(targets.len());
    for (index, label) in targets.iter().enumerate() {
        let truth = y_true.column(index);
        let pred = y_pred.column(index);

        let mean = truth.sum() / n;
        let mut ss_res = 0.0;
        let mut ss_tot = 0.0;
        let mut abs_sum = 0.0;
        for (t, p) in truth.iter().zip(pred.iter()) {
            let residual = t - p;
            ss_res += residual * residual;
            ss_tot += (t - mean) * (t - mean);
            abs_sum += residual.abs();
        }

        let r2 = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };

        rows.push(RegressionRow {
            label: label.clone(),
            r2,
            mae: abs_sum / n,
            rmse: (ss_res / n).sqrt(),
        });
    }

    Ok(RegressionTable {
        prefix: prefix.to_string(),
        rows,
    })
}
