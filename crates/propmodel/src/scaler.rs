//! Per-target standard scaling between normalized and physical units.

use anyhow::ensure;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Fitted per-target mean/std scaler.
///
/// Models train against normalized targets; predictions and ground truth are
/// mapped back to physical units through `inverse_transform` before any
/// diagnostics are computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetScaler {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl TargetScaler {
    /// Fit column means and standard deviations from physical-unit targets.
    ///
    /// A constant column gets std 1.0 so the transform stays invertible.
    pub fn fit(targets: ArrayView2<'_, f64>) -> anyhow::Result<Self> {
        ensure!(targets.nrows() > 0, "cannot fit a scaler on zero rows");
        let mean = targets
            .mean_axis(Axis(0))
            .expect("nonempty by the ensure above");
        let std = targets
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 0.0 { s } else { 1.0 });
        Ok(Self { mean, std })
    }

    /// Build directly from fitted statistics (e.g. restored from a model).
    pub fn from_stats(mean: Vec<f64>, std: Vec<f64>) -> anyhow::Result<Self> {
        ensure!(
            mean.len() == std.len(),
            "mean has {} entries but std has {}",
            mean.len(),
            std.len()
        );
        ensure!(std.iter().all(|s| *s > 0.0), "std entries must be positive");
        Ok(Self {
            mean: Array1::from_vec(mean),
            std: Array1::from_vec(std),
        })
    }

    pub fn n_targets(&self) -> usize {
        self.mean.len()
    }

    /// Physical units → normalized.
    pub fn transform(&self, values: ArrayView2<'_, f64>) -> anyhow::Result<Array2<f64>> {
        self.check_width(values)?;
        Ok((&values - &self.mean) / &self.std)
    }

    /// Normalized → physical units.
    pub fn inverse_transform(&self, values: ArrayView2<'_, f64>) -> anyhow::Result<Array2<f64>> {
        self.check_width(values)?;
        Ok(&values * &self.std + &self.mean)
    }

    fn check_width(&self, values: ArrayView2<'_, f64>) -> anyhow::Result<()> {
        ensure!(
            values.ncols() == self.n_targets(),
            "expected {} target columns, got {}",
            self.n_targets(),
            values.ncols()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_transform_roundtrip() {
        let data = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let scaler = TargetScaler::fit(data.view()).unwrap();

        let normalized = scaler.transform(data.view()).unwrap();
        let restored = scaler.inverse_transform(normalized.view()).unwrap();
        for (a, b) in data.iter().zip(restored.iter()) {
            assert!((a - b).abs() < 1e-12);
        }

        // Normalized columns are centered.
        let means = normalized.mean_axis(Axis(0)).unwrap();
        assert!(means.iter().all(|m| m.abs() < 1e-12));
    }

    #[test]
    fn test_constant_column_stays_invertible() {
        let data = array![[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]];
        let scaler = TargetScaler::fit(data.view()).unwrap();
        let normalized = scaler.transform(data.view()).unwrap();
        let restored = scaler.inverse_transform(normalized.view()).unwrap();
        assert!((restored[[0, 0]] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_width_mismatch_is_error() {
        let data = array![[1.0, 2.0], [3.0, 4.0]];
        let scaler = TargetScaler::fit(data.view()).unwrap();
        let wrong = array![[1.0], [2.0]];
        assert!(scaler.transform(wrong.view()).is_err());
    }

    #[test]
    fn test_from_stats_validation() {
        assert!(TargetScaler::from_stats(vec![0.0, 1.0], vec![1.0]).is_err());
        assert!(TargetScaler::from_stats(vec![0.0], vec![0.0]).is_err());
        let scaler = TargetScaler::from_stats(vec![2.0], vec![3.0]).unwrap();
        assert_eq!(scaler.n_targets(), 1);
    }

    #[test]
    fn test_serde_roundtrip() {
        let data = array![[1.0, 10.0], [3.0, 14.0]];
        let scaler = TargetScaler::fit(data.view()).unwrap();
        let json = serde_json::to_string(&scaler).unwrap();
        let restored: TargetScaler = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.n_targets(), 2);
        let out = restored.inverse_transform(array![[0.0, 0.0]].view()).unwrap();
        assert!((out[[0, 0]] - 2.0).abs() < 1e-12);
        assert!((out[[0, 1]] - 12.0).abs() < 1e-12);
    }
}
