//! Mock implementations of the model and collator seams for testing the
//! prediction loop without a trained model.

use ndarray::Array2;

use crate::model::{Batch, Collate, Example, PropertyModel};
use crate::scaler::TargetScaler;

/// Collator that builds trivial two-column features (SMILES length, MOF ID)
/// and stacks each example's normalized targets into `y`.
pub struct MockCollator;

impl Collate for MockCollator {
    fn collate(&self, chunk: &[Example]) -> anyhow::Result<Batch> {
        let n_targets = chunk.first().map_or(0, |e| e.targets.len());
        let mut x = Vec::with_capacity(chunk.len() * 2);
        let mut mof = Vec::with_capacity(chunk.len());
        let mut y = Vec::with_capacity(chunk.len() * n_targets);
        for example in chunk {
            x.push(example.smiles.len() as f64);
            x.push(example.mof_id as f64);
            mof.push(example.mof_id as f64);
            anyhow::ensure!(
                example.targets.len() == n_targets,
                "ragged targets in chunk"
            );
            y.extend_from_slice(&example.targets);
        }
        Ok(Batch {
            x: Array2::from_shape_vec((chunk.len(), 2), x)?,
            mof: Array2::from_shape_vec((chunk.len(), 1), mof)?,
            y: Array2::from_shape_vec((chunk.len(), n_targets), y)?,
        })
    }
}

/// Mock model whose latent IS the collated ground truth and whose decoder is
/// the identity — predictions therefore equal the batch targets exactly,
/// which makes order and alignment assertions trivial.
pub struct MockModel {
    scaler: TargetScaler,
}

impl MockModel {
    pub fn new(scaler: TargetScaler) -> Self {
        Self { scaler }
    }

    /// Model with an identity scaler over `n_targets` columns.
    pub fn identity(n_targets: usize) -> Self {
        let scaler = TargetScaler::from_stats(vec![0.0; n_targets], vec![1.0; n_targets])
            .expect("identity scaler stats are valid");
        Self { scaler }
    }
}

impl PropertyModel for MockModel {
    fn encode(&self, batch: &Batch) -> anyhow::Result<Array2<f64>> {
        Ok(batch.y.clone())
    }

    fn decode(&self, latent: &Array2<f64>) -> anyhow::Result<Array2<f64>> {
        Ok(latent.clone())
    }

    fn scaler(&self) -> &TargetScaler {
        &self.scaler
    }
}
