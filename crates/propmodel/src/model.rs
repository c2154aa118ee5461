//! Seams between the pipeline and the external model/trainer collaborators.

use ndarray::Array2;

use crate::scaler::TargetScaler;

/// One labeled example: a linker molecule, its MOF identity, and the target
/// property vector in normalized units.
#[derive(Debug, Clone)]
pub struct Example {
    pub smiles: String,
    /// Canonical MOF ID from the identity registry.
    pub mof_id: u32,
    /// Normalized target values, one per property.
    pub targets: Vec<f64>,
}

impl Example {
    pub fn new(smiles: impl Into<String>, mof_id: u32, targets: Vec<f64>) -> Self {
        Self {
            smiles: smiles.into(),
            mof_id,
            targets,
        }
    }
}

/// One collated chunk of model-ready inputs.
///
/// `x` encodes the molecules, `mof` the structural identities; both are
/// whatever the collator produced for the paired model. `y` carries the
/// normalized ground-truth targets, row-aligned with `x`.
#[derive(Debug, Clone)]
pub struct Batch {
    pub x: Array2<f64>,
    pub mof: Array2<f64>,
    pub y: Array2<f64>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.x.nrows() == 0
    }
}

/// A trained property model: encoder, latent-to-target decoder, and the
/// fitted target scaler.
///
/// Implementations are inference-only — they must carry no gradient state,
/// so the prediction loop never accumulates autograd memory regardless of
/// the backend behind the trait.
pub trait PropertyModel {
    /// Encode a collated batch into latent representations, one row per example.
    fn encode(&self, batch: &Batch) -> anyhow::Result<Array2<f64>>;

    /// Decode latents into normalized target predictions.
    fn decode(&self, latent: &Array2<f64>) -> anyhow::Result<Array2<f64>>;

    /// The scaler fitted on this model's training targets.
    fn scaler(&self) -> &TargetScaler;
}

/// Maps a chunk of raw examples to model-ready tensors.
///
/// Constructed against a specific model so input shapes stay compatible;
/// the trainer collaborator supplies the implementation.
pub trait Collate {
    fn collate(&self, chunk: &[Example]) -> anyhow::Result<Batch>;
}
