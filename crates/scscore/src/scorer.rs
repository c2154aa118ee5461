//! The scorer trait and the fingerprint-MLP reference implementation.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors from scorer construction and scoring.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    /// Weights file does not exist.
    #[error("scorer weights not found at {0}")]
    WeightsNotFound(PathBuf),

    /// Weights file exists but could not be parsed or has bad shapes.
    #[error("failed to restore scorer: {0}")]
    Restore(String),

    /// SMILES string the scorer cannot handle at all (empty input).
    #[error("invalid SMILES: '{0}'")]
    InvalidSmiles(String),

    /// Worker pool could not be constructed.
    #[error("scoring pool error: {0}")]
    Pool(String),

    /// IO error while reading weights.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A scored molecule: whether the SMILES looked well formed, and the score.
///
/// Downstream consumers use only `score`; `valid` is advisory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredSmiles {
    pub valid: bool,
    pub score: f64,
}

/// Assigns a synthesizability score to a molecule.
///
/// Implementations must be `Send + Sync`: the parallel driver shares one
/// scorer across worker threads. Weight loading is a one-time scoped cost, so
/// callers should construct a scorer once and reuse it across calls.
pub trait SynthScorer: Send + Sync {
    fn score(&self, smiles: &str) -> Result<ScoredSmiles, ScoreError>;
}

/// One dense layer of the scoring MLP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    /// Row-major weight matrix, `out_dim` rows of `in_dim` values.
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

/// Persisted weights for [`FingerprintScorer`], stored as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerWeights {
    /// Folded fingerprint length; must match the first layer's input dim.
    pub fingerprint_bits: usize,
    /// Layers applied in order; ReLU between layers, sigmoid after the last.
    pub layers: Vec<DenseLayer>,
}

/// Reference scorer: a folded substring-hash fingerprint fed through a small
/// MLP, squashed to the conventional 1..5 synthesizability range.
///
/// Stands in for the external scoring collaborator wherever a concrete
/// implementation is needed; custom scorers plug in through [`SynthScorer`].
#[derive(Debug)]
pub struct FingerprintScorer {
    weights: ScorerWeights,
}

impl FingerprintScorer {
    /// Restore a scorer from a JSON weights file.
    pub fn restore(path: &Path) -> Result<Self, ScoreError> {
        if !path.exists() {
            return Err(ScoreError::WeightsNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let weights: ScorerWeights =
            serde_json::from_str(&contents).map_err(|e| ScoreError::Restore(e.to_string()))?;
        Self::from_weights(weights)
    }

    /// Build a scorer from in-memory weights, validating layer shapes.
    pub fn from_weights(weights: ScorerWeights) -> Result<Self, ScoreError> {
        if weights.layers.is_empty() {
            return Err(ScoreError::Restore("no layers in weights".to_string()));
        }
        if weights.fingerprint_bits == 0 {
            return Err(ScoreError::Restore(
                "fingerprint_bits must be nonzero".to_string(),
            ));
        }
        let mut in_dim = weights.fingerprint_bits;
        for (idx, layer) in weights.layers.iter().enumerate() {
            if layer.weights.len() != layer.bias.len() {
                return Err(ScoreError::Restore(format!(
                    "layer {idx}: {} weight rows but {} biases",
                    layer.weights.len(),
                    layer.bias.len()
                )));
            }
            if let Some(row) = layer.weights.iter().find(|row| row.len() != in_dim) {
                return Err(ScoreError::Restore(format!(
                    "layer {idx}: expected input dim {in_dim}, found row of {}",
                    row.len()
                )));
            }
            in_dim = layer.weights.len();
        }
        if in_dim != 1 {
            return Err(ScoreError::Restore(format!(
                "final layer must produce a scalar, got dim {in_dim}"
            )));
        }
        tracing::debug!(
            bits = weights.fingerprint_bits,
            layers = weights.layers.len(),
            "Restored fingerprint scorer"
        );
        Ok(Self { weights })
    }

    /// Folded count fingerprint over character shingles of length 1..=3.
    fn fingerprint(&self, smiles: &str) -> Vec<f64> {
        let bits = self.weights.fingerprint_bits;
        let mut fp = vec![0.0; bits];
        let chars: Vec<char> = smiles.chars().collect();
        for len in 1..=3usize.min(chars.len()) {
            for window in chars.windows(len) {
                let mut hasher = DefaultHasher::new();
                window.hash(&mut hasher);
                fp[(hasher.finish() as usize) % bits] += 1.0;
            }
        }
        fp
    }

    fn forward(&self, fp: &[f64]) -> f64 {
        let mut activ: Vec<f64> = fp.to_vec();
        let last = self.weights.layers.len() - 1;
        for (idx, layer) in self.weights.layers.iter().enumerate() {
            let mut next = Vec::with_capacity(layer.bias.len());
            for (row, bias) in layer.weights.iter().zip(&layer.bias) {
                let mut sum = *bias;
                for (w, a) in row.iter().zip(&activ) {
                    sum += w * a;
                }
                next.push(if idx < last { sum.max(0.0) } else { sum });
            }
            activ = next;
        }
        activ[0]
    }
}

impl SynthScorer for FingerprintScorer {
    /// Score one molecule on the 1..5 scale.
    ///
    /// Empty input is an error; a SMILES with unbalanced parentheses or rings
    /// is still scored but flagged `valid: false`.
    fn score(&self, smiles: &str) -> Result<ScoredSmiles, ScoreError> {
        let smiles = smiles.trim();
        if smiles.is_empty() {
            return Err(ScoreError::InvalidSmiles(smiles.to_string()));
        }

        let fp = self.fingerprint(smiles);
        let logit = self.forward(&fp);
        let sigmoid = 1.0 / (1.0 + (-logit).exp());
        Ok(ScoredSmiles {
            valid: looks_well_formed(smiles),
            score: 1.0 + 4.0 * sigmoid,
        })
    }
}

/// Cheap structural sanity check: balanced parentheses and paired ring-bond
/// digits. Not a SMILES parser.
fn looks_well_formed(smiles: &str) -> bool {
    let mut depth: i32 = 0;
    let mut digit_counts = [0u32; 10];
    for c in smiles.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            '0'..='9' => digit_counts[c as usize - '0' as usize] += 1,
            _ => {}
        }
    }
    depth == 0 && digit_counts.iter().all(|&n| n % 2 == 0)
}

/// 8-bit fingerprint, one hidden layer of 2, scalar output. Test support.
#[cfg(test)]
pub(crate) fn tiny_weights() -> ScorerWeights {
    ScorerWeights {
        fingerprint_bits: 8,
        layers: vec![
            DenseLayer {
                weights: vec![vec![0.1; 8], vec![-0.05; 8]],
                bias: vec![0.0, 0.1],
            },
            DenseLayer {
                weights: vec![vec![0.3, -0.2]],
                bias: vec![0.05],
            },
        ],
    }
}
