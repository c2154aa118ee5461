//! Synthesizability scoring for molecules.
//!
//! Exposes the [`SynthScorer`] trait consumed by the data pipeline, a
//! reference [`FingerprintScorer`] restored from persisted MLP weights, and
//! [`score_batch`] — a deterministic data-parallel driver that fans a SMILES
//! column out across worker threads and reassembles scores in row order.

pub mod parallel;
pub mod scorer;

pub use parallel::{score_batch, ScoreConfig};
pub use scorer::{
    DenseLayer, FingerprintScorer, ScoreError, ScoredSmiles, ScorerWeights, SynthScorer,
};
