//! Batched inference over trained MOF property models.
//!
//! The model itself lives with an external collaborator; this crate defines
//! the seams ([`PropertyModel`], [`Collate`]) plus the chunked prediction
//! loop that streams a labeled dataset through encoder and decoder,
//! inverse-transforms predictions and ground truth back to physical units,
//! and accumulates full-dataset arrays. Regression diagnostics (R², MAE,
//! RMSE) live in [`metrics`].
//!
//! # Key types
//!
//! - [`Example`] / [`Batch`] — a labeled input row and one collated chunk
//! - [`PropertyModel`] / [`Collate`] — the model and trainer seams
//! - [`TargetScaler`] — fitted normalized ↔ physical target transform
//! - [`predict_properties`] — the chunked inference driver
//! - [`metrics::regression_statistics`] — per-target diagnostics

pub mod metrics;
pub mod mocks;
pub mod model;
pub mod predict;
pub mod scaler;

pub use metrics::{regression_statistics, RegressionRow, RegressionTable};
pub use model::{Batch, Collate, Example, PropertyModel};
pub use predict::{ground_truth, predict_properties, Predictions, DEFAULT_BATCH_SIZE};
pub use scaler::TargetScaler;
