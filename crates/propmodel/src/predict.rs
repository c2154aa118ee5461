//! Chunked, order-preserving inference over a labeled dataset.

use anyhow::{ensure, Context};
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array2, ArrayView2};

use crate::model::{Collate, Example, PropertyModel};
use crate::scaler::TargetScaler;

/// Conventional chunk size for [`predict_properties`].
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Full-dataset prediction output, both matrices in physical units and
/// row-aligned with the input examples.
#[derive(Debug, Clone)]
pub struct Predictions {
    pub y_pred: Array2<f64>,
    pub y_true: Array2<f64>,
}

/// Run the model over `data` in contiguous chunks of `batch_size`.
///
/// Per chunk: collate, encode, decode, then inverse-transform both the
/// prediction and the chunk's ground truth back to physical units. Chunks are
/// processed sequentially and in order, so every example contributes exactly
/// one row to each output matrix, in input order; the last chunk is simply
/// smaller when `data.len()` is not a multiple of `batch_size`.
pub fn predict_properties(
    data: &[Example],
    model: &dyn PropertyModel,
    collator: &dyn Collate,
    batch_size: usize,
) -> anyhow::Result<Predictions> {
    ensure!(batch_size > 0, "batch_size must be at least 1");
    let n_targets = model.scaler().n_targets();
    if data.is_empty() {
        return Ok(Predictions {
            y_pred: Array2::zeros((0, n_targets)),
            y_true: Array2::zeros((0, n_targets)),
        });
    }

    let n_chunks = data.len().div_ceil(batch_size);
    let pb = ProgressBar::new(n_chunks as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) predicting")
            .expect("valid progress bar template")
            .progress_chars("=> "),
    );

    let mut y_pred = Vec::with_capacity(data.len() * n_targets);
    let mut y_true = Vec::with_capacity(data.len() * n_targets);

    for (chunk_idx, chunk) in data.chunks(batch_size).enumerate() {
        let batch = collator
            .collate(chunk)
            .with_context(|| format!("collating chunk {chunk_idx}"))?;
        ensure!(
            batch.len() == chunk.len(),
            "collator returned {} rows for a chunk of {}",
            batch.len(),
            chunk.len()
        );

        let latent = model.encode(&batch)?;
        let pred = model.decode(&latent)?;
        let pred = model.scaler().inverse_transform(pred.view())?;
        let truth = model.scaler().inverse_transform(batch.y.view())?;

        y_pred.extend(pred.iter().copied());
        y_true.extend(truth.iter().copied());
        pb.inc(1);
    }
    pb.finish_and_clear();

    let shape = (data.len(), n_targets);
    let predictions = Predictions {
        y_pred: Array2::from_shape_vec(shape, y_pred).context("assembling prediction matrix")?,
        y_true: Array2::from_shape_vec(shape, y_true).context("assembling ground-truth matrix")?,
    };
    tracing::info!(
        rows = data.len(),
        targets = n_targets,
        batches = n_chunks,
        "Prediction finished"
    );
    Ok(predictions)
}

/// Stack the dataset's target vectors and map them to physical units,
/// without running the model.
pub fn ground_truth(data: &[Example], scaler: &TargetScaler) -> anyhow::Result<Array2<f64>> {
    let n_targets = scaler.n_targets();
    let mut flat = Vec::with_capacity(data.len() * n_targets);
    for (idx, example) in data.iter().enumerate() {
        ensure!(
            example.targets.len() == n_targets,
            "example {idx} has {} targets, scaler expects {n_targets}",
            example.targets.len()
        );
        flat.extend_from_slice(&example.targets);
    }
    let stacked = Array2::from_shape_vec((data.len(), n_targets), flat)
        .context("stacking ground-truth targets")?;
    scaler.inverse_transform(ArrayView2::from(&stacked))
}
