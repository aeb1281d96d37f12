//! Home-win probability model.
//!
//! A standardized logistic regression fit by full-batch gradient descent.
//! Deterministic end to end: zero-initialized weights, a fixed iteration
//! count, a seeded holdout shuffle, and an order-stable correlation pruning
//! pass. The trained column list is part of the model state and inference
//! re-applies exactly that list.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::{CoreError, Result};
use crate::features::FeatureSchema;

const TRAIN_EPOCHS: usize = 500;
const LEARNING_RATE: f64 = 0.05;

/// Seed for the train/holdout shuffle so repeated runs on the same data
/// produce the same split and accuracy line.
const SPLIT_SEED: u64 = 42;

#[inline]
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Summary of a training run, for logging and reports.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub samples: usize,
    pub holdout_samples: usize,
    /// Fraction of held-out games classified correctly at the 0.5 cut.
    /// `None` when the sample was too small to hold anything out.
    pub holdout_accuracy: Option<f64>,
    pub kept_features: Vec<String>,
    pub dropped_features: Vec<String>,
}

#[derive(Debug, Clone)]
struct TrainedState {
    /// The full schema the training matrix was built with.
    schema: FeatureSchema,
    /// Indices into `schema` that survived correlation pruning.
    kept: Vec<usize>,
    means: Vec<f64>,
    stds: Vec<f64>,
    weights: Vec<f64>,
    bias: f64,
}

/// Binary classifier for P(home team wins).
#[derive(Debug, Clone)]
pub struct WinProbabilityModel {
    correlation_threshold: f64,
    prob_clip: (f64, f64),
    holdout_fraction: f64,
    trained: Option<TrainedState>,
}

impl WinProbabilityModel {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            correlation_threshold: config.correlation_threshold,
            prob_clip: (config.prob_clip_min, config.prob_clip_max),
            holdout_fraction: config.holdout_fraction,
            trained: None,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.trained.is_some()
    }

    /// Fit the model on a feature matrix and home-win labels.
    ///
    /// Pruning runs first: for each feature pair whose |Pearson r| exceeds
    /// the threshold, the later-indexed column is dropped. The surviving
    /// columns are standardized and fit; a held-out split is scored for the
    /// accuracy log line.
    pub fn train(
        &mut self,
        rows: &[Vec<f64>],
        labels: &[bool],
        schema: &FeatureSchema,
    ) -> Result<TrainingReport> {
        if rows.is_empty() {
            return Err(CoreError::NoTrainingData);
        }
        if rows.len() != labels.len() {
            return Err(CoreError::Parse(format!(
                "{} feature rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        for row in rows {
            schema.check_row(row)?;
        }

        // Rows carrying non-finite values cannot be fit; exclude them here
        // rather than poisoning the gradient.
        let mut clean_rows: Vec<&Vec<f64>> = Vec::with_capacity(rows.len());
        let mut clean_labels: Vec<f64> = Vec::with_capacity(rows.len());
        for (row, &label) in rows.iter().zip(labels) {
            if row.iter().all(|v| v.is_finite()) {
                clean_rows.push(row);
                clean_labels.push(if label { 1.0 } else { 0.0 });
            }
        }
        if clean_rows.len() < rows.len() {
            warn!(
                dropped = rows.len() - clean_rows.len(),
                "excluded training rows with non-finite features"
            );
        }
        if clean_rows.is_empty() {
            return Err(CoreError::NoTrainingData);
        }

        let kept = prune_correlated(&clean_rows, schema.len(), self.correlation_threshold);
        let dropped_features: Vec<String> = (0..schema.len())
            .filter(|i| !kept.contains(i))
            .map(|i| schema.columns()[i].clone())
            .collect();
        if !dropped_features.is_empty() {
            info!(?dropped_features, "pruned highly correlated features");
        }

        // Standardize the surviving columns.
        let n = clean_rows.len();
        let dim = kept.len();
        let mut means = vec![0.0; dim];
        let mut stds = vec![0.0; dim];
        for (k, &col) in kept.iter().enumerate() {
            let mean = clean_rows.iter().map(|r| r[col]).sum::<f64>() / n as f64;
            let var = clean_rows
                .iter()
                .map(|r| (r[col] - mean).powi(2))
                .sum::<f64>()
                / n as f64;
            means[k] = mean;
            stds[k] = if var.sqrt() > 0.0 { var.sqrt() } else { 1.0 };
        }
        let standardized: Vec<Vec<f64>> = clean_rows
            .iter()
            .map(|r| {
                kept.iter()
                    .enumerate()
                    .map(|(k, &col)| (r[col] - means[k]) / stds[k])
                    .collect()
            })
            .collect();

        // Shuffled holdout split, seeded for repeatability.
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut StdRng::seed_from_u64(SPLIT_SEED));
        let holdout_n = ((n as f64) * self.holdout_fraction).round() as usize;
        let holdout_n = if holdout_n >= n { 0 } else { holdout_n };
        let (holdout_idx, train_idx) = order.split_at(holdout_n);

        // Full-batch gradient descent on the training portion.
        let mut weights = vec![0.0; dim];
        let mut bias = 0.0;
        let m = train_idx.len() as f64;
        for _ in 0..TRAIN_EPOCHS {
            let mut grad_w = vec![0.0; dim];
            let mut grad_b = 0.0;
            for &i in train_idx {
                let x = &standardized[i];
                let z = bias + weights.iter().zip(x).map(|(w, v)| w * v).sum::<f64>();
                let err = sigmoid(z) - clean_labels[i];
                for (g, v) in grad_w.iter_mut().zip(x) {
                    *g += err * v;
                }
                grad_b += err;
            }
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= LEARNING_RATE * g / m;
            }
            bias -= LEARNING_RATE * grad_b / m;
        }

        let holdout_accuracy = if holdout_idx.is_empty() {
            None
        } else {
            let correct = holdout_idx
                .iter()
                .filter(|&&i| {
                    let x = &standardized[i];
                    let z = bias + weights.iter().zip(x).map(|(w, v)| w * v).sum::<f64>();
                    (sigmoid(z) > 0.5) == (clean_labels[i] > 0.5)
                })
                .count();
            Some(correct as f64 / holdout_idx.len() as f64)
        };
        if let Some(accuracy) = holdout_accuracy {
            info!(samples = n, holdout = holdout_idx.len(), accuracy, "model trained");
        } else {
            info!(samples = n, "model trained without holdout");
        }

        let kept_features: Vec<String> =
            kept.iter().map(|&i| schema.columns()[i].clone()).collect();
        self.trained = Some(TrainedState {
            schema: schema.clone(),
            kept,
            means,
            stds,
            weights,
            bias,
        });

        Ok(TrainingReport {
            samples: n,
            holdout_samples: holdout_idx.len(),
            holdout_accuracy,
            kept_features,
            dropped_features,
        })
    }

    /// Home-win probability for each feature row, clipped to the configured
    /// band.
    ///
    /// The rows must be built against the same full schema the model was
    /// trained with; anything else is an error, never a silent default.
    pub fn predict_probability(
        &self,
        rows: &[Vec<f64>],
        schema: &FeatureSchema,
    ) -> Result<Vec<f64>> {
        let state = self.trained.as_ref().ok_or(CoreError::ModelNotTrained)?;
        if schema != &state.schema {
            return Err(CoreError::SchemaMismatch {
                expected: state.schema.columns().to_vec(),
                got: schema.columns().to_vec(),
            });
        }

        let (clip_min, clip_max) = self.prob_clip;
        let mut probs = Vec::with_capacity(rows.len());
        for row in rows {
            schema.check_row(row)?;
            let z = state.bias
                + state
                    .kept
                    .iter()
                    .enumerate()
                    .map(|(k, &col)| {
                        state.weights[k] * (row[col] - state.means[k]) / state.stds[k]
                    })
                    .sum::<f64>();
            probs.push(sigmoid(z).clamp(clip_min, clip_max));
        }
        Ok(probs)
    }
}

/// Indices of columns surviving correlation pruning.
///
/// Pairs are scanned in index order; when |r| exceeds the threshold and
/// neither member has been dropped yet, the later-indexed column goes.
fn prune_correlated(rows: &[&Vec<f64>], dim: usize, threshold: f64) -> Vec<usize> {
    let mut dropped = vec![false; dim];
    for i in 0..dim {
        if dropped[i] {
            continue;
        }
        for j in (i + 1)..dim {
            if dropped[j] {
                continue;
            }
            if pearson(rows, i, j).abs() > threshold {
                dropped[j] = true;
            }
        }
    }
    (0..dim).filter(|&i| !dropped[i]).collect()
}

/// Pearson correlation between two columns; 0.0 when either column has no
/// variance.
fn pearson(rows: &[&Vec<f64>], a: usize, b: usize) -> f64 {
    let n = rows.len() as f64;
    let mean_a = rows.iter().map(|r| r[a]).sum::<f64>() / n;
    let mean_b = rows.iter().map(|r| r[b]).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for row in rows {
        let da = row[a] - mean_a;
        let db = row[b] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a <= 0.0 || var_b <= 0.0 {
        return 0.0;
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}
