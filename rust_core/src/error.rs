use thiserror::Error;

/// Library-wide error type.
///
/// The variants mirror the run's failure taxonomy: a missing data source is
/// fatal for the run, model misuse is fatal for the run, and everything else
/// is handled at the call site (skipped matchups, per-value fallbacks).
#[derive(Debug, Error)]
pub enum CoreError {
    /// The stats or schedule source returned nothing usable. Hard stop.
    #[error("data unavailable from {src}: {reason}")]
    DataUnavailable { src: String, reason: String },

    /// Cleaning and joining left zero usable training rows.
    #[error("no valid training data after cleaning and stats join")]
    NoTrainingData,

    /// `predict_probability` was called before `train`.
    #[error("model has not been trained")]
    ModelNotTrained,

    /// Inference features were built against a different schema than the
    /// model was trained with.
    #[error("feature schema mismatch: model trained on {expected:?}, got {got:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },

    /// A feature row's width disagrees with its declared schema.
    #[error("feature row has {got} columns, schema expects {expected}")]
    FeatureWidth { expected: usize, got: usize },

    #[error("malformed document: {0}")]
    Parse(String),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
