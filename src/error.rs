use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a run.
///
/// `InconsistentFeatureLength` and `PredictionSizeMismatch` are structural
/// failures: callers must not continue with the data they were working on.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to draw {file}: {reason}")]
    Plot { file: String, reason: String },

    #[error("cannot start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("cannot read feature {feature} from {}: {reason}", source_path.display())]
    Source {
        source_path: PathBuf,
        feature: String,
        reason: String,
    },

    #[error(
        "inconsistent feature counts in {}: expected {expected} values, \
         feature {feature} has {found}",
        source_path.display()
    )]
    InconsistentFeatureLength {
        source_path: PathBuf,
        expected: usize,
        found: usize,
        feature: String,
    },

    #[error("no samples left after filtering")]
    EmptyDataset,

    #[error("training requested but the training partition is empty")]
    EmptyTrainingSet,

    #[error("sizes of predictions ({predictions}) and samples ({samples}) are not equal")]
    PredictionSizeMismatch { predictions: usize, samples: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
