pub mod domain;
pub mod infrastructure;

use std::path::PathBuf;

use thiserror::Error;

/// Construction-time classifier failures.
///
/// Both variants are fatal: a failed construction yields no usable
/// classifier. Per-call failures never surface as errors; `classify`
/// absorbs them into an empty result set.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("accent model bundle not found; searched {searched:?}")]
    ModelNotFound { searched: Vec<PathBuf> },
    #[error("failed to load accent model bundle from {path}: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
