use std::path::PathBuf;

use thiserror::Error;

/// Raised once, at service construction, when an artifact cannot be loaded.
///
/// Fatal: a failed construction yields no service value, so prediction is
/// never reachable in a partially-loaded state.
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("artifact not found: {0}")]
    Missing(PathBuf),

    #[error("failed to load artifact {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("artifact {name} is incompatible: {reason}")]
    Incompatible { name: String, reason: String },
}

/// Raised per request when embedding or a classifier invocation fails.
///
/// No partial prediction is ever returned and no internal retry occurs.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("{attribute} classifier failed: {reason}")]
    Classifier {
        attribute: &'static str,
        reason: String,
    },

    #[error("age expectation failed: {0}")]
    AgeExpectation(String),
}
