//! Linear attribute classifiers loaded from JSON artifacts.
//!
//! Each artifact is an exported multinomial logistic regression: one weight
//! row and one intercept per label, probabilities via softmax over
//! `W·x + b`. The label order in the artifact is the classifier's canonical
//! order and drives the deterministic argmax tie-break downstream.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use persona_core::{ArtifactLoadError, Attribute};

/// Capability interface every attribute classifier satisfies.
///
/// `probabilities` returns one value per label, aligned index-for-index
/// with `labels()`, summing to 1.0 within floating-point tolerance.
pub trait ProbabilisticClassifier: Send + Sync {
    /// The fixed label set, in canonical order.
    fn labels(&self) -> &[String];

    /// Probability distribution over `labels()` for one embedding.
    fn probabilities(&self, embedding: &[f32]) -> anyhow::Result<Vec<f32>>;
}

/// On-disk artifact layout.
#[derive(Debug, Deserialize)]
struct LinearArtifact {
    labels: Vec<String>,
    dim: usize,
    weights: Vec<Vec<f32>>,
    intercepts: Vec<f32>,
}

/// Multinomial logistic regression over sentence embeddings.
#[derive(Debug)]
pub struct LinearClassifier {
    labels: Vec<String>,
    dim: usize,
    /// Row-major `[n_labels × dim]` weight matrix.
    weights: Vec<f32>,
    intercepts: Vec<f32>,
}

impl LinearClassifier {
    /// Load and validate a classifier artifact from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ArtifactLoadError> {
        if !path.exists() {
            return Err(ArtifactLoadError::Missing(path.to_path_buf()));
        }

        let raw = fs::read_to_string(path).map_err(|e| ArtifactLoadError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let artifact: LinearArtifact =
            serde_json::from_str(&raw).map_err(|e| ArtifactLoadError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let incompatible = |reason: String| ArtifactLoadError::Incompatible {
            name: name.clone(),
            reason,
        };

        if artifact.labels.is_empty() {
            return Err(incompatible("empty label set".into()));
        }
        if artifact.dim == 0 {
            return Err(incompatible("embedding dim must be at least 1".into()));
        }
        for (i, label) in artifact.labels.iter().enumerate() {
            if artifact.labels[..i].contains(label) {
                return Err(incompatible(format!("duplicate label {label:?}")));
            }
        }
        if artifact.weights.len() != artifact.labels.len() {
            return Err(incompatible(format!(
                "{} weight rows for {} labels",
                artifact.weights.len(),
                artifact.labels.len()
            )));
        }
        if artifact.intercepts.len() != artifact.labels.len() {
            return Err(incompatible(format!(
                "{} intercepts for {} labels",
                artifact.intercepts.len(),
                artifact.labels.len()
            )));
        }
        for (i, row) in artifact.weights.iter().enumerate() {
            if row.len() != artifact.dim {
                return Err(incompatible(format!(
                    "weight row {i} has {} values, expected dim {}",
                    row.len(),
                    artifact.dim
                )));
            }
        }

        debug!(
            artifact = %name,
            labels = artifact.labels.len(),
            dim = artifact.dim,
            "loaded classifier artifact"
        );

        Ok(Self {
            labels: artifact.labels,
            dim: artifact.dim,
            weights: artifact.weights.into_iter().flatten().collect(),
            intercepts: artifact.intercepts,
        })
    }

    /// Embedding dimensionality this classifier expects.
    pub fn dim(&self) -> usize {
        self.dim
    }
}

impl ProbabilisticClassifier for LinearClassifier {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn probabilities(&self, embedding: &[f32]) -> anyhow::Result<Vec<f32>> {
        anyhow::ensure!(
            embedding.len() == self.dim,
            "embedding has {} dimensions, classifier expects {}",
            embedding.len(),
            self.dim
        );

        let mut logits = Vec::with_capacity(self.labels.len());
        for row in self.weights.chunks_exact(self.dim) {
            let dot: f64 = row
                .iter()
                .zip(embedding)
                .map(|(w, x)| (*w as f64) * (*x as f64))
                .sum();
            logits.push(dot);
        }
        for (logit, intercept) in logits.iter_mut().zip(&self.intercepts) {
            *logit += *intercept as f64;
        }

        Ok(softmax(&logits))
    }
}

/// Numerically stable softmax (max-subtraction before exponentiation).
fn softmax(logits: &[f64]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.iter().map(|e| (e / total) as f32).collect()
}

/// The five attribute classifiers, loaded once and shared read-only.
///
/// Fields are boxed trait objects so tests and embedders of the library can
/// substitute engineered classifiers for any attribute.
pub struct AttributeClassifiers {
    pub gender: Box<dyn ProbabilisticClassifier>,
    pub mood: Box<dyn ProbabilisticClassifier>,
    pub country: Box<dyn ProbabilisticClassifier>,
    pub product_fit: Box<dyn ProbabilisticClassifier>,
    pub age_bin: Box<dyn ProbabilisticClassifier>,
}

impl std::fmt::Debug for AttributeClassifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeClassifiers").finish_non_exhaustive()
    }
}

impl AttributeClassifiers {
    /// Load all five artifacts from a directory, checking each against the
    /// encoder's embedding dimensionality.
    pub fn load(dir: &Path, expected_dim: usize) -> Result<Self, ArtifactLoadError> {
        let load_one =
            |attr: Attribute| -> Result<Box<dyn ProbabilisticClassifier>, ArtifactLoadError> {
                let path = dir.join(attr.artifact_file());
                let clf = LinearClassifier::load(&path)?;
                if clf.dim() != expected_dim {
                    return Err(ArtifactLoadError::Incompatible {
                        name: attr.as_str().to_string(),
                        reason: format!(
                            "artifact dim {} does not match encoder dim {expected_dim}",
                            clf.dim()
                        ),
                    });
                }
                Ok(Box::new(clf))
            };

        Ok(Self {
            gender: load_one(Attribute::Gender)?,
            mood: load_one(Attribute::Mood)?,
            country: load_one(Attribute::Country)?,
            product_fit: load_one(Attribute::ProductFit)?,
            age_bin: load_one(Attribute::AgeBin)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn artifact_json(labels: &[&str], dim: usize) -> String {
        // Zero weights and intercepts: uniform distribution over labels.
        let weights: Vec<Vec<f32>> = labels.iter().map(|_| vec![0.0; dim]).collect();
        serde_json::json!({
            "labels": labels,
            "dim": dim,
            "weights": weights,
            "intercepts": vec![0.0f32; labels.len()],
        })
        .to_string()
    }

    fn write_artifact(dir: &Path, file: &str, json: &str) -> std::path::PathBuf {
        let path = dir.join(file);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(json.as_bytes()).unwrap();
        path
    }

    #[test]
    fn probabilities_sum_to_one() {
        let dir = tempfile::tempdir().unwrap();
        let json = serde_json::json!({
            "labels": ["male", "female", "unisex"],
            "dim": 4,
            "weights": [[0.5, -0.2, 0.1, 0.0], [-0.3, 0.4, 0.0, 0.2], [0.1, 0.1, -0.5, 0.3]],
            "intercepts": [0.1, -0.1, 0.0],
        })
        .to_string();
        let path = write_artifact(dir.path(), "gender_clf.json", &json);

        let clf = LinearClassifier::load(&path).unwrap();
        let probs = clf.probabilities(&[0.3, -0.1, 0.7, 0.2]).unwrap();
        assert_eq!(probs.len(), 3);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4, "probabilities sum to {sum}");
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn zero_weights_give_uniform_distribution() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(
            dir.path(),
            "mood_clf.json",
            &artifact_json(&["energising", "calming", "warm"], 4),
        );

        let clf = LinearClassifier::load(&path).unwrap();
        let probs = clf.probabilities(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        for p in &probs {
            assert!((p - 1.0 / 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn label_set_is_stable_across_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(
            dir.path(),
            "mood_clf.json",
            &artifact_json(&["energising", "calming"], 2),
        );
        let clf = LinearClassifier::load(&path).unwrap();

        for input in [[0.0, 0.0], [5.0, -5.0], [-1.0, 1.0]] {
            let probs = clf.probabilities(&input).unwrap();
            assert_eq!(probs.len(), clf.labels().len());
            assert_eq!(clf.labels(), &["energising", "calming"]);
        }
    }

    #[test]
    fn missing_file_is_missing_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LinearClassifier::load(&dir.path().join("gender_clf.json")).unwrap_err();
        assert!(matches!(err, ArtifactLoadError::Missing(_)));
    }

    #[test]
    fn unparsable_json_is_corrupt_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(dir.path(), "gender_clf.json", "not json at all");
        let err = LinearClassifier::load(&path).unwrap_err();
        assert!(matches!(err, ArtifactLoadError::Corrupt { .. }));
    }

    #[test]
    fn wrong_row_length_is_incompatible() {
        let dir = tempfile::tempdir().unwrap();
        let json = serde_json::json!({
            "labels": ["a", "b"],
            "dim": 4,
            "weights": [[0.0, 0.0, 0.0, 0.0], [0.0, 0.0]],
            "intercepts": [0.0, 0.0],
        })
        .to_string();
        let path = write_artifact(dir.path(), "country_clf.json", &json);
        let err = LinearClassifier::load(&path).unwrap_err();
        assert!(matches!(err, ArtifactLoadError::Incompatible { .. }));
    }

    #[test]
    fn duplicate_labels_are_incompatible() {
        let dir = tempfile::tempdir().unwrap();
        let json = serde_json::json!({
            "labels": ["a", "a"],
            "dim": 1,
            "weights": [[0.0], [0.0]],
            "intercepts": [0.0, 0.0],
        })
        .to_string();
        let path = write_artifact(dir.path(), "country_clf.json", &json);
        let err = LinearClassifier::load(&path).unwrap_err();
        assert!(matches!(err, ArtifactLoadError::Incompatible { .. }));
    }

    #[test]
    fn wrong_embedding_dim_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(dir.path(), "mood_clf.json", &artifact_json(&["a", "b"], 4));
        let clf = LinearClassifier::load(&path).unwrap();
        assert!(clf.probabilities(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn load_all_checks_encoder_dim() {
        let dir = tempfile::tempdir().unwrap();
        for attr in Attribute::ALL {
            write_artifact(
                dir.path(),
                &attr.artifact_file(),
                &artifact_json(&["x", "y"], 4),
            );
        }

        assert!(AttributeClassifiers::load(dir.path(), 4).is_ok());
        let err = AttributeClassifiers::load(dir.path(), 8).unwrap_err();
        assert!(matches!(err, ArtifactLoadError::Incompatible { .. }));
    }

    #[test]
    fn load_all_reports_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        for attr in [Attribute::Gender, Attribute::Country, Attribute::AgeBin] {
            write_artifact(
                dir.path(),
                &attr.artifact_file(),
                &artifact_json(&["x", "y"], 4),
            );
        }

        let err = AttributeClassifiers::load(dir.path(), 4).unwrap_err();
        match err {
            ArtifactLoadError::Missing(path) => {
                assert!(path.ends_with("mood_clf.json"));
            }
            other => panic!("expected Missing, got {other:?}"),
        }
    }
}
