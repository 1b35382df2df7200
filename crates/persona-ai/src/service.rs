//! The persona inference service: load artifacts once, predict many times.

use std::path::Path;
use std::sync::Mutex;

use tracing::info;

use persona_core::{
    AgeBin, ArtifactLoadError, Attribute, AttributeOutcome, Distribution, InferenceError,
    PredictionResult, expected_age,
};

use crate::classifier::{AttributeClassifiers, ProbabilisticClassifier};

/// Seam for the shared sentence-embedding artifact.
///
/// Implementations must be deterministic for a loaded model: the same text
/// yields the same vector for the lifetime of the encoder.
pub trait TextEncoder: Send {
    /// Fixed dimensionality of produced vectors.
    fn dim(&self) -> usize;

    /// Encode one UTF-8 string. Empty input is accepted.
    fn encode(&mut self, text: &str) -> anyhow::Result<Vec<f32>>;
}

/// Orchestrates one shared text encoder and five attribute classifiers.
///
/// All artifacts load eagerly at construction and are held read-only for
/// the service's lifetime: no reload, no hot-swap, no per-request state.
/// `predict` takes `&self` and is safe to call from multiple threads; the
/// encoder sits behind a mutex because the ONNX session needs `&mut` to
/// run, while classification is pure arithmetic on shared state.
pub struct PersonaPredictor {
    encoder: Mutex<Box<dyn TextEncoder>>,
    classifiers: AttributeClassifiers,
}

impl std::fmt::Debug for PersonaPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonaPredictor").finish_non_exhaustive()
    }
}

impl PersonaPredictor {
    /// Load the ONNX embedding model and all five classifier artifacts.
    #[cfg(feature = "onnx")]
    pub fn load(model_dir: &Path, artifact_dir: &Path) -> Result<Self, ArtifactLoadError> {
        let encoder = crate::embedder::OnnxEncoder::load(model_dir)?;
        Self::with_encoder(Box::new(encoder), artifact_dir)
    }

    /// Construct with an injected encoder, loading classifiers from disk.
    pub fn with_encoder(
        encoder: Box<dyn TextEncoder>,
        artifact_dir: &Path,
    ) -> Result<Self, ArtifactLoadError> {
        let classifiers = AttributeClassifiers::load(artifact_dir, encoder.dim())?;
        Self::with_classifiers(encoder, classifiers)
    }

    /// Construct with injected encoder and classifiers.
    pub fn with_classifiers(
        encoder: Box<dyn TextEncoder>,
        classifiers: AttributeClassifiers,
    ) -> Result<Self, ArtifactLoadError> {
        // The age-bin label set must be the known bin identifiers, otherwise
        // the expectation step could fail at request time.
        for label in classifiers.age_bin.labels() {
            if AgeBin::from_label(label).is_none() {
                return Err(ArtifactLoadError::Incompatible {
                    name: Attribute::AgeBin.as_str().to_string(),
                    reason: format!("unknown age bin label {label:?}"),
                });
            }
        }

        info!(dim = encoder.dim(), "persona predictor ready");
        Ok(Self {
            encoder: Mutex::new(encoder),
            classifiers,
        })
    }

    /// Embedding dimensionality of the loaded encoder.
    pub fn dim(&self) -> usize {
        match self.encoder.lock() {
            Ok(enc) => enc.dim(),
            Err(poisoned) => poisoned.into_inner().dim(),
        }
    }

    /// Run the full pipeline for one free-text description.
    ///
    /// All-or-nothing: if the embedding step or any classifier fails, the
    /// whole request fails and no partial result is returned.
    pub fn predict(&self, text: &str) -> Result<PredictionResult, InferenceError> {
        let embedding = {
            let mut encoder = match self.encoder.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            encoder
                .encode(text)
                .map_err(|e| InferenceError::Embedding(e.to_string()))?
        };

        let gender = classify(Attribute::Gender, &*self.classifiers.gender, &embedding)?;
        let mood = classify(Attribute::Mood, &*self.classifiers.mood, &embedding)?;
        let country = classify(Attribute::Country, &*self.classifiers.country, &embedding)?;
        let product_fit = classify(
            Attribute::ProductFit,
            &*self.classifiers.product_fit,
            &embedding,
        )?;
        let age_bin = classify(Attribute::AgeBin, &*self.classifiers.age_bin, &embedding)?;

        let expectation = expected_age(&age_bin.distribution).ok_or_else(|| {
            InferenceError::AgeExpectation("distribution contains an unknown bin label".into())
        })?;
        // Truncation toward zero, matching the established display policy.
        let average_age = expectation as u32;

        Ok(PredictionResult {
            gender,
            mood,
            country,
            product_fit,
            age_bin,
            average_age,
        })
    }
}

/// Run one classifier and derive its outcome.
fn classify(
    attribute: Attribute,
    classifier: &dyn ProbabilisticClassifier,
    embedding: &[f32],
) -> Result<AttributeOutcome, InferenceError> {
    let labels = classifier.labels();
    let probs = classifier
        .probabilities(embedding)
        .map_err(|e| InferenceError::Classifier {
            attribute: attribute.as_str(),
            reason: e.to_string(),
        })?;

    if probs.len() != labels.len() {
        return Err(InferenceError::Classifier {
            attribute: attribute.as_str(),
            reason: format!(
                "{} probabilities for {} labels",
                probs.len(),
                labels.len()
            ),
        });
    }

    let distribution = Distribution::from_pairs(labels.iter().cloned().zip(probs));
    let top_label = distribution
        .top()
        .ok_or_else(|| InferenceError::Classifier {
            attribute: attribute.as_str(),
            reason: "empty distribution".into(),
        })?
        .to_string();

    Ok(AttributeOutcome {
        distribution,
        top_label,
    })
}
