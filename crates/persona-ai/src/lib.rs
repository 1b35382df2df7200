//! Persona inference layer: ONNX Runtime text encoding and linear
//! attribute classifiers over shared sentence embeddings.

mod classifier;
mod service;

#[cfg(feature = "onnx")]
mod embedder;

pub use classifier::{AttributeClassifiers, LinearClassifier, ProbabilisticClassifier};
pub use service::{PersonaPredictor, TextEncoder};

#[cfg(feature = "onnx")]
pub use embedder::OnnxEncoder;
