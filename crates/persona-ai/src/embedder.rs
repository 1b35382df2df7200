//! ONNX Runtime sentence encoder for the shared embedding artifact.
//!
//! Targets all-mpnet-base-v2 (768 dimensions, mean pooling, L2 normalized).
//! The model directory must contain `model.onnx` and `tokenizer.json`.

use std::path::Path;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::info;

use persona_core::ArtifactLoadError;

use crate::service::TextEncoder;

const DEFAULT_DIM: usize = 768;
const MAX_TOKENS: usize = 384;

/// Sentence encoder backed by an ONNX sentence-transformers export.
pub struct OnnxEncoder {
    session: Session,
    tokenizer: Tokenizer,
    dim: usize,
}

impl std::fmt::Debug for OnnxEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEncoder").field("dim", &self.dim).finish_non_exhaustive()
    }
}

impl OnnxEncoder {
    /// Load the embedding model from a directory containing `model.onnx`
    /// and `tokenizer.json`.
    pub fn load(model_dir: &Path) -> Result<Self, ArtifactLoadError> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            return Err(ArtifactLoadError::Missing(model_path));
        }
        if !tokenizer_path.exists() {
            return Err(ArtifactLoadError::Missing(tokenizer_path));
        }

        let session = Session::builder()
            .and_then(|mut b| b.commit_from_file(&model_path))
            .map_err(|e| ArtifactLoadError::Corrupt {
                path: model_path.clone(),
                reason: e.to_string(),
            })?;

        // Infer embedding dimension from the model output shape.
        let dim = infer_dim(session.outputs()[0].dtype()).unwrap_or(DEFAULT_DIM);

        let mut tokenizer =
            Tokenizer::from_file(&tokenizer_path).map_err(|e| ArtifactLoadError::Corrupt {
                path: tokenizer_path.clone(),
                reason: e.to_string(),
            })?;

        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| ArtifactLoadError::Corrupt {
                path: tokenizer_path.clone(),
                reason: format!("set truncation: {e}"),
            })?;

        info!(dim, model = %model_path.display(), "loaded embedding model");
        Ok(Self {
            session,
            tokenizer,
            dim,
        })
    }
}

impl TextEncoder for OnnxEncoder {
    fn dim(&self) -> usize {
        self.dim
    }

    /// Encode one text string into a normalized embedding.
    ///
    /// Empty input tokenizes to special tokens only and still produces a
    /// well-formed vector.
    fn encode(&mut self, text: &str) -> anyhow::Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;

        let seq_len = encoding.get_ids().len();
        anyhow::ensure!(seq_len > 0, "tokenizer produced no tokens");

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();

        let shape = [1i64, seq_len as i64];
        let ids_tensor = Tensor::from_array((shape, input_ids.into_boxed_slice()))?;
        let mask_tensor =
            Tensor::from_array((shape, attention_mask.clone().into_boxed_slice()))?;

        // MPNet exports take input_ids and attention_mask only.
        let outputs = self.session.run(ort::inputs![
            "input_ids" => ids_tensor,
            "attention_mask" => mask_tensor,
        ])?;

        // Token embeddings: [1, seq_len, dim].
        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 3 && dims[0] == 1 && dims[2] as usize == self.dim,
            "unexpected output shape: {dims:?}, expected [1, {seq_len}, {}]",
            self.dim
        );
        let actual_seq_len = dims[1] as usize;

        // Mean pooling under the attention mask.
        let mut pooled = vec![0.0f32; self.dim];
        let mut token_count = 0.0f32;
        for (j, &mask) in attention_mask.iter().take(actual_seq_len).enumerate() {
            if mask > 0 {
                let offset = j * self.dim;
                for (d, p) in pooled.iter_mut().enumerate() {
                    *p += output_data[offset + d];
                }
                token_count += 1.0;
            }
        }
        if token_count > 0.0 {
            for p in &mut pooled {
                *p /= token_count;
            }
        }

        normalize(&mut pooled);
        Ok(pooled)
    }
}

/// L2-normalize a vector in place.
fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Try to infer the embedding dimension from the ONNX model output type.
fn infer_dim(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}
