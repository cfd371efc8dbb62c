//! ArcFace face recognizer via ONNX Runtime.
//!
//! Produces L2-normalized 512-dimensional embeddings from aligned RGB face
//! crops using the w600k_r50 ArcFace model.

use crate::alignment::{self, ALIGNED_SIZE};
use crate::types::{BoundingBox, Embedding};
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

const REC_MEAN: f32 = 127.5;
const REC_STD: f32 = 127.5; // ArcFace uses symmetric normalization, not 128.0
const REC_EMBEDDING_DIM: usize = 512;
const REC_MODEL_VERSION: &str = "w600k_r50";

/// Match threshold tuned for L2-normalized w600k_r50 embeddings
/// (Euclidean 1.1 ≈ cosine similarity 0.4). Thresholds are a property of
/// the embedding model; do not reuse this value with any other backend.
pub const W600K_R50_DISTANCE_THRESHOLD: f32 = 1.1;

#[derive(Error, Debug)]
pub enum RecognizerError {
    #[error("model file not found: {0} — download from insightface and place in the model dir")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("face has no landmarks — detector must return landmarks for alignment")]
    NoLandmarks,
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// ArcFace-based face recognizer.
pub struct FaceRecognizer {
    session: Session,
}

impl FaceRecognizer {
    /// Load the ArcFace ONNX model from the given path.
    pub fn load(model_path: &str) -> Result<Self, RecognizerError> {
        if !Path::new(model_path).exists() {
            return Err(RecognizerError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        tracing::info!(path = model_path, "loaded ArcFace model");

        Ok(Self { session })
    }

    /// Extract a face embedding from a detected face in an RGB frame.
    ///
    /// The detection must carry landmarks; the face is warped to the
    /// canonical 112×112 position before embedding extraction, and the
    /// result is L2-normalized.
    pub fn extract(
        &mut self,
        rgb: &[u8],
        width: u32,
        height: u32,
        face: &BoundingBox,
    ) -> Result<Embedding, RecognizerError> {
        let landmarks = face.landmarks.as_ref().ok_or(RecognizerError::NoLandmarks)?;

        let aligned = alignment::align_face(rgb, width, height, landmarks);
        let input = Self::preprocess(&aligned);

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (_, raw_data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| RecognizerError::InferenceFailed(format!("embedding extraction: {e}")))?;

        let raw: Vec<f32> = raw_data.to_vec();

        if raw.len() != REC_EMBEDDING_DIM {
            return Err(RecognizerError::InferenceFailed(format!(
                "expected {REC_EMBEDDING_DIM}-dim embedding, got {}",
                raw.len()
            )));
        }

        let norm: f32 = raw.iter().map(|x| x * x).sum::<f32>().sqrt();
        let values = if norm > 0.0 {
            raw.iter().map(|x| x / norm).collect()
        } else {
            raw
        };

        Ok(Embedding {
            values,
            model_version: Some(REC_MODEL_VERSION.to_string()),
        })
    }

    /// Preprocess a 112×112 interleaved RGB crop into a NCHW float tensor.
    fn preprocess(aligned_rgb: &[u8]) -> Array4<f32> {
        let size = ALIGNED_SIZE;
        let mut tensor = Array4::<f32>::zeros((1, 3, size, size));

        for y in 0..size {
            for x in 0..size {
                for c in 0..3 {
                    let pixel = aligned_rgb
                        .get((y * size + x) * 3 + c)
                        .copied()
                        .unwrap_or(0) as f32;
                    tensor[[0, c, y, x]] = (pixel - REC_MEAN) / REC_STD;
                }
            }
        }

        tensor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_output_shape() {
        let aligned = vec![128u8; ALIGNED_SIZE * ALIGNED_SIZE * 3];
        let tensor = FaceRecognizer::preprocess(&aligned);
        assert_eq!(tensor.shape(), &[1, 3, ALIGNED_SIZE, ALIGNED_SIZE]);
    }

    #[test]
    fn preprocess_normalization() {
        let aligned = vec![128u8; ALIGNED_SIZE * ALIGNED_SIZE * 3];
        let tensor = FaceRecognizer::preprocess(&aligned);
        let expected = (128.0 - REC_MEAN) / REC_STD;
        assert!((tensor[[0, 0, 0, 0]] - expected).abs() < 1e-6);
    }

    #[test]
    fn preprocess_keeps_channels_planar() {
        // One orange pixel at (0,0): R=200, G=100, B=50.
        let mut aligned = vec![0u8; ALIGNED_SIZE * ALIGNED_SIZE * 3];
        aligned[0] = 200;
        aligned[1] = 100;
        aligned[2] = 50;

        let tensor = FaceRecognizer::preprocess(&aligned);
        assert!((tensor[[0, 0, 0, 0]] - (200.0 - REC_MEAN) / REC_STD).abs() < 1e-6);
        assert!((tensor[[0, 1, 0, 0]] - (100.0 - REC_MEAN) / REC_STD).abs() < 1e-6);
        assert!((tensor[[0, 2, 0, 0]] - (50.0 - REC_MEAN) / REC_STD).abs() < 1e-6);
    }
}
