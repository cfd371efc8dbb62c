//! The detect-and-embed seam.
//!
//! Gallery construction and frame matching only need "give me the faces in
//! this RGB buffer, each with an embedding". [`FaceEncoder`] is that seam;
//! [`FacePipeline`] is the production implementation (SCRFD + ArcFace),
//! constructed explicitly by the caller and passed in wherever needed.

use crate::detector::{DetectorError, FaceDetector};
use crate::recognizer::{FaceRecognizer, RecognizerError};
use crate::types::Detection;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("detector: {0}")]
    Detector(#[from] DetectorError),
    #[error("recognizer: {0}")]
    Recognizer(#[from] RecognizerError),
}

/// Detect every face in an interleaved RGB buffer and embed each one.
///
/// An empty result is a valid outcome. Implementations must not hold
/// state across calls that changes results for identical input.
pub trait FaceEncoder {
    fn encode(
        &mut self,
        rgb: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, EncoderError>;
}

/// SCRFD detector + ArcFace recognizer as one owned resource.
pub struct FacePipeline {
    detector: FaceDetector,
    recognizer: FaceRecognizer,
}

impl FacePipeline {
    pub fn new(detector: FaceDetector, recognizer: FaceRecognizer) -> Self {
        Self { detector, recognizer }
    }

    /// Load both models from a directory using the insightface file names.
    pub fn load(model_dir: &Path) -> Result<Self, EncoderError> {
        let det_path = model_dir.join("det_10g.onnx");
        let rec_path = model_dir.join("w600k_r50.onnx");

        let detector = FaceDetector::load(&det_path.to_string_lossy())?;
        let recognizer = FaceRecognizer::load(&rec_path.to_string_lossy())?;
        Ok(Self::new(detector, recognizer))
    }
}

impl FaceEncoder for FacePipeline {
    fn encode(
        &mut self,
        rgb: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, EncoderError> {
        let faces = self.detector.detect(rgb, width, height)?;
        let mut detections = Vec::with_capacity(faces.len());

        for face in faces {
            // A face without landmarks cannot be aligned; skip it rather
            // than failing the whole frame.
            match self.recognizer.extract(rgb, width, height, &face) {
                Ok(embedding) => detections.push(Detection { face, embedding }),
                Err(RecognizerError::NoLandmarks) => {
                    tracing::debug!(
                        confidence = face.confidence,
                        "skipping detection without landmarks"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(detections)
    }
}
