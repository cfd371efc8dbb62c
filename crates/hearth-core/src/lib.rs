//! hearth-core — Face detection, recognition, and gallery matching.
//!
//! SCRFD for detection and ArcFace for recognition, both via ONNX Runtime
//! on CPU. The reference gallery is built from a directory tree of labeled
//! photos and matched by nearest embedding distance.

pub mod alignment;
pub mod detector;
pub mod encoder;
pub mod frame_match;
pub mod gallery;
pub mod matcher;
pub mod recognizer;
pub mod types;

pub use detector::FaceDetector;
pub use encoder::{EncoderError, FaceEncoder, FacePipeline};
pub use frame_match::{match_frame, Observation};
pub use gallery::{build_gallery, GalleryError, GalleryReport, SkippedPhoto};
pub use matcher::{Match, NearestMatcher};
pub use recognizer::{FaceRecognizer, W600K_R50_DISTANCE_THRESHOLD};
pub use types::{BoundingBox, Detection, Embedding, Gallery, GalleryEntry};
