use serde::{Deserialize, Serialize};

/// Bounding box for a detected face, with optional facial landmarks.
///
/// Coordinates are in pixels of the frame the detection ran on; use
/// [`scaled`](Self::scaled) to map boxes from a downscaled frame back to
/// the original.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    /// Five-point facial landmarks: [left_eye, right_eye, nose, left_mouth, right_mouth].
    pub landmarks: Option<[(f32, f32); 5]>,
}

impl BoundingBox {
    /// Return a copy with x-coordinates multiplied by `sx` and
    /// y-coordinates by `sy`, landmarks included. Integer downscaling can
    /// truncate each axis differently, so the factors are per-axis.
    pub fn scaled(&self, sx: f32, sy: f32) -> BoundingBox {
        BoundingBox {
            x: self.x * sx,
            y: self.y * sy,
            width: self.width * sx,
            height: self.height * sy,
            confidence: self.confidence,
            landmarks: self
                .landmarks
                .map(|lms| lms.map(|(lx, ly)| (lx * sx, ly * sy))),
        }
    }
}

/// Face embedding vector (512-dimensional for ArcFace w600k_r50).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    pub values: Vec<f32>,
    /// Model version that produced this embedding (e.g., "w600k_r50").
    pub model_version: Option<String>,
}

impl Embedding {
    /// Euclidean distance. For L2-normalized vectors this is monotonic
    /// with cosine distance, so nearest-by-Euclidean = nearest-by-cosine.
    pub fn distance(&self, other: &Embedding) -> f32 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

/// One reference photo's worth of identity: who it is, which household
/// category the photo was filed under, and the face embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryEntry {
    /// Identity label (reference photo file stem, e.g., "alice").
    pub label: String,
    /// Category label (parent directory name, e.g., "Residents").
    pub role: String,
    pub embedding: Embedding,
}

/// The in-memory reference set of labeled embeddings.
///
/// Entry order is construction order and is load-bearing: the matcher
/// resolves distance ties in favor of the earliest entry.
#[derive(Debug, Clone, Default)]
pub struct Gallery {
    entries: Vec<GalleryEntry>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: GalleryEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<GalleryEntry> for Gallery {
    fn from_iter<T: IntoIterator<Item = GalleryEntry>>(iter: T) -> Self {
        Gallery {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A transient per-frame record: one detected face and its embedding.
#[derive(Debug, Clone)]
pub struct Detection {
    pub face: BoundingBox,
    pub embedding: Embedding,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embed(values: Vec<f32>) -> Embedding {
        Embedding { values, model_version: None }
    }

    #[test]
    fn distance_identical_is_zero() {
        let a = embed(vec![0.3, 0.4, 0.5]);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn distance_unit_axes() {
        let a = embed(vec![1.0, 0.0]);
        let b = embed(vec![0.0, 1.0]);
        assert!((a.distance(&b) - 2.0f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn bbox_scaled_maps_each_axis_independently() {
        let b = BoundingBox {
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 40.0,
            confidence: 0.9,
            landmarks: Some([(1.0, 2.0); 5]),
        };
        let s = b.scaled(4.0, 2.0);
        assert_eq!(s.x, 40.0);
        assert_eq!(s.y, 40.0);
        assert_eq!(s.width, 120.0);
        assert_eq!(s.height, 80.0);
        assert_eq!(s.confidence, 0.9);
        assert_eq!(s.landmarks.unwrap()[0], (4.0, 4.0));
    }

    #[test]
    fn gallery_preserves_insertion_order() {
        let mut g = Gallery::new();
        g.push(GalleryEntry {
            label: "alice".into(),
            role: "Residents".into(),
            embedding: embed(vec![1.0]),
        });
        g.push(GalleryEntry {
            label: "bob".into(),
            role: "Workers".into(),
            embedding: embed(vec![2.0]),
        });
        let labels: Vec<&str> = g.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["alice", "bob"]);
    }
}
