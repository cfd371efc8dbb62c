//! Nearest-neighbor classification of a probe embedding against the gallery.

use crate::types::{Embedding, Gallery};
use serde::{Deserialize, Serialize};

/// Outcome of classifying one detection.
///
/// `Unknown` is a real variant, not a sentinel label mixed in with
/// identities; rendering layers map it to `"Unknown"` / `"-"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Match {
    Identified {
        label: String,
        role: String,
        /// Euclidean distance to the matched gallery entry.
        distance: f32,
    },
    Unknown,
}

impl Match {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Match::Unknown)
    }

    /// Label as the reference scripts rendered it.
    pub fn display_label(&self) -> &str {
        match self {
            Match::Identified { label, .. } => label,
            Match::Unknown => "Unknown",
        }
    }

    /// Role as the reference scripts rendered it.
    pub fn display_role(&self) -> &str {
        match self {
            Match::Identified { role, .. } => role,
            Match::Unknown => "-",
        }
    }
}

/// Nearest-neighbor matcher with an explicit distance threshold.
///
/// The threshold is specific to the embedding model the gallery was built
/// with; there is deliberately no default. Distances at or below the
/// threshold are accepted, anything beyond is `Unknown`.
#[derive(Debug, Clone, Copy)]
pub struct NearestMatcher {
    threshold: f32,
}

impl NearestMatcher {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Classify `probe` against every gallery entry.
    ///
    /// Scans the whole gallery; only a strictly smaller distance replaces
    /// the current best, so equal-distance ties keep the entry appended
    /// first during construction. An empty gallery is `Unknown`.
    pub fn classify(&self, probe: &Embedding, gallery: &Gallery) -> Match {
        let mut best: Option<(usize, f32)> = None;

        for (i, entry) in gallery.entries().iter().enumerate() {
            let dist = probe.distance(&entry.embedding);
            let better = match best {
                None => true,
                Some((_, best_dist)) => dist < best_dist,
            };
            if better {
                best = Some((i, dist));
            }
        }

        match best {
            Some((idx, dist)) if dist <= self.threshold => {
                let entry = &gallery.entries()[idx];
                Match::Identified {
                    label: entry.label.clone(),
                    role: entry.role.clone(),
                    distance: dist,
                }
            }
            _ => Match::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GalleryEntry;

    fn embed(values: Vec<f32>) -> Embedding {
        Embedding { values, model_version: None }
    }

    fn entry(label: &str, role: &str, values: Vec<f32>) -> GalleryEntry {
        GalleryEntry {
            label: label.into(),
            role: role.into(),
            embedding: embed(values),
        }
    }

    #[test]
    fn empty_gallery_is_unknown() {
        let matcher = NearestMatcher::new(10.0);
        let probe = embed(vec![1.0, 0.0]);
        let result = matcher.classify(&probe, &Gallery::new());
        assert_eq!(result, Match::Unknown);
        assert_eq!(result.display_label(), "Unknown");
        assert_eq!(result.display_role(), "-");
    }

    #[test]
    fn exact_embedding_matches_at_zero_distance() {
        let gallery: Gallery = [entry("alice", "Residents", vec![0.6, 0.8])]
            .into_iter()
            .collect();
        // Distance 0 must match even with threshold 0.
        let result = NearestMatcher::new(0.0).classify(&embed(vec![0.6, 0.8]), &gallery);
        match result {
            Match::Identified { label, role, distance } => {
                assert_eq!(label, "alice");
                assert_eq!(role, "Residents");
                assert_eq!(distance, 0.0);
            }
            Match::Unknown => panic!("exact probe must match"),
        }
    }

    #[test]
    fn beyond_threshold_is_unknown() {
        let gallery: Gallery = [entry("alice", "Residents", vec![1.0, 0.0])]
            .into_iter()
            .collect();
        // Distance sqrt(2) ≈ 1.414, strictly greater than the threshold.
        let result = NearestMatcher::new(1.0).classify(&embed(vec![0.0, 1.0]), &gallery);
        assert_eq!(result, Match::Unknown);
    }

    #[test]
    fn tie_keeps_first_constructed_entry() {
        // Both entries are equidistant from the probe.
        let gallery: Gallery = [
            entry("alice", "Residents", vec![1.0, 0.0]),
            entry("bob", "Workers", vec![-1.0, 0.0]),
        ]
        .into_iter()
        .collect();
        let result = NearestMatcher::new(5.0).classify(&embed(vec![0.0, 0.0]), &gallery);
        match result {
            Match::Identified { label, .. } => assert_eq!(label, "alice"),
            Match::Unknown => panic!("within threshold"),
        }
    }

    #[test]
    fn nearest_entry_wins_regardless_of_position() {
        let gallery: Gallery = [
            entry("decoy", "Workers", vec![5.0, 0.0]),
            entry("alice", "Residents", vec![1.0, 0.1]),
        ]
        .into_iter()
        .collect();
        let result = NearestMatcher::new(2.0).classify(&embed(vec![1.0, 0.0]), &gallery);
        match result {
            Match::Identified { label, role, .. } => {
                assert_eq!(label, "alice");
                assert_eq!(role, "Residents");
            }
            Match::Unknown => panic!("alice is within threshold"),
        }
    }

    #[test]
    fn classify_does_not_mutate_gallery() {
        let gallery: Gallery = [entry("alice", "Residents", vec![1.0, 0.0])]
            .into_iter()
            .collect();
        let before = gallery.entries().to_vec();
        let _ = NearestMatcher::new(0.5).classify(&embed(vec![0.9, 0.1]), &gallery);
        assert_eq!(gallery.len(), before.len());
        assert_eq!(gallery.entries()[0].label, before[0].label);
    }
}
