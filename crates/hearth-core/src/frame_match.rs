//! Per-frame matching: detect faces in a frame and classify each against
//! the gallery.

use crate::detector::resize_rgb_bilinear;
use crate::encoder::{EncoderError, FaceEncoder};
use crate::matcher::{Match, NearestMatcher};
use crate::types::{BoundingBox, Gallery};

/// One face observed in a frame, with its classification.
#[derive(Debug, Clone)]
pub struct Observation {
    /// Bounding box in original-frame coordinates.
    pub face: BoundingBox,
    pub outcome: Match,
}

/// Detect and classify every face in an interleaved RGB frame.
///
/// `downscale` > 1 shrinks the frame before detection as a performance
/// optimization only: reported boxes are always mapped back to
/// original-frame coordinates. The gallery is read-only; an empty result
/// is a valid outcome.
pub fn match_frame(
    encoder: &mut dyn FaceEncoder,
    rgb: &[u8],
    width: u32,
    height: u32,
    gallery: &Gallery,
    matcher: &NearestMatcher,
    downscale: u32,
) -> Result<Vec<Observation>, EncoderError> {
    let downscale = downscale.max(1);

    let detections = if downscale > 1 && width >= downscale && height >= downscale {
        let small_w = width / downscale;
        let small_h = height / downscale;
        let small = resize_rgb_bilinear(
            rgb,
            width as usize,
            height as usize,
            small_w as usize,
            small_h as usize,
        );
        // Integer division can truncate width and height by different
        // amounts, so each axis gets its own rescale factor.
        let factor_x = width as f32 / small_w as f32;
        let factor_y = height as f32 / small_h as f32;

        encoder
            .encode(&small, small_w, small_h)?
            .into_iter()
            .map(|mut d| {
                d.face = d.face.scaled(factor_x, factor_y);
                d
            })
            .collect()
    } else {
        encoder.encode(rgb, width, height)?
    };

    Ok(detections
        .into_iter()
        .map(|d| Observation {
            outcome: matcher.classify(&d.embedding, gallery),
            face: d.face,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Detection, Embedding, GalleryEntry};

    fn embed(values: Vec<f32>) -> Embedding {
        Embedding { values, model_version: None }
    }

    /// Stub that reports one face per call: a fixed box at (10, 10) in the
    /// coordinates of whatever buffer it was handed, with the top-left
    /// pixel as the embedding.
    struct OneFaceEncoder {
        seen_widths: Vec<u32>,
    }

    impl FaceEncoder for OneFaceEncoder {
        fn encode(
            &mut self,
            rgb: &[u8],
            width: u32,
            _height: u32,
        ) -> Result<Vec<Detection>, EncoderError> {
            self.seen_widths.push(width);
            Ok(vec![Detection {
                face: BoundingBox {
                    x: 10.0,
                    y: 10.0,
                    width: 20.0,
                    height: 20.0,
                    confidence: 0.95,
                    landmarks: None,
                },
                embedding: embed(vec![
                    rgb[0] as f32 / 255.0,
                    rgb[1] as f32 / 255.0,
                    rgb[2] as f32 / 255.0,
                ]),
            }])
        }
    }

    struct NoFaceEncoder;

    impl FaceEncoder for NoFaceEncoder {
        fn encode(
            &mut self,
            _rgb: &[u8],
            _width: u32,
            _height: u32,
        ) -> Result<Vec<Detection>, EncoderError> {
            Ok(vec![])
        }
    }

    fn alice_bob_gallery() -> Gallery {
        [
            GalleryEntry {
                label: "alice".into(),
                role: "Residents".into(),
                embedding: embed(vec![1.0, 0.0, 0.0]),
            },
            GalleryEntry {
                label: "bob".into(),
                role: "Workers".into(),
                embedding: embed(vec![0.0, 0.0, 1.0]),
            },
        ]
        .into_iter()
        .collect()
    }

    fn solid_frame(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        color
            .iter()
            .copied()
            .cycle()
            .take((width * height * 3) as usize)
            .collect()
    }

    #[test]
    fn downscaled_boxes_come_back_in_frame_coordinates() {
        let frame = solid_frame(160, 120, [255, 0, 0]);
        let mut encoder = OneFaceEncoder { seen_widths: vec![] };

        let obs = match_frame(
            &mut encoder,
            &frame,
            160,
            120,
            &alice_bob_gallery(),
            &NearestMatcher::new(0.5),
            4,
        )
        .unwrap();

        // Detection ran on the quarter-size frame...
        assert_eq!(encoder.seen_widths, vec![40]);
        // ...but the box is reported at original scale.
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].face.x, 40.0);
        assert_eq!(obs[0].face.width, 80.0);
    }

    #[test]
    fn uneven_truncation_rescales_each_axis_independently() {
        // 161/4 = 40 and 121/4 = 30, so the x factor is 161/40 = 4.025
        // and the y factor 121/30 ≈ 4.0333.
        let frame = solid_frame(161, 121, [255, 0, 0]);
        let mut encoder = OneFaceEncoder { seen_widths: vec![] };

        let obs = match_frame(
            &mut encoder,
            &frame,
            161,
            121,
            &alice_bob_gallery(),
            &NearestMatcher::new(0.5),
            4,
        )
        .unwrap();

        assert_eq!(encoder.seen_widths, vec![40]);
        assert!((obs[0].face.x - 10.0 * 161.0 / 40.0).abs() < 1e-4);
        assert!((obs[0].face.y - 10.0 * 121.0 / 30.0).abs() < 1e-4);
        assert!((obs[0].face.height - 20.0 * 121.0 / 30.0).abs() < 1e-4);
    }

    #[test]
    fn downscale_one_runs_at_full_resolution() {
        let frame = solid_frame(160, 120, [255, 0, 0]);
        let mut encoder = OneFaceEncoder { seen_widths: vec![] };

        let obs = match_frame(
            &mut encoder,
            &frame,
            160,
            120,
            &alice_bob_gallery(),
            &NearestMatcher::new(0.5),
            1,
        )
        .unwrap();

        assert_eq!(encoder.seen_widths, vec![160]);
        assert_eq!(obs[0].face.x, 10.0);
    }

    #[test]
    fn red_frame_matches_alice() {
        let frame = solid_frame(160, 120, [250, 0, 0]);
        let mut encoder = OneFaceEncoder { seen_widths: vec![] };

        let obs = match_frame(
            &mut encoder,
            &frame,
            160,
            120,
            &alice_bob_gallery(),
            &NearestMatcher::new(0.5),
            4,
        )
        .unwrap();

        match &obs[0].outcome {
            Match::Identified { label, role, .. } => {
                assert_eq!(label, "alice");
                assert_eq!(role, "Residents");
            }
            Match::Unknown => panic!("near-red frame must match alice"),
        }
    }

    #[test]
    fn distant_embedding_is_unknown() {
        // Green is far from both gallery colors.
        let frame = solid_frame(160, 120, [0, 255, 0]);
        let mut encoder = OneFaceEncoder { seen_widths: vec![] };

        let obs = match_frame(
            &mut encoder,
            &frame,
            160,
            120,
            &alice_bob_gallery(),
            &NearestMatcher::new(0.5),
            1,
        )
        .unwrap();

        assert!(obs[0].outcome.is_unknown());
        assert_eq!(obs[0].outcome.display_label(), "Unknown");
        assert_eq!(obs[0].outcome.display_role(), "-");
    }

    #[test]
    fn empty_detection_list_is_valid() {
        let frame = solid_frame(160, 120, [10, 10, 10]);
        let obs = match_frame(
            &mut NoFaceEncoder,
            &frame,
            160,
            120,
            &alice_bob_gallery(),
            &NearestMatcher::new(0.5),
            1,
        )
        .unwrap();
        assert!(obs.is_empty());
    }

    #[test]
    fn every_face_is_unknown_against_empty_gallery() {
        let frame = solid_frame(160, 120, [250, 0, 0]);
        let mut encoder = OneFaceEncoder { seen_widths: vec![] };

        let obs = match_frame(
            &mut encoder,
            &frame,
            160,
            120,
            &Gallery::new(),
            &NearestMatcher::new(f32::MAX),
            1,
        )
        .unwrap();

        assert!(obs[0].outcome.is_unknown());
    }
}
