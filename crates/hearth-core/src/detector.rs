//! SCRFD face detector via ONNX Runtime.
//!
//! Runs the anchor-free SCRFD model over interleaved RGB buffers with
//! letterbox preprocessing, 3-stride decoding, and NMS.

use crate::types::BoundingBox;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

const DET_INPUT_SIZE: usize = 640;
const DET_MEAN: f32 = 127.5;
const DET_STD: f32 = 128.0;
const DET_CONFIDENCE_THRESHOLD: f32 = 0.5;
const DET_NMS_THRESHOLD: f32 = 0.4;
const DET_STRIDES: [usize; 3] = [8, 16, 32];
const DET_ANCHORS_PER_CELL: usize = 2;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("model file not found: {0} — download from insightface and place in the model dir")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("RGB buffer too short: expected {expected} bytes, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Letterbox geometry, used to map detections back to frame coordinates.
struct Letterbox {
    scale: f32,
    pad_x: f32,
    pad_y: f32,
}

impl Letterbox {
    /// Map a point from letterboxed input space to original frame space.
    fn to_frame(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// Output tensor indices for one stride: (score_idx, bbox_idx, kps_idx).
type StrideOutputs = (usize, usize, usize);

/// SCRFD-based face detector over RGB frames.
pub struct FaceDetector {
    session: Session,
    input_size: usize,
    /// Per-stride output indices [(score, bbox, kps)] for strides [8, 16, 32],
    /// discovered by tensor name at load time with a positional fallback.
    stride_outputs: [StrideOutputs; 3],
}

impl FaceDetector {
    /// Load the SCRFD ONNX model from the given path.
    pub fn load(model_path: &str) -> Result<Self, DetectorError> {
        if !Path::new(model_path).exists() {
            return Err(DetectorError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        let output_names: Vec<String> =
            session.outputs().iter().map(|o| o.name().to_string()).collect();

        tracing::info!(
            path = model_path,
            outputs = ?output_names,
            "loaded SCRFD model"
        );

        if output_names.len() < 9 {
            return Err(DetectorError::InferenceFailed(format!(
                "SCRFD model requires 9 outputs (3 strides × score/bbox/kps), got {}",
                output_names.len()
            )));
        }

        let stride_outputs = discover_output_indices(&output_names);
        tracing::debug!(?stride_outputs, "SCRFD output tensor mapping");

        Ok(Self {
            session,
            input_size: DET_INPUT_SIZE,
            stride_outputs,
        })
    }

    /// Detect faces in an interleaved RGB frame.
    ///
    /// Returns boxes in original-frame coordinates, sorted by confidence
    /// descending. An empty result is a valid outcome, not an error.
    pub fn detect(
        &mut self,
        rgb: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<BoundingBox>, DetectorError> {
        let expected = width as usize * height as usize * 3;
        if rgb.len() < expected {
            return Err(DetectorError::BufferTooShort { expected, actual: rgb.len() });
        }

        let (input, letterbox) = self.preprocess(rgb, width as usize, height as usize);

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let mut detections = Vec::new();

        for (stride_pos, &stride) in DET_STRIDES.iter().enumerate() {
            let (score_idx, bbox_idx, kps_idx) = self.stride_outputs[stride_pos];

            let (_, scores) = outputs[score_idx]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectorError::InferenceFailed(format!("scores stride {stride}: {e}")))?;
            let (_, bboxes) = outputs[bbox_idx]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectorError::InferenceFailed(format!("bboxes stride {stride}: {e}")))?;
            let (_, kps) = outputs[kps_idx]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectorError::InferenceFailed(format!("kps stride {stride}: {e}")))?;

            decode_stride(
                scores,
                bboxes,
                kps,
                stride,
                self.input_size,
                &letterbox,
                DET_CONFIDENCE_THRESHOLD,
                &mut detections,
            );
        }

        let mut result = nms(detections, DET_NMS_THRESHOLD);
        result.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(result)
    }

    /// Letterbox-resize an RGB frame into a NCHW float tensor.
    ///
    /// Bilinear resize per channel; padding uses the model mean so padded
    /// pixels normalize to 0.
    fn preprocess(&self, rgb: &[u8], width: usize, height: usize) -> (Array4<f32>, Letterbox) {
        let size = self.input_size;
        let scale = (size as f32 / width as f32).min(size as f32 / height as f32);

        let new_w = (width as f32 * scale).round() as usize;
        let new_h = (height as f32 * scale).round() as usize;
        let pad_x = (size - new_w) as f32 / 2.0;
        let pad_y = (size - new_h) as f32 / 2.0;
        let x_off = pad_x.floor() as usize;
        let y_off = pad_y.floor() as usize;

        let resized = resize_rgb_bilinear(rgb, width, height, new_w, new_h);

        let mut tensor = Array4::<f32>::from_elem((1, 3, size, size), 0.0);

        for y in 0..size {
            for x in 0..size {
                let inside =
                    y >= y_off && y < y_off + new_h && x >= x_off && x < x_off + new_w;
                for c in 0..3 {
                    let pixel = if inside {
                        resized[((y - y_off) * new_w + (x - x_off)) * 3 + c] as f32
                    } else {
                        DET_MEAN
                    };
                    tensor[[0, c, y, x]] = (pixel - DET_MEAN) / DET_STD;
                }
            }
        }

        (tensor, Letterbox { scale, pad_x, pad_y })
    }
}

/// Bilinear resize of an interleaved RGB buffer.
pub(crate) fn resize_rgb_bilinear(
    rgb: &[u8],
    src_w: usize,
    src_h: usize,
    dst_w: usize,
    dst_h: usize,
) -> Vec<u8> {
    let mut out = vec![0u8; dst_w * dst_h * 3];
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return out;
    }

    let sx = src_w as f32 / dst_w as f32;
    let sy = src_h as f32 / dst_h as f32;

    for y in 0..dst_h {
        let src_y = (y as f32 + 0.5) * sy - 0.5;
        let y0 = (src_y.floor() as i32).clamp(0, src_h as i32 - 1) as usize;
        let y1 = (y0 + 1).min(src_h - 1);
        let fy = (src_y - src_y.floor()).clamp(0.0, 1.0);

        for x in 0..dst_w {
            let src_x = (x as f32 + 0.5) * sx - 0.5;
            let x0 = (src_x.floor() as i32).clamp(0, src_w as i32 - 1) as usize;
            let x1 = (x0 + 1).min(src_w - 1);
            let fx = (src_x - src_x.floor()).clamp(0.0, 1.0);

            for c in 0..3 {
                let tl = rgb[(y0 * src_w + x0) * 3 + c] as f32;
                let tr = rgb[(y0 * src_w + x1) * 3 + c] as f32;
                let bl = rgb[(y1 * src_w + x0) * 3 + c] as f32;
                let br = rgb[(y1 * src_w + x1) * 3 + c] as f32;

                let val = tl * (1.0 - fx) * (1.0 - fy)
                    + tr * fx * (1.0 - fy)
                    + bl * (1.0 - fx) * fy
                    + br * fx * fy;

                out[(y * dst_w + x) * 3 + c] = val.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    out
}

/// Discover output tensor ordering by name.
///
/// SCRFD exports either name tensors per stride ("score_8", "bbox_16",
/// "kps_32", ...) or use opaque numeric names. Falls back to the standard
/// positional layout [0-2]=scores, [3-5]=bboxes, [6-8]=kps.
fn discover_output_indices(names: &[String]) -> [StrideOutputs; 3] {
    let find = |prefix: &str, stride: usize| -> Option<usize> {
        let target = format!("{prefix}_{stride}");
        names.iter().position(|n| n == &target)
    };

    let named = DET_STRIDES.iter().all(|&stride| {
        find("score", stride).is_some()
            && find("bbox", stride).is_some()
            && find("kps", stride).is_some()
    });

    if named {
        tracing::debug!("SCRFD: using name-based output tensor mapping");
        std::array::from_fn(|i| {
            let stride = DET_STRIDES[i];
            (
                find("score", stride).unwrap(),
                find("bbox", stride).unwrap(),
                find("kps", stride).unwrap(),
            )
        })
    } else {
        tracing::debug!(?names, "SCRFD: unrecognized output names, using positional mapping");
        [(0, 3, 6), (1, 4, 7), (2, 5, 8)]
    }
}

/// Decode detections for a single stride level into `out`.
#[allow(clippy::too_many_arguments)]
fn decode_stride(
    scores: &[f32],
    bboxes: &[f32],
    kps: &[f32],
    stride: usize,
    input_size: usize,
    letterbox: &Letterbox,
    threshold: f32,
    out: &mut Vec<BoundingBox>,
) {
    let grid = input_size / stride;
    let num_anchors = grid * grid * DET_ANCHORS_PER_CELL;

    for idx in 0..num_anchors {
        let score = scores.get(idx).copied().unwrap_or(0.0);
        if score <= threshold {
            continue;
        }

        let cell = idx / DET_ANCHORS_PER_CELL;
        let anchor_cx = (cell % grid) as f32 * stride as f32;
        let anchor_cy = (cell / grid) as f32 * stride as f32;

        let off = idx * 4;
        if off + 3 >= bboxes.len() {
            continue;
        }

        // Offsets are in stride units around the anchor center.
        let (x1, y1) = letterbox.to_frame(
            anchor_cx - bboxes[off] * stride as f32,
            anchor_cy - bboxes[off + 1] * stride as f32,
        );
        let (x2, y2) = letterbox.to_frame(
            anchor_cx + bboxes[off + 2] * stride as f32,
            anchor_cy + bboxes[off + 3] * stride as f32,
        );

        let kps_off = idx * 10;
        let landmarks = if kps_off + 9 < kps.len() {
            let mut lms = [(0.0f32, 0.0f32); 5];
            for (i, lm) in lms.iter_mut().enumerate() {
                *lm = letterbox.to_frame(
                    anchor_cx + kps[kps_off + i * 2] * stride as f32,
                    anchor_cy + kps[kps_off + i * 2 + 1] * stride as f32,
                );
            }
            Some(lms)
        } else {
            None
        };

        out.push(BoundingBox {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
            confidence: score,
            landmarks,
        });
    }
}

/// Non-Maximum Suppression: drop detections overlapping a stronger one.
fn nms(mut detections: Vec<BoundingBox>, iou_threshold: f32) -> Vec<BoundingBox> {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; detections.len()];

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(detections[i].clone());

        for j in (i + 1)..detections.len() {
            if !suppressed[j] && iou(&detections[i], &detections[j]) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    keep
}

/// Intersection-over-Union of two boxes.
fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = (a.x + a.width).min(b.x + b.width);
    let y2 = (a.y + a.height).min(b.y + b.height);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union = a.width * a.height + b.width * b.height - inter;

    if union > 0.0 { inter / union } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bbox(x: f32, y: f32, w: f32, h: f32, conf: f32) -> BoundingBox {
        BoundingBox { x, y, width: w, height: h, confidence: conf, landmarks: None }
    }

    #[test]
    fn iou_identical() {
        let a = make_bbox(0.0, 0.0, 100.0, 100.0, 1.0);
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_disjoint() {
        let a = make_bbox(0.0, 0.0, 10.0, 10.0, 1.0);
        let b = make_bbox(20.0, 20.0, 10.0, 10.0, 1.0);
        assert!(iou(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn iou_half_shifted() {
        let a = make_bbox(0.0, 0.0, 10.0, 10.0, 1.0);
        let b = make_bbox(5.0, 0.0, 10.0, 10.0, 1.0);
        // Overlap 5x10 = 50, union 150.
        assert!((iou(&a, &b) - 50.0 / 150.0).abs() < 1e-6);
    }

    #[test]
    fn nms_suppresses_overlap_keeps_disjoint() {
        let detections = vec![
            make_bbox(0.0, 0.0, 100.0, 100.0, 0.9),
            make_bbox(5.0, 5.0, 100.0, 100.0, 0.8),
            make_bbox(200.0, 200.0, 50.0, 50.0, 0.7),
        ];
        let result = nms(detections, 0.4);
        assert_eq!(result.len(), 2);
        assert!((result[0].confidence - 0.9).abs() < 1e-6);
        assert!((result[1].confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn nms_empty() {
        assert!(nms(vec![], 0.4).is_empty());
    }

    #[test]
    fn letterbox_roundtrip() {
        let scale = (640.0f32 / 320.0).min(640.0 / 240.0);
        let pad_x = (640.0 - (320.0 * scale).round()) / 2.0;
        let pad_y = (640.0 - (240.0 * scale).round()) / 2.0;
        let lb = Letterbox { scale, pad_x, pad_y };

        let (fx, fy) = lb.to_frame(100.0 * scale + pad_x, 50.0 * scale + pad_y);
        assert!((fx - 100.0).abs() < 0.1, "x: {fx}");
        assert!((fy - 50.0).abs() < 0.1, "y: {fy}");
    }

    #[test]
    fn discover_named_outputs() {
        let names: Vec<String> = [
            "score_8", "score_16", "score_32",
            "bbox_8", "bbox_16", "bbox_32",
            "kps_8", "kps_16", "kps_32",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let indices = discover_output_indices(&names);
        assert_eq!(indices[0], (0, 3, 6));
        assert_eq!(indices[1], (1, 4, 7));
        assert_eq!(indices[2], (2, 5, 8));
    }

    #[test]
    fn discover_shuffled_named_outputs() {
        let names: Vec<String> = [
            "bbox_8", "kps_8", "score_8",
            "bbox_16", "kps_16", "score_16",
            "bbox_32", "kps_32", "score_32",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let indices = discover_output_indices(&names);
        assert_eq!(indices[0], (2, 0, 1));
        assert_eq!(indices[1], (5, 3, 4));
        assert_eq!(indices[2], (8, 6, 7));
    }

    #[test]
    fn discover_positional_fallback() {
        let names: Vec<String> = (0..9).map(|i: usize| i.to_string()).collect();
        assert_eq!(
            discover_output_indices(&names),
            [(0, 3, 6), (1, 4, 7), (2, 5, 8)]
        );
    }

    #[test]
    fn resize_uniform_rgb_stays_uniform() {
        let rgb = vec![77u8; 32 * 32 * 3];
        let out = resize_rgb_bilinear(&rgb, 32, 32, 64, 64);
        assert_eq!(out.len(), 64 * 64 * 3);
        assert!(out.iter().all(|&p| p == 77));
    }

    #[test]
    fn resize_preserves_channel_order() {
        // 1x1 red pixel scaled up stays red.
        let rgb = vec![200u8, 10, 30];
        let out = resize_rgb_bilinear(&rgb, 1, 1, 4, 4);
        for px in out.chunks(3) {
            assert_eq!(px, [200, 10, 30]);
        }
    }
}
