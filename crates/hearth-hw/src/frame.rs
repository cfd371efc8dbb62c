//! Frame type and pixel format conversion — YUYV and MJPG to RGB.

use thiserror::Error;

/// A captured RGB camera frame.
#[derive(Clone)]
pub struct Frame {
    /// Interleaved RGB pixel data (width * height * 3 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid YUYV length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("MJPG decode failed: {0}")]
    JpegDecode(String),
}

/// Convert packed YUYV (4:2:2) to interleaved RGB using BT.601.
///
/// YUYV packs two pixels per 4 bytes: [Y0, U, Y1, V] — the chroma pair is
/// shared by both pixels.
pub fn yuyv_to_rgb(yuyv: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let expected = (width * height * 2) as usize;
    if yuyv.len() < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: yuyv.len(),
        });
    }

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);

    for quad in yuyv[..expected].chunks_exact(4) {
        let (y0, u, y1, v) = (quad[0], quad[1], quad[2], quad[3]);
        push_yuv_pixel(&mut rgb, y0, u, v);
        push_yuv_pixel(&mut rgb, y1, u, v);
    }

    Ok(rgb)
}

fn push_yuv_pixel(rgb: &mut Vec<u8>, y: u8, u: u8, v: u8) {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = y + 1.402 * v;
    let g = y - 0.344136 * u - 0.714136 * v;
    let b = y + 1.772 * u;

    rgb.push(r.round().clamp(0.0, 255.0) as u8);
    rgb.push(g.round().clamp(0.0, 255.0) as u8);
    rgb.push(b.round().clamp(0.0, 255.0) as u8);
}

/// Decode an MJPG buffer (one JPEG image per frame) to interleaved RGB.
pub fn mjpg_to_rgb(jpeg: &[u8]) -> Result<(Vec<u8>, u32, u32), FrameError> {
    let img = image::load_from_memory_with_format(jpeg, image::ImageFormat::Jpeg)
        .map_err(|e| FrameError::JpegDecode(e.to_string()))?;
    let rgb = img.to_rgb8();
    let (w, h) = (rgb.width(), rgb.height());
    Ok((rgb.into_raw(), w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yuyv_neutral_chroma_is_gray() {
        // Y=100 and Y=200 with neutral chroma (U=V=128) stay achromatic.
        let yuyv = vec![100, 128, 200, 128];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1).unwrap();
        assert_eq!(rgb, vec![100, 100, 100, 200, 200, 200]);
    }

    #[test]
    fn yuyv_full_red_chroma() {
        // V well above neutral pushes red up and green down.
        let yuyv = vec![128, 128, 128, 255];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1).unwrap();
        assert!(rgb[0] > 200, "red: {}", rgb[0]);
        assert!(rgb[1] < 64, "green: {}", rgb[1]);
        assert_eq!(rgb[2], 128, "blue unaffected by V");
    }

    #[test]
    fn yuyv_output_length() {
        let yuyv = vec![128u8; 4 * 2 * 2]; // 4x2 pixels
        let rgb = yuyv_to_rgb(&yuyv, 4, 2).unwrap();
        assert_eq!(rgb.len(), 4 * 2 * 3);
    }

    #[test]
    fn yuyv_too_short_is_error() {
        let yuyv = vec![100, 128];
        assert!(yuyv_to_rgb(&yuyv, 2, 1).is_err());
    }

    #[test]
    fn mjpg_garbage_is_error() {
        assert!(mjpg_to_rgb(b"definitely not jpeg").is_err());
    }
}
