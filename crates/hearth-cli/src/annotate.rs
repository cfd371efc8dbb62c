//! Box drawing on recognized images.
//!
//! Thin render sink for the matcher output: green boxes for identified
//! faces, red for unknown. Text labels go to the console, not the image.

use hearth_core::Observation;
use image::{Rgb, RgbImage};

const IDENTIFIED: Rgb<u8> = Rgb([0, 255, 0]);
const UNKNOWN: Rgb<u8> = Rgb([255, 0, 0]);
const STROKE: u32 = 2;

/// Draw one box per observation onto the image, in place.
pub fn draw_observations(img: &mut RgbImage, observations: &[Observation]) {
    for obs in observations {
        let color = if obs.outcome.is_unknown() { UNKNOWN } else { IDENTIFIED };
        draw_box(
            img,
            obs.face.x,
            obs.face.y,
            obs.face.width,
            obs.face.height,
            color,
        );
    }
}

/// Draw a rectangle outline, clamped to image bounds.
fn draw_box(img: &mut RgbImage, x: f32, y: f32, w: f32, h: f32, color: Rgb<u8>) {
    let (iw, ih) = (img.width(), img.height());
    if iw == 0 || ih == 0 || w <= 0.0 || h <= 0.0 {
        return;
    }

    let x0 = (x.max(0.0) as u32).min(iw - 1);
    let y0 = (y.max(0.0) as u32).min(ih - 1);
    let x1 = ((x + w).max(0.0) as u32).min(iw - 1);
    let y1 = ((y + h).max(0.0) as u32).min(ih - 1);

    for t in 0..STROKE {
        // Horizontal edges
        for px in x0..=x1 {
            if y0 + t < ih {
                img.put_pixel(px, y0 + t, color);
            }
            if y1 >= t {
                img.put_pixel(px, y1 - t, color);
            }
        }
        // Vertical edges
        for py in y0..=y1 {
            if x0 + t < iw {
                img.put_pixel(x0 + t, py, color);
            }
            if x1 >= t {
                img.put_pixel(x1 - t, py, color);
            }
        }
    }
}
