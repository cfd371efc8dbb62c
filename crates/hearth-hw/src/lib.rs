//! hearth-hw — Hardware abstraction for webcam capture.
//!
//! Provides V4L2-based camera access producing interleaved RGB frames.

pub mod camera;
pub mod frame;

pub use camera::{Camera, CameraError, DeviceInfo, PixelFormat};
pub use frame::Frame;
