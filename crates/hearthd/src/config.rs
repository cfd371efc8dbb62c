use hearth_core::W600K_R50_DISTANCE_THRESHOLD;
use std::path::PathBuf;

/// Daemon configuration, loaded from environment variables.
pub struct Config {
    /// V4L2 device path (default: /dev/video0).
    pub camera_device: String,
    /// Directory containing the ONNX model files.
    pub model_dir: PathBuf,
    /// Root of the reference photo tree (subdirectories = categories).
    pub gallery_dir: PathBuf,
    /// Path to the SQLite database file for the message table.
    pub db_path: PathBuf,
    /// Embedding distance threshold for a positive match. Backend-specific;
    /// the default is valid for w600k_r50 only.
    pub match_threshold: f32,
    /// Integer downscale factor applied before detection (1 = full size).
    pub downscale: u32,
    /// Number of warmup frames to discard at startup (camera AGC/AE stabilization).
    pub warmup_frames: usize,
    /// Bind address for the REST surface.
    pub bind_addr: String,
}

impl Config {
    /// Load configuration from `HEARTH_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".local/share")
            })
            .join("hearth");

        let model_dir = std::env::var("HEARTH_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("models"));

        let gallery_dir = std::env::var("HEARTH_GALLERY_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("gallery"));

        let db_path = std::env::var("HEARTH_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("hearth.db"));

        Self {
            camera_device: std::env::var("HEARTH_CAMERA_DEVICE")
                .unwrap_or_else(|_| "/dev/video0".to_string()),
            model_dir,
            gallery_dir,
            db_path,
            match_threshold: env_f32("HEARTH_MATCH_THRESHOLD", W600K_R50_DISTANCE_THRESHOLD),
            downscale: env_u32("HEARTH_DOWNSCALE", 4),
            warmup_frames: env_usize("HEARTH_WARMUP_FRAMES", 4),
            bind_addr: std::env::var("HEARTH_BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
        }
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
