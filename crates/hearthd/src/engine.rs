//! The monitor engine: a blocking webcam loop on a dedicated OS thread.
//!
//! Capture → detect/match → log recognized identities, alert on unknown
//! faces. Strictly sequential with no overlap between frames; the shutdown
//! flag is checked once per frame and the camera is released on every exit
//! path when the loop ends.

use crate::config::Config;
use hearth_alert::{AlertConfig, TelegramNotifier};
use hearth_core::{build_gallery, match_frame, FacePipeline, Match, NearestMatcher};
use hearth_hw::Camera;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Minimum spacing between outbound unknown-person alerts. Console records
/// are emitted every frame regardless.
const ALERT_COOLDOWN: Duration = Duration::from_secs(30);

/// Pause after a failed capture before trying again.
const CAPTURE_RETRY_DELAY: Duration = Duration::from_millis(250);

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("camera: {0}")]
    Camera(#[from] hearth_hw::CameraError),
    #[error("face pipeline: {0}")]
    Encoder(#[from] hearth_core::EncoderError),
    #[error("gallery: {0}")]
    Gallery(#[from] hearth_core::GalleryError),
    #[error("alert channel: {0}")]
    Alert(#[from] hearth_alert::AlertError),
}

/// Handle to a running monitor thread.
pub struct MonitorHandle {
    stop: Arc<AtomicBool>,
    join: Option<std::thread::JoinHandle<()>>,
}

impl MonitorHandle {
    /// Signal the loop to stop after the current frame and wait for it.
    pub fn shutdown(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Start the monitor: open the camera, load both ONNX models, build the
/// reference gallery, then loop on a dedicated thread. Fails fast at
/// startup if the camera, the models, or the gallery root is unavailable.
pub fn spawn_monitor(config: &Config, alerts: &AlertConfig) -> Result<MonitorHandle, EngineError> {
    let camera = Camera::open(&config.camera_device)?;
    tracing::info!(
        device = %config.camera_device,
        width = camera.width,
        height = camera.height,
        fourcc = ?camera.fourcc,
        "camera opened"
    );

    let mut pipeline = FacePipeline::load(&config.model_dir)?;
    tracing::info!(dir = %config.model_dir.display(), "face pipeline loaded");

    let (gallery, report) = build_gallery(&mut pipeline, &config.gallery_dir)?;
    tracing::info!(
        entries = gallery.len(),
        skipped = report.skipped_count(),
        dir = %config.gallery_dir.display(),
        "reference gallery ready"
    );

    let telegram = alerts.telegram()?;
    if telegram.is_none() {
        tracing::info!("telegram alerting disabled (bot_token/chat_id not configured)");
    }

    camera.warmup(config.warmup_frames);

    let matcher = NearestMatcher::new(config.match_threshold);
    let downscale = config.downscale;
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let join = std::thread::Builder::new()
        .name("hearth-monitor".into())
        .spawn(move || {
            tracing::info!("monitor thread started");
            run_loop(camera, pipeline, gallery, matcher, downscale, telegram, stop_flag);
            tracing::info!("monitor thread exiting");
        })
        .expect("failed to spawn monitor thread");

    Ok(MonitorHandle {
        stop,
        join: Some(join),
    })
}

fn run_loop(
    camera: Camera,
    mut pipeline: FacePipeline,
    gallery: hearth_core::Gallery,
    matcher: NearestMatcher,
    downscale: u32,
    telegram: Option<TelegramNotifier>,
    stop: Arc<AtomicBool>,
) {
    let mut last_alert: Option<Instant> = None;

    while !stop.load(Ordering::Relaxed) {
        let frame = match camera.capture_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "frame capture failed");
                std::thread::sleep(CAPTURE_RETRY_DELAY);
                continue;
            }
        };

        let observations = match match_frame(
            &mut pipeline,
            &frame.data,
            frame.width,
            frame.height,
            &gallery,
            &matcher,
            downscale,
        ) {
            Ok(obs) => obs,
            Err(e) => {
                tracing::warn!(error = %e, "frame matching failed");
                continue;
            }
        };

        for obs in &observations {
            match &obs.outcome {
                Match::Identified { label, role, distance } => {
                    tracing::info!(
                        label,
                        category = role,
                        distance,
                        x = obs.face.x,
                        y = obs.face.y,
                        "recognized"
                    );
                }
                Match::Unknown => {
                    tracing::warn!(
                        x = obs.face.x,
                        y = obs.face.y,
                        confidence = obs.face.confidence,
                        "unknown person detected"
                    );
                    if let Some(notifier) = &telegram {
                        let due = last_alert
                            .map(|t| t.elapsed() >= ALERT_COOLDOWN)
                            .unwrap_or(true);
                        if due {
                            match notifier.send(TelegramNotifier::unknown_person_message()) {
                                Ok(()) => last_alert = Some(Instant::now()),
                                Err(e) => {
                                    tracing::warn!(error = %e, "unknown-person alert failed")
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    // Camera drops here, releasing the device on every exit path.
}
