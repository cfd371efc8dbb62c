//! hearth-alert — Outbound side effects over HTTPS.
//!
//! Telegram bot alerts and the hosted multimodal vision relay used for
//! weapon analysis. Every call is at-most-once: failures are surfaced as
//! errors for the caller to log, never retried.

pub mod config;
pub mod telegram;
pub mod vision;

pub use config::AlertConfig;
pub use telegram::TelegramNotifier;
pub use vision::{findings_indicate_weapons, VisionClient, WEAPON_SCAN_INSTRUCTION};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("unexpected response shape: {0}")]
    BadResponse(String),
}
