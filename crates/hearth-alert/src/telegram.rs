//! Telegram bot alerts via the `sendMessage` API.

use crate::AlertError;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Blocking Telegram notifier.
///
/// Built for use from the engine thread and the CLI; one `sendMessage`
/// per alert, no retries.
pub struct TelegramNotifier {
    client: reqwest::blocking::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: String) -> Result<Self, AlertError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            bot_token,
            chat_id,
        })
    }

    /// Send one text alert to the configured chat.
    pub fn send(&self, text: &str) -> Result<(), AlertError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);

        let response = self
            .client
            .post(&url)
            .form(&[("chat_id", self.chat_id.as_str()), ("text", text)])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AlertError::Api {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(chat_id = %self.chat_id, "telegram alert sent");
        Ok(())
    }

    /// Alert text for an unknown person sighting.
    pub fn unknown_person_message() -> &'static str {
        "Alert: unknown person detected at the door."
    }

    /// Alert text for a positive weapon analysis.
    pub fn weapons_message(findings: &str) -> String {
        format!("Alert: weapons detected!\n\nAnalysis results:\n{findings}")
    }
}
