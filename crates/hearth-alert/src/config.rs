//! Alert credentials from environment variables.
//!
//! Secrets are never embedded in source; every field is optional and the
//! corresponding channel is simply disabled when unset.

use crate::telegram::TelegramNotifier;
use crate::vision::VisionClient;
use crate::AlertError;

/// Credentials for the outbound channels.
#[derive(Debug, Clone, Default)]
pub struct AlertConfig {
    /// Hosted vision model API key (`HEARTH_API_KEY`).
    pub api_key: Option<String>,
    /// Telegram bot token (`HEARTH_BOT_TOKEN`).
    pub bot_token: Option<String>,
    /// Telegram chat id (`HEARTH_CHAT_ID`).
    pub chat_id: Option<String>,
}

impl AlertConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: non_empty_env("HEARTH_API_KEY"),
            bot_token: non_empty_env("HEARTH_BOT_TOKEN"),
            chat_id: non_empty_env("HEARTH_CHAT_ID"),
        }
    }

    /// Telegram notifier when both token and chat id are configured.
    pub fn telegram(&self) -> Result<Option<TelegramNotifier>, AlertError> {
        match (&self.bot_token, &self.chat_id) {
            (Some(token), Some(chat)) => {
                Ok(Some(TelegramNotifier::new(token.clone(), chat.clone())?))
            }
            _ => Ok(None),
        }
    }

    /// Vision client when an API key is configured.
    pub fn vision(&self) -> Result<Option<VisionClient>, AlertError> {
        match &self.api_key {
            Some(key) => Ok(Some(VisionClient::new(key.clone())?)),
            None => Ok(None),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telegram_requires_both_token_and_chat() {
        let config = AlertConfig {
            api_key: None,
            bot_token: Some("token".into()),
            chat_id: None,
        };
        assert!(config.telegram().unwrap().is_none());

        let config = AlertConfig {
            bot_token: Some("token".into()),
            chat_id: Some("42".into()),
            ..Default::default()
        };
        assert!(config.telegram().unwrap().is_some());
    }

    #[test]
    fn vision_disabled_without_key() {
        assert!(AlertConfig::default().vision().unwrap().is_none());
    }
}
