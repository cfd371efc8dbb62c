//! Hosted multimodal vision relay.
//!
//! Sends an image plus a natural-language instruction to a Gemini-style
//! `generateContent` endpoint and returns the model's free-text findings.
//! The model does the actual image understanding; this module is transport
//! and response plumbing only.

use crate::AlertError;
use base64::Engine;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Instruction used for the weapon-analysis feature.
pub const WEAPON_SCAN_INSTRUCTION: &str = "Analyze this image carefully and determine if there are any weapons present. \
If weapons are detected, identify each one by name and type (e.g., \"handgun - firearm\", \
\"knife - bladed weapon\", \"rifle - firearm\"). \
If no weapons are detected, simply respond with \"No weapons detected\". \
Be thorough in your analysis and consider all possible weapons.";

const NO_WEAPONS_MARKER: &str = "No weapons detected";

/// Returns true when the model's findings report at least one weapon.
pub fn findings_indicate_weapons(findings: &str) -> bool {
    !findings.contains(NO_WEAPONS_MARKER)
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// Blocking client for the hosted multimodal model.
pub struct VisionClient {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

impl VisionClient {
    pub fn new(api_key: String) -> Result<Self, AlertError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Ask the model about an encoded image (PNG or JPEG bytes).
    ///
    /// Returns the concatenated text of the first candidate. At-most-once;
    /// any transport or non-2xx outcome is an error for the caller to
    /// surface as a warning.
    pub fn analyze_image(
        &self,
        image: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> Result<String, AlertError> {
        let url = format!(
            "{API_BASE}/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let payload = serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": instruction },
                    {
                        "inline_data": {
                            "mime_type": mime_type,
                            "data": base64::engine::general_purpose::STANDARD.encode(image),
                        }
                    }
                ]
            }]
        });

        let response = self.client.post(&url).json(&payload).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AlertError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json()?;
        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AlertError::BadResponse("no candidates in response".into()))?;

        let text: String = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(AlertError::BadResponse("candidate carried no text".into()));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_weapons_marker_is_negative() {
        assert!(!findings_indicate_weapons("No weapons detected"));
        assert!(!findings_indicate_weapons(
            "I looked closely. No weapons detected in this image."
        ));
    }

    #[test]
    fn named_weapon_is_positive() {
        assert!(findings_indicate_weapons("handgun - firearm, on the table"));
    }

    #[test]
    fn response_text_extraction() {
        let body = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "knife - " },
                        { "text": "bladed weapon" }
                    ]
                }
            }]
        });
        let parsed: GenerateResponse = serde_json::from_value(body).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(text, "knife - bladed weapon");
    }

    #[test]
    fn empty_candidates_parse() {
        let parsed: GenerateResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(parsed.candidates.is_empty());
    }
}
