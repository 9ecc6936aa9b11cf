//! Provider adapters for the first-aid guidance fallback chain.
//!
//! One module per vendor. Each adapter turns a [`GuidanceRequest`] into an
//! [`AssessmentResult`] by calling that vendor's HTTP API: build a
//! multimodal payload, extract the answer text from the vendor envelope,
//! parse it as JSON, and fall back to text extraction on malformed output.
//!
//! [`GuidanceRequest`]: crate::guidance::types::GuidanceRequest

pub mod deepseek;
pub mod gemini;
pub mod openai;
pub mod openai_compatible;

use std::fmt;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::guidance::extract;
use crate::guidance::types::AssessmentResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    DeepSeek,
    OpenAi,
}

impl ProviderKind {
    /// Default precedence when no preference is configured.
    pub const FALLBACK_ORDER: [ProviderKind; 3] = [
        ProviderKind::Gemini,
        ProviderKind::DeepSeek,
        ProviderKind::OpenAi,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "Gemini",
            ProviderKind::DeepSeek => "DeepSeek",
            ProviderKind::OpenAi => "OpenAI",
        }
    }

    /// Parse a provider name as found in `PREFERRED_AI_API`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "gemini" => Some(ProviderKind::Gemini),
            "deepseek" => Some(ProviderKind::DeepSeek),
            "openai" | "chatgpt" => Some(ProviderKind::OpenAi),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One failed provider attempt. `Unavailable` (401/429) is the signal the
/// orchestrator uses to distinguish credential/quota trouble from other
/// failures; both move the fallback chain along.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} is unavailable (HTTP {status})")]
    Unavailable { provider: &'static str, status: u16 },

    #[error("{provider} API error {status}: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} could not read {path}: {source}")]
    Io {
        provider: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{provider} returned an empty answer")]
    Empty { provider: &'static str },

    #[error("{provider} API key is not configured")]
    MissingCredential { provider: &'static str },
}

/// Classify a non-success vendor status. 401 and 429 mean the provider is
/// effectively unavailable to us; everything else is a plain API error.
pub(crate) fn status_error(
    provider: &'static str,
    status: reqwest::StatusCode,
    body: String,
) -> ProviderError {
    match status.as_u16() {
        401 | 429 => ProviderError::Unavailable {
            provider,
            status: status.as_u16(),
        },
        code => ProviderError::Api {
            provider,
            status: code,
            body,
        },
    }
}

pub(crate) fn transport_error(provider: &'static str, source: reqwest::Error) -> ProviderError {
    ProviderError::Transport { provider, source }
}

/// Strip markdown code fences that models like to wrap JSON in.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parse a model answer into a result: JSON first, labeled-text extraction
/// as the recovery path.
pub(crate) fn parse_assessment(provider: &'static str, content: &str) -> AssessmentResult {
    let cleaned = strip_code_fences(content);
    match serde_json::from_str::<AssessmentResult>(cleaned) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(
                "{} returned non-JSON guidance ({}); falling back to text extraction",
                provider,
                e
            );
            extract::extract_assessment(cleaned)
        }
    }
}

/// Pluck the answer text out of a generateContent envelope
/// (`candidates[0].content.parts[0].text`).
pub(crate) fn generate_content_text(envelope: &serde_json::Value) -> Option<String> {
    envelope
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}

/// Sniff the MIME type of an uploaded image from its bytes.
pub(crate) fn image_mime(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        image::ImageFormat::Jpeg => Some("image/jpeg"),
        image::ImageFormat::Png => Some("image/png"),
        _ => None,
    }
}

/// Read an image from disk and return it base64-encoded with its MIME type.
pub(crate) async fn read_image_base64(
    provider: &'static str,
    path: &Path,
) -> Result<(String, &'static str), ProviderError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| ProviderError::Io {
        provider,
        path: path.display().to_string(),
        source: e,
    })?;
    let mime = image_mime(&bytes).unwrap_or("image/jpeg");
    Ok((STANDARD.encode(&bytes), mime))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_order_is_gemini_deepseek_openai() {
        assert_eq!(
            ProviderKind::FALLBACK_ORDER,
            [
                ProviderKind::Gemini,
                ProviderKind::DeepSeek,
                ProviderKind::OpenAi
            ]
        );
    }

    #[test]
    fn parses_provider_names_case_insensitively() {
        assert_eq!(ProviderKind::parse("Gemini"), Some(ProviderKind::Gemini));
        assert_eq!(ProviderKind::parse("DEEPSEEK"), Some(ProviderKind::DeepSeek));
        assert_eq!(ProviderKind::parse(" openai "), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::parse("chatgpt"), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::parse("claude"), None);
    }

    #[test]
    fn auth_and_rate_limit_statuses_map_to_unavailable() {
        for code in [401u16, 429] {
            let err = status_error(
                "OpenAI",
                reqwest::StatusCode::from_u16(code).unwrap(),
                String::new(),
            );
            assert!(matches!(err, ProviderError::Unavailable { status, .. } if status == code));
        }
        let err = status_error(
            "OpenAI",
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "boom".to_string(),
        );
        assert!(matches!(err, ProviderError::Api { status: 500, .. }));
    }

    #[test]
    fn strips_json_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn parse_assessment_accepts_fenced_json() {
        let content = "```json\n{\"assessment\": \"Minor burn.\", \"steps\": [\"Cool under water.\"], \"warnings\": []}\n```";
        let result = parse_assessment("Gemini", content);
        assert_eq!(result.assessment, "Minor burn.");
        assert_eq!(result.steps, vec!["Cool under water."]);
    }

    #[test]
    fn parse_assessment_recovers_labeled_text() {
        let content = "assessment: Minor cut.\nsteps: 1. Clean it.";
        let result = parse_assessment("Gemini", content);
        assert_eq!(result.assessment, "Minor cut.");
        assert_eq!(result.steps, vec!["Clean it."]);
    }

    #[test]
    fn parse_assessment_never_fails_on_garbage() {
        let result = parse_assessment("Gemini", "total nonsense");
        assert!(!result.assessment.is_empty());
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn plucks_text_from_generate_content_envelope() {
        let envelope = serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "hello"}], "role": "model"},
                "finishReason": "STOP"
            }]
        });
        assert_eq!(generate_content_text(&envelope).as_deref(), Some("hello"));

        let empty = serde_json::json!({"candidates": []});
        assert!(generate_content_text(&empty).is_none());
        assert!(generate_content_text(&serde_json::json!({})).is_none());
    }

    #[test]
    fn sniffs_image_formats_from_magic_bytes() {
        let png = [0x89u8, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0];
        assert_eq!(image_mime(&png), Some("image/png"));
        let jpeg = [0xffu8, 0xd8, 0xff, 0xe0, 0, 0, 0, 0];
        assert_eq!(image_mime(&jpeg), Some("image/jpeg"));
        assert_eq!(image_mime(b"not an image"), None);
    }
}
