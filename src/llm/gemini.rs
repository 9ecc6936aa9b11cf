//! Gemini provider adapter.
//!
//! Gemini has no speech-to-text here; when the request carries audio the
//! prompt gets a placeholder note instead of a transcript, so the model
//! knows a recording existed.

use serde::Serialize;

use super::{
    generate_content_text, parse_assessment, read_image_base64, status_error, transport_error,
    ProviderError,
};
use crate::guidance::prompt::{build_user_prompt, AudioContext, SYSTEM_PROMPT};
use crate::guidance::types::{AssessmentResult, GuidanceRequest};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const GEMINI_MODEL: &str = "gemini-2.0-flash";
const PROVIDER: &str = "Gemini";

#[derive(Debug, Serialize)]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
pub(crate) struct InlineData {
    pub mime_type: &'static str,
    pub data: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerationConfig {
    pub temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    pub max_output_tokens: u32,
    pub response_mime_type: &'static str,
}

/// Build a generateContent request. Gemini takes no separate system role
/// here; the instruction is prepended to the first text part.
pub(crate) fn build_generate_request(
    user_prompt: &str,
    images: Vec<(String, &'static str)>,
) -> GenerateContentRequest {
    let mut parts = vec![Part::Text {
        text: format!("{}\n\n{}", SYSTEM_PROMPT, user_prompt),
    }];
    for (data, mime) in images {
        parts.push(Part::InlineData {
            inline_data: InlineData { mime_type: mime, data },
        });
    }

    GenerateContentRequest {
        contents: vec![Content { parts }],
        generation_config: GenerationConfig {
            temperature: 0.7,
            max_output_tokens: 1000,
            response_mime_type: "application/json",
        },
    }
}

/// One guidance attempt against Gemini.
pub async fn generate_guidance(
    client: &reqwest::Client,
    api_key: &str,
    request: &GuidanceRequest,
) -> Result<AssessmentResult, ProviderError> {
    let audio = request.audio.as_ref().map(|_| AudioContext::Unavailable);
    let user_prompt = build_user_prompt(&request.text, request.history.as_ref(), audio);

    let mut images = Vec::with_capacity(request.images.len());
    for path in &request.images {
        images.push(read_image_base64(PROVIDER, path).await?);
    }

    let body = build_generate_request(&user_prompt, images);
    let url = format!(
        "{}/models/{}:generateContent?key={}",
        GEMINI_API_BASE, GEMINI_MODEL, api_key
    );

    let response = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(|e| transport_error(PROVIDER, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(PROVIDER, status, body));
    }

    let envelope: serde_json::Value = response
        .json()
        .await
        .map_err(|e| transport_error(PROVIDER, e))?;

    let content =
        generate_content_text(&envelope).ok_or(ProviderError::Empty { provider: PROVIDER })?;

    Ok(parse_assessment(PROVIDER, &content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_prepends_system_instruction_to_first_part() {
        let request = build_generate_request("my finger is bleeding", vec![]);
        let json = serde_json::to_value(&request).unwrap();

        let text = json["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.starts_with(SYSTEM_PROMPT));
        assert!(text.ends_with("my finger is bleeding"));

        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1000);
        assert_eq!(
            json["generationConfig"]["response_mime_type"],
            "application/json"
        );
    }

    #[test]
    fn request_embeds_images_as_inline_data() {
        let request = build_generate_request(
            "see photo",
            vec![("aGVsbG8=".to_string(), "image/jpeg")],
        );
        let json = serde_json::to_value(&request).unwrap();

        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[1]["inline_data"]["data"], "aGVsbG8=");
    }
}
