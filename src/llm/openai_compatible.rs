//! Shared plumbing for OpenAI-style chat-completions APIs.
//! OpenAI itself and DeepSeek both speak this dialect, including the
//! multipart audio-transcription endpoint.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{status_error, transport_error, ProviderError};

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub(crate) struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Build a chat-completions request: system instruction, then a user
/// message carrying the prompt plus each image as a base64 data URL.
pub(crate) fn build_chat_request(
    model: &str,
    system_prompt: &str,
    user_prompt: String,
    images: Vec<(String, &'static str)>,
) -> ChatCompletionRequest {
    let mut parts = vec![ContentPart::Text { text: user_prompt }];
    for (data, mime) in images {
        parts.push(ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: format!("data:{};base64,{}", mime, data),
            },
        });
    }

    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(system_prompt.to_string()),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Parts(parts),
            },
        ],
        max_tokens: 1000,
        temperature: 0.7,
        response_format: ResponseFormat {
            kind: "json_object",
        },
    }
}

/// Call `{base_url}/chat/completions` and return the answer text.
pub(crate) async fn chat(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    provider: &'static str,
    request: &ChatCompletionRequest,
) -> Result<String, ProviderError> {
    let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));

    let response = client
        .post(&url)
        .bearer_auth(api_key)
        .json(request)
        .send()
        .await
        .map_err(|e| transport_error(provider, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(provider, status, body));
    }

    let data: ChatCompletionResponse = response
        .json()
        .await
        .map_err(|e| transport_error(provider, e))?;

    data.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(ProviderError::Empty { provider })
}

/// Call `{base_url}/audio/transcriptions` with the recording as a
/// multipart upload and return the transcript.
pub(crate) async fn transcribe(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    provider: &'static str,
    model: &str,
    audio_path: &Path,
) -> Result<String, ProviderError> {
    let bytes = tokio::fs::read(audio_path)
        .await
        .map_err(|e| ProviderError::Io {
            provider,
            path: audio_path.display().to_string(),
            source: e,
        })?;

    let file_name = audio_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "recording.webm".to_string());

    let form = reqwest::multipart::Form::new()
        .text("model", model.to_string())
        .part("file", reqwest::multipart::Part::bytes(bytes).file_name(file_name));

    let url = format!("{}/audio/transcriptions", base_url.trim_end_matches('/'));

    let response = client
        .post(&url)
        .bearer_auth(api_key)
        .multipart(form)
        .send()
        .await
        .map_err(|e| transport_error(provider, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(provider, status, body));
    }

    let data: TranscriptionResponse = response
        .json()
        .await
        .map_err(|e| transport_error(provider, e))?;

    Ok(data.text)
}
