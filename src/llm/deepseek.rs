//! DeepSeek provider adapter. The API is OpenAI-shaped, so the request
//! plumbing is shared; only the endpoint and model names differ.

use super::{openai_compatible, parse_assessment, read_image_base64, ProviderError};
use crate::guidance::prompt::{build_user_prompt, AudioContext, SYSTEM_PROMPT};
use crate::guidance::types::{AssessmentResult, GuidanceRequest};

const DEEPSEEK_API_BASE: &str = "https://api.deepseek.com/v1";
const CHAT_MODEL: &str = "deepseek-chat";
const TRANSCRIBE_MODEL: &str = "whisper-1";
const PROVIDER: &str = "DeepSeek";

/// One guidance attempt against DeepSeek.
pub async fn generate_guidance(
    client: &reqwest::Client,
    api_key: &str,
    request: &GuidanceRequest,
) -> Result<AssessmentResult, ProviderError> {
    let transcript = match &request.audio {
        Some(path) => Some(
            openai_compatible::transcribe(
                client,
                DEEPSEEK_API_BASE,
                api_key,
                PROVIDER,
                TRANSCRIBE_MODEL,
                path,
            )
            .await?,
        ),
        None => None,
    };

    let user_prompt = build_user_prompt(
        &request.text,
        request.history.as_ref(),
        transcript.as_deref().map(AudioContext::Transcript),
    );

    let mut images = Vec::with_capacity(request.images.len());
    for path in &request.images {
        images.push(read_image_base64(PROVIDER, path).await?);
    }

    let body = openai_compatible::build_chat_request(CHAT_MODEL, SYSTEM_PROMPT, user_prompt, images);
    let content =
        openai_compatible::chat(client, DEEPSEEK_API_BASE, api_key, PROVIDER, &body).await?;

    Ok(parse_assessment(PROVIDER, &content))
}
