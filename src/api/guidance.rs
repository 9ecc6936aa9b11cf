//! First-aid guidance API handler.
//!
//! Accepts a multipart form (text, images, audio, medical history), stages
//! the uploads to a temp directory, runs the provider fallback chain, and
//! returns the guidance record for the browser. The staged files are
//! deleted here on every path; the core never owns them.

use std::path::Path;

use axum::extract::{Multipart, State};
use axum::Json;
use tokio::fs;

use crate::error::AppError;
use crate::guidance::types::{GuidanceRecord, GuidanceRequest, MedicalHistory};
use crate::llm;
use crate::AppState;

/// Upload cap per file, matching what the web client enforces.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// `POST /api/guidance`
pub async fn generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GuidanceRecord>, AppError> {
    let staging = std::env::temp_dir()
        .join("medassist-uploads")
        .join(uuid::Uuid::new_v4().to_string());
    fs::create_dir_all(&staging).await?;

    let outcome = handle_request(&state, multipart, &staging).await;

    // Cleanup runs whether the chain succeeded or not.
    let _ = fs::remove_dir_all(&staging).await;

    outcome.map(Json)
}

async fn handle_request(
    state: &AppState,
    mut multipart: Multipart,
    staging: &Path,
) -> Result<GuidanceRecord, AppError> {
    let mut request = GuidanceRequest::default();
    let mut patient_id = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "text" => request.text = field.text().await?,
            "patientId" => {
                let value = field.text().await?;
                if !value.trim().is_empty() {
                    patient_id = Some(value.trim().to_string());
                }
            }
            "medicalHistory" => {
                let raw = field.text().await?;
                if !raw.trim().is_empty() {
                    let history: MedicalHistory = serde_json::from_str(&raw).map_err(|e| {
                        AppError::BadRequest(format!("Invalid medicalHistory payload: {}", e))
                    })?;
                    request.history = Some(history);
                }
            }
            "images" => {
                let bytes = field.bytes().await?;
                if bytes.len() > MAX_UPLOAD_BYTES {
                    return Err(AppError::BadRequest(
                        "Each image must be 10MB or smaller.".to_string(),
                    ));
                }
                let Some(mime) = llm::image_mime(&bytes) else {
                    return Err(AppError::BadRequest(
                        "Images must be JPEG or PNG.".to_string(),
                    ));
                };
                let ext = if mime == "image/png" { "png" } else { "jpg" };
                let path = staging.join(format!("image_{}.{}", request.images.len(), ext));
                fs::write(&path, &bytes).await?;
                request.images.push(path);
            }
            "audio" => {
                let file_name = field.file_name().map(|n| n.to_string());
                let bytes = field.bytes().await?;
                if bytes.len() > MAX_UPLOAD_BYTES {
                    return Err(AppError::BadRequest(
                        "The audio recording must be 10MB or smaller.".to_string(),
                    ));
                }
                let ext = file_name
                    .as_deref()
                    .and_then(|n| Path::new(n).extension())
                    .and_then(|e| e.to_str())
                    .unwrap_or("webm");
                let path = staging.join(format!("recording.{}", ext));
                fs::write(&path, &bytes).await?;
                request.audio = Some(path);
            }
            other => tracing::debug!("Ignoring unknown multipart field: {}", other),
        }
    }

    if request.text.trim().is_empty() && request.images.is_empty() && request.audio.is_none() {
        return Err(AppError::BadRequest(
            "Provide a description, an image, or an audio recording.".to_string(),
        ));
    }

    let result = state.guidance.generate_first_aid_guidance(&request).await?;

    Ok(GuidanceRecord::from_result(patient_id, result))
}
