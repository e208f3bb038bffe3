//! HTTP surface for speech-to-text on recorded answers.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::llm_client::transcription::{AudioUpload, TranscriptionHints};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TranscriptionResponse {
    pub success: bool,
    pub text: String,
}

/// Pulls the audio file and the optional hint fields out of the form.
async fn read_transcription_form(
    multipart: &mut Multipart,
) -> Result<(Option<AudioUpload>, TranscriptionHints), AppError> {
    let mut audio = None;
    let mut hints = TranscriptionHints::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("audio.webm").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid file upload: {e}")))?;
                audio = Some(AudioUpload {
                    bytes,
                    file_name,
                    content_type,
                });
            }
            "language" | "prompt" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid {name} field: {e}")))?;
                let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
                if name == "language" {
                    hints.language = value;
                } else {
                    hints.prompt = value;
                }
            }
            _ => {}
        }
    }

    Ok((audio, hints))
}

/// POST /api/v1/transcribe
pub async fn handle_transcribe(
    State(state): State<AppState>,
    _caller: Caller,
    mut multipart: Multipart,
) -> Result<Json<TranscriptionResponse>, AppError> {
    let (audio, hints) = read_transcription_form(&mut multipart).await?;
    let audio = audio
        .filter(|a| !a.bytes.is_empty())
        .ok_or_else(|| AppError::Validation("No audio file provided".to_string()))?;

    let size = audio.bytes.len();
    let text = state
        .transcriber
        .transcribe(audio, hints)
        .await
        .map_err(|e| AppError::llm("Failed to transcribe audio", e))?;

    info!("Transcribed {size} bytes of audio into {} chars", text.len());
    Ok(Json(TranscriptionResponse {
        success: true,
        text,
    }))
}
