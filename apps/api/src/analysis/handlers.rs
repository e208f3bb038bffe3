//! Axum route handlers for resume analysis.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::extract::{detect_content_type, extract_resume_text};
use crate::analysis::parser::ResumeAnalysis;
use crate::analysis::{analyze_resume, request_analysis};
use crate::auth::Caller;
use crate::errors::AppError;
use crate::llm_client::ChatCompletionResponse;
use crate::models::application::ApplicationRow;
use crate::models::job::JobRow;
use crate::state::AppState;
use crate::storage::extension_for;

#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    pub text: String,
    #[serde(default, alias = "jobProfile")]
    pub job_profile: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationAnalysisResponse {
    pub application_id: Uuid,
    pub resume_url: String,
    pub analysis: ResumeAnalysis,
}

/// POST /api/v1/resume-analysis
///
/// Returns the upstream chat-completion envelope untouched; the client reads
/// `choices[0].message.content`.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    _caller: Caller,
    Json(request): Json<AnalyzeTextRequest>,
) -> Result<Json<ChatCompletionResponse>, AppError> {
    let response = request_analysis(
        state.llm.as_ref(),
        &request.text,
        request.job_profile.as_deref(),
    )
    .await?;
    Ok(Json(response))
}

struct UploadedFile {
    file_name: String,
    content_type: String,
    bytes: Bytes,
}

async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("resume").to_string();
        let content_type = detect_content_type(field.content_type(), &file_name);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid file upload: {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        return Ok(UploadedFile {
            file_name,
            content_type,
            bytes,
        });
    }
    Err(AppError::Validation("No file provided in the request".to_string()))
}

/// POST /api/v1/applications/:id/resume-analysis
///
/// Uploads a resume for the caller's application, scores it against the job
/// and stores the results on the application.
pub async fn handle_analyze_application(
    State(state): State<AppState>,
    caller: Caller,
    Path(application_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ApplicationAnalysisResponse>, AppError> {
    let applicant_id = caller.require_applicant()?;

    let application =
        sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
            .bind(application_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))?;
    if application.applicant_id != applicant_id {
        return Err(AppError::Forbidden);
    }

    let job = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(application.job_id)
        .fetch_one(&state.db)
        .await?;

    let upload = read_file_field(&mut multipart).await?;
    let text = extract_resume_text(&upload.bytes, &upload.content_type)?;

    let job_profile = format!("{}\n\n{}", job.title, job.description);
    let analysis = analyze_resume(state.llm.as_ref(), &text, Some(&job_profile)).await?;

    let key = format!(
        "resumes/{applicant_id}/{}.{}",
        Uuid::new_v4(),
        extension_for(&upload.content_type)
    );
    let resume_url = state
        .storage
        .put(&key, upload.bytes, &upload.content_type)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    sqlx::query(
        r#"
        UPDATE applications
        SET resume_url = $2, analysis_score = $3, analysis_strength = $4,
            analysis_weakness = $5, analysis_keywords = $6, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(application_id)
    .bind(&resume_url)
    .bind(&analysis.score)
    .bind(&analysis.strength)
    .bind(&analysis.weakness)
    .bind(&analysis.keywords)
    .execute(&state.db)
    .await?;

    info!(
        "Stored resume analysis for application {application_id} ({}, score {})",
        upload.file_name, analysis.score
    );

    Ok(Json(ApplicationAnalysisResponse {
        application_id,
        resume_url,
        analysis,
    }))
}
