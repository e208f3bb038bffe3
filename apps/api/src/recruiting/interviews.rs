use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::types::Json as SqlJson;
use tracing::info;
use uuid::Uuid;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::models::interview::{InterviewMode, InterviewQuestion, InterviewRow, InterviewSessionRow};
use crate::recruiting::{job_owner, required_text};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateInterviewRequest {
    pub job_id: Uuid,
    pub title: String,
    #[serde(default = "default_mode")]
    pub mode: InterviewMode,
    #[serde(default)]
    pub questions: Vec<InterviewQuestion>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

fn default_mode() -> InterviewMode {
    InterviewMode::Ai
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub application_id: Uuid,
}

/// AI interviews need at least one question; every question needs text and a
/// unique id.
pub fn validate_questions(
    mode: InterviewMode,
    questions: &[InterviewQuestion],
) -> Result<(), AppError> {
    if mode == InterviewMode::Ai && questions.is_empty() {
        return Err(AppError::Validation(
            "AI interviews need at least one question".to_string(),
        ));
    }
    let mut ids = HashSet::new();
    for q in questions {
        if q.id.trim().is_empty() || q.question.trim().is_empty() {
            return Err(AppError::Validation(
                "Every question needs an id and text".to_string(),
            ));
        }
        if !ids.insert(q.id.as_str()) {
            return Err(AppError::Validation(format!("Duplicate question id '{}'", q.id)));
        }
    }
    Ok(())
}

/// POST /api/v1/interviews
pub async fn handle_create_interview(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreateInterviewRequest>,
) -> Result<(StatusCode, Json<InterviewRow>), AppError> {
    let recruiter_id = caller.require_recruiter()?;
    let title = required_text("title", &req.title)?;
    validate_questions(req.mode, &req.questions)?;
    if req.deadline.is_some_and(|d| d <= Utc::now()) {
        return Err(AppError::Validation("Deadline must be in the future".to_string()));
    }
    if job_owner(&state.db, req.job_id).await? != recruiter_id {
        return Err(AppError::Forbidden);
    }

    let interview = sqlx::query_as::<_, InterviewRow>(
        r#"
        INSERT INTO interviews (id, job_id, recruiter_id, title, mode, questions, deadline)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.job_id)
    .bind(recruiter_id)
    .bind(&title)
    .bind(req.mode.as_str())
    .bind(SqlJson(&req.questions))
    .bind(req.deadline)
    .fetch_one(&state.db)
    .await?;

    info!(
        "Created {} interview {} with {} question(s)",
        req.mode,
        interview.id,
        req.questions.len()
    );
    Ok((StatusCode::CREATED, Json(interview)))
}

/// POST /api/v1/interviews/:id/sessions
///
/// Selects an applicant for the interview. The application must belong to the
/// interview's job.
pub async fn handle_create_session(
    State(state): State<AppState>,
    caller: Caller,
    Path(interview_id): Path<Uuid>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<InterviewSessionRow>), AppError> {
    let recruiter_id = caller.require_recruiter()?;

    let interview = sqlx::query_as::<_, InterviewRow>("SELECT * FROM interviews WHERE id = $1")
        .bind(interview_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))?;
    if interview.recruiter_id != recruiter_id {
        return Err(AppError::Forbidden);
    }

    let application_job: Option<Uuid> =
        sqlx::query_scalar("SELECT job_id FROM applications WHERE id = $1")
            .bind(req.application_id)
            .fetch_optional(&state.db)
            .await?;
    match application_job {
        None => {
            return Err(AppError::NotFound(format!(
                "Application {} not found",
                req.application_id
            )))
        }
        Some(job_id) if job_id != interview.job_id => {
            return Err(AppError::Validation(
                "Application is for a different job".to_string(),
            ))
        }
        Some(_) => {}
    }

    let session = state.sessions.create(interview_id, req.application_id).await?;
    Ok((StatusCode::CREATED, Json(session)))
}
