use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::models::application::{ApplicationRow, ApplicationStatus};
use crate::recruiting::job_owner;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateApplicationRequest {
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub cover_letter_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    #[serde(default)]
    pub comment: Option<String>,
}

impl UpdateStatusRequest {
    /// Parsed status plus the comment with blank values dropped.
    pub fn validate(&self) -> Result<(ApplicationStatus, Option<String>), AppError> {
        let status = self
            .status
            .trim()
            .to_lowercase()
            .parse::<ApplicationStatus>()
            .map_err(AppError::Validation)?;
        let comment = self
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        Ok((status, comment))
    }
}

async fn load_application(db: &sqlx::PgPool, id: Uuid) -> Result<ApplicationRow, AppError> {
    sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
}

/// POST /api/v1/jobs/:id/applications
pub async fn handle_apply(
    State(state): State<AppState>,
    caller: Caller,
    Path(job_id): Path<Uuid>,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationRow>), AppError> {
    let applicant_id = caller.require_applicant()?;
    job_owner(&state.db, job_id).await?;

    let result = sqlx::query_as::<_, ApplicationRow>(
        r#"
        INSERT INTO applications (id, job_id, applicant_id, resume_url, cover_letter_url)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job_id)
    .bind(applicant_id)
    .bind(&req.resume_url)
    .bind(&req.cover_letter_url)
    .fetch_one(&state.db)
    .await;

    match result {
        Ok(application) => {
            info!("Applicant {applicant_id} applied to job {job_id}");
            Ok((StatusCode::CREATED, Json(application)))
        }
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(AppError::Conflict(
            "You have already applied to this job".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// GET /api/v1/applications/:id
///
/// Visible to the applicant who owns it and to the recruiter who owns the job.
pub async fn handle_get_application(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicationRow>, AppError> {
    let application = load_application(&state.db, id).await?;
    if caller.applicant_id() == Some(application.applicant_id) {
        return Ok(Json(application));
    }
    let recruiter_id = job_owner(&state.db, application.job_id).await?;
    if caller.recruiter_id() == Some(recruiter_id) {
        return Ok(Json(application));
    }
    Err(AppError::Forbidden)
}

/// PATCH /api/v1/applications/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    let recruiter_id = caller.require_recruiter()?;
    let (status, comment) = req.validate()?;

    let application = load_application(&state.db, id).await?;
    if job_owner(&state.db, application.job_id).await? != recruiter_id {
        return Err(AppError::Forbidden);
    }

    let updated = sqlx::query_as::<_, ApplicationRow>(
        r#"
        UPDATE applications
        SET status = $2, recruiter_comment = COALESCE($3, recruiter_comment), updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .bind(&comment)
    .fetch_one(&state.db)
    .await?;

    info!("Application {id} moved to {status}");
    Ok(Json(updated))
}
