use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::models::job::JobRow;
use crate::recruiting::required_text;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JobListQuery {
    pub recruiter_id: Option<Uuid>,
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    let recruiter_id = caller.require_recruiter()?;
    let title = required_text("title", &req.title)?;
    let description = required_text("description", &req.description)?;
    let location = req
        .location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty());

    let job = sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs (id, recruiter_id, title, description, location)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(recruiter_id)
    .bind(&title)
    .bind(&description)
    .bind(&location)
    .fetch_one(&state.db)
    .await?;

    info!("Recruiter {recruiter_id} posted job {}", job.id);
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobListQuery>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    let jobs = sqlx::query_as::<_, JobRow>(
        r#"
        SELECT * FROM jobs
        WHERE $1::uuid IS NULL OR recruiter_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(params.recruiter_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(jobs))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    let job = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    Ok(Json(job))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::auth::testing::applicant_token;
    use crate::config::Config;
    use crate::interview::store::testing::MemorySessionStore;
    use crate::llm_client::testing::ScriptedChat;
    use crate::routes::build_router;
    use crate::state::AppState;

    #[tokio::test]
    async fn test_applicant_cannot_post_job() {
        let app = build_router(AppState::for_tests(
            Arc::new(MemorySessionStore::new()),
            Arc::new(ScriptedChat::new(vec![])),
        ));
        let token = applicant_token(&Config::for_tests().identity_secret, Uuid::new_v4());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/jobs")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"title": "Rust Engineer", "description": "Build APIs"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
