use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::types::Json as SqlJson;
use tracing::info;
use uuid::Uuid;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::models::resume::{EducationItem, ExperienceItem, ResumeRow};
use crate::recruiting::required_text;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateResumeRequest {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub education: Vec<EducationItem>,
    #[serde(default)]
    pub experience: Vec<ExperienceItem>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// Trimmed, de-duplicated skills in their original order.
pub fn normalize_skills(skills: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<ResumeRow>), AppError> {
    let applicant_id = caller.require_applicant()?;
    let title = required_text("title", &req.title)?;
    let skills = normalize_skills(&req.skills);

    let mut tx = state.db.begin().await?;
    if req.is_default {
        sqlx::query("UPDATE resumes SET is_default = false, updated_at = now() WHERE applicant_id = $1 AND is_default")
            .bind(applicant_id)
            .execute(&mut *tx)
            .await?;
    }
    let resume = sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes (id, applicant_id, title, summary, education, experience, skills, is_default)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(applicant_id)
    .bind(&title)
    .bind(&req.summary)
    .bind(SqlJson(&req.education))
    .bind(SqlJson(&req.experience))
    .bind(&skills)
    .bind(req.is_default)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    info!("Applicant {applicant_id} saved resume {}", resume.id);
    Ok((StatusCode::CREATED, Json(resume)))
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<ResumeRow>>, AppError> {
    let applicant_id = caller.require_applicant()?;
    let resumes = sqlx::query_as::<_, ResumeRow>(
        "SELECT * FROM resumes WHERE applicant_id = $1 ORDER BY is_default DESC, updated_at DESC",
    )
    .bind(applicant_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(resumes))
}

/// POST /api/v1/resumes/:id/default
pub async fn handle_set_default_resume(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeRow>, AppError> {
    let applicant_id = caller.require_applicant()?;

    let mut tx = state.db.begin().await?;
    let owner: Option<Uuid> =
        sqlx::query_scalar("SELECT applicant_id FROM resumes WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    match owner {
        None => return Err(AppError::NotFound(format!("Resume {id} not found"))),
        Some(owner) if owner != applicant_id => return Err(AppError::Forbidden),
        Some(_) => {}
    }

    sqlx::query("UPDATE resumes SET is_default = false, updated_at = now() WHERE applicant_id = $1 AND is_default AND id <> $2")
        .bind(applicant_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let resume = sqlx::query_as::<_, ResumeRow>(
        "UPDATE resumes SET is_default = true, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(Json(resume))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_skills_dedupes_case_insensitively() {
        let skills = vec![
            " Rust ".to_string(),
            "rust".to_string(),
            "".to_string(),
            "PostgreSQL".to_string(),
        ];
        assert_eq!(
            normalize_skills(&skills),
            vec!["Rust".to_string(), "PostgreSQL".to_string()]
        );
    }

    #[test]
    fn test_request_defaults_optional_sections() {
        let req: CreateResumeRequest = serde_json::from_str(r#"{"title": "Backend CV"}"#).unwrap();
        assert!(req.education.is_empty());
        assert!(req.experience.is_empty());
        assert!(!req.is_default);
    }
}
