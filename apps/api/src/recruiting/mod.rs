//! Jobs, applications, resumes and interviews: the records interview sessions
//! and resume analysis hang off.

pub mod applications;
pub mod interviews;
pub mod jobs;
pub mod resumes;

use uuid::Uuid;

use crate::errors::AppError;

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn required_text(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// Loads the recruiter that owns a job, or `NotFound`.
pub(crate) async fn job_owner(db: &sqlx::PgPool, job_id: Uuid) -> Result<Uuid, AppError> {
    sqlx::query_scalar::<_, Uuid>("SELECT recruiter_id FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_trims() {
        assert_eq!(required_text("title", "  Backend  ").unwrap(), "Backend");
    }

    #[test]
    fn test_required_text_rejects_blank() {
        let err = required_text("title", " \n ").unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "title cannot be empty"));
    }
}
