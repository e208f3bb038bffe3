//! Interview session persistence.
//!
//! `AppState` holds an `Arc<dyn SessionStore>`; `PgSessionStore` is the
//! production backend.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::completion::SessionScore;
use crate::models::interview::{
    InterviewSessionDetail, InterviewSessionRow, SessionDetailRow, TranscriptEntry,
};

/// Pure scoring step run by `SessionStore::complete` against the locked transcript.
pub type TranscriptScorer = fn(&[TranscriptEntry]) -> Result<SessionScore, AppError>;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Session with interview, job and application joined.
    async fn find_detail(&self, id: Uuid) -> Result<Option<InterviewSessionDetail>, AppError>;

    /// Creates the session for an (interview, application) pair.
    /// Fails with `Conflict` when the pair already has one.
    async fn create(
        &self,
        interview_id: Uuid,
        application_id: Uuid,
    ) -> Result<InterviewSessionRow, AppError>;

    async fn mark_attempted(&self, id: Uuid) -> Result<Option<InterviewSessionRow>, AppError>;

    /// Appends one entry to the end of the transcript. Returns false if the
    /// session does not exist.
    async fn append_entry(&self, id: Uuid, entry: &TranscriptEntry) -> Result<bool, AppError>;

    /// Scores the transcript and stores `{attempted: true, rating, feedback}`.
    /// Nothing is written when `scorer` fails.
    async fn complete(
        &self,
        id: Uuid,
        scorer: TranscriptScorer,
    ) -> Result<InterviewSessionRow, AppError>;
}

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SESSION_DETAIL_QUERY: &str = r#"
    SELECT s.id, s.interview_id, s.application_id, s.attempted, s.rating, s.feedback,
           s.transcript, s.created_at, s.updated_at,
           i.title AS interview_title, i.mode AS interview_mode, i.recruiter_id,
           i.questions, i.deadline,
           j.id AS job_id, j.title AS job_title,
           a.applicant_id, a.status AS application_status
    FROM interview_sessions s
    JOIN interviews i ON i.id = s.interview_id
    JOIN jobs j ON j.id = i.job_id
    JOIN applications a ON a.id = s.application_id
    WHERE s.id = $1
"#;

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn find_detail(&self, id: Uuid) -> Result<Option<InterviewSessionDetail>, AppError> {
        let row = sqlx::query_as::<_, SessionDetailRow>(SESSION_DETAIL_QUERY)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(InterviewSessionDetail::from))
    }

    async fn create(
        &self,
        interview_id: Uuid,
        application_id: Uuid,
    ) -> Result<InterviewSessionRow, AppError> {
        let result = sqlx::query_as::<_, InterviewSessionRow>(
            r#"
            INSERT INTO interview_sessions (id, interview_id, application_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(interview_id)
        .bind(application_id)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => {
                info!(
                    "Created interview session {} for interview {interview_id}",
                    row.id
                );
                Ok(row)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(AppError::Conflict(
                "An interview session already exists for this application".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn mark_attempted(&self, id: Uuid) -> Result<Option<InterviewSessionRow>, AppError> {
        let row = sqlx::query_as::<_, InterviewSessionRow>(
            "UPDATE interview_sessions SET attempted = true, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn append_entry(&self, id: Uuid, entry: &TranscriptEntry) -> Result<bool, AppError> {
        // Single-statement append: concurrent saves never drop each other's entries.
        let result = sqlx::query(
            r#"
            UPDATE interview_sessions
            SET transcript = transcript || jsonb_build_array($2::jsonb),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(Json(entry))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn complete(
        &self,
        id: Uuid,
        scorer: TranscriptScorer,
    ) -> Result<InterviewSessionRow, AppError> {
        let mut tx = self.pool.begin().await?;

        let transcript: Option<Json<Vec<TranscriptEntry>>> = sqlx::query_scalar(
            "SELECT transcript FROM interview_sessions WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let transcript = transcript
            .ok_or_else(|| AppError::NotFound("Interview session not found".to_string()))?;

        let score = scorer(&transcript.0)?;

        let row = sqlx::query_as::<_, InterviewSessionRow>(
            r#"
            UPDATE interview_sessions
            SET attempted = true, rating = $2, feedback = $3, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(score.rating)
        .bind(&score.feedback)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }
}
