use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// How an interview is conducted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewMode {
    Ai,
    Offline,
}

impl InterviewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewMode::Ai => "ai",
            InterviewMode::Offline => "offline",
        }
    }
}

impl fmt::Display for InterviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub id: String,
    pub question: String,
    /// Reference answer written by the recruiter.
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub recruiter_id: Uuid,
    pub title: String,
    pub mode: String,
    pub questions: Json<Vec<InterviewQuestion>>,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One answered question. Appended once, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub question_id: String,
    pub question: String,
    pub user_answer: String,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub feedback: String,
    /// Expected 1–10. `None` counts as 0 when the session is scored.
    #[serde(default)]
    pub rating: Option<i32>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewSessionRow {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub application_id: Uuid,
    pub attempted: bool,
    /// Session aggregate. Only written by completion.
    pub rating: Option<i32>,
    pub feedback: Option<String>,
    pub transcript: Json<Vec<TranscriptEntry>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSummary {
    pub id: Uuid,
    pub title: String,
    pub mode: String,
    pub recruiter_id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub questions: Vec<InterviewQuestion>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationSummary {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub status: String,
}

/// A session with its interview (job, questions) and application (applicant) joined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSessionDetail {
    pub session: InterviewSessionRow,
    pub interview: InterviewSummary,
    pub application: ApplicationSummary,
}

/// Flat row for the joined session lookup.
#[derive(Debug, FromRow)]
pub struct SessionDetailRow {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub application_id: Uuid,
    pub attempted: bool,
    pub rating: Option<i32>,
    pub feedback: Option<String>,
    pub transcript: Json<Vec<TranscriptEntry>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub interview_title: String,
    pub interview_mode: String,
    pub recruiter_id: Uuid,
    pub questions: Json<Vec<InterviewQuestion>>,
    pub deadline: Option<DateTime<Utc>>,
    pub job_id: Uuid,
    pub job_title: String,
    pub applicant_id: Uuid,
    pub application_status: String,
}

impl From<SessionDetailRow> for InterviewSessionDetail {
    fn from(row: SessionDetailRow) -> Self {
        Self {
            interview: InterviewSummary {
                id: row.interview_id,
                title: row.interview_title,
                mode: row.interview_mode,
                recruiter_id: row.recruiter_id,
                job_id: row.job_id,
                job_title: row.job_title,
                questions: row.questions.0,
                deadline: row.deadline,
            },
            application: ApplicationSummary {
                id: row.application_id,
                applicant_id: row.applicant_id,
                status: row.application_status,
            },
            session: InterviewSessionRow {
                id: row.id,
                interview_id: row.interview_id,
                application_id: row.application_id,
                attempted: row.attempted,
                rating: row.rating,
                feedback: row.feedback,
                transcript: row.transcript,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_entry_without_rating_deserializes() {
        let json = r#"{
            "question_id": "q1",
            "question": "What is ownership?",
            "user_answer": "Each value has one owner.",
            "timestamp": "2026-01-05T10:00:00Z"
        }"#;
        let entry: TranscriptEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.rating, None);
        assert_eq!(entry.feedback, "");
    }

    #[test]
    fn test_interview_mode_wire_format() {
        let mode: InterviewMode = serde_json::from_str(r#""offline""#).unwrap();
        assert_eq!(mode, InterviewMode::Offline);
        assert_eq!(mode.to_string(), "offline");
        assert!(serde_json::from_str::<InterviewMode>(r#""phone""#).is_err());
    }
}
