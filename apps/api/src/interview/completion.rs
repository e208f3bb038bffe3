//! Interview completion: turns a transcript into the session's rating and summary.

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::interview::capture::{MAX_RATING, MIN_RATING};
use crate::interview::gate::check_interview_access;
use crate::interview::store::SessionStore;
use crate::models::interview::{InterviewSessionRow, TranscriptEntry};

/// Aggregate written onto a session when it is completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionScore {
    pub rating: i32,
    pub feedback: String,
}

/// Mean of all entry ratings, rounded half away from zero.
///
/// An entry without a rating, or with one outside 1–10, contributes 0 and
/// still counts toward the denominator. Returns `None` for an empty transcript.
pub fn average_rating(entries: &[TranscriptEntry]) -> Option<i32> {
    if entries.is_empty() {
        return None;
    }
    let sum: i64 = entries
        .iter()
        .map(|entry| match entry.rating {
            Some(rating) if (MIN_RATING..=MAX_RATING).contains(&rating) => i64::from(rating),
            _ => 0,
        })
        .sum();
    Some((sum as f64 / entries.len() as f64).round() as i32)
}

pub fn completion_summary(average: i32, answered: usize) -> String {
    let noun = if answered == 1 { "question" } else { "questions" };
    format!(
        "Interview completed with an average rating of {average}/10 across {answered} answered {noun}."
    )
}

/// Scorer handed to `SessionStore::complete`.
pub fn score_transcript(entries: &[TranscriptEntry]) -> Result<SessionScore, AppError> {
    let rating = average_rating(entries).ok_or_else(|| {
        AppError::Validation("No answers found for this interview session".to_string())
    })?;
    Ok(SessionScore {
        rating,
        feedback: completion_summary(rating, entries.len()),
    })
}

/// Completes a session. Re-running on an unchanged transcript stores the same result.
pub async fn complete_interview(
    store: &dyn SessionStore,
    caller: &Caller,
    session_id: Uuid,
) -> Result<InterviewSessionRow, AppError> {
    check_interview_access(store, session_id, caller).await?;

    let session = store
        .complete(session_id, score_transcript)
        .await
        .map_err(|e| match e {
            AppError::NotFound(_) | AppError::Validation(_) => e,
            other => AppError::failed("Failed to complete interview", other),
        })?;

    info!(
        "Completed interview session {session_id}: rating {:?} over {} answers",
        session.rating,
        session.transcript.0.len()
    );
    Ok(session)
}
