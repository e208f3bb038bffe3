//! Answer capture: scoring a transcribed answer and appending it to the session.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::interview::gate::check_interview_access;
use crate::interview::prompts::{ANSWER_FEEDBACK_PROMPT, ANSWER_FEEDBACK_SYSTEM};
use crate::interview::store::SessionStore;
use crate::llm_client::{strip_json_fences, ChatCompletion, ChatMessage};
use crate::models::interview::{InterviewSessionRow, TranscriptEntry};

pub const FALLBACK_RATING: i32 = 5;
pub const FALLBACK_FEEDBACK: &str = "Unable to generate detailed feedback.";

pub(crate) const MIN_RATING: i32 = 1;
pub(crate) const MAX_RATING: i32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerScore {
    pub rating: i32,
    pub feedback: String,
}

impl AnswerScore {
    fn fallback() -> Self {
        Self {
            rating: FALLBACK_RATING,
            feedback: FALLBACK_FEEDBACK.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveAnswerRequest {
    pub question_id: String,
    pub question: String,
    pub user_answer: String,
    #[serde(default)]
    pub correct_answer: String,
    /// When both `rating` and `feedback` are absent the answer is scored by the LLM.
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub rating: Option<i32>,
}

pub fn validate_answer(answer: &str) -> Result<(), AppError> {
    if answer.trim().is_empty() {
        return Err(AppError::Validation("Answer cannot be empty".to_string()));
    }
    Ok(())
}

fn rating_from_value(value: &Value) -> Option<i32> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    Some((raw.round() as i32).clamp(MIN_RATING, MAX_RATING))
}

/// Parses the model's `{rating, feedback}` reply.
/// Anything unusable falls back to a neutral score instead of failing the save.
pub fn parse_answer_score(text: &str) -> AnswerScore {
    let cleaned = strip_json_fences(text);
    let parsed: Value = match serde_json::from_str(cleaned) {
        Ok(v) => v,
        Err(e) => {
            warn!("Answer feedback was not valid JSON, using fallback: {e}");
            return AnswerScore::fallback();
        }
    };

    let rating = parsed.get("rating").and_then(rating_from_value);
    let feedback = parsed
        .get("feedback")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|f| !f.is_empty());

    match (rating, feedback) {
        (Some(rating), Some(feedback)) => AnswerScore {
            rating,
            feedback: feedback.to_string(),
        },
        _ => {
            warn!("Answer feedback missing rating or feedback, using fallback");
            AnswerScore::fallback()
        }
    }
}

/// Asks the LLM to grade one answer against the rubric.
pub async fn score_answer(
    llm: &dyn ChatCompletion,
    question: &str,
    answer: &str,
) -> Result<AnswerScore, AppError> {
    validate_answer(answer)?;

    let prompt = ANSWER_FEEDBACK_PROMPT
        .replace("{question}", question.trim())
        .replace("{answer}", answer.trim());
    let messages = [
        ChatMessage::system(ANSWER_FEEDBACK_SYSTEM),
        ChatMessage::user(prompt),
    ];

    let reply = llm
        .complete_text(&messages)
        .await
        .map_err(|e| AppError::llm("Failed to generate feedback", e))?;

    Ok(parse_answer_score(&reply))
}

/// Marks the session as attempted and returns it.
pub async fn start_interview(
    store: &dyn SessionStore,
    caller: &Caller,
    session_id: Uuid,
) -> Result<InterviewSessionRow, AppError> {
    check_interview_access(store, session_id, caller).await?;

    let session = store
        .mark_attempted(session_id)
        .await
        .map_err(|e| AppError::failed("Failed to start interview", e))?
        .ok_or_else(|| AppError::NotFound("Interview session not found".to_string()))?;

    info!("Interview session {session_id} started");
    Ok(session)
}

/// Validates, scores (if needed) and appends one answer to the transcript.
///
/// Input is validated before any lookup or LLM call.
pub async fn save_answer(
    store: &dyn SessionStore,
    llm: &dyn ChatCompletion,
    caller: &Caller,
    session_id: Uuid,
    request: SaveAnswerRequest,
) -> Result<TranscriptEntry, AppError> {
    validate_answer(&request.user_answer)?;
    if request.question_id.trim().is_empty() {
        return Err(AppError::Validation(
            "question_id cannot be empty".to_string(),
        ));
    }
    if let Some(rating) = request.rating {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::Validation(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }
    }

    check_interview_access(store, session_id, caller).await?;

    let (rating, feedback) = match (request.rating, request.feedback) {
        (Some(rating), feedback) => (Some(rating), feedback.unwrap_or_default()),
        // Feedback without a rating is stored as unrated; it scores 0 on completion.
        (None, Some(feedback)) => (None, feedback),
        (None, None) => {
            let score = score_answer(llm, &request.question, &request.user_answer).await?;
            (Some(score.rating), score.feedback)
        }
    };

    let entry = TranscriptEntry {
        question_id: request.question_id,
        question: request.question,
        user_answer: request.user_answer.trim().to_string(),
        correct_answer: request.correct_answer,
        feedback,
        rating,
        timestamp: Utc::now(),
    };

    let appended = store
        .append_entry(session_id, &entry)
        .await
        .map_err(|e| AppError::failed("Failed to save answer", e))?;
    if !appended {
        return Err(AppError::NotFound(
            "Interview session not found".to_string(),
        ));
    }

    info!(
        "Saved answer to {} for session {session_id} (rating {:?})",
        entry.question_id, entry.rating
    );
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::applicant;
    use crate::interview::store::testing::MemorySessionStore;
    use crate::llm_client::testing::ScriptedChat;

    fn request(answer: &str) -> SaveAnswerRequest {
        SaveAnswerRequest {
            question_id: "q1".to_string(),
            question: "Explain borrowing.".to_string(),
            user_answer: answer.to_string(),
            correct_answer: "References without ownership transfer.".to_string(),
            feedback: None,
            rating: None,
        }
    }

    #[test]
    fn test_parse_fenced_score() {
        let text = "```json\n{\"rating\": 8, \"feedback\": \"Clear and correct.\"}\n```";
        assert_eq!(
            parse_answer_score(text),
            AnswerScore {
                rating: 8,
                feedback: "Clear and correct.".to_string()
            }
        );
    }

    #[test]
    fn test_parse_malformed_falls_back() {
        let score = parse_answer_score("The candidate did well, I'd say 8/10.");
        assert_eq!(score.rating, FALLBACK_RATING);
        assert_eq!(score.feedback, FALLBACK_FEEDBACK);
    }

    #[test]
    fn test_parse_missing_feedback_falls_back() {
        assert_eq!(parse_answer_score(r#"{"rating": 9}"#), AnswerScore::fallback());
    }

    #[test]
    fn test_parse_clamps_and_accepts_numeric_strings() {
        assert_eq!(parse_answer_score(r#"{"rating": 14, "feedback": "x"}"#).rating, 10);
        assert_eq!(parse_answer_score(r#"{"rating": 0, "feedback": "x"}"#).rating, 1);
        assert_eq!(parse_answer_score(r#"{"rating": "7", "feedback": "x"}"#).rating, 7);
        assert_eq!(parse_answer_score(r#"{"rating": 6.6, "feedback": "x"}"#).rating, 7);
    }

    #[test]
    fn test_validate_answer_rejects_whitespace() {
        assert!(validate_answer("").is_err());
        assert!(validate_answer(" \n\t ").is_err());
        assert!(validate_answer("ownership").is_ok());
    }

    #[tokio::test]
    async fn test_blank_answer_makes_no_calls() {
        let store = MemorySessionStore::new();
        let seeded = store.seed(vec![]);
        let llm = ScriptedChat::replying(r#"{"rating": 8, "feedback": "ok"}"#);

        let err = save_answer(
            &store,
            &llm,
            &applicant(seeded.applicant_id),
            seeded.session_id,
            request("   "),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(llm.calls(), 0);
        assert!(store.session(seeded.session_id).unwrap().transcript.0.is_empty());
    }

    #[tokio::test]
    async fn test_save_answer_scores_and_appends() {
        let store = MemorySessionStore::new();
        let seeded = store.seed(vec![]);
        let llm = ScriptedChat::replying(r#"{"rating": 8, "feedback": "Good use of examples."}"#);

        let entry = save_answer(
            &store,
            &llm,
            &applicant(seeded.applicant_id),
            seeded.session_id,
            request("  Borrowing lends a reference.  "),
        )
        .await
        .unwrap();

        assert_eq!(entry.rating, Some(8));
        assert_eq!(entry.user_answer, "Borrowing lends a reference.");
        assert_eq!(llm.calls(), 1);
        let prompt = &llm.last_messages()[1].content;
        assert!(prompt.contains("Explain borrowing."));
        assert!(prompt.contains("Borrowing lends a reference."));

        let session = store.session(seeded.session_id).unwrap();
        assert_eq!(session.transcript.0, vec![entry]);
        // Session-level aggregate is left for completion.
        assert_eq!(session.rating, None);
        assert_eq!(session.feedback, None);
    }

    #[tokio::test]
    async fn test_save_answer_with_unparseable_feedback_still_saves() {
        let store = MemorySessionStore::new();
        let seeded = store.seed(vec![]);
        let llm = ScriptedChat::replying("not json at all");

        let entry = save_answer(
            &store,
            &llm,
            &applicant(seeded.applicant_id),
            seeded.session_id,
            request("An answer"),
        )
        .await
        .unwrap();

        assert_eq!(entry.rating, Some(FALLBACK_RATING));
        assert_eq!(entry.feedback, FALLBACK_FEEDBACK);
    }

    #[tokio::test]
    async fn test_save_answer_keeps_client_scores() {
        let store = MemorySessionStore::new();
        let seeded = store.seed(vec![]);
        let llm = ScriptedChat::new(vec![]);
        let mut req = request("An answer");
        req.rating = Some(6);
        req.feedback = Some("Fine.".to_string());

        let entry = save_answer(
            &store,
            &llm,
            &applicant(seeded.applicant_id),
            seeded.session_id,
            req,
        )
        .await
        .unwrap();

        assert_eq!(entry.rating, Some(6));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_save_answer_rejects_out_of_range_rating() {
        let store = MemorySessionStore::new();
        let seeded = store.seed(vec![]);
        let llm = ScriptedChat::new(vec![]);
        let mut req = request("An answer");
        req.rating = Some(11);

        let err = save_answer(
            &store,
            &llm,
            &applicant(seeded.applicant_id),
            seeded.session_id,
            req,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_save_answer_upstream_failure_is_llm_error() {
        let store = MemorySessionStore::new();
        let seeded = store.seed(vec![]);
        let llm = ScriptedChat::new(vec![Err(503)]);

        let err = save_answer(
            &store,
            &llm,
            &applicant(seeded.applicant_id),
            seeded.session_id,
            request("An answer"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Llm { .. }));
        assert!(store.session(seeded.session_id).unwrap().transcript.0.is_empty());
    }

    #[tokio::test]
    async fn test_start_interview_marks_attempted() {
        let store = MemorySessionStore::new();
        let seeded = store.seed(vec![]);
        let session = start_interview(&store, &applicant(seeded.applicant_id), seeded.session_id)
            .await
            .unwrap();
        assert!(session.attempted);
    }
}
