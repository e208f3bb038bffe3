//! Axum route handlers for interview sessions.

use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::interview::capture::{
    save_answer, score_answer, start_interview, validate_answer, AnswerScore, SaveAnswerRequest,
};
use crate::interview::completion::complete_interview;
use crate::interview::gate::{check_interview_access, protect_interview_route};
use crate::models::interview::{InterviewSessionDetail, InterviewSessionRow, TranscriptEntry};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: InterviewSessionDetail,
}

#[derive(Debug, Serialize)]
pub struct SessionUpdateResponse {
    pub success: bool,
    pub session: InterviewSessionRow,
}

#[derive(Debug, Serialize)]
pub struct SaveAnswerResponse {
    pub success: bool,
    pub entry: TranscriptEntry,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub question: String,
    pub answer: String,
}

/// GET /api/v1/interview-sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    caller: Caller,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = check_interview_access(state.sessions.as_ref(), session_id, &caller).await?;
    Ok(Json(SessionResponse { session }))
}

/// POST /api/v1/interview-sessions/:id/start
pub async fn handle_start(
    State(state): State<AppState>,
    caller: Caller,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionUpdateResponse>, AppError> {
    let session = start_interview(state.sessions.as_ref(), &caller, session_id).await?;
    Ok(Json(SessionUpdateResponse {
        success: true,
        session,
    }))
}

/// POST /api/v1/interview-sessions/:id/feedback
///
/// Grades an answer without saving it, so the candidate can review before saving.
pub async fn handle_feedback(
    State(state): State<AppState>,
    caller: Caller,
    Path(session_id): Path<Uuid>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<AnswerScore>, AppError> {
    validate_answer(&request.answer)?;
    check_interview_access(state.sessions.as_ref(), session_id, &caller).await?;
    let score = score_answer(state.llm.as_ref(), &request.question, &request.answer).await?;
    Ok(Json(score))
}

/// POST /api/v1/interview-sessions/:id/answers
pub async fn handle_save_answer(
    State(state): State<AppState>,
    caller: Caller,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SaveAnswerRequest>,
) -> Result<Json<SaveAnswerResponse>, AppError> {
    let entry = save_answer(
        state.sessions.as_ref(),
        state.llm.as_ref(),
        &caller,
        session_id,
        request,
    )
    .await?;
    Ok(Json(SaveAnswerResponse {
        success: true,
        entry,
    }))
}

/// POST /api/v1/interview-sessions/:id/complete
pub async fn handle_complete(
    State(state): State<AppState>,
    caller: Caller,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionUpdateResponse>, AppError> {
    let session = complete_interview(state.sessions.as_ref(), &caller, session_id).await?;
    Ok(Json(SessionUpdateResponse {
        success: true,
        session,
    }))
}

/// GET /interview/:id
///
/// Page payload for the interview room. Failures redirect to the dashboard.
pub async fn handle_interview_page(
    State(state): State<AppState>,
    caller: Option<Caller>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, Redirect> {
    let session = protect_interview_route(
        state.sessions.as_ref(),
        &state.config.dashboard_url,
        caller.as_ref(),
        session_id,
    )
    .await?;
    Ok(Json(SessionResponse { session }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::auth::testing::applicant_token;
    use crate::config::Config;
    use crate::interview::store::testing::{MemorySessionStore, Seeded};
    use crate::llm_client::testing::ScriptedChat;
    use crate::routes::build_router;
    use crate::state::AppState;

    fn setup(replies: Vec<Result<String, u16>>) -> (axum::Router, Arc<MemorySessionStore>, Seeded, String) {
        let store = Arc::new(MemorySessionStore::new());
        let seeded = store.seed(vec![]);
        let state = AppState::for_tests(store.clone(), Arc::new(ScriptedChat::new(replies)));
        let token = applicant_token(&Config::for_tests().identity_secret, seeded.applicant_id);
        (build_router(state), store, seeded, token)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, token: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::COOKIE, format!("identity={token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let (app, _, seeded, _) = setup(vec![]);
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/interview-sessions/{}", seeded.session_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_session_returns_not_found_message() {
        let (app, _, _, token) = setup(vec![]);
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/interview-sessions/{}", uuid::Uuid::new_v4()))
                    .header(header::COOKIE, format!("identity={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Interview session not found");
    }

    #[tokio::test]
    async fn test_answer_then_complete_flow() {
        let (app, store, seeded, token) = setup(vec![
            Ok(r#"{"rating": 8, "feedback": "Solid."}"#.to_string()),
            Ok("```json\n{\"rating\": 6, \"feedback\": \"Partial.\"}\n```".to_string()),
        ]);
        let base = format!("/api/v1/interview-sessions/{}", seeded.session_id);

        for (qid, answer) in [("q1", "First answer"), ("q2", "Second answer")] {
            let response = app
                .clone()
                .oneshot(post_json(
                    &format!("{base}/answers"),
                    &token,
                    json!({"question_id": qid, "question": "Why?", "user_answer": answer}),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_json(response).await["success"], true);
        }

        let response = app
            .oneshot(post_json(&format!("{base}/complete"), &token, json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["session"]["rating"], 7);
        assert_eq!(body["session"]["attempted"], true);
        assert_eq!(store.session(seeded.session_id).unwrap().transcript.0.len(), 2);
    }

    #[tokio::test]
    async fn test_complete_without_answers_is_bad_request() {
        let (app, store, seeded, token) = setup(vec![]);
        let response = app
            .oneshot(post_json(
                &format!("/api/v1/interview-sessions/{}/complete", seeded.session_id),
                &token,
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!store.session(seeded.session_id).unwrap().attempted);
    }

    #[tokio::test]
    async fn test_interview_page_redirects_anonymous_caller() {
        let (app, _, seeded, _) = setup(vec![]);
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/interview/{}", seeded.session_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/dashboard?error=unauthenticated"
        );
    }
}
