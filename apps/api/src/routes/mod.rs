pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::interview::handlers as interview;
use crate::recruiting::{applications, interviews, jobs, resumes};
use crate::state::AppState;
use crate::transcription;

/// Largest accepted upload body (recorded answers, resumes): the transcription
/// provider's 25 MB file limit plus room for the other form fields.
pub const MAX_UPLOAD_BYTES: usize = 26 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview sessions
        .route(
            "/api/v1/interview-sessions/:id",
            get(interview::handle_get_session),
        )
        .route(
            "/api/v1/interview-sessions/:id/start",
            post(interview::handle_start),
        )
        .route(
            "/api/v1/interview-sessions/:id/feedback",
            post(interview::handle_feedback),
        )
        .route(
            "/api/v1/interview-sessions/:id/answers",
            post(interview::handle_save_answer),
        )
        .route(
            "/api/v1/interview-sessions/:id/complete",
            post(interview::handle_complete),
        )
        .route("/interview/:id", get(interview::handle_interview_page))
        .route(
            "/api/v1/transcribe",
            post(transcription::handle_transcribe)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        // Resume analysis
        .route(
            "/api/v1/resume-analysis",
            post(analysis::handle_analyze_text),
        )
        .route(
            "/api/v1/applications/:id/resume-analysis",
            post(analysis::handle_analyze_application)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        // Recruiting
        .route(
            "/api/v1/jobs",
            post(jobs::handle_create_job).get(jobs::handle_list_jobs),
        )
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        .route(
            "/api/v1/jobs/:id/applications",
            post(applications::handle_apply),
        )
        .route(
            "/api/v1/applications/:id",
            get(applications::handle_get_application),
        )
        .route(
            "/api/v1/applications/:id/status",
            patch(applications::handle_update_status),
        )
        .route(
            "/api/v1/resumes",
            post(resumes::handle_create_resume).get(resumes::handle_list_resumes),
        )
        .route(
            "/api/v1/resumes/:id/default",
            post(resumes::handle_set_default_resume),
        )
        .route("/api/v1/interviews", post(interviews::handle_create_interview))
        .route(
            "/api/v1/interviews/:id/sessions",
            post(interviews::handle_create_session),
        )
        .with_state(state)
}
