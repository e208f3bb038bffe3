//! Session access gate.
//!
//! A session is visible to the applicant whose application it belongs to and
//! to the recruiter who owns its interview. Nobody else.

use axum::response::Redirect;
use tracing::warn;
use uuid::Uuid;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::interview::store::SessionStore;
use crate::models::interview::InterviewSessionDetail;

/// Loads a session with its interview and application joined.
pub async fn get_interview_session(
    store: &dyn SessionStore,
    session_id: Uuid,
) -> Result<InterviewSessionDetail, AppError> {
    match store.find_detail(session_id).await {
        Ok(Some(detail)) => Ok(detail),
        Ok(None) => Err(AppError::NotFound(
            "Interview session not found".to_string(),
        )),
        Err(e) => Err(AppError::failed("Failed to verify access", e)),
    }
}

pub fn is_session_owner(detail: &InterviewSessionDetail, caller: &Caller) -> bool {
    caller.applicant_id() == Some(detail.application.applicant_id)
        || caller.recruiter_id() == Some(detail.interview.recruiter_id)
}

/// Loads the session and checks the caller may act on it.
pub async fn check_interview_access(
    store: &dyn SessionStore,
    session_id: Uuid,
    caller: &Caller,
) -> Result<InterviewSessionDetail, AppError> {
    let detail = get_interview_session(store, session_id).await?;
    if !is_session_owner(&detail, caller) {
        warn!(
            "Denied interview session {session_id} to {} ({:?})",
            caller.0.sub, caller.0.role
        );
        return Err(AppError::Forbidden);
    }
    Ok(detail)
}

/// Why a protected interview page turned the caller away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateFailure {
    Unauthenticated,
    SessionNotFound,
    AccessDenied,
    VerificationFailed,
}

impl GateFailure {
    pub fn code(&self) -> &'static str {
        match self {
            GateFailure::Unauthenticated => "unauthenticated",
            GateFailure::SessionNotFound => "session_not_found",
            GateFailure::AccessDenied => "access_denied",
            GateFailure::VerificationFailed => "verification_failed",
        }
    }

    fn from_error(err: &AppError) -> Self {
        match err {
            AppError::NotFound(_) => GateFailure::SessionNotFound,
            AppError::Forbidden => GateFailure::AccessDenied,
            AppError::Unauthorized => GateFailure::Unauthenticated,
            _ => GateFailure::VerificationFailed,
        }
    }

    pub fn redirect(&self, dashboard_url: &str) -> Redirect {
        Redirect::to(&format!("{dashboard_url}?error={}", self.code()))
    }
}

/// Redirecting variant of `check_interview_access` for page routes.
pub async fn protect_interview_route(
    store: &dyn SessionStore,
    dashboard_url: &str,
    caller: Option<&Caller>,
    session_id: Uuid,
) -> Result<InterviewSessionDetail, Redirect> {
    let Some(caller) = caller else {
        return Err(GateFailure::Unauthenticated.redirect(dashboard_url));
    };
    check_interview_access(store, session_id, caller)
        .await
        .map_err(|e| {
            let failure = GateFailure::from_error(&e);
            if failure == GateFailure::VerificationFailed {
                tracing::error!("Interview gate failed for {session_id}: {e}");
            }
            failure.redirect(dashboard_url)
        })
}
