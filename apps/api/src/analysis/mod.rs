//! Resume ATS analysis: prompt selection, the LLM call, and result parsing.
//! Results are not cached; every request calls the model.

pub mod extract;
pub mod handlers;
pub mod parser;
pub mod prompts;

use tracing::info;

use crate::errors::AppError;
use crate::llm_client::{ChatCompletion, ChatCompletionResponse};

use self::parser::{parse_analysis, ResumeAnalysis};
use self::prompts::build_analysis_messages;

/// Sends the resume to the model and returns the raw completion envelope.
pub async fn request_analysis(
    llm: &dyn ChatCompletion,
    resume_text: &str,
    job_profile: Option<&str>,
) -> Result<ChatCompletionResponse, AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "Resume text cannot be empty".to_string(),
        ));
    }

    let messages = build_analysis_messages(resume_text, job_profile);
    let response = llm
        .complete(&messages)
        .await
        .map_err(|e| AppError::llm("Failed to analyze resume", e))?;

    info!(
        "Resume analysis completed ({} chars, job profile: {})",
        resume_text.len(),
        job_profile.is_some_and(|p| !p.trim().is_empty())
    );
    Ok(response)
}

/// Full analysis: model call, cleanup and normalization.
pub async fn analyze_resume(
    llm: &dyn ChatCompletion,
    resume_text: &str,
    job_profile: Option<&str>,
) -> Result<ResumeAnalysis, AppError> {
    let response = request_analysis(llm, resume_text, job_profile).await?;
    let content = response.content().ok_or_else(|| {
        AppError::UnprocessableEntity("Failed to parse analysis results".to_string())
    })?;
    parse_analysis(content)
}
