// Resume analysis prompt templates.

use crate::llm_client::ChatMessage;

pub const ATS_SYSTEM: &str = "\
You are an Applicant Tracking System (ATS) and senior technical recruiter. \
You evaluate resumes the way automated screening software and hiring managers do. \
You MUST respond with a single valid JSON object only.";

/// General ATS review. Replace `{resume_text}` before sending.
pub const GENERAL_ATS_PROMPT: &str = r#"Analyze the resume below for ATS compatibility and overall quality.

RESUME:
{resume_text}

Consider: section structure, parsability, use of measurable impact, action verbs,
skills coverage, consistency of dates and formatting.

Return exactly this JSON object:
{
  "score": <integer 0-100, overall ATS score>,
  "strength": ["<strength>", "..."],
  "weakness": ["<weakness or missing element>", "..."],
  "keywords": ["<important keyword found or recommended>", "..."]
}"#;

/// Resume vs job-profile match. Replace `{resume_text}` and `{job_profile}` before sending.
pub const JOB_MATCH_PROMPT: &str = r#"Compare the resume below against the job profile and score how well the candidate matches.

JOB PROFILE:
{job_profile}

RESUME:
{resume_text}

Consider: required skills present, relevant experience, seniority fit, and
keywords from the job profile that the resume is missing.

Return exactly this JSON object:
{
  "score": <integer 0-100, match percentage>,
  "strength": ["<where the candidate matches the role>", "..."],
  "weakness": ["<gap against the role>", "..."],
  "keywords": ["<job profile keyword missing from the resume>", "..."]
}"#;

/// Replaces placeholders in one left-to-right pass over the template, so text
/// inserted for one placeholder is never scanned for another.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    loop {
        let next = values
            .iter()
            .filter_map(|(key, value)| rest.find(key).map(|at| (at, *key, *value)))
            .min_by_key(|(at, _, _)| *at);
        match next {
            Some((at, key, value)) => {
                out.push_str(&rest[..at]);
                out.push_str(value);
                rest = &rest[at + key.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

/// Picks the job-match template when a non-blank job profile is given.
pub fn build_analysis_messages(resume_text: &str, job_profile: Option<&str>) -> Vec<ChatMessage> {
    let prompt = match job_profile.map(str::trim).filter(|p| !p.is_empty()) {
        Some(profile) => fill_template(
            JOB_MATCH_PROMPT,
            &[("{job_profile}", profile), ("{resume_text}", resume_text.trim())],
        ),
        None => fill_template(GENERAL_ATS_PROMPT, &[("{resume_text}", resume_text.trim())]),
    };
    vec![ChatMessage::system(ATS_SYSTEM), ChatMessage::user(prompt)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_template_without_profile() {
        let messages = build_analysis_messages("Rust developer, 5 years", None);
        assert_eq!(messages[0].role, "system");
        assert!(messages[1].content.contains("ATS compatibility"));
        assert!(messages[1].content.contains("Rust developer, 5 years"));
    }

    #[test]
    fn test_blank_profile_uses_general_template() {
        let messages = build_analysis_messages("resume", Some("   "));
        assert!(messages[1].content.contains("ATS compatibility"));
    }

    #[test]
    fn test_job_match_template_with_profile() {
        let messages = build_analysis_messages("resume body", Some("Senior Rust Engineer"));
        assert!(messages[1].content.contains("JOB PROFILE:\nSenior Rust Engineer"));
        assert!(messages[1].content.contains("resume body"));
        assert!(!messages[1].content.contains("{job_profile}"));
    }

    #[test]
    fn test_inserted_text_is_not_substituted_again() {
        let messages = build_analysis_messages("RESUME {job_profile}", Some("Role {resume_text}"));
        let content = &messages[1].content;
        assert!(content.contains("JOB PROFILE:\nRole {resume_text}"));
        assert!(content.contains("RESUME:\nRESUME {job_profile}"));
        assert_eq!(content.matches("RESUME {job_profile}").count(), 1);
    }
}
