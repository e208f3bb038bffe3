//! Turns the model's free-text analysis into a `ResumeAnalysis`.
//!
//! Models return loosely shaped JSON: scores as numbers or strings, strengths
//! as a sentence or a list. Everything is normalized to display values here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::llm_client::extract_json_object;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    /// Display percentage, e.g. "85%".
    pub score: String,
    pub strength: String,
    pub weakness: String,
    pub keywords: Vec<String>,
}

pub fn parse_analysis(text: &str) -> Result<ResumeAnalysis, AppError> {
    let cleaned = extract_json_object(text);
    let value: Value = serde_json::from_str(cleaned).map_err(|e| {
        tracing::warn!("Resume analysis was not valid JSON: {e}");
        AppError::UnprocessableEntity("Failed to parse analysis results".to_string())
    })?;
    if !value.is_object() {
        return Err(AppError::UnprocessableEntity(
            "Failed to parse analysis results".to_string(),
        ));
    }

    Ok(ResumeAnalysis {
        score: display_score(value.get("score")),
        strength: display_text(value.get("strength")),
        weakness: display_text(value.get("weakness")),
        keywords: normalize_keywords(value.get("keywords")),
    })
}

fn display_score(value: Option<&Value>) -> String {
    let raw = match value {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().to_string(),
        _ => String::new(),
    };
    if raw.is_empty() {
        return "0%".to_string();
    }
    format!("{raw}%")
}

fn display_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Arrays keep their string elements, a bare string becomes a one-element
/// list, anything else becomes empty.
pub fn normalize_keywords(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}
