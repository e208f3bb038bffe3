//! Plain-text extraction from uploaded resume files.

use crate::errors::AppError;

pub const PDF: &str = "application/pdf";
pub const PLAIN_TEXT: &str = "text/plain";

/// Content type for an upload, falling back to the file extension when the
/// browser sent none or a generic one.
pub fn detect_content_type(declared: Option<&str>, file_name: &str) -> String {
    let declared = declared
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");
    if let Some(ct) = declared {
        return ct;
    }
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        PDF.to_string()
    } else if lower.ends_with(".txt") {
        PLAIN_TEXT.to_string()
    } else {
        "application/octet-stream".to_string()
    }
}

pub fn extract_resume_text(data: &[u8], content_type: &str) -> Result<String, AppError> {
    let text = match content_type {
        PDF => pdf_extract::extract_text_from_mem(data).map_err(|e| {
            tracing::warn!("PDF extraction error: {e}");
            AppError::Validation("Could not read text from the PDF".to_string())
        })?,
        PLAIN_TEXT => String::from_utf8(data.to_vec())
            .map_err(|_| AppError::Validation("Resume text is not valid UTF-8".to_string()))?,
        other => {
            return Err(AppError::Validation(format!(
                "Unsupported resume format '{other}'. Upload a PDF or plain text file."
            )))
        }
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation(
            "No text could be extracted from the resume".to_string(),
        ));
    }
    Ok(text.to_string())
}
