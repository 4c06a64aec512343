//! Input documents: resume text extraction and job-description normalization.

use thiserror::Error;
use tracing::{debug, warn};

/// Job descriptions shorter than this many tokens are treated as absent.
pub const MIN_JD_TOKENS: usize = 20;

/// Literal placeholders people paste when there is no vacancy text.
const JD_NULL_MARKERS: &[&str] = &["n/a", "na", "none"];

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to extract text from PDF: {0}")]
    Pdf(String),

    #[error("Document contains no extractable text")]
    Empty,
}

/// Extracts plain text from an in-memory PDF and normalizes its whitespace.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let raw = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
        warn!("PDF extraction failed: {e}");
        DocumentError::Pdf(e.to_string())
    })?;

    let text = normalize_whitespace(&raw);
    debug!(
        "Extracted {} chars of resume text from {} byte PDF",
        text.len(),
        bytes.len()
    );

    if text.is_empty() {
        return Err(DocumentError::Empty);
    }
    Ok(text)
}

/// Collapses every run of whitespace inside a line to a single space and drops
/// lines that end up blank.
pub fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// True when the job description should be treated as missing: blank, a null
/// marker such as "N/A", or fewer than [`MIN_JD_TOKENS`] tokens.
pub fn is_job_description_empty(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }

    let lowered = trimmed.to_lowercase();
    if JD_NULL_MARKERS.contains(&lowered.as_str()) {
        return true;
    }

    lowered.replace('\n', " ").split_whitespace().count() < MIN_JD_TOKENS
}

/// The JD as the prompt builder should see it: unchanged, or "" when absent.
pub fn normalize_job_description(text: &str) -> &str {
    if is_job_description_empty(text) {
        ""
    } else {
        text
    }
}

/// Truncates to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_short_jd_is_empty() {
        assert!(is_job_description_empty(
            "Backend engineer, 3+ years, Python, PostgreSQL"
        ));
    }

    #[test]
    fn test_blank_and_null_markers_are_empty() {
        assert!(is_job_description_empty(""));
        assert!(is_job_description_empty("   \n\t "));
        assert!(is_job_description_empty("N/A"));
        assert!(is_job_description_empty("  None "));
        assert!(is_job_description_empty("na"));
    }

    #[test]
    fn test_twenty_five_words_is_present() {
        assert!(!is_job_description_empty(&filler(25)));
    }

    #[test]
    fn test_token_threshold_boundary() {
        assert!(is_job_description_empty(&filler(MIN_JD_TOKENS - 1)));
        assert!(!is_job_description_empty(&filler(MIN_JD_TOKENS)));
    }

    #[test]
    fn test_newlines_count_as_token_separators() {
        let jd = vec!["word"; 20].join("\n");
        assert!(!is_job_description_empty(&jd));
    }

    #[test]
    fn test_normalize_job_description_blanks_short_text() {
        assert_eq!(normalize_job_description("Rust dev"), "");
        let long = filler(30);
        assert_eq!(normalize_job_description(&long), long);
    }

    #[test]
    fn test_normalize_whitespace_collapses_runs_and_drops_blank_lines() {
        let raw = "  John   Doe \n\n\t\nSenior\t\tEngineer  \n   \nRust,   Go";
        assert_eq!(
            normalize_whitespace(raw),
            "John Doe\nSenior Engineer\nRust, Go"
        );
    }

    #[test]
    fn test_truncate_chars_respects_code_points() {
        let text = "Привет мир";
        assert_eq!(truncate_chars(text, 6), "Привет");
        assert_eq!(truncate_chars(text, 100), text);
    }
}
