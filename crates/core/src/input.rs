//! Loading question records from the parser's JSON output.

use crate::{Error, QuestionRecord, Result};
use std::path::Path;

/// Parse a JSON array of question records.
///
/// Text wrapped in a markdown code fence (```` ```json ```` or a bare
/// ```` ``` ````) is unwrapped first.
pub fn parse_records(text: &str) -> Result<Vec<QuestionRecord>> {
    let body = strip_code_fence(text);
    let records: Vec<QuestionRecord> = serde_json::from_str(body)
        .map_err(|e| Error::InvalidInput(format!("Failed to parse JSON: {}", e)))?;

    log::debug!("Parsed {} question records", records.len());
    Ok(records)
}

/// Read and parse a records file.
pub fn load_records(path: &Path) -> Result<Vec<QuestionRecord>> {
    let text = std::fs::read_to_string(path)?;
    let records = parse_records(&text)?;
    log::info!("Loaded {} questions from {}", records.len(), path.display());
    Ok(records)
}

/// Return the body of the first markdown code fence, or the trimmed input.
fn strip_code_fence(text: &str) -> &str {
    let (start, marker_len) = match (text.find("```json"), text.find("```")) {
        (Some(pos), _) => (pos, "```json".len()),
        (None, Some(pos)) => (pos, "```".len()),
        (None, None) => return text.trim(),
    };

    let body_start = start + marker_len;
    let body = &text[body_start..];
    let end = body.find("```").unwrap_or(body.len());
    body[..end].trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_plain_array() {
        let records = parse_records(r#"[{"question_number": "Q1", "slides": []}]"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].label(), "Q1");
    }

    #[test]
    fn test_parse_json_fence() {
        let text = "Here you go:\n```json\n[{\"question_number\": \"Q2\"}]\n```\nDone";
        let records = parse_records(text).unwrap();
        assert_eq!(records[0].label(), "Q2");
    }

    #[test]
    fn test_parse_bare_fence() {
        let text = "```\n[]\n```";
        assert!(parse_records(text).unwrap().is_empty());
    }

    #[test]
    fn test_parse_numeric_scalars() {
        let text = r#"[{"question_number": 1, "slides": [
            {"slide_type": "answer", "content": {"answer_text": 4}}
        ]}]"#;
        let records = parse_records(text).unwrap();
        assert_eq!(records[0].label(), "1");
        assert_eq!(records[0].slides()[0].content().answer_text, "4");
    }

    #[test]
    fn test_strip_code_fence_without_fence() {
        assert_eq!(strip_code_fence("  [1]  "), "[1]");
    }

    #[test]
    fn test_invalid_json_is_error() {
        let err = parse_records("not json").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_load_records_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"question_number": "Q1"}}, {{"question_number": "Q2"}}]"#).unwrap();

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_records(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }
}
