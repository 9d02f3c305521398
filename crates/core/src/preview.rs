//! Human-readable preview of parsed question records.
//!
//! Produces a plain text report so a reviewer can skim what the deck will
//! contain before opening it.

use crate::{QuestionRecord, SlideType};
use std::fmt::Write;

const BANNER_WIDTH: usize = 60;

/// Formatter for the plain text preview report.
#[derive(Debug, Clone)]
pub struct PreviewFormatter {
    passage_len: usize,
    question_len: usize,
    option_len: usize,
    options_shown: usize,
    diagram_len: usize,
    answer_len: usize,
}

impl Default for PreviewFormatter {
    fn default() -> Self {
        Self {
            passage_len: 200,
            question_len: 150,
            option_len: 80,
            options_shown: 2,
            diagram_len: 100,
            answer_len: 150,
        }
    }
}

impl PreviewFormatter {
    /// Create a formatter with the default truncation lengths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the report.
    ///
    /// # Example output
    /// ```text
    /// Q1 (MULTIPLE_CHOICE)
    /// ------------------------------------------------------------
    ///
    ///   Slide 1: QUESTION
    ///     Question: What is 2+2?
    ///     Options: 2 options
    ///       - a) 3
    ///       - b) 4
    /// ```
    pub fn format(&self, records: &[QuestionRecord]) -> String {
        let mut out = String::new();
        let rule = "=".repeat(BANNER_WIDTH);

        // Writing to a String cannot fail.
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "PARSED QUESTIONS PREVIEW");
        let _ = writeln!(out, "{}\n", rule);

        for record in records {
            self.format_record(&mut out, record);
        }

        out
    }

    fn format_record(&self, out: &mut String, record: &QuestionRecord) {
        let kind = record.kind.map(|k| k.as_str()).unwrap_or("unknown");
        let _ = writeln!(out, "\n{} ({})", record.label(), kind.to_uppercase());
        let _ = writeln!(out, "{}", "-".repeat(BANNER_WIDTH));

        for (idx, slide) in record.slides().iter().enumerate() {
            let slide_type = slide.slide_type.unwrap_or(SlideType::Unknown);
            let _ = writeln!(out, "\n  Slide {}: {}", idx + 1, slide_type.as_str().to_uppercase());

            let content = slide.content();
            match slide_type {
                SlideType::Passage => {
                    let _ = writeln!(out, "    Passage: {}", truncate(&content.passage, self.passage_len));
                }
                SlideType::Question => {
                    let _ = writeln!(
                        out,
                        "    Question: {}",
                        truncate(&content.question_text, self.question_len)
                    );

                    if !content.options.is_empty() {
                        let _ = writeln!(out, "    Options: {} options", content.options.len());
                        for option in content.options.iter().take(self.options_shown) {
                            let _ = writeln!(out, "      - {}", truncate(option, self.option_len));
                        }
                    }

                    if let Some(table) = &content.table {
                        let _ = writeln!(
                            out,
                            "    Table: {} columns, {} rows",
                            table.headers.len(),
                            table.rows.len()
                        );
                    }

                    if let Some(diagram) = content.diagram_description.as_deref().filter(|d| !d.is_empty()) {
                        let _ = writeln!(out, "    Diagram: {}", truncate(diagram, self.diagram_len));
                    }
                }
                SlideType::Answer => {
                    let _ = writeln!(out, "    Answer: {}", truncate(&content.answer_text, self.answer_len));
                }
                SlideType::Unknown => {}
            }
        }

        out.push('\n');
    }
}

/// Cut `text` to `max` characters, appending "..." when shortened.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}
