//! Splitting text blocks into paragraphs and styled runs.
//!
//! Lines that open with a question or answer label ("Q3", "Ans5") get the
//! label as a bold run with a canonical ". " separator, followed by the rest
//! of the line at the block's normal weight.

use crate::deck::{Paragraph, TextRun, TextStyle};
use regex::Regex;
use std::sync::LazyLock;

/// Matches a trimmed line starting with `Q<digits>` or `Ans<digits>`.
static LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(Q[0-9]+|Ans[0-9]+)(.*)$").unwrap());

/// Separator placed between a label and its text.
const LABEL_SEPARATOR: &str = ". ";

/// Placeholder run text for blank lines so they keep their height.
const BLANK_LINE: &str = " ";

/// Formatter turning a text block into paragraphs of runs.
#[derive(Debug, Clone)]
pub struct RunFormatter {
    /// Space after every paragraph except the last, in points.
    paragraph_spacing_pt: f64,
}

impl Default for RunFormatter {
    fn default() -> Self {
        Self {
            paragraph_spacing_pt: 8.0,
        }
    }
}

impl RunFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paragraph_spacing(mut self, points: f64) -> Self {
        self.paragraph_spacing_pt = points;
        self
    }

    /// Format a block. Produces exactly one paragraph per `\n`-separated line.
    pub fn format(&self, text: &str, style: &TextStyle) -> Vec<Paragraph> {
        let lines: Vec<&str> = text.split('\n').collect();
        let last = lines.len() - 1;

        lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let line = line.strip_suffix('\r').unwrap_or(line);
                Paragraph {
                    runs: self.format_line(line, style),
                    alignment: style.alignment,
                    space_after_pt: (i < last).then_some(self.paragraph_spacing_pt),
                }
            })
            .collect()
    }

    fn format_line(&self, line: &str, style: &TextStyle) -> Vec<TextRun> {
        if let Some((label, rest)) = split_label(line) {
            let mut runs = vec![TextRun {
                text: format!("{}{}", label, LABEL_SEPARATOR),
                style: style.clone().with_bold(true),
            }];
            if !rest.is_empty() {
                runs.push(TextRun {
                    text: rest.to_string(),
                    style: style.clone(),
                });
            }
            return runs;
        }

        let text = if line.trim().is_empty() { BLANK_LINE } else { line };
        vec![TextRun {
            text: text.to_string(),
            style: style.clone(),
        }]
    }
}

/// Split a numbered-label line into its label and the text after any
/// separator. Leading periods and whitespace after the label are consumed.
pub fn split_label(line: &str) -> Option<(&str, &str)> {
    let caps = LABEL_REGEX.captures(line.trim())?;
    let label = caps.get(1)?.as_str();
    let rest = caps.get(2).map(|m| m.as_str()).unwrap_or("").trim();
    let rest = rest.trim_start_matches('.').trim();
    Some((label, rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{Alignment, Rgb};

    fn style() -> TextStyle {
        TextStyle {
            font: "Test Sans".to_string(),
            size_pt: 25.0,
            bold: false,
            color: Rgb::BLACK,
            alignment: Alignment::Left,
        }
    }

    fn texts(paragraph: &Paragraph) -> Vec<&str> {
        paragraph.runs.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn test_split_label_variants() {
        assert_eq!(split_label("Q3 text"), Some(("Q3", "text")));
        assert_eq!(split_label("Q3. text"), Some(("Q3", "text")));
        assert_eq!(split_label("Q3text"), Some(("Q3", "text")));
        assert_eq!(split_label("  Q12.   text  "), Some(("Q12", "text")));
        assert_eq!(split_label("Ans5. 4"), Some(("Ans5", "4")));
        assert_eq!(split_label("Q1"), Some(("Q1", "")));
    }

    #[test]
    fn test_split_label_rejects_non_labels() {
        assert_eq!(split_label("Question 1"), None);
        assert_eq!(split_label("Q"), None);
        assert_eq!(split_label("Answer 4"), None);
        assert_eq!(split_label("Ans"), None);
        assert_eq!(split_label("a) Q1"), None);
        assert_eq!(split_label("q1 lower"), None);
    }

    #[test]
    fn test_label_runs_are_canonical() {
        let formatter = RunFormatter::new();
        for input in ["Q3 text", "Q3. text", "Q3text", "Q3 . text"] {
            let paragraphs = formatter.format(input, &style());
            assert_eq!(texts(&paragraphs[0]), vec!["Q3. ", "text"], "input {:?}", input);
            assert!(paragraphs[0].runs[0].style.bold);
            assert!(!paragraphs[0].runs[1].style.bold);
        }
    }

    #[test]
    fn test_label_without_text_has_one_run() {
        let paragraphs = RunFormatter::new().format("Ans2.", &style());
        assert_eq!(texts(&paragraphs[0]), vec!["Ans2. "]);
    }

    #[test]
    fn test_label_keeps_default_weight_for_body() {
        let bold = style().with_bold(true);
        let paragraphs = RunFormatter::new().format("Q1. hi", &bold);
        assert!(paragraphs[0].runs[1].style.bold);
    }

    #[test]
    fn test_plain_line_is_single_run() {
        let paragraphs = RunFormatter::new().format("  a) three", &style());
        assert_eq!(texts(&paragraphs[0]), vec!["  a) three"]);
        assert_eq!(paragraphs[0].runs[0].style, style());
    }

    #[test]
    fn test_paragraph_count_matches_line_breaks() {
        let formatter = RunFormatter::new();
        for text in ["", "one", "one\ntwo", "one\n\nthree", "\n\n\n", "a\r\nb\r\n"] {
            let breaks = text.matches('\n').count();
            assert_eq!(formatter.format(text, &style()).len(), breaks + 1, "text {:?}", text);
        }
    }

    #[test]
    fn test_blank_lines_keep_placeholder() {
        let paragraphs = RunFormatter::new().format("one\n\n   \nfour", &style());
        assert_eq!(texts(&paragraphs[1]), vec![" "]);
        assert_eq!(texts(&paragraphs[2]), vec![" "]);
        assert_eq!(texts(&paragraphs[3]), vec!["four"]);
    }

    #[test]
    fn test_carriage_returns_are_stripped() {
        let paragraphs = RunFormatter::new().format("one\r\ntwo", &style());
        assert_eq!(texts(&paragraphs[0]), vec!["one"]);
    }

    #[test]
    fn test_last_paragraph_has_no_spacing() {
        let paragraphs = RunFormatter::new().format("a\nb\nc", &style());
        assert_eq!(paragraphs[0].space_after_pt, Some(8.0));
        assert_eq!(paragraphs[1].space_after_pt, Some(8.0));
        assert_eq!(paragraphs[2].space_after_pt, None);

        let single = RunFormatter::new().with_paragraph_spacing(4.0).format("a", &style());
        assert_eq!(single[0].space_after_pt, None);
    }

    #[test]
    fn test_alignment_comes_from_style() {
        let centered = style().with_alignment(Alignment::Center);
        let paragraphs = RunFormatter::new().format("x", &centered);
        assert_eq!(paragraphs[0].alignment, Alignment::Center);
    }
}
