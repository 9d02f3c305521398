//! Structural validation and statistics for question records.
//!
//! Validation only reports. The assembler renders whatever is present.

use crate::{QuestionKind, QuestionRecord, SlideType};
use serde::Serialize;

/// Counts gathered while validating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordStats {
    pub total_questions: usize,
    pub total_slides: usize,
    pub questions_with_answers: usize,
    pub questions_with_options: usize,
    pub questions_with_tables: usize,
    pub questions_with_diagrams: usize,
    pub passage_based: usize,
}

/// Outcome of validating a record list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<String>,
    pub stats: RecordStats,
}

impl ValidationReport {
    /// True when no structural issues were found.
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check every record for missing structure and collect statistics.
pub fn validate_records(records: &[QuestionRecord]) -> ValidationReport {
    let mut report = ValidationReport::default();
    report.stats.total_questions = records.len();

    for (i, record) in records.iter().enumerate() {
        let idx = i + 1;

        if record.number.is_none() {
            report.issues.push(format!("Question {}: Missing question_number", idx));
        }
        if record.kind.is_none() {
            report.issues.push(format!("Question {}: Missing question_type", idx));
        }
        let Some(slides) = &record.slides else {
            report.issues.push(format!("Question {}: Missing slides", idx));
            continue;
        };

        report.stats.total_slides += slides.len();

        let mut has_answer = false;
        let mut has_options = false;
        let mut has_table = false;
        let mut has_diagram = false;

        for (j, slide) in slides.iter().enumerate() {
            match slide.slide_type {
                None => report
                    .issues
                    .push(format!("Question {}, slide {}: Missing slide_type", idx, j + 1)),
                Some(SlideType::Unknown) => report
                    .issues
                    .push(format!("Question {}, slide {}: Unknown slide_type", idx, j + 1)),
                Some(SlideType::Answer) => has_answer = true,
                Some(_) => {}
            }

            let Some(content) = &slide.content else {
                report
                    .issues
                    .push(format!("Question {}, slide {}: Missing content", idx, j + 1));
                continue;
            };

            has_options |= !content.options.is_empty();
            has_table |= content.has_table();
            has_diagram |= content.has_diagram();
        }

        if has_answer {
            report.stats.questions_with_answers += 1;
        }
        if has_options {
            report.stats.questions_with_options += 1;
        }
        if has_table {
            report.stats.questions_with_tables += 1;
        }
        if has_diagram {
            report.stats.questions_with_diagrams += 1;
        }
        if record.kind == Some(QuestionKind::PassageBased) {
            report.stats.passage_based += 1;
        }
    }

    report
}

/// Number of slides the assembler will emit for these records.
pub fn planned_slide_count(records: &[QuestionRecord], include_answers: bool) -> usize {
    records
        .iter()
        .flat_map(|r| r.slides())
        .filter(|s| match s.slide_type {
            Some(SlideType::Question) | Some(SlideType::Passage) => true,
            Some(SlideType::Answer) => include_answers,
            Some(SlideType::Unknown) | None => false,
        })
        .count()
}
