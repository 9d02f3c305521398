//! Document assembly: walks question records in order, dispatches each slide
//! to its builder, and writes the finished deck without overwriting anything.

use crate::deck::Deck;
use crate::slides::{SlideBuilder, SlideLayout};
use crate::table::OptionsTablePolicy;
use crate::writer::PptxWriter;
use deck_core::{Error, QuestionRecord, Result, SlideType};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File extension of written decks.
pub const EXTENSION: &str = "pptx";

/// How many times to re-pick a name when another writer takes it first.
const MAX_CREATE_ATTEMPTS: usize = 16;

/// State owned by a single generation run.
#[derive(Debug)]
pub struct GeneratorState {
    answer_counter: u32,
    pub deck: Deck,
}

impl Default for GeneratorState {
    fn default() -> Self {
        Self {
            answer_counter: 1,
            deck: Deck::new(),
        }
    }
}

impl GeneratorState {
    /// Fresh state: empty deck, answers numbered from 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next answer number.
    pub fn next_answer_number(&mut self) -> u32 {
        let number = self.answer_counter;
        self.answer_counter += 1;
        number
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub slide_count: usize,
    pub path: PathBuf,
}

/// Assembles decks from question records.
#[derive(Debug, Clone)]
pub struct DeckAssembler {
    include_answers: bool,
    builder: SlideBuilder,
    writer: PptxWriter,
}

impl Default for DeckAssembler {
    fn default() -> Self {
        Self {
            include_answers: true,
            builder: SlideBuilder::default(),
            writer: PptxWriter::default(),
        }
    }
}

impl DeckAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether answer slides are emitted (default: true).
    pub fn with_include_answers(mut self, include: bool) -> Self {
        self.include_answers = include;
        self
    }

    pub fn with_options_policy(mut self, policy: OptionsTablePolicy) -> Self {
        self.builder = self.builder.with_options_policy(policy);
        self
    }

    pub fn with_layout(mut self, layout: SlideLayout) -> Self {
        self.builder = SlideBuilder::new(layout);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.writer = self.writer.with_title(title);
        self
    }

    /// Build the deck in memory.
    pub fn build(&self, records: &[QuestionRecord]) -> Deck {
        let mut state = GeneratorState::new();

        for record in records {
            let number = record.label();
            for slide in record.slides() {
                let content = slide.content();
                match slide.slide_type {
                    Some(SlideType::Passage) => self.builder.build_passage(&mut state, &content),
                    Some(SlideType::Question) => {
                        self.builder.build_question(&mut state, &content, number)
                    }
                    Some(SlideType::Answer) if self.include_answers => {
                        self.builder.build_answer(&mut state, &content)
                    }
                    Some(SlideType::Answer) => {}
                    Some(SlideType::Unknown) | None => {
                        log::warn!("{}: skipping slide with unknown or missing type", number);
                    }
                }
            }
        }

        log::debug!("Built {} slides from {} questions", state.deck.len(), records.len());
        state.deck
    }

    /// Build, serialize, and write to a fresh file `<dir>/<stem>[_N].pptx`.
    pub fn assemble(
        &self,
        records: &[QuestionRecord],
        output_dir: &Path,
        stem: &str,
    ) -> Result<GenerationReport> {
        log::info!(
            "Creating presentation from {} questions ({})",
            records.len(),
            if self.include_answers { "with answers" } else { "without answers" }
        );

        let deck = self.build(records);
        let bytes = self.writer.to_bytes(&deck)?;

        for _ in 0..MAX_CREATE_ATTEMPTS {
            let path = unique_output_path(output_dir, stem)?;
            match write_new_file(&path, &bytes) {
                Ok(()) => {
                    log::info!("Presentation saved to: {}", path.display());
                    return Ok(GenerationReport {
                        slide_count: deck.len(),
                        path,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    log::warn!("{} was created by someone else, picking another name", path.display());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::OutputPath(format!(
            "No free file name for '{}' in {}",
            stem,
            output_dir.display()
        )))
    }
}

/// Pick `<dir>/<stem>.pptx`, or `<dir>/<stem>_<k>.pptx` with `k` above every
/// suffix already present. Creates `dir` when missing.
pub fn unique_output_path(dir: &Path, stem: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let base = dir.join(format!("{}.{}", stem, EXTENSION));
    if !base.exists() {
        return Ok(base);
    }

    let prefix = format!("{}_", stem);
    let suffix = format!(".{}", EXTENSION);
    let highest = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            let number = name.strip_prefix(&prefix)?.strip_suffix(&suffix)?;
            if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            number.parse::<u64>().ok()
        })
        .max()
        .unwrap_or(0);

    let mut counter = highest;
    loop {
        counter = counter.checked_add(1).ok_or_else(|| {
            Error::OutputPath(format!(
                "No free suffix left for {} in {}",
                stem,
                dir.display()
            ))
        })?;
        let candidate = dir.join(format!("{}_{}.{}", stem, counter, EXTENSION));
        if !candidate.exists() {
            log::info!("Output file already exists, using: {}", candidate.display());
            return Ok(candidate);
        }
    }
}

/// Write `bytes` to a file that must not exist yet. A partial file is removed
/// if the write fails.
fn write_new_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    let result = file.write_all(bytes).and_then(|_| file.sync_all());
    if result.is_err() {
        let _ = fs::remove_file(path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PptxParser;
    use deck_core::{parse_records, ContentBlock, QuestionKind, SlideSpec, TableData};
    use std::fs::File;

    fn scenario_a() -> Vec<QuestionRecord> {
        vec![QuestionRecord::new("Q1", QuestionKind::Regular)
            .with_slide(SlideSpec::new(
                SlideType::Question,
                ContentBlock::question("What is 2+2?", &["a) 3", "b) 4"]),
            ))
            .with_slide(SlideSpec::new(SlideType::Answer, ContentBlock::answer("4")))]
    }

    fn reopen(path: &Path) -> crate::parser::ParsedDeck {
        PptxParser::new().parse(File::open(path).unwrap()).unwrap()
    }

    #[test]
    fn test_scenario_a_with_answers() {
        let dir = tempfile::tempdir().unwrap();
        let report = DeckAssembler::new().assemble(&scenario_a(), dir.path(), "deck").unwrap();

        assert_eq!(report.slide_count, 2);
        assert_eq!(report.path, dir.path().join("deck.pptx"));

        let parsed = reopen(&report.path);
        assert_eq!(parsed.slide_count(), 2);
        let question = parsed.slides[0].text();
        assert!(question.contains("Q1. What is 2+2?"));
        assert!(question.contains("a) 3"));
        assert!(question.contains("b) 4"));
        assert_eq!(parsed.slides[1].text(), "Ans1. 4");
    }

    #[test]
    fn test_scenario_b_without_answers() {
        let dir = tempfile::tempdir().unwrap();
        let report = DeckAssembler::new()
            .with_include_answers(false)
            .assemble(&scenario_a(), dir.path(), "deck")
            .unwrap();

        assert_eq!(report.slide_count, 1);
        assert_eq!(reopen(&report.path).slide_count(), 1);
    }

    #[test]
    fn test_scenario_c_passage_order() {
        let records = vec![QuestionRecord::new("Q1", QuestionKind::PassageBased)
            .with_slide(SlideSpec::new(SlideType::Passage, ContentBlock::passage("The river ran.")))
            .with_slide(SlideSpec::new(SlideType::Question, ContentBlock::question("Where?", &[])))
            .with_slide(SlideSpec::new(SlideType::Answer, ContentBlock::answer("The river")))];

        let dir = tempfile::tempdir().unwrap();
        let report = DeckAssembler::new().assemble(&records, dir.path(), "deck").unwrap();
        let parsed = reopen(&report.path);

        assert_eq!(parsed.slide_count(), 3);
        assert_eq!(parsed.slides[0].text(), "The river ran.");
        assert_eq!(parsed.slides[1].text(), "Q1. Where?");
        assert_eq!(parsed.slides[2].text(), "Ans1. The river");
    }

    #[test]
    fn test_scenario_d_options_table_suppressed() {
        let records = vec![QuestionRecord::new("Q1", QuestionKind::MultipleChoice).with_slide(
            SlideSpec::new(
                SlideType::Question,
                ContentBlock::question("Pick one", &["a) x", "b) y"])
                    .with_table(TableData::new(&["Label", "Option"], &[&["(a)", "x"], &["(b)", "y"]])),
            ),
        )];

        let deck = DeckAssembler::new().build(&records);
        assert!(deck.slides[0].table().is_none());

        let dir = tempfile::tempdir().unwrap();
        let report = DeckAssembler::new().assemble(&records, dir.path(), "deck").unwrap();
        let parsed = reopen(&report.path);
        assert_eq!(parsed.slides[0].paragraphs, vec!["Q1. Pick one", " ", "a) x", "b) y"]);
    }

    #[test]
    fn test_rendered_table_is_written() {
        let records = vec![QuestionRecord::new("Q1", QuestionKind::Regular).with_slide(SlideSpec::new(
            SlideType::Question,
            ContentBlock::question("Fill in", &[])
                .with_table(TableData::new(&["x", "y"], &[&["1", "2", "dropped"]])),
        ))];

        let dir = tempfile::tempdir().unwrap();
        let report = DeckAssembler::new().assemble(&records, dir.path(), "deck").unwrap();
        let parsed = reopen(&report.path);
        assert_eq!(parsed.slides[0].paragraphs, vec!["Q1. Fill in", "x", "y", "1", "2"]);
    }

    #[test]
    fn test_answer_numbering_spans_questions() {
        let mut records = Vec::new();
        for n in 1..=3 {
            records.push(
                QuestionRecord::new(format!("Q{}", n), QuestionKind::Regular)
                    .with_slide(SlideSpec::new(SlideType::Question, ContentBlock::question("q", &[])))
                    .with_slide(SlideSpec::new(SlideType::Answer, ContentBlock::answer("a")))
                    .with_slide(SlideSpec::new(SlideType::Answer, ContentBlock::answer("b"))),
            );
        }

        let deck = DeckAssembler::new().build(&records);
        let answers: Vec<String> = deck
            .slides
            .iter()
            .map(|s| s.text_lines()[0].clone())
            .filter(|t| t.starts_with("Ans"))
            .collect();
        assert_eq!(
            answers,
            vec!["Ans1. a", "Ans2. b", "Ans3. a", "Ans4. b", "Ans5. a", "Ans6. b"]
        );

        let without = DeckAssembler::new().with_include_answers(false).build(&records);
        assert_eq!(without.len(), 3);
        assert!(without.slides.iter().all(|s| !s.text_lines()[0].starts_with("Ans")));
    }

    #[test]
    fn test_runs_do_not_share_counter() {
        let assembler = DeckAssembler::new();
        let first = assembler.build(&scenario_a());
        let second = assembler.build(&scenario_a());
        assert_eq!(first.slides[1].text_lines(), vec!["Ans1. 4"]);
        assert_eq!(second.slides[1].text_lines(), vec!["Ans1. 4"]);
    }

    #[test]
    fn test_idempotent_runs() {
        let dir = tempfile::tempdir().unwrap();
        let assembler = DeckAssembler::new();
        let first = assembler.assemble(&scenario_a(), dir.path(), "deck").unwrap();
        let second = assembler.assemble(&scenario_a(), dir.path(), "deck").unwrap();

        assert_ne!(first.path, second.path);
        assert_eq!(first.slide_count, second.slide_count);

        let a = reopen(&first.path);
        let b = reopen(&second.path);
        let texts = |d: &crate::parser::ParsedDeck| d.slides.iter().map(|s| s.text()).collect::<Vec<_>>();
        assert_eq!(texts(&a), texts(&b));
        assert_eq!(fs::read(&first.path).unwrap(), fs::read(&second.path).unwrap());
    }

    #[test]
    fn test_malformed_records_degrade() {
        let records = parse_records(
            r#"[
                {"slides": [{"slide_type": "question"}, {"content": {"passage": "lost"}},
                            {"slide_type": "diagram", "content": {}}]},
                {"question_number": "Q2"},
                {"question_number": "Q3", "slides": [
                    {"slide_type": "question", "content": {"question_text": "Table?",
                        "table": {"headers": [], "rows": [["1"]]}, "options": null}},
                    {"slide_type": "answer", "content": {}}
                ]}
            ]"#,
        )
        .unwrap();

        let deck = DeckAssembler::new().build(&records);
        assert_eq!(deck.len(), 3);
        assert_eq!(deck.slides[0].text_lines(), vec!["Q?. "]);
        assert_eq!(deck.slides[1].text_lines(), vec!["Q3. Table?"]);
        assert!(deck.slides[1].table().is_none());
        assert_eq!(deck.slides[2].text_lines(), vec!["Ans1. "]);
    }

    #[test]
    fn test_empty_input_writes_empty_deck() {
        let dir = tempfile::tempdir().unwrap();
        let report = DeckAssembler::new().assemble(&[], dir.path(), "empty").unwrap();
        assert_eq!(report.slide_count, 0);
        assert_eq!(reopen(&report.path).slide_count(), 0);
    }

    #[test]
    fn test_unique_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("deck.pptx");
        assert_eq!(unique_output_path(dir.path(), "deck").unwrap(), base);

        fs::write(&base, b"taken").unwrap();
        assert_eq!(
            unique_output_path(dir.path(), "deck").unwrap(),
            dir.path().join("deck_1.pptx")
        );

        fs::write(dir.path().join("deck_4.pptx"), b"taken").unwrap();
        fs::write(dir.path().join("deck_x.pptx"), b"ignored").unwrap();
        fs::write(dir.path().join("other_9.pptx"), b"ignored").unwrap();
        assert_eq!(
            unique_output_path(dir.path(), "deck").unwrap(),
            dir.path().join("deck_5.pptx")
        );
    }

    #[test]
    fn test_exhausted_suffix_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("deck.pptx"), b"taken").unwrap();
        fs::write(dir.path().join(format!("deck_{}.pptx", u64::MAX)), b"taken").unwrap();

        let result = unique_output_path(dir.path(), "deck");

        assert!(matches!(result, Err(Error::OutputPath(_))));
    }

    #[test]
    fn test_default_state_numbers_from_one() {
        let mut state = GeneratorState::default();
        assert!(state.deck.is_empty());
        assert_eq!(state.next_answer_number(), 1);
        assert_eq!(state.next_answer_number(), 2);
    }

    #[test]
    fn test_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("deck.pptx");
        fs::write(&base, b"keep me").unwrap();

        let report = DeckAssembler::new().assemble(&scenario_a(), dir.path(), "deck").unwrap();

        assert_eq!(report.path, dir.path().join("deck_1.pptx"));
        assert_eq!(fs::read(&base).unwrap(), b"keep me");
        assert!(write_new_file(&base, b"again").is_err());
        assert_eq!(fs::read(&base).unwrap(), b"keep me");
    }

    #[test]
    fn test_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("PPTs").join("week1");
        let report = DeckAssembler::new().assemble(&scenario_a(), &nested, "deck").unwrap();
        assert!(report.path.starts_with(&nested));
        assert!(report.path.exists());
    }

    #[test]
    fn test_unwritable_output_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, b"file").unwrap();

        let result = DeckAssembler::new().assemble(&scenario_a(), &blocker, "deck");
        assert!(matches!(result, Err(Error::IoError(_))));
    }
}
