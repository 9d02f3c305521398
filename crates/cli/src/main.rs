//! CLI tool for building PowerPoint decks from parsed question records.

use anyhow::{Context, Result};
use clap::Parser;
use deck_core::{planned_slide_count, validate_records, PreviewFormatter, QuestionRecord};
use deck_pptx::{DeckAssembler, GenerationReport, PptxParser};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

/// How many validation issues to print before summarizing the rest.
const ISSUES_SHOWN: usize = 5;

/// Build a PowerPoint deck from parsed question records.
#[derive(Parser, Debug)]
#[command(name = "deck-build")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Parsed questions JSON file
    input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "PPTs")]
    output_dir: PathBuf,

    /// Base name of the output file (default: derived from the input name)
    #[arg(short, long)]
    name: Option<String>,

    /// Exclude answer slides from the presentation
    #[arg(long)]
    no_answers: bool,

    /// Also write a human-readable preview next to the deck
    #[arg(short, long)]
    preview: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let records = deck_core::load_records(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    report_validation(&records);

    let include_answers = !args.no_answers;
    let planned = planned_slide_count(&records, include_answers);
    eprintln!(
        "Will generate {} slides from {} questions ({})",
        planned,
        records.len(),
        if include_answers { "with answers" } else { "without answers" }
    );

    let stem = args.name.clone().unwrap_or_else(|| default_stem(&args.input));
    let report = DeckAssembler::new()
        .with_include_answers(include_answers)
        .with_title(stem.clone())
        .assemble(&records, &args.output_dir, &stem)
        .context("Failed to write presentation")?;

    verify_output(&report, planned);

    if args.preview {
        let preview_path = report.path.with_extension("preview.txt");
        write_output(&preview_path, &PreviewFormatter::new().format(&records))?;
        if args.verbose {
            eprintln!("Preview written to: {}", preview_path.display());
        }
    }

    println!("{}", report.path.display());
    Ok(())
}

/// Print validation issues and stats. Issues never stop the build.
fn report_validation(records: &[QuestionRecord]) {
    let validation = validate_records(records);

    if validation.is_valid() {
        log::info!("All questions validated successfully");
    } else {
        eprintln!("Found {} validation issues:", validation.issues.len());
        for issue in validation.issues.iter().take(ISSUES_SHOWN) {
            eprintln!("  - {}", issue);
        }
        if validation.issues.len() > ISSUES_SHOWN {
            eprintln!("  ... and {} more", validation.issues.len() - ISSUES_SHOWN);
        }
    }

    log::debug!("Record stats: {:?}", validation.stats);
}

/// Re-open the written deck and compare its slide count with the plan.
fn verify_output(report: &GenerationReport, planned: usize) {
    let counted = File::open(&report.path)
        .map_err(deck_core::Error::from)
        .and_then(|file| PptxParser::new().count_slides(BufReader::new(file)));

    match counted {
        Ok(count) if count == planned && count == report.slide_count => {
            eprintln!("{} slides written to {}", count, report.path.display());
        }
        Ok(count) => {
            eprintln!(
                "Warning: {} contains {} slides, expected {}",
                report.path.display(),
                count,
                planned
            );
        }
        Err(e) => {
            eprintln!("Warning: could not verify {}: {}", report.path.display(), e);
        }
    }
}

/// Output name from the input file, dropping the parser's prefix.
fn default_stem(input: &Path) -> String {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("presentation");

    let stem = stem.strip_prefix("parsed_questions_").unwrap_or(stem);
    if stem.is_empty() {
        "presentation".to_string()
    } else {
        stem.to_string()
    }
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
