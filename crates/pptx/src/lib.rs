//! PPTX (OOXML) slide assembly for practice-question decks.
//!
//! Question records go in, a widescreen .pptx comes out: one slide per
//! question, answer, or passage, laid out at calibrated template positions.

pub mod assembler;
pub mod deck;
mod package;
pub mod parser;
pub mod runs;
pub mod slides;
pub mod table;
pub mod units;
pub mod writer;

pub use assembler::{unique_output_path, DeckAssembler, GenerationReport, GeneratorState};
pub use deck::Deck;
pub use parser::{ParsedDeck, ParsedSlide, PptxParser};
pub use runs::RunFormatter;
pub use slides::{SlideBuilder, SlideLayout};
pub use table::OptionsTablePolicy;
pub use writer::PptxWriter;
