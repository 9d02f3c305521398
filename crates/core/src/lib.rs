//! Core domain types, input loading, validation, and previews for building
//! practice-question slide decks.

pub mod error;
pub mod input;
pub mod preview;
pub mod types;
pub mod validate;

pub use error::{Error, Result};
pub use input::{load_records, parse_records};
pub use preview::PreviewFormatter;
pub use types::{
    Cell, ContentBlock, QuestionKind, QuestionRecord, SlideSpec, SlideType, TableData,
};
pub use validate::{planned_slide_count, validate_records, RecordStats, ValidationReport};
