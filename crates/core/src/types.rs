//! Domain types for question records produced by the upstream parser.
//!
//! Every field is optional at the serde level. Structural gaps are reported by
//! [`crate::validate`] and rendered as empty content rather than rejected.

use serde::{Deserialize, Deserializer, Serialize};

/// One logical question unit and the slides it expands into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Sequential label assigned upstream, e.g. "Q1".
    #[serde(
        rename = "question_number",
        alias = "number",
        default,
        deserialize_with = "optional_scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub number: Option<String>,

    /// Informational question kind. Does not change assembly.
    #[serde(
        rename = "question_type",
        alias = "kind",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<QuestionKind>,

    /// Slides in rendering order. `None` when the field was missing entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slides: Option<Vec<SlideSpec>>,
}

impl QuestionRecord {
    /// Create a record with a number and no slides.
    pub fn new(number: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            number: Some(number.into()),
            kind: Some(kind),
            slides: Some(Vec::new()),
        }
    }

    /// Append a slide, keeping declaration order.
    pub fn with_slide(mut self, slide: SlideSpec) -> Self {
        self.slides.get_or_insert_with(Vec::new).push(slide);
        self
    }

    /// The question label, falling back to "Q?" when upstream omitted it.
    pub fn label(&self) -> &str {
        self.number.as_deref().unwrap_or("Q?")
    }

    /// Slides in order; empty when the field was missing.
    pub fn slides(&self) -> &[SlideSpec] {
        self.slides.as_deref().unwrap_or(&[])
    }
}

/// Question kind as reported by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Regular,
    MultiPart,
    MultipleChoice,
    PassageBased,
    /// Any kind string this version does not know.
    #[serde(other)]
    Other,
}

impl QuestionKind {
    /// The wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Regular => "regular",
            QuestionKind::MultiPart => "multi_part",
            QuestionKind::MultipleChoice => "multiple_choice",
            QuestionKind::PassageBased => "passage_based",
            QuestionKind::Other => "unknown",
        }
    }
}

/// The closed set of slide kinds a record can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideType {
    Question,
    Answer,
    Passage,
    /// A slide type string this version does not know. Never rendered.
    #[serde(other)]
    Unknown,
}

impl SlideType {
    /// The wire name of this slide type.
    pub fn as_str(&self) -> &'static str {
        match self {
            SlideType::Question => "question",
            SlideType::Answer => "answer",
            SlideType::Passage => "passage",
            SlideType::Unknown => "unknown",
        }
    }
}

/// One slide to emit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_type: Option<SlideType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentBlock>,
}

impl SlideSpec {
    /// Create a slide of the given type.
    pub fn new(slide_type: SlideType, content: ContentBlock) -> Self {
        Self {
            slide_type: Some(slide_type),
            content: Some(content),
        }
    }

    /// Content, or an empty block when it was missing.
    pub fn content(&self) -> ContentBlock {
        self.content.clone().unwrap_or_default()
    }
}

/// Loosely typed slide content. Fields irrelevant to the slide type are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub question_text: String,

    /// Option lines such as "a) ...", in order.
    #[serde(default, deserialize_with = "scalars_as_strings")]
    pub options: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableData>,

    /// Only ever rendered as a `[Diagram]` marker.
    #[serde(
        default,
        deserialize_with = "optional_scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub diagram_description: Option<String>,

    #[serde(default, deserialize_with = "scalar_as_string")]
    pub passage: String,

    #[serde(default, deserialize_with = "scalar_as_string")]
    pub answer_text: String,
}

impl ContentBlock {
    /// Question content with text and options.
    pub fn question(text: impl Into<String>, options: &[&str]) -> Self {
        Self {
            question_text: text.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Answer content.
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            answer_text: text.into(),
            ..Self::default()
        }
    }

    /// Passage content.
    pub fn passage(text: impl Into<String>) -> Self {
        Self {
            passage: text.into(),
            ..Self::default()
        }
    }

    /// Attach a table.
    pub fn with_table(mut self, table: TableData) -> Self {
        self.table = Some(table);
        self
    }

    /// Attach a diagram description.
    pub fn with_diagram(mut self, description: impl Into<String>) -> Self {
        self.diagram_description = Some(description.into());
        self
    }

    /// True when a non-empty diagram description is present.
    pub fn has_diagram(&self) -> bool {
        self.diagram_description
            .as_deref()
            .map(|d| !d.is_empty())
            .unwrap_or(false)
    }

    /// True when a table with at least one header is present.
    pub fn has_table(&self) -> bool {
        self.table.as_ref().map(|t| !t.headers.is_empty()).unwrap_or(false)
    }
}

/// Tabular content: headers define the column count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: Vec<Cell>,

    /// Rows aligned by index to `headers`. Extra cells are dropped when rendered.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rows: Vec<Vec<Cell>>,
}

impl TableData {
    /// Build a table from string slices.
    pub fn new(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| Cell::from(*h)).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| Cell::from(*c)).collect())
                .collect(),
        }
    }
}

/// A table cell. Strings, numbers and booleans are kept as text; null is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cell(pub String);

impl Cell {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell(s.to_string())
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Cell(scalar_text(value).unwrap_or_default()))
    }
}

/// Text form of a loosely typed JSON value. Null has none.
fn scalar_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Accept a string, number or boolean as text. Null is empty.
fn scalar_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(optional_scalar_as_string(deserializer)?.unwrap_or_default())
}

fn optional_scalar_as_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(scalar_text(serde_json::Value::deserialize(deserializer)?))
}

/// A list of scalars as text. A null list is empty; null items become "".
fn scalars_as_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let items = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(items
        .unwrap_or_default()
        .into_iter()
        .map(|item| scalar_text(item).unwrap_or_default())
        .collect())
}

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
