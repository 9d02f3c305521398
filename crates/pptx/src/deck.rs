//! In-memory slide model produced by the slide builders and consumed by the
//! package writer.

use crate::units::{Emu, Rect};

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Hex form used by `a:srgbClr/@val`, e.g. "F0F0F0".
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
}

impl Alignment {
    /// Value of `a:pPr/@algn`.
    pub fn as_ooxml(&self) -> &'static str {
        match self {
            Alignment::Left => "l",
            Alignment::Center => "ctr",
        }
    }
}

/// Character formatting shared by every run in a block.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font: String,
    /// Size in points.
    pub size_pt: f64,
    pub bold: bool,
    pub color: Rgb,
    pub alignment: Alignment,
}

impl TextStyle {
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_size(mut self, size_pt: f64) -> Self {
        self.size_pt = size_pt;
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// A span of text with one style.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub style: TextStyle,
}

/// One line of a text block.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
    pub alignment: Alignment,
    /// Spacing after the paragraph in points; `None` for no spacing.
    pub space_after_pt: Option<f64>,
}

impl Paragraph {
    /// Concatenated run text.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A positioned text box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub frame: Rect,
    /// Inner margin on every side.
    pub inset: Emu,
    pub paragraphs: Vec<Paragraph>,
}

/// A table cell with its formatting already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub text: String,
    pub style: TextStyle,
    pub fill: Option<Rgb>,
}

/// A positioned grid of cells. Every row has `column_widths.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub frame: Rect,
    pub column_widths: Vec<Emu>,
    pub row_height: Emu,
    pub rows: Vec<Vec<TableCell>>,
}

impl Table {
    pub fn column_count(&self) -> usize {
        self.column_widths.len()
    }
}

/// Anything placed on a slide.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    TextBox(TextBox),
    Table(Table),
}

/// One rendered slide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slide {
    pub shapes: Vec<Shape>,
}

impl Slide {
    /// Paragraph and cell text in placement order.
    pub fn text_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for shape in &self.shapes {
            match shape {
                Shape::TextBox(text_box) => {
                    lines.extend(text_box.paragraphs.iter().map(Paragraph::text));
                }
                Shape::Table(table) => {
                    for row in &table.rows {
                        lines.extend(row.iter().map(|c| c.text.clone()));
                    }
                }
            }
        }
        lines
    }

    /// The first table on the slide, if any.
    pub fn table(&self) -> Option<&Table> {
        self.shapes.iter().find_map(|s| match s {
            Shape::Table(t) => Some(t),
            Shape::TextBox(_) => None,
        })
    }

    /// The first text box on the slide, if any.
    pub fn text_box(&self) -> Option<&TextBox> {
        self.shapes.iter().find_map(|s| match s {
            Shape::TextBox(t) => Some(t),
            Shape::Table(_) => None,
        })
    }
}

/// An ordered collection of slides; appended to during a run and written once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deck {
    pub slides: Vec<Slide>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a blank slide and return it for filling.
    pub fn add_slide(&mut self) -> &mut Slide {
        self.slides.push(Slide::default());
        let last = self.slides.len() - 1;
        &mut self.slides[last]
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_hex() {
        assert_eq!(Rgb::BLACK.hex(), "000000");
        assert_eq!(Rgb(240, 240, 240).hex(), "F0F0F0");
    }

    #[test]
    fn test_add_slide_appends_in_order() {
        let mut deck = Deck::new();
        assert!(deck.is_empty());

        deck.add_slide();
        deck.add_slide().shapes.push(Shape::TextBox(TextBox {
            frame: Rect::new(0, 0, 1, 1),
            inset: 0,
            paragraphs: Vec::new(),
        }));

        assert_eq!(deck.len(), 2);
        assert!(deck.slides[0].shapes.is_empty());
        assert!(deck.slides[1].text_box().is_some());
        assert!(deck.slides[1].table().is_none());
    }
}
