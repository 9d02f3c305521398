//! Builders for question, answer, and passage slides.
//!
//! Each builder appends exactly one slide to the run's deck. The only state
//! they share is the answer counter in [`GeneratorState`].

use crate::assembler::GeneratorState;
use crate::deck::{Alignment, Rgb, Shape, TextBox, TextStyle};
use crate::runs::RunFormatter;
use crate::table::{render_table, OptionsTablePolicy};
use crate::units::{font_size_for_canvas, inches, Emu, Rect};
use deck_core::ContentBlock;

/// Typeface for every slide.
pub const FONT_NAME: &str = "Frankfurter Medium";

/// Body text size as it should appear in the design tool.
pub const CANVAS_BODY_SIZE_PT: f64 = 38.0;

/// Table cell size in points, used as-is.
pub const TABLE_FONT_SIZE_PT: f64 = 18.0;

/// Marker standing in for a diagram to be drawn by hand.
pub const DIAGRAM_MARKER: &str = "[Diagram]";

/// Fixed positions and styles shared by all slide builders.
#[derive(Debug, Clone)]
pub struct SlideLayout {
    /// Main text block.
    pub text_frame: Rect,
    /// Inner margin of the text block.
    pub text_inset: Emu,
    /// Widest a table may be.
    pub content_width: Emu,
    /// Height taken from the text block when a table is shown.
    pub table_reserve: Emu,
    /// Gap between the text block and the table.
    pub table_gap: Emu,
    pub body_style: TextStyle,
    pub table_style: TextStyle,
}

impl Default for SlideLayout {
    fn default() -> Self {
        let body_style = TextStyle {
            font: FONT_NAME.to_string(),
            size_pt: font_size_for_canvas(CANVAS_BODY_SIZE_PT),
            bold: false,
            color: Rgb::BLACK,
            alignment: Alignment::Left,
        };
        let table_style = body_style.clone().with_size(TABLE_FONT_SIZE_PT);

        Self {
            text_frame: Rect::from_canvas(73.6, 162.3, 1773.3, 510.7),
            text_inset: inches(0.15),
            content_width: inches(12.0),
            table_reserve: inches(1.0),
            table_gap: inches(0.2),
            body_style,
            table_style,
        }
    }
}

/// Builds slides into a run's deck.
#[derive(Debug, Clone, Default)]
pub struct SlideBuilder {
    layout: SlideLayout,
    formatter: RunFormatter,
    options_policy: OptionsTablePolicy,
}

impl SlideBuilder {
    pub fn new(layout: SlideLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    pub fn with_options_policy(mut self, policy: OptionsTablePolicy) -> Self {
        self.options_policy = policy;
        self
    }

    pub fn layout(&self) -> &SlideLayout {
        &self.layout
    }

    /// Question number, text, options, diagram marker, and an optional table.
    pub fn build_question(&self, state: &mut GeneratorState, content: &ContentBlock, number: &str) {
        let text = question_text(content, number);

        let table = content.table.as_ref().filter(|t| !t.headers.is_empty());
        let table = match table {
            Some(t) if self.options_policy.is_options_table(t, &content.options) => {
                log::debug!("{}: table repeats the options, not rendering it", number);
                None
            }
            other => other,
        };

        let mut frame = self.layout.text_frame;
        if table.is_some() {
            frame.height -= self.layout.table_reserve;
        }

        let text_box = self.text_box(&text, frame);
        let slide = state.deck.add_slide();
        slide.shapes.push(Shape::TextBox(text_box));

        if let Some(data) = table {
            let top = frame.bottom() + self.layout.table_gap;
            let width = frame.width.min(self.layout.content_width);
            if let Some(rendered) =
                render_table(data, frame.left, top, width, &self.layout.table_style)
            {
                slide.shapes.push(Shape::Table(rendered));
            }
        }
    }

    /// Answer text labelled with the run's next answer number.
    pub fn build_answer(&self, state: &mut GeneratorState, content: &ContentBlock) {
        let number = state.next_answer_number();
        let text = format!("Ans{}. {}", number, content.answer_text);

        let text_box = self.text_box(&text, self.layout.text_frame);
        state.deck.add_slide().shapes.push(Shape::TextBox(text_box));
    }

    /// Passage text, verbatim.
    pub fn build_passage(&self, state: &mut GeneratorState, content: &ContentBlock) {
        let text_box = self.text_box(&content.passage, self.layout.text_frame);
        state.deck.add_slide().shapes.push(Shape::TextBox(text_box));
    }

    fn text_box(&self, text: &str, frame: Rect) -> TextBox {
        TextBox {
            frame,
            inset: self.layout.text_inset,
            paragraphs: self.formatter.format(text, &self.layout.body_style),
        }
    }
}

/// Compose the question block: "<number>. <text>", options one per line,
/// then the diagram marker, with blank lines between parts.
fn question_text(content: &ContentBlock, number: &str) -> String {
    let mut parts = vec![format!("{}. {}", number, content.question_text)];

    if !content.options.is_empty() {
        parts.push(content.options.join("\n"));
    }

    if content.has_diagram() {
        parts.push(format!("\n{}", DIAGRAM_MARKER));
    }

    parts.join("\n\n")
}
