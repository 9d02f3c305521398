//! Table rendering and the options-table suppression heuristic.

use crate::deck::{Alignment, Rgb, Table, TableCell, TextStyle};
use crate::units::{inches, Emu, Rect};
use deck_core::TableData;

/// Header row fill.
pub const HEADER_FILL: Rgb = Rgb(240, 240, 240);

/// Height allowed per row, in inches.
const ROW_HEIGHT_IN: f64 = 0.4;

/// Cap on the estimated total table height, in inches.
const MAX_TABLE_HEIGHT_IN: f64 = 4.0;

/// Render `data` at (`left`, `top`) with the given width.
///
/// Returns `None` when the table has no headers. Cells beyond the header
/// count are dropped; missing cells render empty.
pub fn render_table(
    data: &TableData,
    left: Emu,
    top: Emu,
    width: Emu,
    cell_style: &TextStyle,
) -> Option<Table> {
    if data.headers.is_empty() {
        return None;
    }

    let columns = data.headers.len();
    let row_count = data.rows.len() + 1;
    let height = estimated_height(row_count);
    let column_width = width / columns as Emu;

    let centered = cell_style.clone().with_alignment(Alignment::Center);
    let header_style = centered.clone().with_bold(true);

    let mut rows = Vec::with_capacity(row_count);
    rows.push(
        data.headers
            .iter()
            .map(|h| TableCell {
                text: h.as_str().to_string(),
                style: header_style.clone(),
                fill: Some(HEADER_FILL),
            })
            .collect(),
    );

    for row in &data.rows {
        rows.push(
            (0..columns)
                .map(|col| TableCell {
                    text: row.get(col).map(|c| c.as_str().to_string()).unwrap_or_default(),
                    style: centered.clone(),
                    fill: None,
                })
                .collect(),
        );
        if row.len() > columns {
            log::debug!("Dropping {} cells beyond {} columns", row.len() - columns, columns);
        }
    }

    Some(Table {
        frame: Rect::new(left, top, width, height),
        column_widths: vec![column_width; columns],
        row_height: height / row_count as Emu,
        rows,
    })
}

/// Estimated table height for `row_count` rows including the header.
pub fn estimated_height(row_count: usize) -> Emu {
    inches((row_count as f64 * ROW_HEIGHT_IN).min(MAX_TABLE_HEIGHT_IN))
}

/// Policy for hiding tables that repeat the multiple-choice options.
///
/// This is a heuristic. A table whose row count differs from the option
/// count is never suppressed, even if it logically duplicates them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionsTablePolicy {
    /// Fraction of rows whose first cell must match an option label.
    pub match_threshold: f64,
}

impl Default for OptionsTablePolicy {
    fn default() -> Self {
        Self {
            match_threshold: 0.75,
        }
    }
}

impl OptionsTablePolicy {
    pub fn with_threshold(match_threshold: f64) -> Self {
        Self { match_threshold }
    }

    /// True when `table` restates `options` and should not be rendered.
    pub fn is_options_table(&self, table: &TableData, options: &[String]) -> bool {
        if options.is_empty() || table.rows.is_empty() || table.rows.len() != options.len() {
            return false;
        }

        let matches = table
            .rows
            .iter()
            .zip(options)
            .filter(|(row, option)| {
                let Some(first) = row.first() else {
                    return false;
                };
                match (cell_label(first.as_str()), option_label(option)) {
                    (Some(a), Some(b)) => a.to_lowercase().eq(b.to_lowercase()),
                    _ => false,
                }
            })
            .count();

        matches as f64 >= options.len() as f64 * self.match_threshold
    }
}

/// Letter of a cell shaped like "(a)".
fn cell_label(cell: &str) -> Option<char> {
    let mut chars = cell.trim().chars();
    match (chars.next(), chars.next(), chars.next(), chars.next()) {
        (Some('('), Some(letter), Some(')'), None) if letter.is_alphabetic() => Some(letter),
        _ => None,
    }
}

/// Letter named by the first three characters of an option, e.g. "a) " or "(a)".
fn option_label(option: &str) -> Option<char> {
    let head: String = option.trim().chars().take(3).collect();
    let mut letters = head
        .chars()
        .filter(|c| !matches!(c, '(' | ')') && !c.is_whitespace());
    match (letters.next(), letters.next()) {
        (Some(letter), None) if letter.is_alphabetic() && head.contains(')') => Some(letter),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> TextStyle {
        TextStyle {
            font: "Test Sans".to_string(),
            size_pt: 18.0,
            bold: false,
            color: Rgb::BLACK,
            alignment: Alignment::Left,
        }
    }

    fn options(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_headers_renders_nothing() {
        let table = TableData::new(&[], &[&["1", "2"]]);
        assert!(render_table(&table, 0, 0, 1000, &style()).is_none());
        assert!(render_table(&TableData::default(), 0, 0, 1000, &style()).is_none());
    }

    #[test]
    fn test_grid_shape_and_widths() {
        let data = TableData::new(&["A", "B", "C"], &[&["1", "2", "3"], &["4", "5", "6"]]);
        let table = render_table(&data, 10, 20, 3000, &style()).unwrap();

        assert_eq!(table.column_count(), 3);
        assert_eq!(table.column_widths, vec![1000, 1000, 1000]);
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows.iter().all(|r| r.len() == 3));
        assert_eq!(table.frame.left, 10);
        assert_eq!(table.frame.top, 20);
        assert_eq!(table.frame.height, estimated_height(3));
        assert_eq!(table.row_height, estimated_height(3) / 3);
    }

    #[test]
    fn test_header_and_body_styles() {
        let data = TableData::new(&["A"], &[&["1"]]);
        let table = render_table(&data, 0, 0, 100, &style()).unwrap();

        let header = &table.rows[0][0];
        assert!(header.style.bold);
        assert_eq!(header.style.alignment, Alignment::Center);
        assert_eq!(header.fill, Some(HEADER_FILL));

        let body = &table.rows[1][0];
        assert!(!body.style.bold);
        assert_eq!(body.style.alignment, Alignment::Center);
        assert_eq!(body.style.size_pt, 18.0);
        assert_eq!(body.fill, None);
    }

    #[test]
    fn test_ragged_rows() {
        let data = TableData::new(&["A", "B"], &[&["1", "2", "extra"], &["only"]]);
        let table = render_table(&data, 0, 0, 100, &style()).unwrap();

        assert_eq!(table.rows[1].len(), 2);
        assert_eq!(table.rows[1][1].text, "2");
        assert_eq!(table.rows[2][0].text, "only");
        assert_eq!(table.rows[2][1].text, "");
    }

    #[test]
    fn test_height_is_capped() {
        assert_eq!(estimated_height(2), inches(0.8));
        assert_eq!(estimated_height(10), inches(4.0));
        assert_eq!(estimated_height(50), inches(4.0));
    }

    #[test]
    fn test_cell_label() {
        assert_eq!(cell_label(" (a) "), Some('a'));
        assert_eq!(cell_label("(B)"), Some('B'));
        assert_eq!(cell_label("(1)"), None);
        assert_eq!(cell_label("(ab)"), None);
        assert_eq!(cell_label("a)"), None);
    }

    #[test]
    fn test_option_label() {
        assert_eq!(option_label("a) x"), Some('a'));
        assert_eq!(option_label("(b) y"), Some('b'));
        assert_eq!(option_label("C) z"), Some('C'));
        assert_eq!(option_label("apple"), None);
        assert_eq!(option_label(""), None);
    }

    #[test]
    fn test_matching_table_is_suppressed() {
        let table = TableData::new(&["Option", "Value"], &[&["(a)", "x"], &["(b)", "y"]]);
        let policy = OptionsTablePolicy::default();
        assert!(policy.is_options_table(&table, &options(&["a) x", "b) y"])));
        assert!(policy.is_options_table(&table, &options(&["(A) x", "(B) y"])));
    }

    #[test]
    fn test_threshold_boundary() {
        let policy = OptionsTablePolicy::default();
        let opts = options(&["a) 1", "b) 2", "c) 3", "d) 4"]);

        let three_of_four =
            TableData::new(&["L"], &[&["(a)"], &["(b)"], &["(c)"], &["(z)"]]);
        assert!(policy.is_options_table(&three_of_four, &opts));

        let two_of_four = TableData::new(&["L"], &[&["(a)"], &["(b)"], &["x"], &["(z)"]]);
        assert!(!policy.is_options_table(&two_of_four, &opts));
    }

    #[test]
    fn test_count_mismatch_never_suppresses() {
        let table = TableData::new(&["L"], &[&["(a)"], &["(b)"]]);
        let policy = OptionsTablePolicy::default();
        assert!(!policy.is_options_table(&table, &options(&["a) x", "b) y", "c) z"])));
        assert!(!policy.is_options_table(&table, &[]));
    }

    #[test]
    fn test_custom_threshold() {
        let table = TableData::new(&["L"], &[&["(a)"], &["nope"]]);
        let opts = options(&["a) x", "b) y"]);
        assert!(!OptionsTablePolicy::default().is_options_table(&table, &opts));
        assert!(OptionsTablePolicy::with_threshold(0.5).is_options_table(&table, &opts));
    }
}
