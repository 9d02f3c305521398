//! PPTX reader used to verify written decks.
//!
//! Re-opens a package, orders slides by the presentation relationships, and
//! returns the paragraph text of every text box and table cell.

use deck_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// A re-opened deck.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedDeck {
    pub slides: Vec<ParsedSlide>,
}

impl ParsedDeck {
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }
}

/// Text of one slide.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedSlide {
    /// 1-based slide number.
    pub number: usize,
    /// Paragraph text in document order.
    pub paragraphs: Vec<String>,
}

impl ParsedSlide {
    /// All paragraphs joined with newlines.
    pub fn text(&self) -> String {
        self.paragraphs.join("\n")
    }
}

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a PPTX package from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<ParsedDeck> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let slide_order = self.get_slide_order(&mut archive)?;
        let mut deck = ParsedDeck::default();

        for (idx, slide_path) in slide_order.iter().enumerate() {
            let content = self.read_file_from_archive(&mut archive, slide_path)?;
            deck.slides.push(ParsedSlide {
                number: idx + 1,
                paragraphs: self.extract_paragraphs(&content)?,
            });
        }

        Ok(deck)
    }

    /// Count slides without reading their text.
    pub fn count_slides<R: Read + Seek>(&self, reader: R) -> Result<usize> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;
        Ok(self.get_slide_order(&mut archive)?.len())
    }

    /// Get the ordered list of slide paths from the presentation relationships.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = self.read_file_from_archive(archive, "ppt/_rels/presentation.xml.rels")?;
        let mut slides: Vec<(String, Option<usize>, Option<usize>)> = Vec::new();

        let mut reader = Reader::from_str(&rels_content);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"Relationship" =>
                {
                    let mut rel_type = String::new();
                    let mut target = String::new();
                    let mut id = String::new();

                    for attr in e.attributes().flatten() {
                        let value = String::from_utf8_lossy(&attr.value).to_string();
                        match attr.key.as_ref() {
                            b"Type" => rel_type = value,
                            b"Target" => target = value,
                            b"Id" => id = value,
                            _ => {}
                        }
                    }

                    if rel_type.ends_with("/slide") {
                        let full_path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("ppt/{}", target),
                        };
                        slides.push((
                            full_path,
                            extract_slide_number(&target),
                            extract_slide_number(&id),
                        ));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::PptxParseError(format!(
                        "Error parsing relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        // Order by the slide file number, then by relationship id.
        slides.sort_by(|a, b| match (a.1.or(a.2), b.1.or(b.2)) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _, _)| path).collect())
    }

    /// Collect the text of every `a:p` on a slide, including table cells.
    fn extract_paragraphs(&self, xml_content: &str) -> Result<Vec<String>> {
        let mut paragraphs = Vec::new();
        let mut reader = Reader::from_str(xml_content);

        let mut in_paragraph = false;
        let mut in_text = false;
        let mut current = String::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                    b"p" => {
                        in_paragraph = true;
                        current.clear();
                    }
                    b"t" if in_paragraph => in_text = true,
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => {
                    if local_name(e.name().as_ref()) == b"p" {
                        paragraphs.push(String::new());
                    }
                }
                Ok(Event::Text(ref e)) if in_text => {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::PptxParseError(format!("Bad slide text: {}", e)))?;
                    current.push_str(&text);
                }
                Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                    b"t" => in_text = false,
                    b"p" if in_paragraph => {
                        paragraphs.push(std::mem::take(&mut current));
                        in_paragraph = false;
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    log::warn!("XML parsing error (continuing): {}", e);
                }
                _ => {}
            }
        }

        Ok(paragraphs)
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a trailing number from a string like "rId2" or "slides/slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{Alignment, Deck, Paragraph, Rgb, Shape, TextBox, TextRun, TextStyle};
    use crate::units::Rect;
    use crate::writer::PptxWriter;
    use std::io::Cursor;

    fn text_slide(deck: &mut Deck, lines: &[&str]) {
        let style = TextStyle {
            font: "Test Sans".to_string(),
            size_pt: 20.0,
            bold: false,
            color: Rgb::BLACK,
            alignment: Alignment::Left,
        };
        deck.add_slide().shapes.push(Shape::TextBox(TextBox {
            frame: Rect::new(0, 0, 100, 100),
            inset: 0,
            paragraphs: lines
                .iter()
                .map(|l| Paragraph {
                    runs: vec![TextRun {
                        text: l.to_string(),
                        style: style.clone(),
                    }],
                    alignment: Alignment::Left,
                    space_after_pt: None,
                })
                .collect(),
        }));
    }

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slides/slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_extract_paragraphs() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:txBody>
            <a:p><a:r><a:t>Q1. </a:t></a:r><a:r><a:t>Fish &amp; chips</a:t></a:r></a:p>
            <a:p><a:endParaRPr/></a:p>
            <a:p/>
        </p:txBody></p:sld>"#;
        let paragraphs = PptxParser::new().extract_paragraphs(xml).unwrap();
        assert_eq!(paragraphs, vec!["Q1. Fish & chips", "", ""]);
    }

    #[test]
    fn test_round_trip_order_and_text() {
        let mut deck = Deck::new();
        for n in 1..=12 {
            let label = format!("slide {}", n);
            text_slide(&mut deck, &[label.as_str(), " "]);
        }
        let bytes = PptxWriter::new().to_bytes(&deck).unwrap();

        let parsed = PptxParser::new().parse(Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(parsed.slide_count(), 12);
        for (idx, slide) in parsed.slides.iter().enumerate() {
            assert_eq!(slide.number, idx + 1);
            assert_eq!(slide.paragraphs, vec![format!("slide {}", idx + 1), " ".to_string()]);
        }

        let count = PptxParser::new().count_slides(Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(count, 12);
    }

    #[test]
    fn test_not_a_zip() {
        let err = PptxParser::new().parse(Cursor::new(b"plain text".to_vec())).unwrap_err();
        assert!(matches!(err, Error::ZipError(_)));
    }
}
