//! PPTX package writer.
//!
//! Serializes a [`Deck`] as a PresentationML ZIP package with one blank
//! layout. Output is deterministic: identical decks give identical bytes.

use crate::deck::{Deck, Paragraph, Shape, Slide, Table, TableCell, TextBox, TextRun};
use crate::package::{self, content_type, part, rel};
use crate::units::{font_size_hundredths, slide_height, slide_width, Rect};
use deck_core::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;
use std::io::{Cursor, Seek, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

/// Writer for PPTX packages.
#[derive(Debug, Clone)]
pub struct PptxWriter {
    title: String,
}

impl Default for PptxWriter {
    fn default() -> Self {
        Self {
            title: "Practice Questions".to_string(),
        }
    }
}

impl PptxWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document title stored in the core properties.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Serialize `deck` into an in-memory package.
    pub fn to_bytes(&self, deck: &Deck) -> Result<Vec<u8>> {
        let cursor = self.write(deck, Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    /// Serialize `deck` into `writer` and return it.
    pub fn write<W: Write + Seek>(&self, deck: &Deck, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let count = deck.len();

        add_part(&mut zip, part::CONTENT_TYPES, &content_types_xml(count)?)?;
        add_part(&mut zip, part::PACKAGE_RELS, &package_rels_xml()?)?;
        add_part(&mut zip, part::CORE, &self.core_xml()?)?;
        add_part(&mut zip, part::APP, &app_xml(count)?)?;
        add_part(&mut zip, part::PRESENTATION, &presentation_xml(count)?)?;
        add_part(&mut zip, part::PRESENTATION_RELS, &presentation_rels_xml(count)?)?;
        add_part(&mut zip, part::SLIDE_MASTER, package::SLIDE_MASTER_XML.as_bytes())?;
        add_part(
            &mut zip,
            part::SLIDE_MASTER_RELS,
            &rels_xml(&[
                ("rId1", rel::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml"),
                ("rId2", rel::THEME, "../theme/theme1.xml"),
            ])?,
        )?;
        add_part(&mut zip, part::SLIDE_LAYOUT, package::SLIDE_LAYOUT_XML.as_bytes())?;
        add_part(
            &mut zip,
            part::SLIDE_LAYOUT_RELS,
            &rels_xml(&[("rId1", rel::SLIDE_MASTER, "../slideMasters/slideMaster1.xml")])?,
        )?;
        add_part(&mut zip, part::THEME, package::THEME_XML.as_bytes())?;

        let layout_rels = rels_xml(&[("rId1", rel::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml")])?;
        for (idx, slide) in deck.slides.iter().enumerate() {
            let number = idx + 1;
            add_part(&mut zip, &part::slide(number), &slide_xml(slide)?)?;
            add_part(&mut zip, &part::slide_rels(number), &layout_rels)?;
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))
    }

    fn core_xml(&self) -> Result<Vec<u8>> {
        let mut xml = XmlOut::new()?;
        xml.start(
            "cp:coreProperties",
            &[
                (
                    "xmlns:cp",
                    "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
                ),
                ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
                ("xmlns:dcterms", "http://purl.org/dc/terms/"),
                ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
            ],
        )?;
        xml.leaf("dc:title", &[], &self.title)?;
        xml.leaf("dc:creator", &[], "deck-build")?;
        xml.end("cp:coreProperties")?;
        Ok(xml.finish())
    }
}

fn add_part<W: Write + Seek>(zip: &mut ZipWriter<W>, name: &str, data: &[u8]) -> Result<()> {
    // Fixed timestamp keeps output reproducible.
    let options = FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    zip.start_file(name, options)
        .map_err(|e| Error::ZipError(format!("Failed to start '{}': {}", name, e)))?;
    zip.write_all(data)
        .map_err(|e| Error::ZipError(format!("Failed to write '{}': {}", name, e)))?;
    Ok(())
}

fn content_types_xml(slide_count: usize) -> Result<Vec<u8>> {
    let mut xml = XmlOut::new()?;
    xml.start("Types", &[("xmlns", package::NS_CONTENT_TYPES)])?;
    xml.empty("Default", &[("Extension", "rels"), ("ContentType", content_type::RELS)])?;
    xml.empty("Default", &[("Extension", "xml"), ("ContentType", content_type::XML)])?;

    let mut overrides = vec![
        ("/ppt/presentation.xml".to_string(), content_type::PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml".to_string(), content_type::SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml".to_string(), content_type::SLIDE_LAYOUT),
        ("/ppt/theme/theme1.xml".to_string(), content_type::THEME),
        ("/docProps/core.xml".to_string(), content_type::CORE_PROPERTIES),
        ("/docProps/app.xml".to_string(), content_type::EXTENDED_PROPERTIES),
    ];
    overrides.extend((1..=slide_count).map(|n| (format!("/{}", part::slide(n)), content_type::SLIDE)));

    for (name, kind) in &overrides {
        xml.empty("Override", &[("PartName", name.as_str()), ("ContentType", *kind)])?;
    }
    xml.end("Types")?;
    Ok(xml.finish())
}

fn package_rels_xml() -> Result<Vec<u8>> {
    rels_xml(&[
        ("rId1", rel::OFFICE_DOCUMENT, "ppt/presentation.xml"),
        ("rId2", rel::CORE_PROPERTIES, "docProps/core.xml"),
        ("rId3", rel::EXTENDED_PROPERTIES, "docProps/app.xml"),
    ])
}

fn app_xml(slide_count: usize) -> Result<Vec<u8>> {
    let mut xml = XmlOut::new()?;
    xml.start(
        "Properties",
        &[(
            "xmlns",
            "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
        )],
    )?;
    xml.leaf("Application", &[], "deck-build")?;
    xml.leaf("Slides", &[], &slide_count.to_string())?;
    xml.end("Properties")?;
    Ok(xml.finish())
}

/// Presentation relationships: rId1 master, rId2.. slides, then the theme.
fn presentation_rels_xml(slide_count: usize) -> Result<Vec<u8>> {
    let mut entries: Vec<(String, &str, String)> = vec![(
        "rId1".to_string(),
        rel::SLIDE_MASTER,
        "slideMasters/slideMaster1.xml".to_string(),
    )];
    for n in 1..=slide_count {
        entries.push((format!("rId{}", n + 1), rel::SLIDE, format!("slides/slide{}.xml", n)));
    }
    entries.push((format!("rId{}", slide_count + 2), rel::THEME, "theme/theme1.xml".to_string()));

    let borrowed: Vec<(&str, &str, &str)> = entries
        .iter()
        .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
        .collect();
    rels_xml(&borrowed)
}

fn rels_xml(entries: &[(&str, &str, &str)]) -> Result<Vec<u8>> {
    let mut xml = XmlOut::new()?;
    xml.start("Relationships", &[("xmlns", package::NS_RELS)])?;
    for &(id, kind, target) in entries {
        xml.empty("Relationship", &[("Id", id), ("Type", kind), ("Target", target)])?;
    }
    xml.end("Relationships")?;
    Ok(xml.finish())
}

fn presentation_xml(slide_count: usize) -> Result<Vec<u8>> {
    let mut xml = XmlOut::new()?;
    xml.start(
        "p:presentation",
        &[
            ("xmlns:a", package::NS_A),
            ("xmlns:r", package::NS_R),
            ("xmlns:p", package::NS_P),
            ("saveSubsetFonts", "1"),
        ],
    )?;

    xml.start("p:sldMasterIdLst", &[])?;
    xml.empty("p:sldMasterId", &[("id", "2147483648"), ("r:id", "rId1")])?;
    xml.end("p:sldMasterIdLst")?;

    if slide_count > 0 {
        xml.start("p:sldIdLst", &[])?;
        for n in 1..=slide_count {
            let id = (255 + n).to_string();
            let rid = format!("rId{}", n + 1);
            xml.empty("p:sldId", &[("id", id.as_str()), ("r:id", rid.as_str())])?;
        }
        xml.end("p:sldIdLst")?;
    }

    let cx = slide_width().to_string();
    let cy = slide_height().to_string();
    xml.empty("p:sldSz", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    xml.empty("p:notesSz", &[("cx", "6858000"), ("cy", "9144000")])?;
    xml.end("p:presentation")?;
    Ok(xml.finish())
}

fn slide_xml(slide: &Slide) -> Result<Vec<u8>> {
    let mut xml = XmlOut::new()?;
    xml.start(
        "p:sld",
        &[
            ("xmlns:a", package::NS_A),
            ("xmlns:r", package::NS_R),
            ("xmlns:p", package::NS_P),
        ],
    )?;
    xml.start("p:cSld", &[])?;
    xml.start("p:spTree", &[])?;

    xml.start("p:nvGrpSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
    xml.empty("p:cNvGrpSpPr", &[])?;
    xml.empty("p:nvPr", &[])?;
    xml.end("p:nvGrpSpPr")?;
    xml.start("p:grpSpPr", &[])?;
    xml.start("a:xfrm", &[])?;
    xml.empty("a:off", &[("x", "0"), ("y", "0")])?;
    xml.empty("a:ext", &[("cx", "0"), ("cy", "0")])?;
    xml.empty("a:chOff", &[("x", "0"), ("y", "0")])?;
    xml.empty("a:chExt", &[("cx", "0"), ("cy", "0")])?;
    xml.end("a:xfrm")?;
    xml.end("p:grpSpPr")?;

    // Shape ids start after the group's id 1.
    for (idx, shape) in slide.shapes.iter().enumerate() {
        let id = idx + 2;
        match shape {
            Shape::TextBox(text_box) => write_text_box(&mut xml, text_box, id)?,
            Shape::Table(table) => write_table(&mut xml, table, id)?,
        }
    }

    xml.end("p:spTree")?;
    xml.end("p:cSld")?;
    xml.start("p:clrMapOvr", &[])?;
    xml.empty("a:masterClrMapping", &[])?;
    xml.end("p:clrMapOvr")?;
    xml.end("p:sld")?;
    Ok(xml.finish())
}

fn write_text_box(xml: &mut XmlOut, text_box: &TextBox, id: usize) -> Result<()> {
    let id_str = id.to_string();
    let name = format!("TextBox {}", id - 1);

    xml.start("p:sp", &[])?;
    xml.start("p:nvSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", id_str.as_str()), ("name", name.as_str())])?;
    xml.empty("p:cNvSpPr", &[("txBox", "1")])?;
    xml.empty("p:nvPr", &[])?;
    xml.end("p:nvSpPr")?;

    xml.start("p:spPr", &[])?;
    write_xfrm(xml, "a:xfrm", &text_box.frame)?;
    xml.start("a:prstGeom", &[("prst", "rect")])?;
    xml.empty("a:avLst", &[])?;
    xml.end("a:prstGeom")?;
    xml.empty("a:noFill", &[])?;
    xml.end("p:spPr")?;

    let inset = text_box.inset.to_string();
    xml.start("p:txBody", &[])?;
    xml.start(
        "a:bodyPr",
        &[
            ("wrap", "square"),
            ("lIns", inset.as_str()),
            ("tIns", inset.as_str()),
            ("rIns", inset.as_str()),
            ("bIns", inset.as_str()),
            ("anchor", "t"),
        ],
    )?;
    xml.empty("a:noAutofit", &[])?;
    xml.end("a:bodyPr")?;
    xml.empty("a:lstStyle", &[])?;
    for paragraph in &text_box.paragraphs {
        write_paragraph(xml, paragraph)?;
    }
    xml.end("p:txBody")?;
    xml.end("p:sp")?;
    Ok(())
}

fn write_table(xml: &mut XmlOut, table: &Table, id: usize) -> Result<()> {
    let id_str = id.to_string();
    let name = format!("Table {}", id - 1);

    xml.start("p:graphicFrame", &[])?;
    xml.start("p:nvGraphicFramePr", &[])?;
    xml.empty("p:cNvPr", &[("id", id_str.as_str()), ("name", name.as_str())])?;
    xml.start("p:cNvGraphicFramePr", &[])?;
    xml.empty("a:graphicFrameLocks", &[("noGrp", "1")])?;
    xml.end("p:cNvGraphicFramePr")?;
    xml.empty("p:nvPr", &[])?;
    xml.end("p:nvGraphicFramePr")?;
    write_xfrm(xml, "p:xfrm", &table.frame)?;

    xml.start("a:graphic", &[])?;
    xml.start("a:graphicData", &[("uri", package::TABLE_URI)])?;
    xml.start("a:tbl", &[])?;
    xml.empty("a:tblPr", &[("firstRow", "1"), ("bandRow", "1")])?;
    xml.start("a:tblGrid", &[])?;
    for width in &table.column_widths {
        xml.empty("a:gridCol", &[("w", width.to_string().as_str())])?;
    }
    xml.end("a:tblGrid")?;

    let row_height = table.row_height.to_string();
    for row in &table.rows {
        xml.start("a:tr", &[("h", row_height.as_str())])?;
        for cell in row {
            write_cell(xml, cell)?;
        }
        xml.end("a:tr")?;
    }

    xml.end("a:tbl")?;
    xml.end("a:graphicData")?;
    xml.end("a:graphic")?;
    xml.end("p:graphicFrame")?;
    Ok(())
}

fn write_cell(xml: &mut XmlOut, cell: &TableCell) -> Result<()> {
    xml.start("a:tc", &[])?;
    xml.start("a:txBody", &[])?;
    xml.empty("a:bodyPr", &[])?;
    xml.empty("a:lstStyle", &[])?;
    write_paragraph(
        xml,
        &Paragraph {
            runs: vec![TextRun {
                text: cell.text.clone(),
                style: cell.style.clone(),
            }],
            alignment: cell.style.alignment,
            space_after_pt: None,
        },
    )?;
    xml.end("a:txBody")?;

    match cell.fill {
        Some(fill) => {
            xml.start("a:tcPr", &[])?;
            xml.start("a:solidFill", &[])?;
            xml.empty("a:srgbClr", &[("val", fill.hex().as_str())])?;
            xml.end("a:solidFill")?;
            xml.end("a:tcPr")?;
        }
        None => xml.empty("a:tcPr", &[])?,
    }
    xml.end("a:tc")?;
    Ok(())
}

fn write_xfrm(xml: &mut XmlOut, tag: &str, rect: &Rect) -> Result<()> {
    let (x, y) = (rect.left.to_string(), rect.top.to_string());
    let (cx, cy) = (rect.width.to_string(), rect.height.to_string());
    xml.start(tag, &[])?;
    xml.empty("a:off", &[("x", x.as_str()), ("y", y.as_str())])?;
    xml.empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    xml.end(tag)
}

fn write_paragraph(xml: &mut XmlOut, paragraph: &Paragraph) -> Result<()> {
    xml.start("a:p", &[])?;
    xml.start("a:pPr", &[("algn", paragraph.alignment.as_ooxml())])?;
    write_spacing(xml, "a:spcBef", 0.0)?;
    if let Some(after) = paragraph.space_after_pt {
        write_spacing(xml, "a:spcAft", after)?;
    }
    xml.end("a:pPr")?;

    let mut end_size = None;
    for run in paragraph.runs.iter().filter(|r| !r.text.is_empty()) {
        write_run(xml, run)?;
        end_size = Some(run.style.size_pt);
    }
    if end_size.is_none() {
        // Keep the line height of an empty paragraph at the run size.
        if let Some(run) = paragraph.runs.first() {
            let sz = font_size_hundredths(run.style.size_pt).to_string();
            xml.empty("a:endParaRPr", &[("lang", "en-US"), ("sz", sz.as_str())])?;
        }
    }
    xml.end("a:p")
}

/// `a:spcPts` is in hundredths of a point.
fn write_spacing(xml: &mut XmlOut, tag: &str, pt: f64) -> Result<()> {
    let val = ((pt * 100.0).round() as i64).to_string();
    xml.start(tag, &[])?;
    xml.empty("a:spcPts", &[("val", val.as_str())])?;
    xml.end(tag)
}

fn write_run(xml: &mut XmlOut, run: &TextRun) -> Result<()> {
    let style = &run.style;
    let sz = font_size_hundredths(style.size_pt).to_string();
    let bold = if style.bold { "1" } else { "0" };

    xml.start("a:r", &[])?;
    xml.start("a:rPr", &[("lang", "en-US"), ("sz", sz.as_str()), ("b", bold), ("dirty", "0")])?;
    xml.start("a:solidFill", &[])?;
    xml.empty("a:srgbClr", &[("val", style.color.hex().as_str())])?;
    xml.end("a:solidFill")?;
    xml.empty("a:latin", &[("typeface", style.font.as_str())])?;
    xml.end("a:rPr")?;
    xml.leaf("a:t", &[], &run.text)?;
    xml.end("a:r")
}

/// Small wrapper over the quick-xml writer that maps errors into ours.
struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Result<Self> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(xml_error)?;
        Ok(Self { writer })
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Start(element)).map_err(xml_error)
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Empty(element)).map_err(xml_error)
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_error)
    }

    fn text(&mut self, text: &str) -> Result<()> {
        let clean = xml_safe(text);
        self.writer
            .write_event(Event::Text(BytesText::new(clean.as_ref())))
            .map_err(xml_error)
    }

    /// Start tag, text, end tag.
    fn leaf(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<()> {
        self.start(name, attrs)?;
        self.text(text)?;
        self.end(name)
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

fn xml_error(e: quick_xml::Error) -> Error {
    Error::XmlError(format!("Failed to write XML: {}", e))
}

/// Drop characters XML 1.0 cannot represent (stray control codes from OCR).
fn xml_safe(text: &str) -> Cow<'_, str> {
    let allowed = |c: char| matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}');
    if text.chars().all(allowed) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| allowed(c)).collect())
    }
}
