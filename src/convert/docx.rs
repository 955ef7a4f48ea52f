//! Office documents: DOCX is converted to HTML, rendered to a temporary PDF
//! inside the output directory and rasterized like any other PDF.
//!
//! The HTML keeps paragraphs, headings, bold/italic/underline runs, line
//! and page breaks, tables, bullet lists and embedded images (inlined as
//! data URIs). Anything else is dropped.

use super::html::{HtmlRenderer, WkHtmlToPdf};
use super::pdf::rasterize_pdf;
use super::PageConverter;
use crate::detect::ensure_pdf_file;
use crate::error::{Error, Result};
use crate::model::{InputDocument, PageImage};
use crate::normalize::{NormalizeOptions, OutputDirectory};
use base64::Engine;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use std::sync::Arc;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";
const RELATIONSHIPS_PART: &str = "word/_rels/document.xml.rels";
const STYLES_PART: &str = "word/styles.xml";

const STYLESHEET: &str = "body { font-family: 'Times New Roman', serif; font-size: 12pt; line-height: 1.3; }\n\
table { border-collapse: collapse; margin: 6pt 0; }\n\
td { border: 1px solid #000; padding: 2pt 4pt; vertical-align: top; }\n\
img { max-width: 100%; }\n\
p { margin: 0 0 6pt 0; }\n\
.page-break { page-break-after: always; }\n";

/// Convert a DOCX file to a standalone HTML document.
pub fn docx_to_html(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    reader_to_html(file)
}

/// Convert DOCX bytes to a standalone HTML document.
pub fn docx_bytes_to_html(bytes: &[u8]) -> Result<String> {
    reader_to_html(Cursor::new(bytes))
}

fn reader_to_html<R: Read + Seek>(reader: R) -> Result<String> {
    let mut archive = ZipArchive::new(reader)?;

    let document = read_part(&mut archive, DOCUMENT_PART)?
        .ok_or_else(|| Error::document(format!("missing {}", DOCUMENT_PART)))?;
    let relationships = match read_part(&mut archive, RELATIONSHIPS_PART)? {
        Some(xml) => parse_relationships(&xml)?,
        None => HashMap::new(),
    };
    let headings = match read_part(&mut archive, STYLES_PART)? {
        Some(xml) => parse_heading_styles(&xml)?,
        None => HashMap::new(),
    };

    let mut body = BodyWriter::new(&headings, &relationships);
    let mut reader = Reader::from_str(&document);
    reader.trim_text(false);

    loop {
        match reader.read_event()? {
            Event::Start(e) => body.start(&e, false, &mut archive),
            Event::Empty(e) => body.start(&e, true, &mut archive),
            Event::End(e) => body.end(e.name().as_ref()),
            Event::Text(e) => {
                if body.in_text {
                    let text = e.unescape()?;
                    body.push_text(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(body.finish())
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let mut part = match archive.by_name(name) {
        Ok(part) => part,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    part.read_to_string(&mut content)?;
    Ok(Some(content))
}

fn read_binary_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Option<Vec<u8>> {
    let mut part = archive.by_name(name).ok()?;
    let mut bytes = Vec::new();
    part.read_to_end(&mut bytes).ok()?;
    Some(bytes)
}

/// Extract an attribute value by qualified name.
fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// A toggle property such as `<w:b w:val="0"/>` is off when its value says so.
fn toggle_on(e: &BytesStart) -> bool {
    !matches!(
        attr(e, b"w:val").as_deref(),
        Some("0") | Some("false") | Some("none")
    )
}

/// Relationship id to target path, for parts that live in the archive.
fn parse_relationships(xml: &str) -> Result<HashMap<String, String>> {
    let mut relationships = HashMap::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"Relationship" => {
                if attr(&e, b"TargetMode").as_deref() == Some("External") {
                    continue;
                }
                if let (Some(id), Some(target)) = (attr(&e, b"Id"), attr(&e, b"Target")) {
                    relationships.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(relationships)
}

/// Style id to heading level (1..=6).
fn parse_heading_styles(xml: &str) -> Result<HashMap<String, u8>> {
    let mut levels = HashMap::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut style_id: Option<String> = None;
    let mut level: Option<u8> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:style" => {
                style_id = attr(&e, b"w:styleId");
                level = None;
            }
            Event::Empty(e) if style_id.is_some() => match e.name().as_ref() {
                b"w:name" => {
                    if let Some(name) = attr(&e, b"w:val") {
                        level = level.or_else(|| heading_level_from_name(&name));
                    }
                }
                b"w:outlineLvl" => {
                    if let Some(lvl) = attr(&e, b"w:val").and_then(|v| v.parse::<u8>().ok()) {
                        if lvl < 6 {
                            level = Some(lvl + 1);
                        }
                    }
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"w:style" => {
                if let (Some(id), Some(lvl)) = (style_id.take(), level.take()) {
                    levels.insert(id, lvl);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(levels)
}

/// "heading 2" -> 2, "Title" -> 1. Also accepts ids like "Heading2".
fn heading_level_from_name(name: &str) -> Option<u8> {
    let lower = name.to_ascii_lowercase();
    if lower == "title" {
        return Some(1);
    }
    let digits = lower.strip_prefix("heading")?.trim();
    match digits.parse::<u8>() {
        Ok(n @ 1..=6) => Some(n),
        _ => None,
    }
}

fn mime_type(path: &str) -> Option<&'static str> {
    let ext = path.rsplit('.').next()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Paragraph,
    Heading(u8),
    ListItem,
}

#[derive(Debug, Default, Clone, Copy)]
struct RunStyle {
    bold: bool,
    italic: bool,
    underline: bool,
}

/// Streaming writer for the `w:body` element tree.
struct BodyWriter<'a> {
    headings: &'a HashMap<String, u8>,
    relationships: &'a HashMap<String, String>,
    html: String,
    block: String,
    block_kind: BlockKind,
    in_paragraph: bool,
    in_run: bool,
    in_text: bool,
    run: String,
    run_style: RunStyle,
    list_open: bool,
    page_break: bool,
}

impl<'a> BodyWriter<'a> {
    fn new(headings: &'a HashMap<String, u8>, relationships: &'a HashMap<String, String>) -> Self {
        Self {
            headings,
            relationships,
            html: String::new(),
            block: String::new(),
            block_kind: BlockKind::Paragraph,
            in_paragraph: false,
            in_run: false,
            in_text: false,
            run: String::new(),
            run_style: RunStyle::default(),
            list_open: false,
            page_break: false,
        }
    }

    fn start<R: Read + Seek>(&mut self, e: &BytesStart, empty: bool, archive: &mut ZipArchive<R>) {
        match e.name().as_ref() {
            b"w:p" => {
                self.begin_paragraph();
                if empty {
                    self.end_paragraph();
                }
            }
            b"w:pStyle" => {
                if let Some(id) = attr(e, b"w:val") {
                    let level = self
                        .headings
                        .get(&id)
                        .copied()
                        .or_else(|| heading_level_from_name(&id));
                    if let Some(level) = level {
                        self.block_kind = BlockKind::Heading(level);
                    }
                }
            }
            b"w:numPr" if self.block_kind == BlockKind::Paragraph => {
                self.block_kind = BlockKind::ListItem;
            }
            b"w:r" => {
                self.in_run = true;
                self.run.clear();
                self.run_style = RunStyle::default();
                if empty {
                    self.end_run();
                }
            }
            b"w:b" if self.in_run => self.run_style.bold = toggle_on(e),
            b"w:i" if self.in_run => self.run_style.italic = toggle_on(e),
            b"w:u" if self.in_run => self.run_style.underline = toggle_on(e),
            b"w:t" if !empty => self.in_text = true,
            b"w:tab" if self.in_run => self.run.push_str("&emsp;"),
            b"w:br" if self.in_run => {
                if attr(e, b"w:type").as_deref() == Some("page") {
                    self.page_break = true;
                } else {
                    self.run.push_str("<br/>");
                }
            }
            b"a:blip" => {
                if let Some(id) = attr(e, b"r:embed") {
                    self.push_image(&id, archive);
                }
            }
            b"v:imagedata" => {
                if let Some(id) = attr(e, b"r:id") {
                    self.push_image(&id, archive);
                }
            }
            b"w:tbl" if !empty => {
                self.close_list();
                self.html.push_str("<table>\n");
            }
            b"w:tr" if !empty => self.html.push_str("<tr>"),
            b"w:tc" if !empty => {
                self.close_list();
                self.html.push_str("<td>");
            }
            _ => {}
        }
    }

    fn end(&mut self, name: &[u8]) {
        match name {
            b"w:t" => self.in_text = false,
            b"w:r" => self.end_run(),
            b"w:p" => self.end_paragraph(),
            b"w:tc" => {
                self.close_list();
                self.html.push_str("</td>");
            }
            b"w:tr" => self.html.push_str("</tr>\n"),
            b"w:tbl" => self.html.push_str("</table>\n"),
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.in_run {
            self.run.push_str(&escape(text));
        }
    }

    fn push_image<R: Read + Seek>(&mut self, rel_id: &str, archive: &mut ZipArchive<R>) {
        let Some(target) = self.relationships.get(rel_id) else {
            log::warn!("image relationship {} not found, skipping", rel_id);
            return;
        };
        let part = match target.strip_prefix('/') {
            Some(absolute) => absolute.to_string(),
            None => format!("word/{}", target),
        };
        let Some(mime) = mime_type(&part) else {
            log::warn!("unsupported embedded image {}, skipping", part);
            return;
        };
        let Some(bytes) = read_binary_part(archive, &part) else {
            log::warn!("embedded image {} is missing, skipping", part);
            return;
        };

        let data = base64::engine::general_purpose::STANDARD.encode(&bytes);
        let tag = format!("<img src=\"data:{};base64,{}\"/>", mime, data);
        if self.in_run {
            self.run.push_str(&tag);
        } else {
            self.block.push_str(&tag);
        }
    }

    fn begin_paragraph(&mut self) {
        self.in_paragraph = true;
        self.block.clear();
        self.block_kind = BlockKind::Paragraph;
    }

    fn end_run(&mut self) {
        self.in_run = false;
        self.in_text = false;
        if self.run.is_empty() {
            return;
        }

        let style = self.run_style;
        let mut run = std::mem::take(&mut self.run);
        if style.underline {
            run = format!("<u>{}</u>", run);
        }
        if style.italic {
            run = format!("<em>{}</em>", run);
        }
        if style.bold {
            run = format!("<strong>{}</strong>", run);
        }
        self.block.push_str(&run);
    }

    fn end_paragraph(&mut self) {
        if !self.in_paragraph {
            return;
        }
        self.in_paragraph = false;

        let content = if self.block.is_empty() {
            "&nbsp;".to_string()
        } else {
            std::mem::take(&mut self.block)
        };

        match self.block_kind {
            BlockKind::ListItem => {
                if !self.list_open {
                    self.html.push_str("<ul>\n");
                    self.list_open = true;
                }
                self.html.push_str(&format!("<li>{}</li>\n", content));
            }
            BlockKind::Heading(level) => {
                self.close_list();
                self.html
                    .push_str(&format!("<h{0}>{1}</h{0}>\n", level.clamp(1, 6), content));
            }
            BlockKind::Paragraph => {
                self.close_list();
                self.html.push_str(&format!("<p>{}</p>\n", content));
            }
        }

        if self.page_break {
            self.close_list();
            self.html.push_str("<div class=\"page-break\"></div>\n");
            self.page_break = false;
        }
    }

    fn close_list(&mut self) {
        if self.list_open {
            self.html.push_str("</ul>\n");
            self.list_open = false;
        }
    }

    fn finish(mut self) -> String {
        self.end_paragraph();
        self.close_list();
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
            STYLESHEET, self.html
        )
    }
}

/// Converter for office documents.
///
/// Only DOCX can be read; legacy `.doc` files are rejected with
/// [`Error::LegacyDoc`].
#[derive(Clone)]
pub struct DocxConverter {
    renderer: Arc<dyn HtmlRenderer>,
}

impl DocxConverter {
    /// Create a converter rendering through `wkhtmltopdf`.
    pub fn new() -> Self {
        Self::with_renderer(Arc::new(WkHtmlToPdf::new()))
    }

    /// Create a converter with a custom HTML renderer.
    pub fn with_renderer(renderer: Arc<dyn HtmlRenderer>) -> Self {
        Self { renderer }
    }
}

impl Default for DocxConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DocxConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocxConverter")
            .field("renderer", &self.renderer.name())
            .finish()
    }
}

impl PageConverter for DocxConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["doc", "docx"]
    }

    fn name(&self) -> &str {
        "docx"
    }

    fn convert(
        &self,
        input: &InputDocument,
        output: &mut OutputDirectory,
        options: &NormalizeOptions,
    ) -> Result<Vec<PageImage>> {
        if input.extension() == "doc" {
            return Err(Error::LegacyDoc(input.path().to_path_buf()));
        }

        let html = docx_to_html(input.path())?;
        log::debug!(
            "converted {} to {} bytes of HTML",
            input.path().display(),
            html.len()
        );

        // Removed on drop, so every exit path below cleans it up.
        let pdf = tempfile::Builder::new()
            .prefix(".wordocr-")
            .suffix(".pdf")
            .tempfile_in(output.path())?
            .into_temp_path();

        self.renderer.render(&html, &options.page_setup, &pdf)?;
        ensure_pdf_file(&pdf)?;
        let pages = rasterize_pdf(&pdf, input.base_name(), output, options)?;

        if let Err(e) = pdf.close() {
            log::warn!("could not remove intermediate PDF: {}", e);
        }
        Ok(pages)
    }
}
