//! End-to-end normalization tests over real files.
//!
//! Tests that rasterize PDFs need the PDFium library and are ignored by
//! default; run them with `cargo test -- --ignored` where it is installed.

use image::{ImageFormat, Rgb, RgbImage};
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use wordocr::convert::{ConverterRegistry, HtmlRenderer, PageRasterizer};
use wordocr::error::{Error, Result};
use wordocr::normalize::{DocumentNormalizer, NormalizeOptions, PageSetup, PdfRenderSettings};
use wordocr::{normalize_file, WordOcr};

/// A small but well-formed PDF with `page_count` letter-size pages.
fn minimal_pdf(page_count: usize) -> Vec<u8> {
    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            (0..page_count)
                .map(|i| format!("{} 0 R", i * 2 + 4))
                .collect::<Vec<_>>()
                .join(" "),
            page_count
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];
    for i in 0..page_count {
        let content_obj = i * 2 + 5;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            content_obj
        ));
        let text = format!("BT /F1 24 Tf 72 700 Td (Page {}) Tj ET", i + 1);
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            text.len(),
            text
        ));
    }

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref
        )
        .as_bytes(),
    );
    pdf
}

fn minimal_docx(text: &str) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>"#,
        text
    );
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.write_all(document.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

fn write_image(path: &Path, format: ImageFormat) {
    RgbImage::from_pixel(30, 20, Rgb([200, 100, 50]))
        .save_with_format(path, format)
        .unwrap();
}

fn png_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".png"))
        .collect();
    names.sort();
    names
}

/// Renderer double that records the HTML it was given and writes a fixed
/// file in place of the PDF.
struct FakeRenderer {
    output: Vec<u8>,
    seen_html: Mutex<Option<String>>,
    seen_pdf_path: Mutex<Option<std::path::PathBuf>>,
}

impl FakeRenderer {
    fn writing(output: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            output,
            seen_html: Mutex::new(None),
            seen_pdf_path: Mutex::new(None),
        })
    }
}

impl HtmlRenderer for FakeRenderer {
    fn name(&self) -> &str {
        "fake"
    }

    fn render(&self, html: &str, setup: &PageSetup, output: &Path) -> Result<()> {
        assert_eq!(setup, &PageSetup::default());
        *self.seen_html.lock().unwrap() = Some(html.to_string());
        *self.seen_pdf_path.lock().unwrap() = Some(output.to_path_buf());
        fs::write(output, &self.output)?;
        Ok(())
    }
}

struct FailingRenderer;

impl HtmlRenderer for FailingRenderer {
    fn name(&self) -> &str {
        "failing"
    }

    fn render(&self, _html: &str, _setup: &PageSetup, _output: &Path) -> Result<()> {
        Err(Error::HtmlRender("renderer crashed".into()))
    }
}

#[test]
fn test_png_jpg_tiff_normalize_to_png() {
    let temp = tempfile::tempdir().unwrap();
    let cases = [
        ("a.png", ImageFormat::Png),
        ("b.jpg", ImageFormat::Jpeg),
        ("c.tiff", ImageFormat::Tiff),
        ("d.TIF", ImageFormat::Tiff),
    ];

    for (name, format) in cases {
        let path = temp.path().join(name);
        write_image(&path, format);

        let normalized = normalize_file(&path).unwrap();
        let stem = Path::new(name).file_stem().unwrap().to_string_lossy().into_owned();

        assert_eq!(normalized.output_dir, temp.path().join(&stem));
        assert_eq!(normalized.pages.len(), 1);
        assert_eq!(png_files(&normalized.output_dir), vec![format!("{}.png", stem)]);
        assert_eq!((normalized.pages[0].width, normalized.pages[0].height), (30, 20));
    }
}

#[test]
fn test_unsupported_extension_creates_nothing() {
    let temp = tempfile::tempdir().unwrap();
    for name in ["notes.txt", "photo.jpeg", "README"] {
        let path = temp.path().join(name);
        fs::write(&path, "content").unwrap();

        let err = normalize_file(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)), "{}", name);
    }

    let dirs = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .count();
    assert_eq!(dirs, 0);
}

#[test]
fn test_renormalizing_is_idempotent() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("scan.png");
    write_image(&path, ImageFormat::Png);

    let first = normalize_file(&path).unwrap();
    let second = normalize_file(&path).unwrap();

    assert_eq!(first, second);
    assert_eq!(png_files(&second.output_dir), vec!["scan.png"]);
}

#[test]
fn test_empty_path() {
    assert!(matches!(
        DocumentNormalizer::new(""),
        Err(Error::EmptyInputPath)
    ));
}

#[test]
#[ignore = "requires PDFium"]
fn test_pdf_page_count_matches_source() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("three.pdf");
    fs::write(&path, minimal_pdf(3)).unwrap();

    let rasterizer = PageRasterizer::new(&PdfRenderSettings::default()).unwrap();
    assert_eq!(rasterizer.page_count(&path).unwrap(), 3);

    for options in [NormalizeOptions::default(), NormalizeOptions::new().sequential()] {
        let normalized = DocumentNormalizer::new(&path)
            .unwrap()
            .with_options(options)
            .normalize()
            .unwrap();

        assert_eq!(normalized.pages.len(), 3);
        assert_eq!(
            png_files(&normalized.output_dir),
            vec![
                "three_result_page_1.png",
                "three_result_page_2.png",
                "three_result_page_3.png"
            ]
        );
        // Unit scale: one pixel per point
        assert_eq!((normalized.pages[0].width, normalized.pages[0].height), (612, 792));
    }
}

#[test]
#[ignore = "requires PDFium"]
fn test_corrupt_pdf_rolls_back() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("corrupt.pdf");
    fs::write(&path, b"%PDF-1.4\nthis is not a pdf body").unwrap();

    let err = normalize_file(&path).unwrap_err();
    assert!(matches!(err, Error::PdfLoad { .. } | Error::EmptyPdf(_)));
    assert!(!temp.path().join("corrupt").exists());
}

#[test]
#[ignore = "requires PDFium"]
fn test_docx_through_renderer() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("memo.docx");
    fs::write(&path, minimal_docx("Quarterly numbers")).unwrap();

    let renderer = FakeRenderer::writing(minimal_pdf(2));
    let normalized = WordOcr::new()
        .with_html_renderer(renderer.clone())
        .normalize(&path)
        .unwrap();

    let html = renderer.seen_html.lock().unwrap().clone().unwrap();
    assert!(html.contains("Quarterly numbers"));

    // Pages are named after the input, not the intermediate PDF
    assert_eq!(
        png_files(&normalized.output_dir),
        vec!["memo_result_page_1.png", "memo_result_page_2.png"]
    );

    // The intermediate PDF lived inside the output directory and is gone
    let pdf_path = renderer.seen_pdf_path.lock().unwrap().clone().unwrap();
    assert_eq!(pdf_path.parent().unwrap(), normalized.output_dir);
    assert!(!pdf_path.exists());
}

#[test]
fn test_docx_renderer_output_not_pdf() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("memo.docx");
    fs::write(&path, minimal_docx("text")).unwrap();

    let renderer = FakeRenderer::writing(b"<html>oops</html>".to_vec());
    let err = DocumentNormalizer::new(&path)
        .unwrap()
        .with_registry(ConverterRegistry::with_html_renderer(renderer.clone()))
        .normalize()
        .unwrap_err();

    assert!(matches!(err, Error::MissingIntermediatePdf(_)));
    let pdf_path = renderer.seen_pdf_path.lock().unwrap().clone().unwrap();
    assert!(!pdf_path.exists());
    assert!(!temp.path().join("memo").exists());
}

#[test]
fn test_docx_renderer_failure() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("memo.docx");
    fs::write(&path, minimal_docx("text")).unwrap();

    let err = DocumentNormalizer::new(&path)
        .unwrap()
        .with_registry(ConverterRegistry::with_html_renderer(Arc::new(FailingRenderer)))
        .normalize()
        .unwrap_err();

    assert!(matches!(err, Error::HtmlRender(_)));
    assert!(!temp.path().join("memo").exists());
}

#[test]
fn test_invalid_docx() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("fake.docx");
    fs::write(&path, "not a zip archive").unwrap();

    let err = normalize_file(&path).unwrap_err();
    assert!(matches!(err, Error::Document(_)));
    assert!(!temp.path().join("fake").exists());
}
