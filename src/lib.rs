//! # wordocr
//!
//! Word-level OCR export for office documents, PDFs and images.
//!
//! An input file is normalized into ordered PNG page images, every page is
//! run through a line-level text recognition engine, and each detected line
//! is split into words with their own quadrilaterals. The words of a page
//! are written as JSON next to its image.
//!
//! ## Quick Start
//!
//! ```no_run
//! use wordocr::engine::ProcessRecognizer;
//! use wordocr::WordOcr;
//!
//! fn main() -> wordocr::Result<()> {
//!     let engine = ProcessRecognizer::new("paddleocr-page");
//!     let summary = WordOcr::new().export("contract.docx", engine)?;
//!
//!     for page in &summary.pages {
//!         println!("{}: {} words", page.json_path.display(), page.word_count);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Input formats**: jpg, png, tiff, heic (feature `heic`), pdf, docx
//! - **Deterministic pages**: `<name>_result_page_<n>.png` in document order
//! - **Rollback**: a failed conversion removes what it wrote
//! - **Word geometry**: per-word quadrilaterals along rotated or skewed lines
//! - **Parallel encoding**: rendered pages are PNG-encoded with Rayon
//! - **Async**: `export_file_async` behind the `async` feature

pub mod convert;
pub mod detect;
pub mod engine;
pub mod error;
pub mod export;
pub mod model;
pub mod normalize;
pub mod segment;
pub mod upload;

// Re-export commonly used types
pub use convert::{ConverterRegistry, HtmlRenderer, PageConverter, WkHtmlToPdf};
pub use detect::{classify_path, FileCategory};
pub use engine::{ProcessRecognizer, TextRecognizer};
pub use error::{Error, Result};
pub use export::{ExportOptions, ExportSummary, Exporter, JsonFormat, PageExport};
pub use model::{DetectionLine, ExportRecord, InputDocument, PageImage, Point, Quad, WordSpan};
pub use normalize::{
    DocumentNormalizer, NormalizeOptions, NormalizedDocument, PageSetup, PdfRenderSettings,
};
pub use segment::{segment_line, segment_lines};
pub use upload::{upload_folder, Uploader};

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Classify a file by its extension.
///
/// # Example
///
/// ```
/// use wordocr::{classify, FileCategory};
///
/// assert_eq!(classify("scan.HEIC"), FileCategory::Image);
/// ```
pub fn classify<P: AsRef<Path>>(path: P) -> FileCategory {
    classify_path(path)
}

/// Normalize a file into page images with default options.
///
/// # Example
///
/// ```no_run
/// use wordocr::normalize_file;
///
/// let normalized = normalize_file("report.pdf").unwrap();
/// println!("{} pages in {}", normalized.pages.len(), normalized.output_dir.display());
/// ```
pub fn normalize_file<P: AsRef<Path>>(path: P) -> Result<NormalizedDocument> {
    DocumentNormalizer::new(path)?.normalize()
}

/// Normalize a file and export word-level JSON for every page.
///
/// # Example
///
/// ```no_run
/// use wordocr::{export_file, ProcessRecognizer};
///
/// let summary = export_file("scan.png", ProcessRecognizer::new("ocr-engine")).unwrap();
/// println!("{} words", summary.word_count());
/// ```
pub fn export_file<P, R>(path: P, recognizer: R) -> Result<ExportSummary>
where
    P: AsRef<Path>,
    R: TextRecognizer,
{
    Exporter::new(recognizer).export(path)
}

/// Export on Tokio's blocking pool.
///
/// # Example
///
/// ```no_run
/// # async fn run() -> wordocr::Result<()> {
/// use wordocr::{export_file_async, ProcessRecognizer};
///
/// let summary = export_file_async("scan.png", ProcessRecognizer::new("ocr-engine")).await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "async")]
pub async fn export_file_async<P, R>(path: P, recognizer: R) -> Result<ExportSummary>
where
    P: Into<PathBuf>,
    R: TextRecognizer + Send + 'static,
{
    let path = path.into();
    tokio::task::spawn_blocking(move || export_file(path, recognizer))
        .await
        .map_err(|e| Error::Other(format!("export task failed: {}", e)))?
}

/// Builder for normalizing and exporting documents.
///
/// # Example
///
/// ```no_run
/// use wordocr::{JsonFormat, ProcessRecognizer, WordOcr};
///
/// let summary = WordOcr::new()
///     .with_pdfium_dir("/opt/pdfium/lib")
///     .with_angle_classification(false)
///     .with_json_format(JsonFormat::Compact)
///     .sequential()
///     .export("report.pdf", ProcessRecognizer::new("ocr-engine"))?;
/// # Ok::<(), wordocr::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct WordOcr {
    normalize_options: NormalizeOptions,
    export_options: ExportOptions,
    registry: ConverterRegistry,
}

impl WordOcr {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            normalize_options: NormalizeOptions::default(),
            export_options: ExportOptions::default(),
            registry: ConverterRegistry::with_defaults(),
        }
    }

    /// Disable parallel page encoding.
    pub fn sequential(mut self) -> Self {
        self.normalize_options = self.normalize_options.sequential();
        self
    }

    /// Look for the PDFium library in `dir` first.
    pub fn with_pdfium_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.normalize_options.pdf = self.normalize_options.pdf.with_library_dir(dir);
        self
    }

    /// Set the PDF render scale (1.0 renders one pixel per point).
    pub fn with_pdf_scale(mut self, scale: f32) -> Self {
        self.normalize_options.pdf = self.normalize_options.pdf.with_scale(scale);
        self
    }

    /// Set the page layout used for office documents.
    pub fn with_page_setup(mut self, setup: PageSetup) -> Self {
        self.normalize_options = self.normalize_options.with_page_setup(setup);
        self
    }

    /// Render office documents through a custom HTML renderer.
    pub fn with_html_renderer(mut self, renderer: Arc<dyn HtmlRenderer>) -> Self {
        self.registry
            .register(Arc::new(convert::DocxConverter::with_renderer(renderer)));
        self
    }

    /// Register an additional converter.
    pub fn with_converter(mut self, converter: Arc<dyn PageConverter>) -> Self {
        self.registry.register(converter);
        self
    }

    /// Enable or disable angle classification in the engine.
    pub fn with_angle_classification(mut self, enabled: bool) -> Self {
        self.export_options = self.export_options.with_angle_classification(enabled);
        self
    }

    /// Set the JSON output style.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.export_options = self.export_options.with_json_format(format);
        self
    }

    /// Normalize a file into page images.
    pub fn normalize<P: AsRef<Path>>(&self, path: P) -> Result<NormalizedDocument> {
        DocumentNormalizer::new(path)?
            .with_options(self.normalize_options.clone())
            .with_registry(self.registry.clone())
            .normalize()
    }

    /// Build an exporter around `recognizer` with this builder's settings.
    pub fn exporter<R: TextRecognizer>(&self, recognizer: R) -> Exporter<R> {
        Exporter::new(recognizer)
            .with_options(self.export_options)
            .with_normalize_options(self.normalize_options.clone())
            .with_registry(self.registry.clone())
    }

    /// Normalize a file and export every page.
    pub fn export<P, R>(&self, path: P, recognizer: R) -> Result<ExportSummary>
    where
        P: AsRef<Path>,
        R: TextRecognizer,
    {
        self.exporter(recognizer).export(path)
    }
}

impl Default for WordOcr {
    fn default() -> Self {
        Self::new()
    }
}
