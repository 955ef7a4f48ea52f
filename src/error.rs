//! Error types for wordocr library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for wordocr operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while normalizing, recognizing and exporting.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input path was empty.
    #[error("Input file path cannot be empty")]
    EmptyInputPath,

    /// The file extension does not map to any supported category.
    #[error("Unsupported file type: {0:?}")]
    UnsupportedFormat(String),

    /// A raster image could not be decoded or encoded.
    #[error("Image conversion failed: {source_path} -> {target}: {message}")]
    ImageDecode {
        source_path: PathBuf,
        target: PathBuf,
        message: String,
    },

    /// A page image could not be written as PNG.
    #[error("Failed to write page image {target}: {message}")]
    ImageEncode { target: PathBuf, message: String },

    /// HEIC input was given but the crate was built without HEIC support.
    #[error("HEIC support is not enabled (build with the `heic` feature): {0}")]
    HeicUnavailable(PathBuf),

    /// libheif failed to decode the file.
    #[error("HEIC conversion failed: {0}")]
    Heic(String),

    /// The PDFium library could not be bound.
    #[error("Failed to initialize PDFium: {0}")]
    PdfiumUnavailable(String),

    /// The PDF could not be opened.
    #[error("Failed to load PDF {path}: {message}")]
    PdfLoad { path: PathBuf, message: String },

    /// A single page failed to render.
    #[error("Failed to render page {page}: {message}")]
    PdfRender { page: usize, message: String },

    /// The PDF has no pages.
    #[error("PDF has no pages: {0}")]
    EmptyPdf(PathBuf),

    /// The office document could not be read.
    #[error("Document conversion failed: {0}")]
    Document(String),

    /// Legacy binary `.doc` files cannot be converted through HTML.
    #[error("Legacy .doc format is not supported, convert to .docx first: {0}")]
    LegacyDoc(PathBuf),

    /// The HTML to PDF renderer failed.
    #[error("HTML to PDF rendering failed: {0}")]
    HtmlRender(String),

    /// The intermediate PDF for a document was missing or not a PDF.
    #[error("Intermediate PDF is missing or invalid: {0}")]
    MissingIntermediatePdf(PathBuf),

    /// A converter finished without producing any page.
    #[error("No pages were produced for {0}")]
    NoPages(PathBuf),

    /// The recognition engine failed.
    #[error("Recognition engine error: {0}")]
    Engine(String),

    /// The recognition engine did not finish in time.
    #[error("Recognition engine timed out after {0:?}")]
    EngineTimeout(std::time::Duration),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// The upload command could not be started.
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn document(message: impl std::fmt::Display) -> Self {
        Error::Document(message.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialize(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::document(format!("not a DOCX archive: {}", err)),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::document(format!("malformed document XML: {}", err))
    }
}

impl From<pdfium_render::prelude::PdfiumError> for Error {
    fn from(err: pdfium_render::prelude::PdfiumError) -> Self {
        Error::PdfiumUnavailable(err.to_string())
    }
}
