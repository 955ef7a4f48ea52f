//! Input format classification and PDF header validation.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Coarse category of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    /// A single raster image (jpg, png, heic, tiff)
    Image,
    /// A PDF document
    Pdf,
    /// An office document (doc, docx)
    Document,
    /// Anything else
    Unknown,
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FileCategory::Image => "image",
            FileCategory::Pdf => "pdf",
            FileCategory::Document => "document",
            FileCategory::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// How a file in the image category has to be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// HEIC/HEIF, decoded through libheif
    Heic,
    /// TIFF, possibly multi-strip
    Tiff,
    /// Any other raster the `image` crate decodes directly
    Raster,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png", "heic", "tiff", "tif"];
const PDF_EXTENSIONS: &[&str] = &["pdf"];
const DOCUMENT_EXTENSIONS: &[&str] = &["doc", "docx"];

/// Lowercase extension of a path, without the leading dot.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Classify a file by its extension.
///
/// This never touches the filesystem; unrecognized or missing extensions
/// map to [`FileCategory::Unknown`].
///
/// # Example
/// ```
/// use wordocr::detect::{classify_path, FileCategory};
///
/// assert_eq!(classify_path("scan.TIF"), FileCategory::Image);
/// assert_eq!(classify_path("report.docx"), FileCategory::Document);
/// assert_eq!(classify_path("notes.txt"), FileCategory::Unknown);
/// ```
pub fn classify_path<P: AsRef<Path>>(path: P) -> FileCategory {
    match extension_of(path.as_ref()) {
        Some(ext) => classify_extension(&ext),
        None => FileCategory::Unknown,
    }
}

/// Classify a bare extension (case-insensitive, leading dot optional).
pub fn classify_extension(ext: &str) -> FileCategory {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        FileCategory::Image
    } else if PDF_EXTENSIONS.contains(&ext.as_str()) {
        FileCategory::Pdf
    } else if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
        FileCategory::Document
    } else {
        FileCategory::Unknown
    }
}

/// Decide how an image-category file must be decoded.
pub fn image_kind(ext: &str) -> ImageKind {
    match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "heic" => ImageKind::Heic,
        "tiff" | "tif" => ImageKind::Tiff,
        _ => ImageKind::Raster,
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Read the PDF version from a header such as `%PDF-1.7`.
///
/// Returns `None` when the data is not a PDF header.
pub fn detect_pdf_header(data: &[u8]) -> Option<String> {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return None;
    }

    let version_bytes = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();
    is_valid_version(&version).then_some(version)
}

/// Check if a version string looks like `1.7`.
fn is_valid_version(version: &str) -> bool {
    let chars: Vec<char> = version.chars().collect();
    chars.len() == 3 && chars[0].is_ascii_digit() && chars[1] == '.' && chars[2].is_ascii_digit()
}

/// Check if bytes start with a valid PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_pdf_header(data).is_some()
}

/// Verify that a file exists and starts with a PDF header.
///
/// Used before rasterizing an intermediate PDF produced by another tool.
pub fn ensure_pdf_file(path: &Path) -> Result<()> {
    let mut header = [0u8; 16];
    let read = File::open(path)
        .and_then(|mut f| f.read(&mut header))
        .map_err(|_| Error::MissingIntermediatePdf(path.to_path_buf()))?;

    if is_pdf_bytes(&header[..read]) {
        Ok(())
    } else {
        Err(Error::MissingIntermediatePdf(path.to_path_buf()))
    }
}
