//! Page converters: one per input family, each turning a source file into
//! ordered PNG page images inside an [`OutputDirectory`].
//!
//! Converters are registered by file extension and dispatched through a
//! [`ConverterRegistry`].
//!
//! # Example
//!
//! ```no_run
//! use wordocr::convert::ConverterRegistry;
//! use wordocr::model::InputDocument;
//! use wordocr::normalize::{NormalizeOptions, OutputDirectory};
//!
//! fn main() -> wordocr::Result<()> {
//!     let registry = ConverterRegistry::with_defaults();
//!     let input = InputDocument::new("scan.tiff")?;
//!     let mut output = OutputDirectory::create(input.output_dir())?;
//!
//!     let converter = registry.get_by_extension(input.extension()).unwrap();
//!     let pages = converter.convert(&input, &mut output, &NormalizeOptions::default())?;
//!     println!("{} page(s)", pages.len());
//!     Ok(())
//! }
//! ```

mod docx;
mod html;
mod image;
mod pdf;

pub use self::docx::{docx_bytes_to_html, docx_to_html, DocxConverter};
pub use self::html::{HtmlRenderer, WkHtmlToPdf};
pub use self::image::ImageConverter;
pub use self::pdf::{rasterize_pdf, PageRasterizer, PdfConverter};

use crate::error::Result;
use crate::model::{InputDocument, PageImage};
use crate::normalize::{NormalizeOptions, OutputDirectory};
use std::collections::HashMap;
use std::sync::Arc;

/// Trait for page converters.
///
/// Implement this trait to add support for a new input format.
pub trait PageConverter: Send + Sync {
    /// Get the supported file extensions for this converter.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["pdf"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this converter.
    fn name(&self) -> &str;

    /// Write the pages of `input` into `output`, returning them in document
    /// order.
    ///
    /// Every file written must go through `output` (or be recorded on it) so
    /// a failure can be rolled back.
    fn convert(
        &self,
        input: &InputDocument,
        output: &mut OutputDirectory,
        options: &NormalizeOptions,
    ) -> Result<Vec<PageImage>>;

    /// Check if this converter supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for page converters.
///
/// Maps file extensions to converters. Registering a converter for an
/// extension that is already taken replaces the previous one.
#[derive(Clone)]
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn PageConverter>>,
    by_name: HashMap<String, Arc<dyn PageConverter>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the image, PDF and DOCX converters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ImageConverter::new()));
        registry.register(Arc::new(PdfConverter::new()));
        registry.register(Arc::new(DocxConverter::new()));
        registry
    }

    /// Create a registry with the default converters, rendering documents
    /// through the given HTML renderer.
    pub fn with_html_renderer(renderer: Arc<dyn HtmlRenderer>) -> Self {
        let mut registry = Self::with_defaults();
        registry.register(Arc::new(DocxConverter::with_renderer(renderer)));
        registry
    }

    /// Register a converter.
    ///
    /// The converter will be registered for all its supported extensions.
    pub fn register(&mut self, converter: Arc<dyn PageConverter>) {
        for ext in converter.supported_extensions() {
            self.converters.insert(ext.to_lowercase(), converter.clone());
        }
        self.by_name
            .insert(converter.name().to_lowercase(), converter);
    }

    /// Get a converter by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn PageConverter>> {
        self.converters.get(&ext.to_lowercase()).cloned()
    }

    /// Get a converter by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn PageConverter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.converters.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.converters.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("extensions", &self.supported_extensions())
            .finish()
    }
}
