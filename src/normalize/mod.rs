//! Normalization of one input file into ordered page images.
//!
//! The [`DocumentNormalizer`] looks up the converter registered for the
//! input's extension, creates the output directory next to it, runs the
//! conversion and rolls back everything it wrote if conversion fails.
//!
//! # Example
//!
//! ```no_run
//! use wordocr::normalize::DocumentNormalizer;
//!
//! fn main() -> wordocr::Result<()> {
//!     let normalized = DocumentNormalizer::new("report.pdf")?.normalize()?;
//!     for page in &normalized.pages {
//!         println!("page {}: {}", page.index, page.path.display());
//!     }
//!     Ok(())
//! }
//! ```

mod options;
mod output;

pub use options::{
    Margins, NormalizeOptions, Orientation, PageSetup, PageSize, PdfRenderSettings,
};
pub use output::{OutputDirectory, RasterPage};

use crate::convert::ConverterRegistry;
use crate::error::{Error, Result};
use crate::model::{InputDocument, PageImage};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result of normalizing one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedDocument {
    /// Directory holding the page images
    pub output_dir: PathBuf,

    /// Pages in document order
    pub pages: Vec<PageImage>,
}

impl NormalizedDocument {
    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Turns one input file into PNG page images.
#[derive(Debug, Clone)]
pub struct DocumentNormalizer {
    input: InputDocument,
    options: NormalizeOptions,
    registry: ConverterRegistry,
}

impl DocumentNormalizer {
    /// Create a normalizer for `path` with default options and converters.
    ///
    /// Fails with [`Error::EmptyInputPath`] for an empty path, before any I/O.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            input: InputDocument::new(path)?,
            options: NormalizeOptions::default(),
            registry: ConverterRegistry::with_defaults(),
        })
    }

    /// Set normalization options.
    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a custom converter registry.
    pub fn with_registry(mut self, registry: ConverterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The input being normalized.
    pub fn input(&self) -> &InputDocument {
        &self.input
    }

    /// Produce the page images.
    ///
    /// An extension with no registered converter fails before anything is
    /// created; registered converters may claim extensions the classifier
    /// does not know. Any other failure removes the files written by this
    /// call, and the output directory if this call created it, before the
    /// error is returned.
    pub fn normalize(&self) -> Result<NormalizedDocument> {
        let input = &self.input;
        let converter = self
            .registry
            .get_by_extension(input.extension())
            .ok_or_else(|| Error::UnsupportedFormat(input.extension().to_string()))?;

        let mut output = OutputDirectory::create(input.output_dir())?;
        log::info!(
            "normalizing {} ({}) with the {} converter",
            input.path().display(),
            input.category(),
            converter.name()
        );

        let result = converter
            .convert(input, &mut output, &self.options)
            .and_then(|pages| {
                if pages.is_empty() {
                    Err(Error::NoPages(input.path().to_path_buf()))
                } else {
                    Ok(pages)
                }
            });

        match result {
            Ok(pages) => {
                log::info!("{} page(s) written to {}", pages.len(), output.path().display());
                Ok(NormalizedDocument {
                    output_dir: output.into_path(),
                    pages,
                })
            }
            Err(e) => {
                log::error!("normalizing {} failed: {}", input.path().display(), e);
                let dir = output.path().to_path_buf();
                if !output.rollback() {
                    log::warn!("rollback of {} was incomplete", dir.display());
                }
                Err(e)
            }
        }
    }
}
