//! Per-page recognition and word-level JSON export.
//!
//! For every page image the exporter calls the recognition engine once,
//! splits each detected line into words and writes the page's words to
//! `<page-name>.json` next to the image. Pages are handled in document order
//! and the first failure stops the export; pages already written are kept.

mod json;

pub use json::{read_record, to_json, write_record, JsonFormat};

use crate::convert::ConverterRegistry;
use crate::engine::TextRecognizer;
use crate::error::Result;
use crate::model::PageImage;
use crate::normalize::{DocumentNormalizer, NormalizeOptions};
use crate::segment::segment_lines;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Options for the export stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Ask the engine to classify text angle first
    pub classify_angle: bool,

    /// JSON output style
    pub json: JsonFormat,
}

impl ExportOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable angle classification.
    pub fn with_angle_classification(mut self, enabled: bool) -> Self {
        self.classify_angle = enabled;
        self
    }

    /// Set the JSON style.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json = format;
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            classify_angle: true,
            json: JsonFormat::Pretty,
        }
    }
}

/// Export result for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageExport {
    pub page: PageImage,
    pub json_path: PathBuf,
    pub word_count: usize,
}

/// Export result for one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    /// Directory holding the page images and their JSON files
    pub output_dir: PathBuf,

    /// Exported pages in document order
    pub pages: Vec<PageExport>,
}

impl ExportSummary {
    /// Total number of words across all pages.
    pub fn word_count(&self) -> usize {
        self.pages.iter().map(|p| p.word_count).sum()
    }
}

/// Normalizes an input, then recognizes and exports every page.
#[derive(Debug)]
pub struct Exporter<R> {
    recognizer: R,
    options: ExportOptions,
    normalize: NormalizeOptions,
    registry: ConverterRegistry,
}

impl<R: TextRecognizer> Exporter<R> {
    /// Create an exporter using `recognizer`.
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            options: ExportOptions::default(),
            normalize: NormalizeOptions::default(),
            registry: ConverterRegistry::with_defaults(),
        }
    }

    /// Set export options.
    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Set normalization options.
    pub fn with_normalize_options(mut self, options: NormalizeOptions) -> Self {
        self.normalize = options;
        self
    }

    /// Use a custom converter registry.
    pub fn with_registry(mut self, registry: ConverterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The recognizer in use.
    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Normalize `path` and export every page.
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<ExportSummary> {
        let normalized = DocumentNormalizer::new(path)?
            .with_options(self.normalize.clone())
            .with_registry(self.registry.clone())
            .normalize()?;

        let pages = self.export_pages(&normalized.pages)?;
        Ok(ExportSummary {
            output_dir: normalized.output_dir,
            pages,
        })
    }

    /// Export already normalized pages, in the given order.
    pub fn export_pages(&self, pages: &[PageImage]) -> Result<Vec<PageExport>> {
        pages.iter().map(|page| self.export_page(page)).collect()
    }

    /// Recognize one page and write its JSON next to the image.
    pub fn export_page(&self, page: &PageImage) -> Result<PageExport> {
        let lines = self
            .recognizer
            .recognize(&page.path, self.options.classify_angle)
            .map_err(|e| {
                log::error!("recognition failed for {}: {}", page.path.display(), e);
                e
            })?;

        let record = segment_lines(&lines);
        log::debug!(
            "page {}: {} line(s), {} word(s)",
            page.index,
            lines.len(),
            record.len()
        );

        let json_path = page.path.with_file_name(format!("{}.json", page.stem()));
        write_record(&record, &json_path, self.options.json)?;

        Ok(PageExport {
            page: page.clone(),
            json_path,
            word_count: record.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::from_fn;
    use crate::error::Error;
    use crate::model::{DetectionLine, Quad};

    fn page(dir: &Path, index: u32) -> PageImage {
        PageImage {
            index,
            path: dir.join(PageImage::page_file_name("doc", index)),
            width: 100,
            height: 100,
        }
    }

    #[test]
    fn test_export_options_defaults() {
        let options = ExportOptions::default();
        assert!(options.classify_angle);
        assert_eq!(options.json, JsonFormat::Pretty);

        let options = ExportOptions::new()
            .with_angle_classification(false)
            .with_json_format(JsonFormat::Compact);
        assert!(!options.classify_angle);
        assert_eq!(options.json, JsonFormat::Compact);
    }

    #[test]
    fn test_export_page_writes_json_beside_image() {
        let temp = tempfile::tempdir().unwrap();
        let engine = from_fn(|_: &Path, cls: bool| {
            assert!(cls);
            Ok(vec![
                DetectionLine::new(Quad::from_rect(0.0, 0.0, 100.0, 10.0), "ab cd"),
                DetectionLine::new(Quad::from_rect(0.0, 20.0, 100.0, 10.0), "   "),
            ])
        });

        let export = Exporter::new(engine)
            .export_page(&page(temp.path(), 2))
            .unwrap();

        assert_eq!(export.word_count, 2);
        assert_eq!(export.json_path, temp.path().join("doc_result_page_2.json"));
        let record = read_record(&export.json_path).unwrap();
        assert_eq!(record.words[1].text, "cd");
    }

    #[test]
    fn test_engine_error_writes_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let engine = from_fn(|_: &Path, _: bool| Err(Error::Engine("boom".into())));

        let err = Exporter::new(engine)
            .export_page(&page(temp.path(), 1))
            .unwrap_err();
        assert!(matches!(err, Error::Engine(_)));
        assert!(!temp.path().join("doc_result_page_1.json").exists());
    }

    #[test]
    fn test_summary_word_count() {
        let temp = tempfile::tempdir().unwrap();
        let summary = ExportSummary {
            output_dir: temp.path().to_path_buf(),
            pages: vec![
                PageExport {
                    page: page(temp.path(), 1),
                    json_path: temp.path().join("a.json"),
                    word_count: 3,
                },
                PageExport {
                    page: page(temp.path(), 2),
                    json_path: temp.path().join("b.json"),
                    word_count: 4,
                },
            ],
        };
        assert_eq!(summary.word_count(), 7);
    }
}
