//! PDF rasterization through PDFium.

use super::PageConverter;
use crate::error::{Error, Result};
use crate::model::{InputDocument, PageImage};
use crate::normalize::{NormalizeOptions, OutputDirectory, PdfRenderSettings, RasterPage};
use ::image::{DynamicImage, RgbImage, RgbaImage};
use pdfium_render::prelude::*;
use std::path::Path;

/// Renders PDF pages to RGB images.
///
/// PDFium is bound at construction; the binding is not shared across
/// threads, so create one rasterizer per conversion.
pub struct PageRasterizer {
    pdfium: Pdfium,
    scale: f32,
}

impl PageRasterizer {
    /// Bind PDFium and create a rasterizer.
    pub fn new(settings: &PdfRenderSettings) -> Result<Self> {
        let bindings = bind_pdfium(settings.library_dir.as_deref())?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
            scale: settings.scale,
        })
    }

    /// Number of pages in a PDF file.
    pub fn page_count(&self, path: &Path) -> Result<usize> {
        let document = self.load(path)?;
        Ok(document.pages().len() as usize)
    }

    /// Render every page of a PDF file, in page order.
    pub fn render_file(&self, path: &Path) -> Result<Vec<RgbImage>> {
        let document = self.load(path)?;
        let page_count = document.pages().len() as usize;
        if page_count == 0 {
            return Err(Error::EmptyPdf(path.to_path_buf()));
        }

        log::debug!("rendering {} page(s) of {}", page_count, path.display());

        let mut images = Vec::with_capacity(page_count);
        for (index, page) in document.pages().iter().enumerate() {
            images.push(self.render_page(&page, index + 1)?);
        }
        Ok(images)
    }

    fn load<'a>(&'a self, path: &Path) -> Result<PdfDocument<'a>> {
        self.pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| Error::PdfLoad {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    fn render_page(&self, page: &PdfPage, number: usize) -> Result<RgbImage> {
        let config = PdfRenderConfig::new()
            .scale_page_by_factor(self.scale)
            .render_form_data(true)
            .render_annotations(true);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| Error::PdfRender {
                page: number,
                message: e.to_string(),
            })?;

        let width = bitmap.width() as u32;
        let height = bitmap.height() as u32;
        let rgba = RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes()).ok_or_else(|| {
            Error::PdfRender {
                page: number,
                message: "bitmap buffer does not match its dimensions".into(),
            }
        })?;

        Ok(DynamicImage::ImageRgba8(rgba).into_rgb8())
    }
}

/// Locations searched for the PDFium shared library, after the configured
/// directory and before the system library path.
const LIBRARY_DIRS: &[&str] = &["./", "/usr/lib", "/usr/local/lib", "/opt/homebrew/lib"];

fn bind_pdfium(library_dir: Option<&Path>) -> Result<Box<dyn PdfiumLibraryBindings>> {
    let candidates = library_dir
        .map(|dir| dir.to_string_lossy().into_owned())
        .into_iter()
        .chain(LIBRARY_DIRS.iter().map(|dir| dir.to_string()));

    for dir in candidates {
        match Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir.as_str())) {
            Ok(bindings) => {
                log::debug!("bound PDFium from {}", dir);
                return Ok(bindings);
            }
            Err(e) => log::trace!("no PDFium in {}: {}", dir, e),
        }
    }

    Pdfium::bind_to_system_library()
        .map_err(|e| Error::PdfiumUnavailable(format!("Could not find PDFium library: {}", e)))
}

/// Rasterize a PDF into `<base_name>_result_page_<i>.png` files.
pub fn rasterize_pdf(
    path: &Path,
    base_name: &str,
    output: &mut OutputDirectory,
    options: &NormalizeOptions,
) -> Result<Vec<PageImage>> {
    let rasterizer = PageRasterizer::new(&options.pdf)?;
    let images = rasterizer.render_file(path)?;

    let pages = images
        .into_iter()
        .zip(1u32..)
        .map(|(image, index)| {
            RasterPage::new(index, PageImage::page_file_name(base_name, index), image)
        })
        .collect();

    output.save_pages(pages, options.parallel)
}

/// Converter for PDF inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfConverter;

impl PdfConverter {
    /// Create a new PDF converter.
    pub fn new() -> Self {
        Self
    }
}

impl PageConverter for PdfConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn name(&self) -> &str {
        "pdf"
    }

    fn convert(
        &self,
        input: &InputDocument,
        output: &mut OutputDirectory,
        options: &NormalizeOptions,
    ) -> Result<Vec<PageImage>> {
        rasterize_pdf(input.path(), input.base_name(), output, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_dir_falls_through() {
        // A bogus configured directory must not stop the search; the result
        // depends on whether PDFium is installed, but never panics.
        let settings = PdfRenderSettings::new().with_library_dir("/nonexistent/pdfium");
        match PageRasterizer::new(&settings) {
            Ok(_) => {}
            Err(e) => assert!(matches!(e, Error::PdfiumUnavailable(_))),
        }
    }

    #[test]
    fn test_converter_metadata() {
        let converter = PdfConverter::new();
        assert_eq!(converter.name(), "pdf");
        assert!(converter.supports_extension("PDF"));
        assert!(!converter.supports_extension("docx"));
    }
}
