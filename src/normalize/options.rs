//! Normalization options and configuration.

use std::path::PathBuf;

/// Options for turning an input file into page images.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// PDF rasterization settings
    pub pdf: PdfRenderSettings,

    /// Page layout used when rendering documents through HTML
    pub page_setup: PageSetup,

    /// Whether to encode rendered pages in parallel
    pub parallel: bool,
}

impl NormalizeOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set PDF rasterization settings.
    pub fn with_pdf_settings(mut self, settings: PdfRenderSettings) -> Self {
        self.pdf = settings;
        self
    }

    /// Set the document page layout.
    pub fn with_page_setup(mut self, setup: PageSetup) -> Self {
        self.page_setup = setup;
        self
    }

    /// Disable parallel page encoding.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            pdf: PdfRenderSettings::default(),
            page_setup: PageSetup::default(),
            parallel: true,
        }
    }
}

/// Settings for PDF page rasterization.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfRenderSettings {
    /// Pixels per PDF point (1.0 = 72 DPI, no extra scaling)
    pub scale: f32,

    /// Directory to look for the PDFium shared library first
    pub library_dir: Option<PathBuf>,
}

impl PdfRenderSettings {
    /// Create settings with unit scale.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the render scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Set the PDFium library directory.
    pub fn with_library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.library_dir = Some(dir.into());
        self
    }
}

impl Default for PdfRenderSettings {
    fn default() -> Self {
        Self {
            scale: 1.0,
            library_dir: None,
        }
    }
}

/// Paper size for documents rendered through HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    /// 210 x 297 mm
    #[default]
    A4,
    /// 8.5 x 11 in
    Letter,
    /// 8.5 x 14 in
    Legal,
}

impl PageSize {
    /// Name understood by HTML renderers.
    pub fn as_str(&self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::Letter => "Letter",
            PageSize::Legal => "Legal",
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Name understood by HTML renderers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "Portrait",
            Orientation::Landscape => "Landscape",
        }
    }
}

/// Page margins in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    /// Same margin on every side.
    pub fn uniform(inches: f32) -> Self {
        Self {
            top: inches,
            right: inches,
            bottom: inches,
            left: inches,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

/// Layout of the intermediate PDF rendered from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSetup {
    pub size: PageSize,
    pub orientation: Orientation,
    pub margins: Margins,
    /// Content zoom factor
    pub zoom: f32,
}

impl PageSetup {
    /// A4 portrait, 1 inch margins, 0.9 zoom.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the paper size.
    pub fn with_size(mut self, size: PageSize) -> Self {
        self.size = size;
        self
    }

    /// Set the orientation.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the margins.
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Set the zoom factor.
    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            orientation: Orientation::Portrait,
            margins: Margins::default(),
            zoom: 0.9,
        }
    }
}
