//! HTML to PDF rendering for office documents.

use crate::error::{Error, Result};
use crate::normalize::PageSetup;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Renders an HTML document to a PDF file.
pub trait HtmlRenderer: Send + Sync {
    /// Renderer name, for logs.
    fn name(&self) -> &str;

    /// Write `html` as a PDF to `output`, laid out with `setup`.
    fn render(&self, html: &str, setup: &PageSetup, output: &Path) -> Result<()>;
}

/// Renderer backed by the `wkhtmltopdf` executable.
#[derive(Debug, Clone)]
pub struct WkHtmlToPdf {
    program: PathBuf,
}

impl WkHtmlToPdf {
    /// Use `wkhtmltopdf` from `PATH`.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("wkhtmltopdf"),
        }
    }

    /// Use a specific executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Executable that will be run.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command line arguments for one render, excluding the program.
    pub fn args(setup: &PageSetup, html: &Path, pdf: &Path) -> Vec<String> {
        let margin = |inches: f32| format!("{}in", inches);
        vec![
            "--quiet".into(),
            "--enable-local-file-access".into(),
            "--page-size".into(),
            setup.size.as_str().into(),
            "--orientation".into(),
            setup.orientation.as_str().into(),
            "--margin-top".into(),
            margin(setup.margins.top),
            "--margin-right".into(),
            margin(setup.margins.right),
            "--margin-bottom".into(),
            margin(setup.margins.bottom),
            "--margin-left".into(),
            margin(setup.margins.left),
            "--zoom".into(),
            setup.zoom.to_string(),
            html.to_string_lossy().into_owned(),
            pdf.to_string_lossy().into_owned(),
        ]
    }
}

impl Default for WkHtmlToPdf {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlRenderer for WkHtmlToPdf {
    fn name(&self) -> &str {
        "wkhtmltopdf"
    }

    fn render(&self, html: &str, setup: &PageSetup, output: &Path) -> Result<()> {
        let mut source = tempfile::Builder::new()
            .prefix("wordocr-")
            .suffix(".html")
            .tempfile()?;
        source.write_all(html.as_bytes())?;
        source.flush()?;

        let args = Self::args(setup, source.path(), output);
        log::debug!("running {} {}", self.program.display(), args.join(" "));

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                Error::HtmlRender(format!("failed to run {}: {}", self.program.display(), e))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Error::HtmlRender(format!(
                "{} exited with {}: {}",
                self.program.display(),
                result.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{Margins, Orientation, PageSize};

    #[test]
    fn test_default_args() {
        let args = WkHtmlToPdf::args(
            &PageSetup::default(),
            Path::new("/tmp/in.html"),
            Path::new("/tmp/out.pdf"),
        );
        assert_eq!(
            args,
            vec![
                "--quiet",
                "--enable-local-file-access",
                "--page-size",
                "A4",
                "--orientation",
                "Portrait",
                "--margin-top",
                "1in",
                "--margin-right",
                "1in",
                "--margin-bottom",
                "1in",
                "--margin-left",
                "1in",
                "--zoom",
                "0.9",
                "/tmp/in.html",
                "/tmp/out.pdf",
            ]
        );
    }

    #[test]
    fn test_custom_setup_args() {
        let setup = PageSetup::new()
            .with_size(PageSize::Letter)
            .with_orientation(Orientation::Landscape)
            .with_margins(Margins::uniform(0.5));
        let args = WkHtmlToPdf::args(&setup, Path::new("a.html"), Path::new("b.pdf"));
        assert!(args.windows(2).any(|w| w == ["--page-size", "Letter"]));
        assert!(args.windows(2).any(|w| w == ["--orientation", "Landscape"]));
        assert!(args.windows(2).any(|w| w == ["--margin-left", "0.5in"]));
    }

    #[test]
    fn test_missing_program_is_render_error() {
        let renderer = WkHtmlToPdf::with_program("/nonexistent/wkhtmltopdf");
        let err = renderer
            .render("<p>x</p>", &PageSetup::default(), Path::new("out.pdf"))
            .unwrap_err();
        assert!(matches!(err, Error::HtmlRender(_)));
    }
}
