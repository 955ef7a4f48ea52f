//! The text detection and recognition engine boundary.
//!
//! Recognition itself is out of scope for this crate: an engine takes a page
//! image and returns detected lines with their quadrilaterals. Any closure
//! can act as an engine through [`from_fn`]; [`ProcessRecognizer`] drives an
//! external program.

mod process;

pub use process::{parse_engine_output, ProcessRecognizer};

use crate::error::Result;
use crate::model::DetectionLine;
use std::path::Path;
use std::sync::Arc;

/// Line-level text detection and recognition for one page image.
pub trait TextRecognizer {
    /// Detect and transcribe the text lines of `image`.
    ///
    /// `classify_angle` asks the engine to correct rotated text first.
    fn recognize(&self, image: &Path, classify_angle: bool) -> Result<Vec<DetectionLine>>;
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for &T {
    fn recognize(&self, image: &Path, classify_angle: bool) -> Result<Vec<DetectionLine>> {
        (**self).recognize(image, classify_angle)
    }
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for Box<T> {
    fn recognize(&self, image: &Path, classify_angle: bool) -> Result<Vec<DetectionLine>> {
        (**self).recognize(image, classify_angle)
    }
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for Arc<T> {
    fn recognize(&self, image: &Path, classify_angle: bool) -> Result<Vec<DetectionLine>> {
        (**self).recognize(image, classify_angle)
    }
}

/// A recognizer backed by a closure. Created with [`from_fn`].
#[derive(Clone)]
pub struct FnRecognizer<F> {
    f: F,
}

impl<F> TextRecognizer for FnRecognizer<F>
where
    F: Fn(&Path, bool) -> Result<Vec<DetectionLine>>,
{
    fn recognize(&self, image: &Path, classify_angle: bool) -> Result<Vec<DetectionLine>> {
        (self.f)(image, classify_angle)
    }
}

impl<F> std::fmt::Debug for FnRecognizer<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnRecognizer")
    }
}

/// Wrap a closure as a [`TextRecognizer`].
///
/// # Example
///
/// ```
/// use wordocr::engine::{from_fn, TextRecognizer};
/// use wordocr::model::{DetectionLine, Quad};
/// use std::path::Path;
///
/// let engine = from_fn(|_page: &Path, _cls: bool| {
///     Ok(vec![DetectionLine::new(Quad::from_rect(0.0, 0.0, 50.0, 10.0), "hi there")])
/// });
/// let lines = engine.recognize(Path::new("page.png"), true).unwrap();
/// assert_eq!(lines.len(), 1);
/// ```
pub fn from_fn<F>(f: F) -> FnRecognizer<F>
where
    F: Fn(&Path, bool) -> Result<Vec<DetectionLine>>,
{
    FnRecognizer { f }
}
