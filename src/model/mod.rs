//! Data model shared by the normalization, segmentation and export stages.
//!
//! Everything here is plain data: geometry in page pixel space, the input
//! and page descriptors, and the line/word records that flow from the
//! recognition engine to the JSON artifacts.

mod geometry;
mod page;
mod word;

pub use geometry::{Point, Quad};
pub use page::{InputDocument, PageImage};
pub use word::{DetectionLine, ExportRecord, WordSpan};
