//! Input documents and the page images produced from them.

use crate::detect::{classify_path, extension_of, FileCategory};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An input file and its detected category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDocument {
    path: PathBuf,
    category: FileCategory,
    extension: String,
    base_name: String,
}

impl InputDocument {
    /// Describe an input file.
    ///
    /// Fails with [`Error::EmptyInputPath`] for an empty path. No I/O is done.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::EmptyInputPath);
        }

        let base_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            category: classify_path(path),
            extension: extension_of(path).unwrap_or_default(),
            base_name,
        })
    }

    /// Source file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Detected category.
    pub fn category(&self) -> FileCategory {
        self.category
    }

    /// Lowercase extension without the dot (empty if none).
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// File name without extension.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Directory that receives the page images: a sibling of the input
    /// named after its base name.
    pub fn output_dir(&self) -> PathBuf {
        let parent = self.path.parent().unwrap_or_else(|| Path::new(""));
        parent.join(&self.base_name)
    }
}

/// One rasterized page written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageImage {
    /// Page number (1-indexed, document order)
    pub index: u32,

    /// Location of the PNG file
    pub path: PathBuf,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,
}

impl PageImage {
    /// File name for the only page of a single-image source.
    pub fn single_file_name(base_name: &str) -> String {
        format!("{}.png", base_name)
    }

    /// File name for one page of a multi-page source.
    pub fn page_file_name(base_name: &str, index: u32) -> String {
        format!("{}_result_page_{}.png", base_name, index)
    }

    /// File name without extension, used to name the page's JSON.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("page_{}", self.index))
    }
}
