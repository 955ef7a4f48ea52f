//! The per-input output directory and its rollback ledger.

use crate::error::{Error, Result};
use crate::model::PageImage;
use image::{ImageFormat, RgbImage};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A rendered page that has not been written yet.
#[derive(Debug, Clone)]
pub struct RasterPage {
    /// Page number (1-indexed)
    pub index: u32,

    /// Target file name inside the output directory
    pub file_name: String,

    /// RGB pixels
    pub image: RgbImage,
}

impl RasterPage {
    /// Create a new raster page.
    pub fn new(index: u32, file_name: impl Into<String>, image: RgbImage) -> Self {
        Self {
            index,
            file_name: file_name.into(),
            image,
        }
    }
}

/// Directory receiving the page images of one input.
///
/// Records whether it was created by this run and every file written into
/// it, so a failed conversion can remove exactly what it produced.
#[derive(Debug)]
pub struct OutputDirectory {
    path: PathBuf,
    created: bool,
    written: Vec<PathBuf>,
}

impl OutputDirectory {
    /// Create the directory, or reuse it if it already exists.
    pub fn create<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let created = !path.is_dir();
        fs::create_dir_all(&path)?;

        if created {
            log::debug!("created output directory {}", path.display());
        } else {
            log::debug!("reusing output directory {}", path.display());
        }

        Ok(Self {
            path,
            created,
            written: Vec::new(),
        })
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this run created the directory.
    pub fn created(&self) -> bool {
        self.created
    }

    /// Path of a file inside the directory.
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.path.join(file_name)
    }

    /// Remember a file written by this run.
    pub fn record(&mut self, path: PathBuf) {
        if !self.written.contains(&path) {
            self.written.push(path);
        }
    }

    /// Files written by this run, in write order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Encode pages as PNG files.
    ///
    /// File names are fixed up front, so pages can be encoded in parallel
    /// without affecting the result order. Every attempted file that did not
    /// exist before is recorded, even when encoding fails, and the first
    /// failure is returned. Files left by an earlier run are overwritten but
    /// never recorded, so a rollback keeps them.
    pub fn save_pages(&mut self, pages: Vec<RasterPage>, parallel: bool) -> Result<Vec<PageImage>> {
        let dir = self.path.clone();

        let results: Vec<(PathBuf, bool, Result<PageImage>)> = if parallel && pages.len() > 1 {
            pages
                .into_par_iter()
                .map(|page| write_page(&dir, page))
                .collect()
        } else {
            pages
                .into_iter()
                .map(|page| write_page(&dir, page))
                .collect()
        };

        let mut saved = Vec::with_capacity(results.len());
        let mut first_error = None;
        for (path, existed, result) in results {
            if !existed {
                self.record(path);
            }
            match result {
                Ok(page) => saved.push(page),
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                saved.sort_by_key(|p| p.index);
                Ok(saved)
            }
        }
    }

    /// Remove every file written by this run, then the directory if this run
    /// created it.
    ///
    /// Returns `false` if anything could not be removed; each leftover is
    /// logged as a warning.
    pub fn rollback(self) -> bool {
        let mut complete = true;

        for file in self.written.iter().rev() {
            match fs::remove_file(file) {
                Ok(()) => log::debug!("rolled back {}", file.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    log::warn!("could not remove {}: {}", file.display(), e);
                    complete = false;
                }
            }
        }

        if self.created {
            if let Err(e) = fs::remove_dir(&self.path) {
                if e.kind() != io::ErrorKind::NotFound {
                    log::warn!(
                        "could not remove output directory {}: {}",
                        self.path.display(),
                        e
                    );
                    complete = false;
                }
            }
        }

        complete
    }

    /// Keep the directory and return its path.
    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

fn write_page(dir: &Path, page: RasterPage) -> (PathBuf, bool, Result<PageImage>) {
    let path = dir.join(&page.file_name);
    let existed = path.exists();
    let (width, height) = page.image.dimensions();

    let result = page
        .image
        .save_with_format(&path, ImageFormat::Png)
        .map_err(|e| Error::ImageEncode {
            target: path.clone(),
            message: e.to_string(),
        })
        .map(|()| {
            log::info!("wrote page {} to {}", page.index, path.display());
            PageImage {
                index: page.index,
                path: path.clone(),
                width,
                height,
            }
        });

    (path, existed, result)
}
