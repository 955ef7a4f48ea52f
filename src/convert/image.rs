//! Single-image inputs: HEIC, TIFF and other rasters re-encoded as one PNG.

use super::PageConverter;
use crate::detect::{image_kind, ImageKind};
use crate::error::{Error, Result};
use crate::model::{InputDocument, PageImage};
use crate::normalize::{NormalizeOptions, OutputDirectory, RasterPage};
use ::image::RgbImage;
use std::path::Path;

/// Converter for single-image inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageConverter;

impl ImageConverter {
    /// Create a new image converter.
    pub fn new() -> Self {
        Self
    }

    /// Decode an image file to RGB according to its extension.
    pub fn decode(&self, path: &Path, ext: &str, target: &Path) -> Result<RgbImage> {
        match image_kind(ext) {
            ImageKind::Heic => decode_heic(path),
            ImageKind::Tiff | ImageKind::Raster => decode_raster(path, target),
        }
    }
}

impl PageConverter for ImageConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["jpg", "png", "heic", "tiff", "tif"]
    }

    fn name(&self) -> &str {
        "image"
    }

    fn convert(
        &self,
        input: &InputDocument,
        output: &mut OutputDirectory,
        _options: &NormalizeOptions,
    ) -> Result<Vec<PageImage>> {
        let file_name = PageImage::single_file_name(input.base_name());
        let target = output.file_path(&file_name);

        let rgb = self.decode(input.path(), input.extension(), &target)?;
        log::debug!(
            "decoded {} ({}x{})",
            input.path().display(),
            rgb.width(),
            rgb.height()
        );

        output.save_pages(vec![RasterPage::new(1, file_name, rgb)], false)
    }
}

/// TIFF and ordinary rasters. Only the first frame of a multi-page TIFF is
/// kept; alpha is dropped.
fn decode_raster(path: &Path, target: &Path) -> Result<RgbImage> {
    let decoded = ::image::open(path).map_err(|e| Error::ImageDecode {
        source_path: path.to_path_buf(),
        target: target.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(decoded.into_rgb8())
}

#[cfg(feature = "heic")]
fn decode_heic(path: &Path) -> Result<RgbImage> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let path_str = path
        .to_str()
        .ok_or_else(|| Error::Heic(format!("non UTF-8 path: {}", path.display())))?;

    let lib_heif = LibHeif::new();
    let ctx = HeifContext::read_from_file(path_str).map_err(|e| Error::Heic(e.to_string()))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| Error::Heic(e.to_string()))?;
    let decoded = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(|e| Error::Heic(e.to_string()))?;

    let planes = decoded.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| Error::Heic("decoded image has no interleaved plane".into()))?;

    let (width, height) = (plane.width, plane.height);
    let row_len = width as usize * 3;
    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in plane.data.chunks(plane.stride).take(height as usize) {
        pixels.extend_from_slice(&row[..row_len]);
    }

    RgbImage::from_raw(width, height, pixels)
        .ok_or_else(|| Error::Heic("decoded plane is smaller than its dimensions".into()))
}

#[cfg(not(feature = "heic"))]
fn decode_heic(path: &Path) -> Result<RgbImage> {
    Err(Error::HeicUnavailable(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{ImageFormat, Rgb, Rgba, RgbaImage};
    use tempfile::tempdir;

    #[test]
    fn test_jpg_and_png_become_single_png() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("photo.png");
        RgbaImage::from_pixel(5, 3, Rgba([10, 20, 30, 128]))
            .save_with_format(&src, ImageFormat::Png)
            .unwrap();

        let input = InputDocument::new(&src).unwrap();
        let mut out = OutputDirectory::create(input.output_dir()).unwrap();
        let pages = ImageConverter::new()
            .convert(&input, &mut out, &NormalizeOptions::default())
            .unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].index, 1);
        assert_eq!(pages[0].path, temp.path().join("photo").join("photo.png"));
        assert_eq!((pages[0].width, pages[0].height), (5, 3));

        let written = ::image::open(&pages[0].path).unwrap();
        assert_eq!(written.color(), ::image::ColorType::Rgb8);
    }

    #[test]
    fn test_tiff_input() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("scan.tif");
        RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]))
            .save_with_format(&src, ImageFormat::Tiff)
            .unwrap();

        let input = InputDocument::new(&src).unwrap();
        let mut out = OutputDirectory::create(input.output_dir()).unwrap();
        let pages = ImageConverter::new()
            .convert(&input, &mut out, &NormalizeOptions::default())
            .unwrap();
        assert_eq!(pages[0].path.file_name().unwrap(), "scan.png");
    }

    #[test]
    fn test_corrupt_image_reports_paths() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("broken.jpg");
        std::fs::write(&src, b"not a jpeg").unwrap();

        let input = InputDocument::new(&src).unwrap();
        let mut out = OutputDirectory::create(input.output_dir()).unwrap();
        let err = ImageConverter::new()
            .convert(&input, &mut out, &NormalizeOptions::default())
            .unwrap_err();

        match err {
            Error::ImageDecode {
                source_path,
                target,
                ..
            } => {
                assert_eq!(source_path, src);
                assert_eq!(target.file_name().unwrap(), "broken.png");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(not(feature = "heic"))]
    #[test]
    fn test_heic_without_feature() {
        let err = decode_heic(Path::new("photo.heic")).unwrap_err();
        assert!(matches!(err, Error::HeicUnavailable(_)));
    }
}
