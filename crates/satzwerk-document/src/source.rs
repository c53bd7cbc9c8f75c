// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source-image access: load the scan behind a page at output resolution and
// cut picture regions out of it.

use image::DynamicImage;
use satzwerk_core::OcrPage;
use satzwerk_core::Rect;
use satzwerk_core::error::{Result, SatzwerkError};
use tracing::{debug, instrument};

use crate::image::ImageProcessor;
use crate::image::processor::clamp_region;

/// Supplies the raster behind a page.
pub trait SourceImageProvider {
    /// The page scan rendered at `output_dpi` and rotated by the page angle.
    ///
    /// Fails with `PageUnavailable` when the scan cannot be obtained.
    fn load_page(&self, page: &OcrPage, output_dpi: u32) -> Result<DynamicImage>;
}

/// A loaded page scan in output-image pixel space.
pub struct PageRaster {
    image: DynamicImage,
}

impl PageRaster {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Copy of the region `rect` (output pixels), clamped to the raster.
    pub fn selection(&self, rect: Rect) -> DynamicImage {
        let (x, y, width, height) = clamp_region(rect, self.width(), self.height());
        self.image.crop_imm(x, y, width, height)
    }
}

/// Reads page scans from image files on disk.
///
/// Scans are assumed to be stored at the page's source resolution. Only
/// single-image files are supported, so any page number other than 1 is
/// unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFileSource;

impl SourceImageProvider for ImageFileSource {
    #[instrument(skip(self, page), fields(title = %page.title, path = %page.source_file.display()))]
    fn load_page(&self, page: &OcrPage, output_dpi: u32) -> Result<DynamicImage> {
        let unavailable = |reason: String| SatzwerkError::PageUnavailable {
            page: page.title.clone(),
            reason,
        };
        if page.page_number != 1 {
            return Err(unavailable(format!(
                "page {} of a single-image source",
                page.page_number
            )));
        }
        if page.source_dpi == 0 {
            return Err(unavailable("source resolution is zero".into()));
        }

        let processor = ImageProcessor::open(&page.source_file)
            .map_err(|err| unavailable(err.to_string()))?
            .rotate(page.angle);
        let scale = page.image_scale(output_dpi);
        let width = ((f64::from(processor.width()) * scale).round() as u32).max(1);
        let height = ((f64::from(processor.height()) * scale).round() as u32).max(1);
        debug!(width, height, scale, "Page raster prepared");
        Ok(processor.resize_exact(width, height).into_dynamic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use satzwerk_core::OcrNode;

    fn page(source_file: std::path::PathBuf, page_number: u32) -> OcrPage {
        OcrPage {
            title: "scan 1".into(),
            source_file,
            page_number,
            source_dpi: 100,
            angle: 0.0,
            bbox: Rect::new(0, 0, 40, 20),
            enabled: true,
            root: OcrNode::page(Rect::new(0, 0, 40, 20), Vec::new()),
        }
    }

    #[test]
    fn selection_clamps_to_raster() {
        let raster = PageRaster::new(DynamicImage::ImageLuma8(GrayImage::new(30, 30)));
        let region = raster.selection(Rect::new(20, 25, 20, 20));
        assert_eq!((region.width(), region.height()), (10, 5));
        assert_eq!(raster.selection(Rect::new(40, 0, 5, 5)).width(), 0);
    }

    #[test]
    fn selection_leaves_the_raster_untouched() {
        let mut scan = GrayImage::new(8, 8);
        scan.put_pixel(5, 6, Luma([200u8]));
        let raster = PageRaster::new(DynamicImage::ImageLuma8(scan));
        let region = raster.selection(Rect::new(4, 4, 3, 3)).to_luma8();
        assert_eq!(region.dimensions(), (3, 3));
        assert_eq!(region.get_pixel(1, 2).0, [200]);
        assert_eq!((raster.width(), raster.height()), (8, 8));
    }

    #[test]
    fn file_source_rescales_to_output_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        GrayImage::from_pixel(40, 20, Luma([200u8])).save(&path).unwrap();

        let image = ImageFileSource.load_page(&page(path, 1), 300).unwrap();
        assert_eq!((image.width(), image.height()), (120, 60));
    }

    #[test]
    fn rotation_is_applied_before_scaling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        GrayImage::new(40, 20).save(&path).unwrap();

        let mut rotated = page(path, 1);
        rotated.angle = 90.0;
        let image = ImageFileSource.load_page(&rotated, 200).unwrap();
        assert_eq!((image.width(), image.height()), (40, 80));
    }

    #[test]
    fn missing_file_is_page_unavailable() {
        let result = ImageFileSource.load_page(&page("/nonexistent/scan.png".into(), 1), 300);
        assert!(matches!(
            result,
            Err(SatzwerkError::PageUnavailable { ref page, .. }) if page == "scan 1"
        ));
    }

    #[test]
    fn later_pages_are_unavailable() {
        let result = ImageFileSource.load_page(&page("scan.tiff".into(), 2), 300);
        assert!(matches!(result, Err(SatzwerkError::PageUnavailable { .. })));
    }
}
