// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: rotate, resample and crop source scans, and convert picture
// regions to the sample format requested for embedding. Operates on in-memory
// images using the `image` and `imageproc` crates.

use image::imageops::{self, BiLevel};
use image::{DynamicImage, GrayImage, Luma, RgbImage, RgbaImage};
use imageproc::geometric_transformations::{self, Interpolation};
use satzwerk_core::error::{Result, SatzwerkError};
use satzwerk_core::{ColorFormat, DitherMethod, Rect};
use tracing::{debug, info, instrument};

/// Image processing pipeline operating on a single in-memory image.
///
/// Transformations consume `self` and return a new `ImageProcessor`, so calls
/// chain:
///
/// ```ignore
/// let region = ImageProcessor::open("scan.png")?
///     .rotate(90.0)
///     .resize_exact(1275, 1650)
///     .crop(Rect::new(100, 100, 400, 300))
///     .into_dynamic();
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|err| {
            SatzwerkError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Resample to exactly `width` x `height`.
    pub fn resize_exact(self, width: u32, height: u32) -> Self {
        if width == self.image.width() && height == self.image.height() {
            return self;
        }
        debug!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            width,
            height,
            "Resampling image"
        );
        let resized = self
            .image
            .resize_exact(width, height, imageops::FilterType::Triangle);
        Self { image: resized }
    }

    /// Rotate by an arbitrary angle in degrees (clockwise).
    ///
    /// Multiples of 90 are rotated losslessly; other angles are rotated about
    /// the centre with bilinear interpolation on a white canvas of the same
    /// size.
    #[instrument(skip(self))]
    pub fn rotate(self, degrees: f64) -> Self {
        let normalised = degrees.rem_euclid(360.0);
        if normalised.abs() < 0.01 || (normalised - 360.0).abs() < 0.01 {
            return self;
        }
        if (normalised - 90.0).abs() < 0.01 {
            return Self {
                image: self.image.rotate90(),
            };
        }
        if (normalised - 180.0).abs() < 0.01 {
            return Self {
                image: self.image.rotate180(),
            };
        }
        if (normalised - 270.0).abs() < 0.01 {
            return Self {
                image: self.image.rotate270(),
            };
        }

        let rgba = self.image.to_rgba8();
        let rotated: RgbaImage = geometric_transformations::rotate_about_center(
            &rgba,
            (degrees as f32).to_radians(),
            Interpolation::Bilinear,
            image::Rgba([255u8, 255, 255, 255]),
        );
        debug!("General rotation applied");
        Self {
            image: DynamicImage::ImageRgba8(rotated),
        }
    }

    /// Cut out `region`, clamped to the image bounds. A region entirely
    /// outside the image yields an empty image.
    pub fn crop(self, region: Rect) -> Self {
        let (x, y, width, height) = clamp_region(region, self.image.width(), self.image.height());
        Self {
            image: self.image.crop_imm(x, y, width, height),
        }
    }

    // -- Colour conversion ----------------------------------------------------

    /// Convert to the requested sample format. `dither` only applies when
    /// reducing to monochrome.
    pub fn to_color_format(&self, format: ColorFormat, dither: DitherMethod) -> ConvertedImage {
        match format {
            ColorFormat::Color => ConvertedImage::Rgb(self.image.to_rgb8()),
            ColorFormat::Grayscale => ConvertedImage::Gray(self.image.to_luma8()),
            ColorFormat::Monochrome => {
                let mut gray = self.image.to_luma8();
                match dither {
                    DitherMethod::Threshold => {
                        for pixel in gray.pixels_mut() {
                            *pixel = Luma([if pixel.0[0] > 127 { 255 } else { 0 }]);
                        }
                    }
                    DitherMethod::Diffuse => imageops::dither(&mut gray, &BiLevel),
                }
                ConvertedImage::Mono(gray)
            }
        }
    }
}

/// `region` clamped to a `width` x `height` image, as `(x, y, width, height)`.
pub(crate) fn clamp_region(region: Rect, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let img_w = i64::from(width);
    let img_h = i64::from(height);

    let x0 = i64::from(region.x).clamp(0, img_w);
    let y0 = i64::from(region.y).clamp(0, img_h);
    let x1 = (i64::from(region.x) + i64::from(region.width.max(0))).clamp(x0, img_w);
    let y1 = (i64::from(region.y) + i64::from(region.height.max(0))).clamp(y0, img_h);

    (x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32)
}

/// A picture converted to one of the embeddable sample formats.
///
/// Monochrome images are stored one byte per pixel holding 0 (black) or 255
/// (white) until they are packed.
#[derive(Debug, Clone)]
pub enum ConvertedImage {
    Rgb(RgbImage),
    Gray(GrayImage),
    Mono(GrayImage),
}

impl ConvertedImage {
    pub fn color_format(&self) -> ColorFormat {
        match self {
            Self::Rgb(_) => ColorFormat::Color,
            Self::Gray(_) => ColorFormat::Grayscale,
            Self::Mono(_) => ColorFormat::Monochrome,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Rgb(img) => img.dimensions(),
            Self::Gray(img) | Self::Mono(img) => img.dimensions(),
        }
    }

    /// Bytes per packed row: `ceil(width * bits / 8) * components`.
    pub fn row_bytes(&self) -> usize {
        let format = self.color_format();
        let (width, _) = self.dimensions();
        let bits = width as usize * usize::from(format.bits_per_component());
        bits.div_ceil(8) * usize::from(format.components())
    }

    /// Pack rows into one contiguous buffer without row padding.
    ///
    /// Monochrome rows are packed MSB first with 1 = white, matching a
    /// 1-bit `DeviceGray` image. Unused trailing bits of a row are zero.
    pub fn pack(&self) -> Vec<u8> {
        match self {
            Self::Rgb(img) => img.as_raw().clone(),
            Self::Gray(img) => img.as_raw().clone(),
            Self::Mono(img) => {
                let row_bytes = self.row_bytes();
                let (width, height) = img.dimensions();
                let mut packed = vec![0u8; row_bytes * height as usize];
                for (y, row) in packed.chunks_exact_mut(row_bytes.max(1)).enumerate() {
                    for x in 0..width {
                        if img.get_pixel(x, y as u32).0[0] != 0 {
                            row[(x / 8) as usize] |= 0x80 >> (x % 8);
                        }
                    }
                }
                packed
            }
        }
    }

    /// Back to a `DynamicImage`, for on-screen use.
    pub fn into_dynamic(self) -> DynamicImage {
        match self {
            Self::Rgb(img) => DynamicImage::ImageRgb8(img),
            Self::Gray(img) | Self::Mono(img) => DynamicImage::ImageLuma8(img),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, _| {
            Luma([((x * 255) / width.max(2).saturating_sub(1)) as u8])
        }))
    }

    #[test]
    fn crop_clamps_to_bounds() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(50, 40));
        let cropped = ImageProcessor::from_dynamic(img.clone())
            .crop(Rect::new(40, 30, 20, 20))
            .into_dynamic();
        assert_eq!((cropped.width(), cropped.height()), (10, 10));

        let outside = ImageProcessor::from_dynamic(img)
            .crop(Rect::new(60, 0, 10, 10))
            .into_dynamic();
        assert_eq!(outside.width(), 0);
    }

    #[test]
    fn negative_origin_is_clamped() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(20, 20));
        let cropped = ImageProcessor::from_dynamic(img)
            .crop(Rect::new(-5, -5, 10, 10))
            .into_dynamic();
        assert_eq!((cropped.width(), cropped.height()), (5, 5));
    }

    #[test]
    fn quarter_turn_swaps_dimensions() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(30, 10));
        let rotated = ImageProcessor::from_dynamic(img).rotate(-90.0);
        assert_eq!((rotated.width(), rotated.height()), (10, 30));
    }

    #[test]
    fn threshold_produces_only_black_and_white() {
        let converted = ImageProcessor::from_dynamic(gradient(64, 4))
            .to_color_format(ColorFormat::Monochrome, DitherMethod::Threshold);
        let ConvertedImage::Mono(mono) = &converted else {
            panic!("expected monochrome output");
        };
        assert!(mono.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        assert_eq!(mono.get_pixel(0, 0).0[0], 0);
        assert_eq!(mono.get_pixel(63, 0).0[0], 255);
    }

    #[test]
    fn diffusion_preserves_mean_tone() {
        let mid = DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 64, Luma([128u8])));
        let ConvertedImage::Mono(mono) = ImageProcessor::from_dynamic(mid)
            .to_color_format(ColorFormat::Monochrome, DitherMethod::Diffuse)
        else {
            panic!("expected monochrome output");
        };
        let white = mono.pixels().filter(|p| p.0[0] == 255).count();
        let ratio = white as f64 / (64.0 * 64.0);
        assert!((0.35..0.65).contains(&ratio), "white ratio {ratio}");
    }

    #[test]
    fn row_bytes_follow_sample_geometry() {
        let img = gradient(10, 3);
        let proc = ImageProcessor::from_dynamic(img);
        let rgb = proc.to_color_format(ColorFormat::Color, DitherMethod::Threshold);
        assert_eq!(rgb.row_bytes(), 30);
        assert_eq!(rgb.pack().len(), 90);
        let gray = proc.to_color_format(ColorFormat::Grayscale, DitherMethod::Threshold);
        assert_eq!(gray.row_bytes(), 10);
        let mono = proc.to_color_format(ColorFormat::Monochrome, DitherMethod::Threshold);
        assert_eq!(mono.row_bytes(), 2);
        assert_eq!(mono.pack().len(), 6);
    }

    #[test]
    fn mono_packing_is_msb_first_white_is_one() {
        let mut img = GrayImage::from_pixel(9, 1, Luma([0u8]));
        img.put_pixel(0, 0, Luma([255]));
        img.put_pixel(8, 0, Luma([255]));
        let packed = ConvertedImage::Mono(img).pack();
        assert_eq!(packed, vec![0b1000_0000, 0b1000_0000]);
    }
}
