//! Image buffers shared by every stage, plus loading of source images.

use std::path::Path;

use image::{GrayImage, ImageBuffer, Luma, Pixel};
use num_traits::Zero;

use crate::error::{Error, Result};

/// Single-channel intensity image with samples in `[0, 255]`.
pub type RasterImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Component labels, `0` for background.
pub type LabelImage = ImageBuffer<Luma<u32>, Vec<u32>>;

/// Gray value stored for foreground pixels of a [`BinaryImage`].
pub const FOREGROUND: u8 = 255;

/// A foreground/background mask.
///
/// Backed by a [`GrayImage`] that only ever holds `0` and [`FOREGROUND`], so it can be handed
/// straight to `imageproc` routines that expect 8-bit input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage {
    mask: GrayImage,
}

impl BinaryImage {
    /// An all-background image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            mask: GrayImage::new(width, height),
        }
    }

    /// An all-foreground image.
    pub fn filled(width: u32, height: u32) -> Self {
        Self {
            mask: GrayImage::from_pixel(width, height, Luma([FOREGROUND])),
        }
    }

    /// Foreground wherever `f(x, y)` is true.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        Self {
            mask: GrayImage::from_fn(width, height, |x, y| Luma([encode(f(x, y))])),
        }
    }

    /// Wraps a gray buffer that already holds only `0` and [`FOREGROUND`].
    pub(crate) fn from_gray_unchecked(mask: GrayImage) -> Self {
        debug_assert!(mask.as_raw().iter().all(|&v| v == 0 || v == FOREGROUND));
        Self { mask }
    }

    /// Treats every pixel with any nonzero channel as foreground.
    ///
    /// Works for any subpixel type, so raw intensities, smoothed floats and label grids all
    /// coerce the same way.
    pub fn from_nonzero<P>(image: &ImageBuffer<P, Vec<P::Subpixel>>) -> Self
    where
        P: Pixel,
        P::Subpixel: Zero,
    {
        let (width, height) = image.dimensions();
        Self::from_fn(width, height, |x, y| {
            image.get_pixel(x, y).channels().iter().any(|c| !c.is_zero())
        })
    }

    /// Foreground where `sample >= threshold`.
    pub fn from_threshold(image: &RasterImage, threshold: f32) -> Self {
        let (width, height) = image.dimensions();
        Self::from_fn(width, height, |x, y| image.get_pixel(x, y)[0] >= threshold)
    }

    pub fn width(&self) -> u32 {
        self.mask.width()
    }

    pub fn height(&self) -> u32 {
        self.mask.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.mask.dimensions()
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.mask.get_pixel(x, y)[0] != 0
    }

    pub fn set(&mut self, x: u32, y: u32, foreground: bool) {
        self.mask.put_pixel(x, y, Luma([encode(foreground)]));
    }

    pub fn foreground_count(&self) -> usize {
        self.mask.as_raw().iter().filter(|&&v| v != 0).count()
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.mask
    }

    pub fn into_gray(self) -> GrayImage {
        self.mask
    }

    /// Foreground becomes `255.0`, background `0.0`.
    pub fn to_raster(&self) -> RasterImage {
        let (width, height) = self.dimensions();
        RasterImage::from_fn(width, height, |x, y| {
            Luma([if self.get(x, y) { 255.0 } else { 0.0 }])
        })
    }
}

/// Rounds samples to 8 bits, clamping to `[0, 255]`.
pub fn raster_to_gray(image: &RasterImage) -> GrayImage {
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        Luma([image.get_pixel(x, y)[0].round().clamp(0.0, 255.0) as u8])
    })
}

fn encode(foreground: bool) -> u8 {
    if foreground { FOREGROUND } else { 0 }
}

/// Decodes `path` and reduces it to luminance in `[0, 255]`. Alpha is discarded.
pub fn load_raster(path: impl AsRef<Path>) -> Result<RasterImage> {
    let path = path.as_ref();
    let decoded = image::open(path).map_err(|source| Error::Load {
        path: path.to_path_buf(),
        source,
    })?;
    let mut luma = decoded.to_luma32f();
    for sample in luma.iter_mut() {
        *sample *= 255.0;
    }
    log::debug!(
        "loaded '{}' as {}x{} raster",
        path.display(),
        luma.width(),
        luma.height()
    );
    Ok(luma)
}

/// The file name of `path` up to its first `.`, used to name exported files.
///
/// Returns `None` when there is no file name or it starts with a dot.
pub fn base_name(path: &Path) -> Option<&str> {
    let file_name = path.file_name()?.to_str()?;
    file_name.split('.').next().filter(|stem| !stem.is_empty())
}
