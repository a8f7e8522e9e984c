//! Noise reduction and binarization of a raw intensity image.
//!
//! Stages run in a fixed order: Gaussian blur, median filter, then either a threshold (followed
//! by a 1×1 closing) or, when no threshold is set, nonzero coercion of the smoothed samples.

use imageproc::filter::gaussian_blur_f32;

use crate::error::{Error, Result};
use crate::morphology::close;
use crate::raster::{BinaryImage, RasterImage};
use crate::structuring::square;

/// Largest accepted median window side.
pub const MAX_MEDIAN_WINDOW: u32 = 511;

/// Largest accepted Gaussian standard deviation.
pub const MAX_GAUSSIAN_SIGMA: f32 = 100.0;

/// Parameters of the denoise/threshold stage.
///
/// The default is the neutral setting: no blur, a 1×1 median window and no threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    /// Standard deviation of the Gaussian blur. `0.0` disables it.
    pub gaussian_sigma: f32,
    /// Side of the square median window. Must be odd; `1` disables it.
    pub median_window: u32,
    /// Samples `>= threshold` become foreground. `0` disables thresholding.
    pub threshold: u8,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            gaussian_sigma: 0.0,
            median_window: 1,
            threshold: 0,
        }
    }
}

impl FilterParams {
    pub fn new(gaussian_sigma: f32, median_window: u32, threshold: u8) -> Result<Self> {
        let params = Self {
            gaussian_sigma,
            median_window,
            threshold,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.gaussian_sigma.is_finite() || self.gaussian_sigma < 0.0 {
            return Err(Error::invalid(
                "gaussian_sigma",
                format!("must be finite and non-negative, got {}", self.gaussian_sigma),
            ));
        }
        if self.gaussian_sigma > MAX_GAUSSIAN_SIGMA {
            return Err(Error::invalid(
                "gaussian_sigma",
                format!("{} exceeds {MAX_GAUSSIAN_SIGMA}", self.gaussian_sigma),
            ));
        }
        if self.median_window == 0 || self.median_window % 2 == 0 {
            return Err(Error::invalid(
                "median_window",
                format!("must be a positive odd number, got {}", self.median_window),
            ));
        }
        if self.median_window > MAX_MEDIAN_WINDOW {
            return Err(Error::invalid(
                "median_window",
                format!("{} exceeds {MAX_MEDIAN_WINDOW}", self.median_window),
            ));
        }
        Ok(())
    }
}

/// Single-level save/restore of the filter settings.
///
/// Suspending stores the current settings and switches to the neutral defaults; toggling again
/// brings the stored settings back. There is no history beyond that one snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdToggle {
    Active(FilterParams),
    Suspended { saved: FilterParams },
}

impl Default for ThresholdToggle {
    fn default() -> Self {
        ThresholdToggle::Active(FilterParams::default())
    }
}

impl ThresholdToggle {
    pub fn new(params: FilterParams) -> Self {
        ThresholdToggle::Active(params)
    }

    /// Parameters the pipeline should run with right now.
    pub fn effective(&self) -> FilterParams {
        match self {
            ThresholdToggle::Active(params) => *params,
            ThresholdToggle::Suspended { .. } => FilterParams::default(),
        }
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self, ThresholdToggle::Suspended { .. })
    }

    pub fn toggle(&mut self) {
        *self = match *self {
            ThresholdToggle::Active(params) => ThresholdToggle::Suspended { saved: params },
            ThresholdToggle::Suspended { saved } => ThresholdToggle::Active(saved),
        };
    }
}

/// Runs the whole stage and returns the binary result.
///
/// # Arguments
///
/// * `image` - Raw intensities in `[0, 255]`. Left untouched.
/// * `params` - Blur, median and threshold settings. [`FilterParams::default`] only coerces
///   nonzero samples to foreground.
///
/// # Returns
///
/// A mask of the same dimensions as `image`.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if `params` fails [`FilterParams::validate`].
///
/// # Examples
///
/// ```
/// use image::Luma;
/// use particle_extract::{FilterParams, RasterImage};
/// use particle_extract::denoise::process;
///
/// let image = RasterImage::from_fn(4, 1, |x, _| Luma([x as f32 * 60.0]));
/// let params = FilterParams::new(0.0, 1, 100).unwrap();
/// let binary = process(&image, &params).unwrap();
/// assert_eq!(binary.foreground_count(), 2);
/// ```
pub fn process(image: &RasterImage, params: &FilterParams) -> Result<BinaryImage> {
    let smoothed = smooth(image, params)?;
    binarize(&smoothed, params.threshold)
}

/// Gaussian blur followed by the median filter.
pub fn smooth(image: &RasterImage, params: &FilterParams) -> Result<RasterImage> {
    params.validate()?;

    // gaussian_blur_f32 panics for sigma <= 0
    let blurred = if params.gaussian_sigma > 0.0 {
        gaussian_blur_f32(image, params.gaussian_sigma)
    } else {
        image.clone()
    };
    Ok(median_filter(&blurred, params.median_window / 2))
}

/// Turns smoothed samples into a mask.
///
/// With `threshold == 0` every nonzero sample is foreground.
pub fn binarize(smoothed: &RasterImage, threshold: u8) -> Result<BinaryImage> {
    if threshold == 0 {
        return Ok(BinaryImage::from_nonzero(smoothed));
    }
    let binary = BinaryImage::from_threshold(smoothed, f32::from(threshold));
    close(&binary, &square(1)?)
}

/// Median over a `(2 * radius + 1)` square window. Samples beyond the border repeat the nearest
/// edge sample.
fn median_filter(image: &RasterImage, radius: u32) -> RasterImage {
    if radius == 0 {
        return image.clone();
    }

    let (width, height) = image.dimensions();
    let r = i64::from(radius);
    let side = (2 * radius + 1) as usize;
    let mut window = Vec::with_capacity(side * side);

    RasterImage::from_fn(width, height, |x, y| {
        window.clear();
        for dy in -r..=r {
            let sy = (i64::from(y) + dy).clamp(0, i64::from(height) - 1) as u32;
            for dx in -r..=r {
                let sx = (i64::from(x) + dx).clamp(0, i64::from(width) - 1) as u32;
                window.push(image.get_pixel(sx, sy)[0]);
            }
        }
        let mid = window.len() / 2;
        let (_, median, _) = window.select_nth_unstable_by(mid, f32::total_cmp);
        image::Luma([*median])
    })
}
