//! End-to-end run: denoise/threshold, morphology chain, labelling.
//!
//! Every call recomputes all stages from the raw image. Nothing is cached between runs; the
//! caller keeps the latest [`PipelineRun`] and replaces it when a new run succeeds.

use std::path::Path;

use crate::denoise::{self, FilterParams};
use crate::error::Result;
use crate::export::{self, ExportOptions, ExportSummary};
use crate::morphology::MorphChain;
use crate::raster::{BinaryImage, RasterImage};
use crate::region_labelling::{DEFAULT_REGION_CEILING, Labeling, Region, label_with_ceiling};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Component count above which regions are withheld.
    pub region_ceiling: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            region_ceiling: DEFAULT_REGION_CEILING,
        }
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    smoothed: RasterImage,
    binary: BinaryImage,
    labeling: Labeling,
}

impl PipelineRun {
    /// Blurred and median-filtered intensities, before thresholding.
    pub fn smoothed(&self) -> &RasterImage {
        &self.smoothed
    }

    /// Mask after thresholding and the morphology chain.
    pub fn binary(&self) -> &BinaryImage {
        &self.binary
    }

    pub fn labeling(&self) -> &Labeling {
        &self.labeling
    }

    pub fn count(&self) -> u32 {
        self.labeling.count()
    }

    pub fn regions(&self) -> Option<&[Region]> {
        self.labeling.regions()
    }

    pub fn is_overloaded(&self) -> bool {
        self.labeling.is_overloaded()
    }

    /// Writes this run's regions for `original` into the export layout.
    pub fn export(
        &self,
        original: &RasterImage,
        destination_root: &Path,
        base_name: &str,
        options: &ExportOptions,
    ) -> Result<ExportSummary> {
        Ok(export::export(
            original,
            self.labeling.labels(),
            destination_root,
            base_name,
            options,
        )?)
    }
}

/// Runs every stage on `image`.
///
/// # Arguments
///
/// * `image` - Raw intensities in `[0, 255]`.
/// * `params` - Settings of the denoise/threshold stage.
/// * `chain` - Shape filters applied in order to the thresholded mask.
/// * `options` - Region ceiling for the labeller.
///
/// # Returns
///
/// A fresh [`PipelineRun`] with the smoothed preview, the final mask and its labelling.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`](crate::Error::InvalidParameter) if `params` or any
/// operation in `chain` is malformed. No stage runs past the failing one.
///
/// # Examples
///
/// ```
/// use particle_extract::{FilterParams, MorphChain, PipelineOptions, RasterImage};
///
/// let mut image = RasterImage::new(20, 20);
/// for (x, y, pixel) in image.enumerate_pixels_mut() {
///     if (4..8).contains(&x) && (4..8).contains(&y) {
///         pixel.0 = [200.0];
///     }
/// }
///
/// let params = FilterParams::new(0.0, 1, 128).unwrap();
/// let run = particle_extract::run(&image, &params, &MorphChain::new(), &PipelineOptions::default())
///     .unwrap();
/// assert_eq!(run.count(), 1);
/// assert_eq!(run.regions().unwrap()[0].bbox.as_tuple(), (4, 4, 7, 7));
/// ```
pub fn run(
    image: &RasterImage,
    params: &FilterParams,
    chain: &MorphChain,
    options: &PipelineOptions,
) -> Result<PipelineRun> {
    let (width, height) = image.dimensions();
    log::debug!("pipeline run on {width}x{height} image with {params:?}");

    let smoothed = denoise::smooth(image, params)?;
    let thresholded = denoise::binarize(&smoothed, params.threshold)?;
    log::debug!(
        "{} foreground pixels after thresholding",
        thresholded.foreground_count()
    );

    let binary = chain.apply(&thresholded)?;
    let labeling = label_with_ceiling(&binary, options.region_ceiling);

    Ok(PipelineRun {
        smoothed,
        binary,
        labeling,
    })
}
