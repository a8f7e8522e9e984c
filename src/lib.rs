//! Particle extraction from grayscale images.
//!
//! A run smooths and thresholds a raw intensity image ([`denoise`]), passes the mask through an
//! ordered chain of binary shape filters ([`morphology`]), labels the remaining connected
//! components ([`region_labelling`]) and, on request, writes one mask file per component
//! ([`export`]). [`pipeline::run`] ties the stages together.
//!
//! ```no_run
//! use particle_extract::{FilterParams, MorphChain, MorphKind, MorphOp, PipelineOptions};
//!
//! # fn main() -> particle_extract::Result<()> {
//! let image = particle_extract::raster::load_raster("scan.png")?;
//! let params = FilterParams::new(1.0, 3, 120)?;
//! let mut chain = MorphChain::new();
//! chain.push(MorphOp::new(MorphKind::Opening, 3)?);
//!
//! let run = particle_extract::run(&image, &params, &chain, &PipelineOptions::default())?;
//! println!("{} particles", run.count());
//! # Ok(())
//! # }
//! ```

pub mod denoise;
pub mod error;
pub mod export;
pub mod morphology;
pub mod pipeline;
pub mod raster;
pub mod rect;
pub mod region_labelling;
pub mod render;
pub mod structuring;

pub use denoise::{FilterParams, ThresholdToggle};
pub use error::{Error, ExportError, Result};
pub use export::{ExportOptions, ExportSummary, MaskEncoding};
pub use morphology::{MorphChain, MorphKind, MorphOp};
pub use pipeline::{PipelineOptions, PipelineRun, run};
pub use raster::{BinaryImage, LabelImage, RasterImage};
pub use region_labelling::{Labeling, Region, RegionOutcome};
