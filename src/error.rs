//! Error types for the extraction pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by pipeline stages.
#[derive(Debug, Error)]
pub enum Error {
    /// A filter argument is outside its valid range. This is a caller error.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Failed to load image '{path}': {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl Error {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// I/O failures while writing extracted regions, tagged with the failing step.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create output directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write source image '{path}': {source}")]
    WriteImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write mask for label {label} to '{path}': {source}")]
    WriteMask {
        label: u32,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl ExportError {
    /// The path the failing step was writing to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ExportError::CreateDir { path, .. }
            | ExportError::WriteImage { path, .. }
            | ExportError::WriteMask { path, .. } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
