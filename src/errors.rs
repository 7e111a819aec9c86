use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort a resize request.
///
/// The engine itself is pure computation, so apart from `ImageIo` every
/// variant is a caller contract violation and carries the widths, rows or
/// columns needed to diagnose it.
#[derive(Error, Debug)]
pub enum SeamCarvingError {
    #[error("Invalid grid: {reason}")]
    InvalidGrid { reason: String },

    #[error("Invalid target width {target}: expected 1 <= target < current width {width}")]
    InvalidTarget { width: usize, target: usize },

    #[error("Degenerate geometry: a {width}-wide grid cannot lose another seam (target width {target})")]
    DegenerateGeometry { width: usize, target: usize },

    #[error("Invalid border policy: base {base} must be finite and > 0, scale {scale} finite and >= 0")]
    InvalidBorderPolicy { base: f64, scale: f64 },

    #[error("Seam length {len} does not match grid height {height}")]
    SeamLength { len: usize, height: usize },

    #[error("Seam column {column} at row {row} is outside a {width}-wide grid")]
    SeamOutOfBounds {
        row: usize,
        column: usize,
        width: usize,
    },

    #[error("Image error: {operation} failed for {path:?}")]
    ImageIo {
        path: PathBuf,
        operation: String,
        #[source]
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, SeamCarvingError>;

impl SeamCarvingError {
    pub(crate) fn invalid_grid(reason: impl Into<String>) -> Self {
        Self::InvalidGrid {
            reason: reason.into(),
        }
    }
}
