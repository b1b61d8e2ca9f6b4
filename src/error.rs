//! Error taxonomy for field operations.
//!
//! Every operation in this crate returns a typed [`FieldResult`] — failures
//! are values, never panics, and propagate unchanged through composed
//! operations. All fatal conditions are malformed inputs detected at the
//! start of an operation; numerical edge cases inside an algorithm
//! (degenerate stencils, parallel vectors, vanished field magnitude) are
//! handled by documented fallback values instead.
//!
//! Given identical inputs, failures are deterministic; nothing is retried.

use thiserror::Error;

/// Result alias used by every fallible operation in the crate
pub type FieldResult<T> = Result<T, FieldError>;

/// Field operation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    /// Sample array length does not match the grid's sample count
    #[error("dimension mismatch: field carries {actual} samples, grid expects {expected}")]
    DimensionMismatch {
        /// Sample count the grid requires (N³)
        expected: usize,
        /// Sample count the field actually carries
        actual: usize,
    },

    /// Grid resolution below the supported minimum of 8
    #[error("resolution {resolution} is below the minimum of {}", crate::grid::MIN_RESOLUTION)]
    BelowMinimumResolution {
        /// Requested resolution
        resolution: usize,
    },

    /// Grid resolution above the supported maximum of 256
    #[error("resolution {resolution} is above the maximum of {}", crate::grid::MAX_RESOLUTION)]
    AboveMaximumResolution {
        /// Requested resolution
        resolution: usize,
    },

    /// Grid bounds have near-zero extent along an axis
    #[error("degenerate bounds: near-zero extent along axis {axis}")]
    DegenerateBounds {
        /// Offending axis (0 = x, 1 = y, 2 = z)
        axis: usize,
    },

    /// Streamline integration was given an empty seed set
    #[error("streamline integration requires at least one seed point")]
    InvalidSeeds,

    /// Isovalue list is empty or contains a non-finite value
    #[error("invalid isovalue list: {0}")]
    InvalidIsovalue(String),

    /// Interpolation method name not recognized
    #[error("unsupported interpolation method: {0:?}")]
    UnsupportedInterpolationMethod(String),

    /// Integration scheme name not recognized
    #[error("unsupported integration scheme: {0:?}")]
    UnsupportedIntegrationScheme(String),

    /// Streamline step size outside the accepted [1e-8, 1.0] range
    #[error("step size {value} is outside the accepted [1e-8, 1.0] range")]
    InvalidStepSize {
        /// Rejected step size
        value: f32,
    },

    /// Input is numerically unusable (zero direction vector, no finite samples, ...)
    #[error("numeric degeneracy: {0}")]
    NumericDegeneracy(String),
}
