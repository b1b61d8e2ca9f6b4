//! Regular 3D sample lattice.
//!
//! [`Grid`] maps a resolution `N` and axis-aligned bounds to a row-major
//! index space: `index(i, j, k) = i·N² + j·N + k` with `k` fastest, and the
//! inverse mapping from a flat index back to a world-space position. It is a
//! pure lattice abstraction — it never touches geometry and every field type
//! in the crate is built on top of it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldResult};

/// Smallest supported resolution per axis
pub const MIN_RESOLUTION: usize = 8;
/// Largest supported resolution per axis
pub const MAX_RESOLUTION: usize = 256;

/// Relative tolerance below which an axis extent counts as degenerate
const EXTENT_EPSILON: f32 = 1e-6;

/// Regular 3D grid: origin corner, per-axis spacing, and resolution `N`
/// (the grid carries `N³` samples).
///
/// Spacing is expected to be non-negative; a zero spacing axis marks
/// degenerate bounds and is reported by [`Grid::degenerate_axis`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// World-space position of sample (0, 0, 0)
    pub origin: Vec3,
    /// Distance between adjacent samples along each axis
    pub spacing: Vec3,
    /// Sample count per axis
    pub resolution: usize,
}

impl Grid {
    /// Create a grid from an origin corner and explicit spacing.
    ///
    /// Fails with [`FieldError::BelowMinimumResolution`] /
    /// [`FieldError::AboveMaximumResolution`] outside the [8, 256] range.
    pub fn new(origin: Vec3, spacing: Vec3, resolution: usize) -> FieldResult<Self> {
        if resolution < MIN_RESOLUTION {
            return Err(FieldError::BelowMinimumResolution { resolution });
        }
        if resolution > MAX_RESOLUTION {
            return Err(FieldError::AboveMaximumResolution { resolution });
        }
        Ok(Grid {
            origin,
            spacing,
            resolution,
        })
    }

    /// Create a grid spanning `[min, max]` with `resolution` samples per
    /// axis; spacing is derived as `extent / (N - 1)`.
    ///
    /// Degenerate (zero-extent) bounds are representable — interpolation
    /// decides how to handle them — but the resolution range is enforced.
    pub fn from_bounds(min: Vec3, max: Vec3, resolution: usize) -> FieldResult<Self> {
        if resolution < MIN_RESOLUTION {
            return Err(FieldError::BelowMinimumResolution { resolution });
        }
        let spacing = (max - min) / (resolution - 1) as f32;
        Self::new(min, spacing, resolution)
    }

    /// Total number of samples (N³)
    #[inline(always)]
    pub fn sample_count(&self) -> usize {
        self.resolution * self.resolution * self.resolution
    }

    /// Flat index for lattice coordinates: `i·N² + j·N + k`
    #[inline(always)]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        let n = self.resolution;
        i * n * n + j * n + k
    }

    /// Lattice coordinates for a flat index (inverse of [`Grid::index`])
    #[inline(always)]
    pub fn coords(&self, flat: usize) -> (usize, usize, usize) {
        let n = self.resolution;
        (flat / (n * n), (flat / n) % n, flat % n)
    }

    /// World-space position of sample (i, j, k)
    #[inline(always)]
    pub fn position(&self, i: usize, j: usize, k: usize) -> Vec3 {
        self.origin + self.spacing * Vec3::new(i as f32, j as f32, k as f32)
    }

    /// World-space position of a flat sample index
    #[inline(always)]
    pub fn position_of(&self, flat: usize) -> Vec3 {
        let (i, j, k) = self.coords(flat);
        self.position(i, j, k)
    }

    /// Minimum corner of the sampled bounds
    #[inline(always)]
    pub fn bounds_min(&self) -> Vec3 {
        self.origin
    }

    /// Maximum corner of the sampled bounds
    #[inline(always)]
    pub fn bounds_max(&self) -> Vec3 {
        self.origin + self.spacing * (self.resolution - 1) as f32
    }

    /// World-space extent of the sampled bounds
    #[inline(always)]
    pub fn extent(&self) -> Vec3 {
        self.spacing * (self.resolution - 1) as f32
    }

    /// Whether a world-space point lies inside the sampled bounds
    /// (inclusive on both faces)
    #[inline(always)]
    pub fn contains(&self, point: Vec3) -> bool {
        let min = self.bounds_min();
        let max = self.bounds_max();
        point.x >= min.x
            && point.x <= max.x
            && point.y >= min.y
            && point.y <= max.y
            && point.z >= min.z
            && point.z <= max.z
    }

    /// First axis whose extent is near zero under a small relative
    /// tolerance, if any
    pub fn degenerate_axis(&self) -> Option<usize> {
        let min = self.bounds_min();
        let max = self.bounds_max();
        (0..3).find(|&axis| {
            let scale = min[axis].abs().max(max[axis].abs()).max(1.0);
            (max[axis] - min[axis]).abs() <= EXTENT_EPSILON * scale
        })
    }

    /// Whether any axis extent is near zero
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.degenerate_axis().is_some()
    }
}
