//! Off-grid sampling of scalar and vector fields.
//!
//! Two methods: nearest-neighbor (the grid itself is the spatial index)
//! and trilinear 8-corner interpolation. Trilinear needs non-degenerate
//! bounds on every axis; [`InterpolationMethod::effective`] downgrades it
//! to nearest-neighbor when a grid cannot support it, which is how the
//! streamline integrator keeps sampling degenerate grids.

use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldResult};
use crate::field::{ScalarField, VectorField};
use crate::grid::Grid;

/// Spacing below this counts as a collapsed axis for nearest-neighbor
/// coordinate math.
const SPACING_EPSILON: f32 = 1e-12;

/// How to evaluate a field between grid samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationMethod {
    /// Value of the closest grid sample (ties go to the lowest flat index)
    Nearest,
    /// Weighted blend of the 8 surrounding cell corners
    #[default]
    Trilinear,
}

impl InterpolationMethod {
    /// Method actually usable on `grid`: trilinear downgrades to nearest
    /// when any axis extent is degenerate.
    pub fn effective(self, grid: &Grid) -> Self {
        match self {
            InterpolationMethod::Trilinear if grid.is_degenerate() => InterpolationMethod::Nearest,
            other => other,
        }
    }
}

impl FromStr for InterpolationMethod {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(InterpolationMethod::Nearest),
            "trilinear" => Ok(InterpolationMethod::Trilinear),
            other => Err(FieldError::UnsupportedInterpolationMethod(other.to_string())),
        }
    }
}

/// Sample a scalar field at an arbitrary point.
pub fn sample_scalar(
    field: &ScalarField,
    point: Vec3,
    method: InterpolationMethod,
) -> FieldResult<f32> {
    field.validate()?;
    match method {
        InterpolationMethod::Nearest => Ok(field.values[nearest_index(&field.grid, point)]),
        InterpolationMethod::Trilinear => {
            check_degenerate(&field.grid)?;
            Ok(trilinear(&field.grid, point, |idx| field.values[idx]))
        }
    }
}

/// Sample a vector field at an arbitrary point.
pub fn sample_vector(
    field: &VectorField,
    point: Vec3,
    method: InterpolationMethod,
) -> FieldResult<Vec3> {
    field.validate()?;
    match method {
        InterpolationMethod::Nearest => Ok(field.values[nearest_index(&field.grid, point)]),
        InterpolationMethod::Trilinear => {
            check_degenerate(&field.grid)?;
            Ok(trilinear(&field.grid, point, |idx| field.values[idx]))
        }
    }
}

/// Vector sampling without re-validation, for callers that have already
/// validated the field and resolved the method via
/// [`InterpolationMethod::effective`]. Infallible by construction.
#[inline]
pub(crate) fn sample_vector_resolved(
    field: &VectorField,
    point: Vec3,
    method: InterpolationMethod,
) -> Vec3 {
    match method {
        InterpolationMethod::Nearest => field.values[nearest_index(&field.grid, point)],
        InterpolationMethod::Trilinear => trilinear(&field.grid, point, |idx| field.values[idx]),
    }
}

fn check_degenerate(grid: &Grid) -> FieldResult<()> {
    match grid.degenerate_axis() {
        Some(axis) => Err(FieldError::DegenerateBounds { axis }),
        None => Ok(()),
    }
}

/// Flat index of the grid sample closest to `point`.
///
/// Per-axis rounding with midpoint ties resolved toward the lower index,
/// which matches the lowest-flat-index tie-break of a brute-force scan.
/// A collapsed axis contributes index 0 — every sample along it is
/// equidistant, so the lowest index wins.
fn nearest_index(grid: &Grid, point: Vec3) -> usize {
    let n = grid.resolution;
    let mut c = [0usize; 3];
    for (axis, slot) in c.iter_mut().enumerate() {
        let h = grid.spacing[axis];
        if h.abs() < SPACING_EPSILON {
            continue;
        }
        let t = ((point[axis] - grid.origin[axis]) / h).clamp(0.0, (n - 1) as f32);
        let lower = t.floor();
        let frac = t - lower;
        let idx = if frac > 0.5 {
            lower as usize + 1
        } else {
            lower as usize
        };
        *slot = idx.min(n - 1);
    }
    grid.index(c[0], c[1], c[2])
}

/// 8-corner trilinear interpolation (clamped to the grid bounds).
fn trilinear<T, F>(grid: &Grid, point: Vec3, value: F) -> T
where
    T: Copy + std::ops::Add<Output = T> + std::ops::Mul<f32, Output = T>,
    F: Fn(usize) -> T,
{
    let n = grid.resolution;
    let max_t = (n - 1) as f32;
    let min = grid.bounds_min();
    let extent = grid.extent();

    // Normalized grid coordinate per axis, clamped to [0, N-1]
    let mut t = [0.0f32; 3];
    for (axis, slot) in t.iter_mut().enumerate() {
        *slot = ((point[axis] - min[axis]) / extent[axis] * max_t).clamp(0.0, max_t);
    }

    let i0 = t[0] as usize;
    let j0 = t[1] as usize;
    let k0 = t[2] as usize;
    let i1 = (i0 + 1).min(n - 1);
    let j1 = (j0 + 1).min(n - 1);
    let k1 = (k0 + 1).min(n - 1);

    let fx = t[0] - i0 as f32;
    let fy = t[1] - j0 as f32;
    let fz = t[2] - k0 as f32;

    let lerp = |a: T, b: T, s: f32| a * (1.0 - s) + b * s;

    let c00 = lerp(value(grid.index(i0, j0, k0)), value(grid.index(i1, j0, k0)), fx);
    let c10 = lerp(value(grid.index(i0, j1, k0)), value(grid.index(i1, j1, k0)), fx);
    let c01 = lerp(value(grid.index(i0, j0, k1)), value(grid.index(i1, j0, k1)), fx);
    let c11 = lerp(value(grid.index(i0, j1, k1)), value(grid.index(i1, j1, k1)), fx);

    let c0 = lerp(c00, c10, fy);
    let c1 = lerp(c01, c11, fy);
    lerp(c0, c1, fz)
}
