//! Pointwise field algebra.
//!
//! Elementwise combinators over whole fields: magnitude, normalization,
//! component extraction, scaling, dot products, and the directional
//! derivative of a scalar field. All of them are embarrassingly parallel
//! and run over rayon's parallel iterators.

use glam::Vec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::differential::gradient;
use crate::error::{FieldError, FieldResult};
use crate::field::{ScalarField, VectorField};

/// Vector magnitude below which normalization yields the zero vector
const NORMALIZE_EPSILON: f32 = 1e-10;

/// Coordinate axis selector for component extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// x component
    X,
    /// y component
    Y,
    /// z component
    Z,
}

impl Axis {
    #[inline(always)]
    fn select(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }
}

/// Per-sample Euclidean magnitude of a vector field.
pub fn magnitude(field: &VectorField) -> FieldResult<ScalarField> {
    field.validate()?;
    let values = field.values.par_iter().map(|v| v.length()).collect();
    Ok(ScalarField {
        grid: field.grid,
        values,
    })
}

/// Per-sample unit vectors; samples shorter than 1e-10 become zero
/// instead of blowing up.
pub fn normalize(field: &VectorField) -> FieldResult<VectorField> {
    field.validate()?;
    let values = field
        .values
        .par_iter()
        .map(|v| {
            if v.length() < NORMALIZE_EPSILON {
                Vec3::ZERO
            } else {
                v.normalize()
            }
        })
        .collect();
    Ok(VectorField {
        grid: field.grid,
        values,
    })
}

/// Extract one coordinate component as a scalar field.
pub fn component(field: &VectorField, axis: Axis) -> FieldResult<ScalarField> {
    field.validate()?;
    let values = field.values.par_iter().map(|&v| axis.select(v)).collect();
    Ok(ScalarField {
        grid: field.grid,
        values,
    })
}

/// Multiply every sample of a scalar field by a constant.
pub fn scale(field: &ScalarField, factor: f32) -> FieldResult<ScalarField> {
    field.validate()?;
    let values = field.values.par_iter().map(|v| v * factor).collect();
    Ok(ScalarField {
        grid: field.grid,
        values,
    })
}

/// Per-sample dot product of two vector fields on the same grid.
///
/// The grids must match exactly (origin, spacing, and resolution); two
/// fields sampled over different bounds have no common lattice to combine
/// on even when their sample counts agree.
pub fn dot(a: &VectorField, b: &VectorField) -> FieldResult<ScalarField> {
    a.validate()?;
    b.validate()?;
    if a.grid != b.grid {
        return Err(FieldError::DimensionMismatch {
            expected: a.grid.sample_count(),
            actual: b.grid.sample_count(),
        });
    }
    let values = a
        .values
        .par_iter()
        .zip(b.values.par_iter())
        .map(|(u, v)| u.dot(*v))
        .collect();
    Ok(ScalarField {
        grid: a.grid,
        values,
    })
}

/// Directional derivative ∇f · d̂ of a scalar field along `direction`.
///
/// The direction is normalized first; a zero or non-finite direction is
/// rejected since it has no meaningful normalization.
pub fn directional_derivative(
    field: &ScalarField,
    direction: Vec3,
) -> FieldResult<ScalarField> {
    if !direction.is_finite() || direction.length() < NORMALIZE_EPSILON {
        return Err(FieldError::NumericDegeneracy(format!(
            "direction {direction:?} cannot be normalized"
        )));
    }
    let unit = direction.normalize();
    let grad = gradient(field)?;
    let values = grad.values.par_iter().map(|g| g.dot(unit)).collect();
    Ok(ScalarField {
        grid: field.grid,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    fn grid() -> Grid {
        Grid::from_bounds(Vec3::ZERO, Vec3::splat(1.0), 8).unwrap()
    }

    #[test]
    fn test_magnitude_and_normalize() {
        let field = VectorField::from_fn(grid(), |_| Vec3::new(3.0, 4.0, 0.0));
        let mag = magnitude(&field).unwrap();
        assert!(mag.values.iter().all(|&v| (v - 5.0).abs() < 1e-6));

        let unit = normalize(&field).unwrap();
        assert!(unit
            .values
            .iter()
            .all(|v| (v.length() - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_normalize_zero_vectors() {
        let field = VectorField::from_fn(grid(), |_| Vec3::ZERO);
        let unit = normalize(&field).unwrap();
        assert!(unit.values.iter().all(|&v| v == Vec3::ZERO));
    }

    #[test]
    fn test_component_extraction() {
        let field = VectorField::from_fn(grid(), |p| Vec3::new(p.x, 2.0 * p.y, -p.z));
        let y = component(&field, Axis::Y).unwrap();
        for flat in [0, 100, 511] {
            let p = field.grid.position_of(flat);
            assert!((y.values[flat] - 2.0 * p.y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_scale() {
        let field = ScalarField::from_fn(grid(), |p| p.x);
        let scaled = scale(&field, -2.0).unwrap();
        for flat in [0, 7, 300] {
            assert!((scaled.values[flat] + 2.0 * field.values[flat]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_dot_requires_matching_grids() {
        let a = VectorField::from_fn(grid(), |_| Vec3::X);
        let b = VectorField::from_fn(grid(), |_| Vec3::new(2.0, 5.0, 1.0));
        let d = dot(&a, &b).unwrap();
        assert!(d.values.iter().all(|&v| (v - 2.0).abs() < 1e-6));

        let other = VectorField::from_fn(
            Grid::from_bounds(Vec3::ZERO, Vec3::splat(1.0), 9).unwrap(),
            |_| Vec3::X,
        );
        assert!(matches!(
            dot(&a, &other),
            Err(FieldError::DimensionMismatch { .. })
        ));

        // Same resolution on shifted bounds is a different lattice too.
        let shifted = VectorField::from_fn(
            Grid::from_bounds(Vec3::splat(1.0), Vec3::splat(2.0), 8).unwrap(),
            |_| Vec3::X,
        );
        assert!(matches!(
            dot(&a, &shifted),
            Err(FieldError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_directional_derivative_of_linear_field() {
        // f = x + 2y has ∇f = (1, 2, 0); along (0, 1, 0) that is 2.
        let field = ScalarField::from_fn(grid(), |p| p.x + 2.0 * p.y);
        let dd = directional_derivative(&field, Vec3::new(0.0, 3.0, 0.0)).unwrap();
        assert!(dd.values.iter().all(|&v| (v - 2.0).abs() < 1e-3));
    }

    #[test]
    fn test_directional_derivative_rejects_zero_direction() {
        let field = ScalarField::from_fn(grid(), |p| p.x);
        assert!(matches!(
            directional_derivative(&field, Vec3::ZERO),
            Err(FieldError::NumericDegeneracy(_))
        ));
        assert!(matches!(
            directional_derivative(&field, Vec3::new(f32::NAN, 0.0, 0.0)),
            Err(FieldError::NumericDegeneracy(_))
        ));
    }
}
