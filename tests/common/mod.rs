//! Common test helpers for gridfield integration tests

use gridfield::prelude::*;

// ============================================================================
// Standard test fields
// ============================================================================

/// Sphere SDF of the given radius on a centered [-1, 1]³ lattice
pub fn sphere_sdf(resolution: usize, radius: f32) -> ScalarField {
    let grid = Grid::from_bounds(Vec3::splat(-1.0), Vec3::splat(1.0), resolution).unwrap();
    ScalarField::from_fn(grid, move |p| p.length() - radius)
}

/// Scalar field sampled on the unit cube [0, 1]³
pub fn scalar_on_unit_cube(resolution: usize, f: impl Fn(Vec3) -> f32 + Sync) -> ScalarField {
    let grid = Grid::from_bounds(Vec3::ZERO, Vec3::splat(1.0), resolution).unwrap();
    ScalarField::from_fn(grid, f)
}

/// Vector field sampled on the unit cube [0, 1]³
pub fn vector_on_unit_cube(resolution: usize, f: impl Fn(Vec3) -> Vec3 + Sync) -> VectorField {
    let grid = Grid::from_bounds(Vec3::ZERO, Vec3::splat(1.0), resolution).unwrap();
    VectorField::from_fn(grid, f)
}

/// Multiply every sample of a vector field by a constant
pub fn scale_vector(field: &VectorField, factor: f32) -> VectorField {
    VectorField {
        grid: field.grid,
        values: field.values.iter().map(|v| *v * factor).collect(),
    }
}
