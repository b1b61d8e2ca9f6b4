//! Field value types sampled on a [`Grid`].
//!
//! A field is a grid plus a flat sample array in the grid's row-major
//! order. Fields are plain value objects: every operation in the crate
//! consumes them immutably and produces fresh outputs, so there is no
//! shared mutable state between calls.
//!
//! The `from_fn` constructors evaluate a closure over every grid position
//! with slab parallelism — the usual way an upstream sampler's output
//! lands on a grid in one pass.

use glam::{Mat3, Vec3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldResult};
use crate::grid::Grid;

/// Symmetric 3×3 matrix stored as its six distinct entries.
///
/// Used for Hessians: `xy == yx`, `xz == zx`, `yz == zy` by construction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SymMat3 {
    /// ∂²f/∂x²
    pub xx: f32,
    /// ∂²f/∂x∂y
    pub xy: f32,
    /// ∂²f/∂x∂z
    pub xz: f32,
    /// ∂²f/∂y²
    pub yy: f32,
    /// ∂²f/∂y∂z
    pub yz: f32,
    /// ∂²f/∂z²
    pub zz: f32,
}

impl SymMat3 {
    /// All-zero matrix
    pub const ZERO: SymMat3 = SymMat3 {
        xx: 0.0,
        xy: 0.0,
        xz: 0.0,
        yy: 0.0,
        yz: 0.0,
        zz: 0.0,
    };

    /// Row `r` of the full matrix
    #[inline(always)]
    pub fn row(&self, r: usize) -> Vec3 {
        match r {
            0 => Vec3::new(self.xx, self.xy, self.xz),
            1 => Vec3::new(self.xy, self.yy, self.yz),
            _ => Vec3::new(self.xz, self.yz, self.zz),
        }
    }

    /// Diagonal entries
    #[inline(always)]
    pub fn diagonal(&self) -> Vec3 {
        Vec3::new(self.xx, self.yy, self.zz)
    }

    /// Trace (sum of the diagonal)
    #[inline(always)]
    pub fn trace(&self) -> f32 {
        self.xx + self.yy + self.zz
    }

    /// Frobenius norm of the off-diagonal part
    #[inline(always)]
    pub fn off_diagonal_norm(&self) -> f32 {
        (2.0 * (self.xy * self.xy + self.xz * self.xz + self.yz * self.yz)).sqrt()
    }

    /// Expand to a full column-major [`Mat3`]
    pub fn to_mat3(&self) -> Mat3 {
        Mat3::from_cols(
            Vec3::new(self.xx, self.xy, self.xz),
            Vec3::new(self.xy, self.yy, self.yz),
            Vec3::new(self.xz, self.yz, self.zz),
        )
    }
}

/// Scalar samples on a regular grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarField {
    /// Sample lattice
    pub grid: Grid,
    /// Flat samples in the grid's row-major order
    pub values: Vec<f32>,
}

impl ScalarField {
    /// Wrap an existing sample array; fails with
    /// [`FieldError::DimensionMismatch`] if the length is not N³.
    pub fn new(grid: Grid, values: Vec<f32>) -> FieldResult<Self> {
        let field = ScalarField { grid, values };
        field.validate()?;
        Ok(field)
    }

    /// Constant-valued field
    pub fn filled(grid: Grid, value: f32) -> Self {
        ScalarField {
            grid,
            values: vec![value; grid.sample_count()],
        }
    }

    /// Evaluate `f` at every grid position, parallel over i-slabs
    pub fn from_fn(grid: Grid, f: impl Fn(Vec3) -> f32 + Sync) -> Self {
        let n = grid.resolution;
        let mut values = vec![0.0f32; grid.sample_count()];
        values
            .par_chunks_mut(n * n)
            .enumerate()
            .for_each(|(i, slab)| {
                for j in 0..n {
                    let row = j * n;
                    for k in 0..n {
                        slab[row + k] = f(grid.position(i, j, k));
                    }
                }
            });
        ScalarField { grid, values }
    }

    /// Check that the sample array matches the grid
    pub fn validate(&self) -> FieldResult<()> {
        let expected = self.grid.sample_count();
        if self.values.len() != expected {
            return Err(FieldError::DimensionMismatch {
                expected,
                actual: self.values.len(),
            });
        }
        Ok(())
    }

    /// Sample at lattice coordinates (bounds-unchecked)
    #[inline(always)]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f32 {
        self.values[self.grid.index(i, j, k)]
    }
}

/// 3-vector samples on a regular grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorField {
    /// Sample lattice
    pub grid: Grid,
    /// Flat samples in the grid's row-major order
    pub values: Vec<Vec3>,
}

impl VectorField {
    /// Wrap an existing sample array; fails with
    /// [`FieldError::DimensionMismatch`] if the length is not N³.
    pub fn new(grid: Grid, values: Vec<Vec3>) -> FieldResult<Self> {
        let field = VectorField { grid, values };
        field.validate()?;
        Ok(field)
    }

    /// Evaluate `f` at every grid position, parallel over i-slabs
    pub fn from_fn(grid: Grid, f: impl Fn(Vec3) -> Vec3 + Sync) -> Self {
        let n = grid.resolution;
        let mut values = vec![Vec3::ZERO; grid.sample_count()];
        values
            .par_chunks_mut(n * n)
            .enumerate()
            .for_each(|(i, slab)| {
                for j in 0..n {
                    let row = j * n;
                    for k in 0..n {
                        slab[row + k] = f(grid.position(i, j, k));
                    }
                }
            });
        VectorField { grid, values }
    }

    /// Check that the sample array matches the grid
    pub fn validate(&self) -> FieldResult<()> {
        let expected = self.grid.sample_count();
        if self.values.len() != expected {
            return Err(FieldError::DimensionMismatch {
                expected,
                actual: self.values.len(),
            });
        }
        Ok(())
    }

    /// Sample at lattice coordinates (bounds-unchecked)
    #[inline(always)]
    pub fn get(&self, i: usize, j: usize, k: usize) -> Vec3 {
        self.values[self.grid.index(i, j, k)]
    }
}

/// Symmetric 3×3 matrix samples on a regular grid (Hessian output)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HessianField {
    /// Sample lattice
    pub grid: Grid,
    /// Flat samples in the grid's row-major order
    pub values: Vec<SymMat3>,
}

impl HessianField {
    /// Wrap an existing sample array; fails with
    /// [`FieldError::DimensionMismatch`] if the length is not N³.
    pub fn new(grid: Grid, values: Vec<SymMat3>) -> FieldResult<Self> {
        let field = HessianField { grid, values };
        field.validate()?;
        Ok(field)
    }

    /// Check that the sample array matches the grid
    pub fn validate(&self) -> FieldResult<()> {
        let expected = self.grid.sample_count();
        if self.values.len() != expected {
            return Err(FieldError::DimensionMismatch {
                expected,
                actual: self.values.len(),
            });
        }
        Ok(())
    }

    /// Sample at lattice coordinates (bounds-unchecked)
    #[inline(always)]
    pub fn get(&self, i: usize, j: usize, k: usize) -> SymMat3 {
        self.values[self.grid.index(i, j, k)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::from_bounds(Vec3::splat(-1.0), Vec3::splat(1.0), 8).unwrap()
    }

    #[test]
    fn test_length_validation() {
        let g = grid();
        assert!(ScalarField::new(g, vec![0.0; 512]).is_ok());
        assert_eq!(
            ScalarField::new(g, vec![0.0; 100]),
            Err(FieldError::DimensionMismatch {
                expected: 512,
                actual: 100
            })
        );
        assert!(VectorField::new(g, vec![Vec3::ZERO; 511]).is_err());
        assert!(HessianField::new(g, vec![SymMat3::ZERO; 512]).is_ok());
    }

    #[test]
    fn test_from_fn_positions() {
        let g = grid();
        let field = ScalarField::from_fn(g, |p| p.x + 2.0 * p.y + 3.0 * p.z);
        assert_eq!(field.values.len(), 512);
        for flat in [0, 17, 300, 511] {
            let p = g.position_of(flat);
            let expected = p.x + 2.0 * p.y + 3.0 * p.z;
            assert!((field.values[flat] - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_sym_mat3() {
        let m = SymMat3 {
            xx: 1.0,
            xy: 2.0,
            xz: 3.0,
            yy: 4.0,
            yz: 5.0,
            zz: 6.0,
        };
        assert_eq!(m.trace(), 11.0);
        assert_eq!(m.row(1), Vec3::new(2.0, 4.0, 5.0));
        let full = m.to_mat3();
        // Symmetric expansion: M == Mᵀ
        assert_eq!(full, full.transpose());
        assert!(SymMat3::ZERO.off_diagonal_norm() < 1e-12);
    }
}
