//! # gridfield
//!
//! Analysis of scalar and vector fields sampled on regular 3D grids.
//!
//! ## Features
//!
//! - **Fields**: Scalar, vector, and symmetric-matrix samples on a cubic lattice
//! - **Differential operators**: Gradient, divergence, curl, Laplacian, Hessian
//! - **Interpolation**: Nearest-neighbor and trilinear off-grid sampling
//! - **Streamlines**: Fixed-step Euler / Midpoint / RK4 advection
//! - **Isosurfaces**: Marching-cubes extraction at one or more isovalues
//! - **Critical points**: Detection and Hessian eigenvalue classification
//! - **Statistics & algebra**: Field summaries and pointwise combinators
//!
//! ## Example
//!
//! ```rust
//! use gridfield::prelude::*;
//!
//! // Sample a signed distance function on a 33³ lattice
//! let grid = Grid::from_bounds(Vec3::splat(-1.0), Vec3::splat(1.0), 33).unwrap();
//! let sdf = ScalarField::from_fn(grid, |p| p.length() - 0.5);
//!
//! // Differential structure
//! let grad = gradient(&sdf).unwrap();
//! let flat = laplacian(&sdf).unwrap();
//! assert_eq!(flat.values.len(), sdf.values.len());
//!
//! // The zero level set as a triangle mesh
//! let surfaces = extract_isosurfaces(&sdf, &IsosurfaceConfig::default()).unwrap();
//! assert!(surfaces[0].triangle_count() > 0);
//!
//! // Advect seeds through the gradient field
//! let seeds = [Vec3::new(0.8, 0.1, 0.0)];
//! let lines = integrate(&grad, &seeds, &StreamlineConfig::default()).unwrap();
//! assert_eq!(lines.len(), 1);
//! ```

#![warn(missing_docs)]

pub mod algebra;
pub mod critical;
pub mod differential;
pub mod error;
pub mod field;
pub mod grid;
pub mod interpolate;
pub mod isosurface;
pub mod statistics;
pub mod streamline;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::algebra::{
        component, directional_derivative, dot, magnitude, normalize, scale, Axis,
    };
    pub use crate::critical::{
        eigen_symmetric, find_critical_points, CriticalKind, CriticalPoint, CriticalPointConfig,
    };
    pub use crate::differential::{curl, divergence, gradient, hessian, laplacian};
    pub use crate::error::{FieldError, FieldResult};
    pub use crate::field::{HessianField, ScalarField, SymMat3, VectorField};
    pub use crate::grid::Grid;
    pub use crate::interpolate::{sample_scalar, sample_vector, InterpolationMethod};
    pub use crate::isosurface::{extract_isosurfaces, Isosurface, IsosurfaceConfig};
    pub use crate::statistics::{field_statistics, FieldStatistics};
    pub use crate::streamline::{
        integrate, IntegrationScheme, Streamline, StreamlineConfig, MAX_STREAMLINE_STEPS,
    };
    pub use glam::Vec3;
}

// Re-exports for convenience
pub use error::{FieldError, FieldResult};
pub use field::{ScalarField, VectorField};
pub use grid::Grid;

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_basic_workflow() {
        // Sphere SDF on a centered lattice
        let grid = Grid::from_bounds(Vec3::splat(-1.0), Vec3::splat(1.0), 17).unwrap();
        let sdf = ScalarField::from_fn(grid, |p| p.length() - 0.5);

        // Gradient of a distance field has near-unit magnitude off center
        let grad = gradient(&sdf).unwrap();
        let probe = grad.get(12, 8, 8);
        assert!((probe.length() - 1.0).abs() < 0.1);

        // Zero level set is non-empty
        let surfaces = extract_isosurfaces(&sdf, &IsosurfaceConfig::default()).unwrap();
        assert!(surfaces[0].triangle_count() > 0);

        // Statistics see the negative interior and positive corners
        let stats = field_statistics(&sdf).unwrap();
        assert!(stats.min < 0.0 && stats.max > 0.0);
    }
}
