//! Marching-cubes isosurface extraction from scalar fields.
//!
//! Each of the (N-1)³ cells is classified against the isovalue with a
//! strictly-less-than inside test, looked up in the canonical tables, and
//! triangulated with linearly interpolated edge crossings. Extraction is
//! parallel over i-slabs of cells; per-slab buffers are stitched together
//! afterward with index offsetting.
//!
//! Vertices are emitted per-triangle without welding, so the index buffer
//! is the trivial 0..3T sequence. Callers that need a connected mesh can
//! weld by position downstream.

mod tables;

use glam::Vec3;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldResult};
use crate::field::ScalarField;

use tables::{CORNER_OFFSETS, EDGE_CONNECTIONS, EDGE_TABLE, TRI_TABLE};

/// Corner-value gap below which an edge crossing falls back to the midpoint
const FLAT_EDGE_EPSILON: f32 = 1e-12;

/// Isovalues to extract surfaces for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsosurfaceConfig {
    /// One surface is extracted per value, in order
    pub isovalues: Vec<f32>,
}

impl Default for IsosurfaceConfig {
    fn default() -> Self {
        IsosurfaceConfig {
            isovalues: vec![0.0],
        }
    }
}

impl IsosurfaceConfig {
    /// Reject empty or non-finite isovalue sets.
    pub fn validate(&self) -> FieldResult<()> {
        if self.isovalues.is_empty() {
            return Err(FieldError::InvalidIsovalue(
                "isovalue list is empty".to_string(),
            ));
        }
        for &v in &self.isovalues {
            if !v.is_finite() {
                return Err(FieldError::InvalidIsovalue(format!(
                    "isovalue {v} is not finite"
                )));
            }
        }
        Ok(())
    }
}

/// Triangle soup for one isovalue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Isosurface {
    /// Isovalue this surface was extracted at
    pub isovalue: f32,
    /// Vertex positions, three per triangle
    pub vertices: Vec<Vec3>,
    /// Triangle indices into `vertices` (the sequence 0..3T, kept for
    /// downstream consumers that expect an indexed mesh)
    pub indices: Vec<u32>,
}

impl Isosurface {
    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Extract one isosurface per configured isovalue.
pub fn extract_isosurfaces(
    field: &ScalarField,
    config: &IsosurfaceConfig,
) -> FieldResult<Vec<Isosurface>> {
    field.validate()?;
    config.validate()?;

    let surfaces: Vec<Isosurface> = config
        .isovalues
        .iter()
        .map(|&iso| extract(field, iso))
        .collect();

    debug!(
        "extracted {} isosurfaces, {} triangles total",
        surfaces.len(),
        surfaces.iter().map(Isosurface::triangle_count).sum::<usize>()
    );
    Ok(surfaces)
}

/// March all cells for one isovalue, parallel over i-slabs of cells.
fn extract(field: &ScalarField, isovalue: f32) -> Isosurface {
    let n = field.grid.resolution;

    // One cell slab per leading index; each produces its own vertex buffer.
    let slabs: Vec<Vec<Vec3>> = (0..n - 1)
        .into_par_iter()
        .map(|i| {
            let mut verts = Vec::new();
            for j in 0..n - 1 {
                for k in 0..n - 1 {
                    march_cell(field, isovalue, i, j, k, &mut verts);
                }
            }
            verts
        })
        .collect();

    let total: usize = slabs.iter().map(Vec::len).sum();
    let mut vertices = Vec::with_capacity(total);
    for slab in slabs {
        vertices.extend(slab);
    }
    let indices = (0..vertices.len() as u32).collect();

    Isosurface {
        isovalue,
        vertices,
        indices,
    }
}

/// Triangulate one cell, appending vertices in triangle order.
fn march_cell(
    field: &ScalarField,
    isovalue: f32,
    i: usize,
    j: usize,
    k: usize,
    out: &mut Vec<Vec3>,
) {
    let mut corner_values = [0.0f32; 8];
    let mut corner_positions = [Vec3::ZERO; 8];
    let mut config = 0usize;
    for (c, [di, dj, dk]) in CORNER_OFFSETS.iter().enumerate() {
        let (ci, cj, ck) = (i + di, j + dj, k + dk);
        corner_values[c] = field.get(ci, cj, ck);
        corner_positions[c] = field.grid.position(ci, cj, ck);
        // Inside means strictly below the isovalue.
        if corner_values[c] < isovalue {
            config |= 1 << c;
        }
    }

    let edge_mask = EDGE_TABLE[config];
    if edge_mask == 0 {
        return;
    }

    let mut edge_points = [Vec3::ZERO; 12];
    for (e, point) in edge_points.iter_mut().enumerate() {
        if edge_mask & (1 << e) == 0 {
            continue;
        }
        let [a, b] = EDGE_CONNECTIONS[e];
        *point = edge_crossing(
            corner_positions[a],
            corner_positions[b],
            corner_values[a],
            corner_values[b],
            isovalue,
        );
    }

    for triple in TRI_TABLE[config].chunks_exact(3) {
        if triple[0] == -1 {
            break;
        }
        for &e in triple {
            out.push(edge_points[e as usize]);
        }
    }
}

/// Linear crossing of the isovalue along an edge; midpoint when the
/// corner values are too close to divide.
#[inline(always)]
fn edge_crossing(p1: Vec3, p2: Vec3, v1: f32, v2: f32, isovalue: f32) -> Vec3 {
    let denom = v2 - v1;
    let t = if denom.abs() < FLAT_EDGE_EPSILON {
        0.5
    } else {
        ((isovalue - v1) / denom).clamp(0.0, 1.0)
    };
    p1 + (p2 - p1) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    fn sphere_field(resolution: usize) -> ScalarField {
        let grid = Grid::from_bounds(Vec3::splat(-1.0), Vec3::splat(1.0), resolution).unwrap();
        ScalarField::from_fn(grid, |p| p.length() - 0.5)
    }

    #[test]
    fn test_config_validation() {
        assert!(IsosurfaceConfig::default().validate().is_ok());
        assert!(matches!(
            IsosurfaceConfig { isovalues: vec![] }.validate(),
            Err(FieldError::InvalidIsovalue(_))
        ));
        assert!(matches!(
            IsosurfaceConfig {
                isovalues: vec![0.0, f32::NAN]
            }
            .validate(),
            Err(FieldError::InvalidIsovalue(_))
        ));
    }

    #[test]
    fn test_value_objects_are_serializable() {
        fn assert_serde<T: serde::Serialize + serde::de::DeserializeOwned>() {}
        assert_serde::<IsosurfaceConfig>();
        assert_serde::<Isosurface>();
    }

    #[test]
    fn test_sphere_surface_vertices_near_isovalue() {
        // Every emitted vertex lies on an edge crossing, so the SDF residual
        // is bounded by the cell-scale linearization error.
        let field = sphere_field(33);
        let surfaces = extract_isosurfaces(&field, &IsosurfaceConfig::default()).unwrap();
        assert_eq!(surfaces.len(), 1);
        let surface = &surfaces[0];
        assert!(surface.triangle_count() > 100);
        for v in &surface.vertices {
            assert!(
                (v.length() - 0.5).abs() < 0.05,
                "vertex {v:?} far from the r = 0.5 sphere"
            );
        }
    }

    #[test]
    fn test_indices_are_sequential_soup() {
        let field = sphere_field(17);
        let surfaces = extract_isosurfaces(&field, &IsosurfaceConfig::default()).unwrap();
        let surface = &surfaces[0];
        assert_eq!(surface.vertices.len(), surface.indices.len());
        assert_eq!(surface.vertex_count() % 3, 0);
        for (pos, &idx) in surface.indices.iter().enumerate() {
            assert_eq!(idx as usize, pos);
        }
    }

    #[test]
    fn test_empty_surface_when_field_never_crosses() {
        let grid = Grid::from_bounds(Vec3::splat(-1.0), Vec3::splat(1.0), 9).unwrap();
        let field = ScalarField::filled(grid, 1.0);
        let surfaces = extract_isosurfaces(&field, &IsosurfaceConfig::default()).unwrap();
        assert!(surfaces[0].vertices.is_empty());
        assert_eq!(surfaces[0].triangle_count(), 0);
    }

    #[test]
    fn test_multiple_isovalues_are_nested_spheres() {
        let field = sphere_field(33);
        let config = IsosurfaceConfig {
            isovalues: vec![-0.2, 0.0, 0.2],
        };
        let surfaces = extract_isosurfaces(&field, &config).unwrap();
        assert_eq!(surfaces.len(), 3);
        // SDF isovalue c is the sphere of radius 0.5 + c.
        for (surface, radius) in surfaces.iter().zip([0.3f32, 0.5, 0.7]) {
            assert!(surface.triangle_count() > 0);
            for v in &surface.vertices {
                assert!(
                    (v.length() - radius).abs() < 0.05,
                    "vertex {v:?} far from radius {radius}"
                );
            }
        }
    }
}
