//! Integration tests: the full field analysis pipeline
//!
//! Exercises the crate end-to-end on analytically known fields: a sphere
//! SDF for isosurfaces and critical points, linear and rotational vector
//! fields for the differential operators and streamlines.

mod common;

use gridfield::prelude::*;
use common::*;

// ============================================================================
// Differential operators on analytic fields
// ============================================================================

#[test]
fn gradient_of_sphere_sdf_points_outward() {
    let sdf = sphere_sdf(33, 0.5);
    let grad = gradient(&sdf).unwrap();

    // Away from the center and the boundary, ∇(|p| - r) = p/|p|.
    let n = grad.grid.resolution;
    for (i, j, k) in [(24, 16, 16), (16, 24, 16), (20, 20, 20)] {
        assert!(i < n - 1 && j < n - 1 && k < n - 1);
        let p = grad.grid.position(i, j, k);
        let g = grad.get(i, j, k);
        let expected = p.normalize();
        assert!(
            (g - expected).length() < 0.02,
            "gradient {g:?} at {p:?} should be {expected:?}"
        );
    }
}

#[test]
fn gradient_then_curl_vanishes() {
    // Curl of a gradient field is identically zero in the interior.
    let sdf = scalar_on_unit_cube(17, |p| p.x * p.x + p.y * p.z);
    let grad = gradient(&sdf).unwrap();
    let rot = curl(&grad).unwrap();

    let n = rot.grid.resolution;
    for i in 2..n - 2 {
        for j in 2..n - 2 {
            for k in 2..n - 2 {
                assert!(
                    rot.get(i, j, k).length() < 1e-3,
                    "curl {:?} at interior node ({i}, {j}, {k})",
                    rot.get(i, j, k)
                );
            }
        }
    }
}

#[test]
fn divergence_of_radial_field_is_three() {
    // div(p) = 3 everywhere, exactly even for one-sided stencils since
    // the field is linear.
    let field = vector_on_unit_cube(17, |p| p);
    let div = divergence(&field).unwrap();
    assert!(div.values.iter().all(|&v| (v - 3.0).abs() < 1e-3));
}

// ============================================================================
// Isosurface extraction
// ============================================================================

#[test]
fn sphere_isosurface_matches_analytic_radius() {
    let sdf = sphere_sdf(65, 0.5);
    let surfaces = extract_isosurfaces(&sdf, &IsosurfaceConfig::default()).unwrap();
    assert_eq!(surfaces.len(), 1);
    let surface = &surfaces[0];

    assert!(
        surface.triangle_count() > 500,
        "expected a dense sphere tessellation, got {} triangles",
        surface.triangle_count()
    );
    assert_eq!(surface.vertex_count() % 3, 0);

    // Marching-cubes vertices sit on interpolated edge crossings, so the
    // SDF residual shrinks with the cell size.
    let mut worst = 0.0f32;
    for v in &surface.vertices {
        worst = worst.max((v.length() - 0.5).abs());
    }
    assert!(worst < 0.01, "worst SDF residual {worst}");
}

#[test]
fn isosurface_area_scales_with_isovalue() {
    // For an SDF, isovalue c extracts the sphere of radius r + c; the
    // triangle count grows with the surface area.
    let sdf = sphere_sdf(33, 0.4);
    let config = IsosurfaceConfig {
        isovalues: vec![0.0, 0.3],
    };
    let surfaces = extract_isosurfaces(&sdf, &config).unwrap();
    assert!(surfaces[1].triangle_count() > surfaces[0].triangle_count());
}

// ============================================================================
// Streamlines
// ============================================================================

#[test]
fn streamlines_follow_rotation_field() {
    // Circular field around the z axis through the cube center: points
    // stay at a constant radius from the axis.
    let center = Vec3::splat(0.5);
    let field = vector_on_unit_cube(17, move |p| {
        let r = p - center;
        Vec3::new(-r.y, r.x, 0.0)
    });
    let seed = Vec3::new(0.75, 0.5, 0.5);
    let config = StreamlineConfig {
        step_size: 0.01,
        ..Default::default()
    };
    let lines = integrate(&field, &[seed], &config).unwrap();
    let line = &lines[0];
    assert!(line.points.len() > 100);

    let radius = (seed - center).length();
    for p in &line.points {
        let r = (Vec3::new(p.x, p.y, 0.5) - center).length();
        assert!(
            (r - radius).abs() < 0.01,
            "streamline left the circular orbit: radius {r} vs {radius}"
        );
        assert!((p.z - 0.5).abs() < 1e-5);
    }
}

#[test]
fn streamline_through_gradient_descends_the_sdf() {
    // Integrating the negated gradient of an SDF walks toward the surface
    // from outside and keeps decreasing the distance value.
    let sdf = sphere_sdf(33, 0.5);
    let grad = gradient(&sdf).unwrap();
    let inward = scale_vector(&grad, -1.0);

    let seed = Vec3::new(0.9, 0.0, 0.0);
    let config = StreamlineConfig {
        step_size: 0.02,
        ..Default::default()
    };
    let lines = integrate(&inward, &[seed], &config).unwrap();
    let line = &lines[0];
    assert!(line.points.len() > 5);

    let first = line.points[1].length();
    let last = line.points[line.points.len() - 1].length();
    assert!(
        last < first,
        "descent did not approach the surface: {first} -> {last}"
    );
}

// ============================================================================
// Critical points and statistics
// ============================================================================

#[test]
fn paraboloid_pipeline_finds_the_minimum() {
    // f = |p|² has one critical point (the origin), which is also the
    // field minimum reported by the statistics pass.
    let grid = Grid::from_bounds(Vec3::splat(-1.0), Vec3::splat(1.0), 17).unwrap();
    let field = ScalarField::from_fn(grid, |p| p.length_squared());

    let points = find_critical_points(&field, &CriticalPointConfig::default()).unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].kind, CriticalKind::Minimum);
    assert!(points[0].position.length() < 1e-5);

    let stats = field_statistics(&field).unwrap();
    assert!(stats.min_position.length() < 1e-5);
    assert!((stats.max - 3.0).abs() < 1e-4, "corner value is 3");
}

#[test]
fn directional_derivative_matches_gradient_component() {
    let field = scalar_on_unit_cube(17, |p| p.x + 4.0 * p.z);
    let along_z = directional_derivative(&field, Vec3::Z).unwrap();
    assert!(along_z.values.iter().all(|&v| (v - 4.0).abs() < 1e-3));

    // Same thing via the explicit gradient and component extraction.
    let grad = gradient(&field).unwrap();
    let z_comp = component(&grad, Axis::Z).unwrap();
    for (a, b) in along_z.values.iter().zip(&z_comp.values) {
        assert!((a - b).abs() < 1e-5);
    }
}

// ============================================================================
// Interpolation consistency
// ============================================================================

#[test]
fn trilinear_sampling_agrees_with_grid_nodes() {
    let sdf = sphere_sdf(33, 0.5);
    let n = sdf.grid.resolution;
    for (i, j, k) in [(0, 0, 0), (16, 16, 16), (n - 1, 4, 20)] {
        let p = sdf.grid.position(i, j, k);
        let sampled = sample_scalar(&sdf, p, InterpolationMethod::Trilinear).unwrap();
        assert!(
            (sampled - sdf.get(i, j, k)).abs() < 1e-5,
            "node sample mismatch at ({i}, {j}, {k})"
        );
    }
}
