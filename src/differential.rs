//! Finite-difference differential operators.
//!
//! All operators are pure functions from input fields to fresh output
//! fields, parallel over the outer i-slab of the flat sample array.
//!
//! # Boundary policy
//!
//! First-derivative operators (gradient, curl, divergence) use central
//! differences in the interior (O(h²)) and one-sided forward/backward
//! differences at the two boundary layers (O(h), still exact for linear
//! fields). Second-derivative operators (Laplacian, Hessian) emit 0 for
//! any entry whose central stencil would leave the grid. One policy per
//! derivative order, applied uniformly across operators.

use glam::Vec3;
use rayon::prelude::*;

use crate::error::FieldResult;
use crate::field::{HessianField, ScalarField, SymMat3, VectorField};

/// Spacing below this is treated as a collapsed axis: derivatives along it
/// are 0 rather than dividing by near-zero.
const SPACING_EPSILON: f32 = 1e-12;

/// First derivative along `axis` at (i, j, k): central in the interior,
/// one-sided at the boundary layers.
#[inline(always)]
fn d1<F: Fn(usize, usize, usize) -> f32>(
    f: &F,
    i: usize,
    j: usize,
    k: usize,
    axis: usize,
    n: usize,
    h: f32,
) -> f32 {
    if h.abs() < SPACING_EPSILON {
        return 0.0;
    }
    let center = [i, j, k];
    let mut up = center;
    let mut down = center;
    if center[axis] == 0 {
        up[axis] += 1;
        (f(up[0], up[1], up[2]) - f(i, j, k)) / h
    } else if center[axis] == n - 1 {
        down[axis] -= 1;
        (f(i, j, k) - f(down[0], down[1], down[2])) / h
    } else {
        up[axis] += 1;
        down[axis] -= 1;
        (f(up[0], up[1], up[2]) - f(down[0], down[1], down[2])) / (2.0 * h)
    }
}

/// Second derivative along `axis` at (i, j, k): central stencil in the
/// interior, 0 at the boundary layers.
#[inline(always)]
fn d2<F: Fn(usize, usize, usize) -> f32>(
    f: &F,
    i: usize,
    j: usize,
    k: usize,
    axis: usize,
    n: usize,
    h: f32,
) -> f32 {
    if h.abs() < SPACING_EPSILON {
        return 0.0;
    }
    let center = [i, j, k];
    if center[axis] == 0 || center[axis] == n - 1 {
        return 0.0;
    }
    let mut up = center;
    let mut down = center;
    up[axis] += 1;
    down[axis] -= 1;
    (f(up[0], up[1], up[2]) - 2.0 * f(i, j, k) + f(down[0], down[1], down[2])) / (h * h)
}

/// Mixed second derivative ∂²f/∂a∂b via the 4-point central stencil,
/// 0 unless both axes are interior.
#[inline(always)]
fn d2_mixed<F: Fn(usize, usize, usize) -> f32>(
    f: &F,
    i: usize,
    j: usize,
    k: usize,
    axis_a: usize,
    axis_b: usize,
    n: usize,
    ha: f32,
    hb: f32,
) -> f32 {
    if ha.abs() < SPACING_EPSILON || hb.abs() < SPACING_EPSILON {
        return 0.0;
    }
    let center = [i, j, k];
    if center[axis_a] == 0
        || center[axis_a] == n - 1
        || center[axis_b] == 0
        || center[axis_b] == n - 1
    {
        return 0.0;
    }
    let mut pp = center;
    let mut pm = center;
    let mut mp = center;
    let mut mm = center;
    pp[axis_a] += 1;
    pp[axis_b] += 1;
    pm[axis_a] += 1;
    pm[axis_b] -= 1;
    mp[axis_a] -= 1;
    mp[axis_b] += 1;
    mm[axis_a] -= 1;
    mm[axis_b] -= 1;
    (f(pp[0], pp[1], pp[2]) - f(pm[0], pm[1], pm[2]) - f(mp[0], mp[1], mp[2])
        + f(mm[0], mm[1], mm[2]))
        / (4.0 * ha * hb)
}

/// Gradient ∇f of a scalar field.
///
/// Central differences in the interior, one-sided at the boundary layers;
/// both are exact for linear fields.
pub fn gradient(field: &ScalarField) -> FieldResult<VectorField> {
    field.validate()?;
    let grid = field.grid;
    let n = grid.resolution;
    let h = grid.spacing;
    let s = |i: usize, j: usize, k: usize| field.values[grid.index(i, j, k)];

    let mut out = vec![Vec3::ZERO; grid.sample_count()];
    out.par_chunks_mut(n * n).enumerate().for_each(|(i, slab)| {
        for j in 0..n {
            let row = j * n;
            for k in 0..n {
                slab[row + k] = Vec3::new(
                    d1(&s, i, j, k, 0, n, h.x),
                    d1(&s, i, j, k, 1, n, h.y),
                    d1(&s, i, j, k, 2, n, h.z),
                );
            }
        }
    });
    Ok(VectorField {
        grid,
        values: out,
    })
}

/// Divergence ∇·F of a vector field.
pub fn divergence(field: &VectorField) -> FieldResult<ScalarField> {
    field.validate()?;
    let grid = field.grid;
    let n = grid.resolution;
    let h = grid.spacing;
    let fx = |i: usize, j: usize, k: usize| field.values[grid.index(i, j, k)].x;
    let fy = |i: usize, j: usize, k: usize| field.values[grid.index(i, j, k)].y;
    let fz = |i: usize, j: usize, k: usize| field.values[grid.index(i, j, k)].z;

    let mut out = vec![0.0f32; grid.sample_count()];
    out.par_chunks_mut(n * n).enumerate().for_each(|(i, slab)| {
        for j in 0..n {
            let row = j * n;
            for k in 0..n {
                slab[row + k] = d1(&fx, i, j, k, 0, n, h.x)
                    + d1(&fy, i, j, k, 1, n, h.y)
                    + d1(&fz, i, j, k, 2, n, h.z);
            }
        }
    });
    Ok(ScalarField {
        grid,
        values: out,
    })
}

/// Curl ∇×F of a vector field.
pub fn curl(field: &VectorField) -> FieldResult<VectorField> {
    field.validate()?;
    let grid = field.grid;
    let n = grid.resolution;
    let h = grid.spacing;
    let fx = |i: usize, j: usize, k: usize| field.values[grid.index(i, j, k)].x;
    let fy = |i: usize, j: usize, k: usize| field.values[grid.index(i, j, k)].y;
    let fz = |i: usize, j: usize, k: usize| field.values[grid.index(i, j, k)].z;

    let mut out = vec![Vec3::ZERO; grid.sample_count()];
    out.par_chunks_mut(n * n).enumerate().for_each(|(i, slab)| {
        for j in 0..n {
            let row = j * n;
            for k in 0..n {
                let dfz_dy = d1(&fz, i, j, k, 1, n, h.y);
                let dfy_dz = d1(&fy, i, j, k, 2, n, h.z);
                let dfx_dz = d1(&fx, i, j, k, 2, n, h.z);
                let dfz_dx = d1(&fz, i, j, k, 0, n, h.x);
                let dfy_dx = d1(&fy, i, j, k, 0, n, h.x);
                let dfx_dy = d1(&fx, i, j, k, 1, n, h.y);
                slab[row + k] = Vec3::new(dfz_dy - dfy_dz, dfx_dz - dfz_dx, dfy_dx - dfx_dy);
            }
        }
    });
    Ok(VectorField {
        grid,
        values: out,
    })
}

/// Laplacian ∇²f of a scalar field (0 at the boundary layers).
pub fn laplacian(field: &ScalarField) -> FieldResult<ScalarField> {
    field.validate()?;
    let grid = field.grid;
    let n = grid.resolution;
    let h = grid.spacing;
    let s = |i: usize, j: usize, k: usize| field.values[grid.index(i, j, k)];

    let mut out = vec![0.0f32; grid.sample_count()];
    out.par_chunks_mut(n * n).enumerate().for_each(|(i, slab)| {
        for j in 0..n {
            let row = j * n;
            for k in 0..n {
                slab[row + k] = d2(&s, i, j, k, 0, n, h.x)
                    + d2(&s, i, j, k, 1, n, h.y)
                    + d2(&s, i, j, k, 2, n, h.z);
            }
        }
    });
    Ok(ScalarField {
        grid,
        values: out,
    })
}

/// Hessian of a scalar field: diagonal entries via central second
/// differences, mixed entries via the 4-point stencil; each entry is 0
/// wherever its stencil would leave the grid.
pub fn hessian(field: &ScalarField) -> FieldResult<HessianField> {
    field.validate()?;
    let grid = field.grid;
    let n = grid.resolution;
    let h = grid.spacing;
    let s = |i: usize, j: usize, k: usize| field.values[grid.index(i, j, k)];

    let mut out = vec![SymMat3::ZERO; grid.sample_count()];
    out.par_chunks_mut(n * n).enumerate().for_each(|(i, slab)| {
        for j in 0..n {
            let row = j * n;
            for k in 0..n {
                slab[row + k] = SymMat3 {
                    xx: d2(&s, i, j, k, 0, n, h.x),
                    yy: d2(&s, i, j, k, 1, n, h.y),
                    zz: d2(&s, i, j, k, 2, n, h.z),
                    xy: d2_mixed(&s, i, j, k, 0, 1, n, h.x, h.y),
                    xz: d2_mixed(&s, i, j, k, 0, 2, n, h.x, h.z),
                    yz: d2_mixed(&s, i, j, k, 1, 2, n, h.y, h.z),
                };
            }
        }
    });
    Ok(HessianField {
        grid,
        values: out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    fn grid(n: usize) -> Grid {
        Grid::from_bounds(Vec3::splat(-1.0), Vec3::splat(1.0), n).unwrap()
    }

    #[test]
    fn test_gradient_linear_exact_everywhere() {
        // Central and one-sided differences are both exact for ax+by+cz,
        // so the gradient must equal (a,b,c) at every sample, boundary
        // layers included.
        let (a, b, c) = (2.0, -3.0, 0.5);
        let field = ScalarField::from_fn(grid(8), |p| a * p.x + b * p.y + c * p.z);
        let grad = gradient(&field).unwrap();
        for v in &grad.values {
            assert!(
                (*v - Vec3::new(a, b, c)).length() < 1e-4,
                "gradient {v:?} != ({a}, {b}, {c})"
            );
        }
    }

    #[test]
    fn test_gradient_quadratic_interior() {
        let field = ScalarField::from_fn(grid(17), |p| p.x * p.x);
        let grad = gradient(&field).unwrap();
        let g = grad.grid;
        let n = g.resolution;
        for i in 1..n - 1 {
            let p = g.position(i, n / 2, n / 2);
            let v = grad.values[g.index(i, n / 2, n / 2)];
            assert!((v.x - 2.0 * p.x).abs() < 1e-3, "d/dx x² at {p:?}: {v:?}");
            assert!(v.y.abs() < 1e-4 && v.z.abs() < 1e-4);
        }
    }

    #[test]
    fn test_divergence_of_rotation_vanishes() {
        // F = (-y, x, 0) is divergence-free.
        let field = VectorField::from_fn(grid(9), |p| Vec3::new(-p.y, p.x, 0.0));
        let div = divergence(&field).unwrap();
        for v in &div.values {
            assert!(v.abs() < 1e-4, "divergence should vanish, got {v}");
        }
    }

    #[test]
    fn test_curl_of_gradient_vanishes() {
        // F = ∇(x² + y² + z²) = (2x, 2y, 2z) is curl-free.
        let field = VectorField::from_fn(grid(9), |p| 2.0 * p);
        let c = curl(&field).unwrap();
        for v in &c.values {
            assert!(v.length() < 1e-4, "curl should vanish, got {v:?}");
        }
    }

    #[test]
    fn test_curl_of_rotation() {
        // ∇×(-y, x, 0) = (0, 0, 2) in the interior.
        let field = VectorField::from_fn(grid(9), |p| Vec3::new(-p.y, p.x, 0.0));
        let c = curl(&field).unwrap();
        let g = c.grid;
        let n = g.resolution;
        for i in 1..n - 1 {
            for j in 1..n - 1 {
                for k in 1..n - 1 {
                    let v = c.values[g.index(i, j, k)];
                    assert!((v - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-3);
                }
            }
        }
    }

    #[test]
    fn test_laplacian_quadratic() {
        // ∇²(x² + y² + z²) = 6 in the interior, 0 on the boundary layers.
        let field = ScalarField::from_fn(grid(9), |p| p.length_squared());
        let lap = laplacian(&field).unwrap();
        let g = lap.grid;
        let n = g.resolution;
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    let v = lap.values[g.index(i, j, k)];
                    let boundary =
                        i == 0 || i == n - 1 || j == 0 || j == n - 1 || k == 0 || k == n - 1;
                    if boundary {
                        // Some entries survive on faces where only one axis
                        // is clamped; fully interior axes still contribute.
                        continue;
                    }
                    assert!((v - 6.0).abs() < 1e-2, "laplacian {v} != 6");
                }
            }
        }
        // Corner: every axis is clamped, so the value is exactly 0.
        assert_eq!(lap.values[g.index(0, 0, 0)], 0.0);
    }

    #[test]
    fn test_hessian_quadratic() {
        // f = x² + 3xy: Hxx = 2, Hxy = 3, everything else 0.
        let field = ScalarField::from_fn(grid(9), |p| p.x * p.x + 3.0 * p.x * p.y);
        let hess = hessian(&field).unwrap();
        let g = hess.grid;
        let n = g.resolution;
        let m = hess.values[g.index(n / 2, n / 2, n / 2)];
        assert!((m.xx - 2.0).abs() < 1e-2);
        assert!((m.xy - 3.0).abs() < 1e-2);
        assert!(m.yy.abs() < 1e-2 && m.zz.abs() < 1e-2);
        assert!(m.xz.abs() < 1e-2 && m.yz.abs() < 1e-2);
        // Boundary entries needing out-of-grid neighbors are zeroed.
        assert_eq!(hess.values[g.index(0, 4, 4)].xx, 0.0);
        assert_eq!(hess.values[g.index(0, 4, 4)].xy, 0.0);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let bad = ScalarField {
            grid: grid(8),
            values: vec![0.0; 10],
        };
        assert!(gradient(&bad).is_err());
        assert!(laplacian(&bad).is_err());
        assert!(hessian(&bad).is_err());
    }
}
