//! Critical point detection and classification.
//!
//! A critical point is an interior grid node where the finite-difference
//! gradient magnitude falls under a threshold. Each candidate is classified
//! by the eigenvalues of the Hessian there: three above +ε is a minimum,
//! three below -ε a maximum, anything else a saddle. Eigenvalues within
//! the classification epsilon of zero count toward neither side, so a
//! degenerate Hessian classifies as a saddle.
//!
//! The symmetric 3×3 eigensolve is the closed-form trigonometric one
//! (Smith's algorithm); no iterative solver is involved.

use glam::Vec3;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::differential::{gradient, hessian};
use crate::error::FieldResult;
use crate::field::{ScalarField, SymMat3};

/// Hessian signature of a critical point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CriticalKind {
    /// All three eigenvalues above +ε
    Minimum,
    /// All three eigenvalues below -ε
    Maximum,
    /// Anything else, degenerate eigenvalues included
    Saddle,
}

/// One classified critical point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalPoint {
    /// World position of the grid node
    pub position: Vec3,
    /// Hessian signature
    pub kind: CriticalKind,
    /// Field value at the node
    pub value: f32,
    /// Hessian eigenvalues, descending
    pub eigenvalues: [f32; 3],
    /// Unit eigenvectors matching `eigenvalues` by position
    pub eigenvectors: [Vec3; 3],
}

/// Thresholds for detection and classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalPointConfig {
    /// Gradient magnitude under this marks a candidate node
    pub gradient_threshold: f32,
    /// Eigenvalues within this of zero make the Hessian degenerate
    pub classify_epsilon: f32,
}

impl Default for CriticalPointConfig {
    fn default() -> Self {
        CriticalPointConfig {
            gradient_threshold: 1e-6,
            classify_epsilon: 1e-6,
        }
    }
}

/// Find and classify the critical points of a scalar field.
///
/// Boundary nodes are never candidates; one-sided derivative stencils
/// there are too biased to trust a near-zero gradient reading.
pub fn find_critical_points(
    field: &ScalarField,
    config: &CriticalPointConfig,
) -> FieldResult<Vec<CriticalPoint>> {
    field.validate()?;
    let grad = gradient(field)?;
    let hess = hessian(field)?;
    let n = field.grid.resolution;

    let mut points: Vec<CriticalPoint> = (1..n - 1)
        .into_par_iter()
        .flat_map_iter(|i| {
            let grad = &grad;
            let hess = &hess;
            let mut found = Vec::new();
            for j in 1..n - 1 {
                for k in 1..n - 1 {
                    if grad.get(i, j, k).length() >= config.gradient_threshold {
                        continue;
                    }
                    let (eigenvalues, eigenvectors) = eigen_symmetric(hess.get(i, j, k));
                    let kind = classify(eigenvalues, config.classify_epsilon);
                    found.push(CriticalPoint {
                        position: field.grid.position(i, j, k),
                        kind,
                        value: field.get(i, j, k),
                        eigenvalues,
                        eigenvectors,
                    });
                }
            }
            found.into_iter()
        })
        .collect();

    // Keep the output in flat-index order independent of the parallel
    // split.
    points.sort_by(|a, b| {
        a.position
            .to_array()
            .partial_cmp(&b.position.to_array())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!("classified {} critical points", points.len());
    Ok(points)
}

/// Signature of a descending eigenvalue triple. Eigenvalues within
/// `epsilon` of zero count as neither positive nor negative, so anything
/// short of three definite signs on one side is a saddle.
fn classify(eigenvalues: [f32; 3], epsilon: f32) -> CriticalKind {
    let positives = eigenvalues.iter().filter(|l| **l > epsilon).count();
    let negatives = eigenvalues.iter().filter(|l| **l < -epsilon).count();
    match (positives, negatives) {
        (3, _) => CriticalKind::Minimum,
        (_, 3) => CriticalKind::Maximum,
        _ => CriticalKind::Saddle,
    }
}

/// Eigenvalues (descending) and matching unit eigenvectors of a symmetric
/// 3×3 matrix, via the closed-form trigonometric solution.
pub fn eigen_symmetric(m: SymMat3) -> ([f32; 3], [Vec3; 3]) {
    // Near-diagonal fast path: the diagonal is already the spectrum.
    if m.off_diagonal_norm() < 1e-12 {
        let mut pairs = [
            (m.xx, Vec3::X),
            (m.yy, Vec3::Y),
            (m.zz, Vec3::Z),
        ];
        pairs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        return (
            [pairs[0].0, pairs[1].0, pairs[2].0],
            [pairs[0].1, pairs[1].1, pairs[2].1],
        );
    }

    let p1 = m.xy * m.xy + m.xz * m.xz + m.yz * m.yz;
    let q = m.trace() / 3.0;
    let p2 = (m.xx - q).powi(2) + (m.yy - q).powi(2) + (m.zz - q).powi(2) + 2.0 * p1;
    let p = (p2 / 6.0).sqrt();

    // B = (A - qI) / p has eigenvalues in [-2, 2]; det(B)/2 = cos(3φ).
    let b = SymMat3 {
        xx: (m.xx - q) / p,
        xy: m.xy / p,
        xz: m.xz / p,
        yy: (m.yy - q) / p,
        yz: m.yz / p,
        zz: (m.zz - q) / p,
    };
    let det_b = b.xx * (b.yy * b.zz - b.yz * b.yz) - b.xy * (b.xy * b.zz - b.yz * b.xz)
        + b.xz * (b.xy * b.yz - b.yy * b.xz);
    let r = (det_b / 2.0).clamp(-1.0, 1.0);

    let phi = r.acos() / 3.0;
    let l1 = q + 2.0 * p * phi.cos();
    let l3 = q + 2.0 * p * (phi + 2.0 * std::f32::consts::PI / 3.0).cos();
    let l2 = 3.0 * q - l1 - l3;

    let eigenvalues = [l1, l2, l3];
    let eigenvectors = [
        eigenvector_for(m, l1),
        eigenvector_for(m, l2),
        eigenvector_for(m, l3),
    ];
    (eigenvalues, eigenvectors)
}

/// Unit eigenvector for eigenvalue `lambda`: the rows of (A - λI) span the
/// orthogonal complement of the eigenspace, so the largest cross product
/// of any two rows points along the eigenvector.
fn eigenvector_for(m: SymMat3, lambda: f32) -> Vec3 {
    let r0 = m.row(0) - lambda * Vec3::X;
    let r1 = m.row(1) - lambda * Vec3::Y;
    let r2 = m.row(2) - lambda * Vec3::Z;

    let candidates = [r0.cross(r1), r0.cross(r2), r1.cross(r2)];
    let mut best = candidates[0];
    let mut best_norm = best.length_squared();
    for c in &candidates[1..] {
        let norm = c.length_squared();
        if norm > best_norm {
            best = *c;
            best_norm = norm;
        }
    }

    if best_norm < 1e-24 {
        // Repeated eigenvalue: any axis of the eigenplane will do.
        return Vec3::X;
    }
    best / best_norm.sqrt()
}
