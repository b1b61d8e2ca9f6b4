//! Streamline integration through a sampled vector field.
//!
//! Seeds are advected independently (parallel across seeds) with fixed-step
//! Euler, Midpoint, or classic RK4 stepping; off-grid evaluation goes
//! through the interpolator. Stage evaluations within one step are strictly
//! sequential (k2 needs k1, and so on), so parallelism never reaches inside
//! a step.
//!
//! Adaptive (error-controlled) step sizing is deliberately not implemented;
//! callers wanting it should subdivide externally.

use std::str::FromStr;

use glam::Vec3;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldResult};
use crate::field::VectorField;
use crate::interpolate::{sample_vector_resolved, InterpolationMethod};

/// Hard cap on accepted points per streamline (seed included)
pub const MAX_STREAMLINE_STEPS: usize = 10_000;
/// Smallest accepted step size
pub const MIN_STEP_SIZE: f32 = 1e-8;
/// Largest accepted step size
pub const MAX_STEP_SIZE: f32 = 1.0;

/// Field magnitude below which integration treats the field as vanished
const VANISHED_FIELD_EPSILON: f32 = 1e-10;
/// Step delta magnitude below which integration treats the seed as stagnant
const STAGNANT_DELTA_EPSILON: f32 = 1e-10;

/// Explicit fixed-step integration scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IntegrationScheme {
    /// First order: delta = h·k1
    Euler,
    /// Second order: delta = h·(k1 + k2)/2
    Midpoint,
    /// Classic fourth order: delta = h·(k1 + 2k2 + 2k3 + k4)/6
    #[default]
    Rk4,
}

impl FromStr for IntegrationScheme {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euler" => Ok(IntegrationScheme::Euler),
            "midpoint" => Ok(IntegrationScheme::Midpoint),
            "rk4" => Ok(IntegrationScheme::Rk4),
            other => Err(FieldError::UnsupportedIntegrationScheme(other.to_string())),
        }
    }
}

/// Configuration for streamline integration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamlineConfig {
    /// Fixed step size h, valid in [1e-8, 1.0]
    pub step_size: f32,
    /// Stepping scheme
    pub scheme: IntegrationScheme,
    /// Off-grid evaluation method (downgraded to nearest on degenerate grids)
    pub method: InterpolationMethod,
}

impl Default for StreamlineConfig {
    fn default() -> Self {
        StreamlineConfig {
            step_size: 0.01,
            scheme: IntegrationScheme::Rk4,
            method: InterpolationMethod::Trilinear,
        }
    }
}

impl StreamlineConfig {
    /// Check the step size range.
    pub fn validate(&self) -> FieldResult<()> {
        if !self.step_size.is_finite()
            || self.step_size < MIN_STEP_SIZE
            || self.step_size > MAX_STEP_SIZE
        {
            return Err(FieldError::InvalidStepSize {
                value: self.step_size,
            });
        }
        Ok(())
    }
}

/// One integrated streamline: the seed plus the accepted point sequence
/// (seed included, at most [`MAX_STREAMLINE_STEPS`] points). Produced once;
/// not restartable. A seed that terminates immediately yields a degenerate
/// 2-point segment of duplicated seeds rather than an error, so downstream
/// curve fitting always sees a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Streamline {
    /// Seed point the integration started from
    pub seed: Vec3,
    /// Accepted point sequence, seed first
    pub points: Vec<Vec3>,
}

/// Advect every seed through the vector field.
///
/// Fails with [`FieldError::InvalidSeeds`] on an empty seed set; otherwise
/// each seed yields exactly one [`Streamline`], in seed order.
pub fn integrate(
    field: &VectorField,
    seeds: &[Vec3],
    config: &StreamlineConfig,
) -> FieldResult<Vec<Streamline>> {
    field.validate()?;
    config.validate()?;
    if seeds.is_empty() {
        return Err(FieldError::InvalidSeeds);
    }

    let method = config.method.effective(&field.grid);
    let lines: Vec<Streamline> = seeds
        .par_iter()
        .map(|&seed| advect(field, seed, method, config))
        .collect();

    debug!(
        "integrated {} streamlines ({} scheme, h = {})",
        lines.len(),
        match config.scheme {
            IntegrationScheme::Euler => "Euler",
            IntegrationScheme::Midpoint => "Midpoint",
            IntegrationScheme::Rk4 => "RK4",
        },
        config.step_size
    );
    Ok(lines)
}

/// Integrate a single seed until termination.
///
/// Termination: vanished field at the current point, stagnant delta,
/// the next point leaving the sampling bounds, or the point cap.
fn advect(
    field: &VectorField,
    seed: Vec3,
    method: InterpolationMethod,
    config: &StreamlineConfig,
) -> Streamline {
    let mut points = Vec::with_capacity(64);
    points.push(seed);
    let mut current = seed;

    while points.len() < MAX_STREAMLINE_STEPS {
        let Some(delta) = step_delta(field, current, config.step_size, method, config.scheme)
        else {
            break;
        };
        if delta.length() < STAGNANT_DELTA_EPSILON {
            break;
        }
        let next = current + delta;
        if !field.grid.contains(next) {
            break;
        }
        points.push(next);
        current = next;
    }

    // Immediate termination still yields a 2-point segment.
    if points.len() == 1 {
        points.push(seed);
    }

    Streamline { seed, points }
}

/// Weighted step delta for one integration step, or `None` when the field
/// has vanished at the current point. Stage evaluations are sequential by
/// construction.
fn step_delta(
    field: &VectorField,
    p: Vec3,
    h: f32,
    method: InterpolationMethod,
    scheme: IntegrationScheme,
) -> Option<Vec3> {
    let k1 = sample_vector_resolved(field, p, method);
    if k1.length() < VANISHED_FIELD_EPSILON {
        return None;
    }
    let delta = match scheme {
        IntegrationScheme::Euler => k1 * h,
        IntegrationScheme::Midpoint => {
            let k2 = sample_vector_resolved(field, p + k1 * (h * 0.5), method);
            (k1 + k2) * (h * 0.5)
        }
        IntegrationScheme::Rk4 => {
            let k2 = sample_vector_resolved(field, p + k1 * (h * 0.5), method);
            let k3 = sample_vector_resolved(field, p + k2 * (h * 0.5), method);
            let k4 = sample_vector_resolved(field, p + k3 * h, method);
            (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (h / 6.0)
        }
    };
    Some(delta)
}
