//! Summary statistics over scalar field samples.
//!
//! Non-finite samples (NaN, ±inf) are excluded from every aggregate; a
//! field with no finite sample at all is an error rather than a NaN-filled
//! summary. Extrema report the first occurrence in flat-index order, so
//! results are stable across runs.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldResult};
use crate::field::ScalarField;

/// Aggregates over the finite samples of a scalar field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldStatistics {
    /// Smallest finite sample
    pub min: f32,
    /// Largest finite sample
    pub max: f32,
    /// Arithmetic mean of the finite samples
    pub mean: f32,
    /// Population standard deviation of the finite samples
    pub std_dev: f32,
    /// Flat index of the first minimum
    pub min_index: usize,
    /// Flat index of the first maximum
    pub max_index: usize,
    /// World position of the first minimum
    pub min_position: Vec3,
    /// World position of the first maximum
    pub max_position: Vec3,
    /// Number of finite samples that entered the aggregates
    pub finite_count: usize,
}

/// Compute summary statistics for a scalar field.
///
/// Two passes: extrema and mean first, then the centered second moment,
/// which avoids the cancellation of the single-pass sum-of-squares form.
pub fn field_statistics(field: &ScalarField) -> FieldResult<FieldStatistics> {
    field.validate()?;

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    let mut min_index = 0usize;
    let mut max_index = 0usize;
    let mut sum = 0.0f64;
    let mut finite_count = 0usize;

    for (idx, &v) in field.values.iter().enumerate() {
        if !v.is_finite() {
            continue;
        }
        if v < min {
            min = v;
            min_index = idx;
        }
        if v > max {
            max = v;
            max_index = idx;
        }
        sum += v as f64;
        finite_count += 1;
    }

    if finite_count == 0 {
        return Err(FieldError::NumericDegeneracy(
            "field has no finite samples".to_string(),
        ));
    }

    let mean = sum / finite_count as f64;
    let mut sq_sum = 0.0f64;
    for &v in &field.values {
        if v.is_finite() {
            let d = v as f64 - mean;
            sq_sum += d * d;
        }
    }
    let std_dev = (sq_sum / finite_count as f64).sqrt();

    Ok(FieldStatistics {
        min,
        max,
        mean: mean as f32,
        std_dev: std_dev as f32,
        min_index,
        max_index,
        min_position: field.grid.position_of(min_index),
        max_position: field.grid.position_of(max_index),
        finite_count,
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
    fn test_constant_field() {
        let field = ScalarField::filled(grid(), 4.0);
        let stats = field_statistics(&field).unwrap();
        assert_eq!(stats.min, 4.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.mean, 4.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.finite_count, 512);
        // Constant fields tie everywhere; the first flat index wins.
        assert_eq!(stats.min_index, 0);
        assert_eq!(stats.max_index, 0);
    }

    #[test]
    fn test_extrema_and_positions() {
        let field = ScalarField::from_fn(grid(), |p| p.x);
        let stats = field_statistics(&field).unwrap();
        assert!((stats.min - 0.0).abs() < 1e-6);
        assert!((stats.max - 1.0).abs() < 1e-6);
        assert!(stats.min_position.x.abs() < 1e-6);
        assert!((stats.max_position.x - 1.0).abs() < 1e-6);
        // x varies along i, so the first max sits at the start of the
        // last i-slab.
        assert_eq!(stats.max_index, 7 * 64);
    }

    #[test]
    fn test_non_finite_samples_are_skipped() {
        let g = grid();
        let mut values = vec![1.0f32; g.sample_count()];
        values[3] = f32::NAN;
        values[10] = f32::INFINITY;
        values[20] = 2.0;
        let field = ScalarField::new(g, values).unwrap();
        let stats = field_statistics(&field).unwrap();
        assert_eq!(stats.finite_count, 510);
        assert_eq!(stats.max, 2.0);
        assert_eq!(stats.max_index, 20);
    }

    #[test]
    fn test_all_non_finite_is_an_error() {
        let field = ScalarField::filled(grid(), f32::NAN);
        assert!(matches!(
            field_statistics(&field),
            Err(FieldError::NumericDegeneracy(_))
        ));
    }

    #[test]
    fn test_known_std_dev() {
        // Two-valued field split evenly: mean 1.0, deviation 1.0.
        let g = grid();
        let values: Vec<f32> = (0..g.sample_count())
            .map(|i| if i % 2 == 0 { 0.0 } else { 2.0 })
            .collect();
        let field = ScalarField::new(g, values).unwrap();
        let stats = field_statistics(&field).unwrap();
        assert!((stats.mean - 1.0).abs() < 1e-6);
        assert!((stats.std_dev - 1.0).abs() < 1e-6);
    }
}
