use crate::distance::helpers::{accumulate_components, accumulate_dot, validate_dimensions};
use crate::distance::types::{CosineNorms, Distance, Norm, Result, Vector, VectorKind};

/// Computes the cosine distance between two vectors.
///
/// The optional [`CosineNorms`] parameter allows callers to reuse pre-computed
/// L2 norms and avoid recomputing them for every pair. When either vector has
/// zero magnitude the angle is undefined and [`Distance::UNDEFINED`] (`1.0`) is
/// returned.
///
/// # Examples
///
/// ```
/// use ratefill_core::{CosineNorms, DistanceError, cosine_distance};
///
/// fn main() -> Result<(), DistanceError> {
///     let a = [1.0_f64, 0.0, 0.0];
///     let b = [0.0_f64, 1.0, 0.0];
///
///     // Compute norms on the fly.
///     let orthogonal = cosine_distance(&a, &b, None)?;
///     assert!((orthogonal.value() - 1.0).abs() < 1e-12);
///
///     // Reuse pre-computed norms.
///     let norms = CosineNorms::from_vectors(&a, &b)?;
///     let again = cosine_distance(&a, &b, Some(norms))?;
///     assert!((again.value() - 1.0).abs() < 1e-12);
///
///     // Zero vectors sit at the conventional distance.
///     let undefined = cosine_distance(&[0.0, 0.0], &[3.0, 4.0], None)?;
///     assert_eq!(undefined.value(), 1.0);
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// - [`crate::DistanceError::ZeroLength`] when any input is empty.
/// - [`crate::DistanceError::DimensionMismatch`] when input lengths differ.
/// - [`crate::DistanceError::NonFinite`] when a value is NaN or infinite.
/// - [`crate::DistanceError::InvalidNorm`] when the magnitudes overflow.
pub fn cosine_distance(
    left: &[f64],
    right: &[f64],
    norms: Option<CosineNorms>,
) -> Result<Distance> {
    let left = Vector::new(left, VectorKind::Left)?;
    let right = Vector::new(right, VectorKind::Right)?;
    validate_dimensions(&left, &right)?;

    let (dot, left_norm, right_norm) = match norms {
        Some(norms) => (accumulate_dot(&left, &right), norms.left(), norms.right()),
        None => {
            let (dot, left_squares, right_squares) = accumulate_components(&left, &right);
            (
                dot,
                Norm::from_squared_sum(left_squares, VectorKind::Left)?,
                Norm::from_squared_sum(right_squares, VectorKind::Right)?,
            )
        }
    };

    if left_norm.is_zero() || right_norm.is_zero() {
        return Ok(Distance::UNDEFINED);
    }

    let similarity = dot / (*left_norm * *right_norm);
    // Theoretical range is [-1, 1], but numerical noise can spill over.
    let similarity = similarity.clamp(-1.0, 1.0);

    Ok(Distance::from_raw(1.0 - similarity))
}
