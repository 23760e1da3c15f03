//! Cross-checking device output against the sequential result.

use crate::error::{BenchError, Result};

/// Summary of an element-wise comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub max_abs_error: f32,
    pub max_rel_error: f32,
    /// First index whose relative error exceeded the tolerance.
    pub first_mismatch: Option<usize>,
}

impl Comparison {
    pub fn passed(&self) -> bool {
        self.first_mismatch.is_none()
    }
}

/// Compare `actual` against `expected` with a relative tolerance.
///
/// The relative error is taken against `max(|expected|, 1.0)` so that
/// values near zero are judged on an absolute scale.  A length mismatch
/// reports index `min(len)` as the mismatch.
pub fn compare(expected: &[f32], actual: &[f32], rel_tol: f32) -> Comparison {
    let mut max_abs_error = 0.0f32;
    let mut max_rel_error = 0.0f32;
    let mut first_mismatch = None;

    for (i, (&e, &a)) in expected.iter().zip(actual).enumerate() {
        let abs = (e - a).abs();
        let rel = abs / e.abs().max(1.0);
        // NaN compares false, so test the negation.
        if !(rel <= rel_tol) && first_mismatch.is_none() {
            first_mismatch = Some(i);
        }
        max_abs_error = max_abs_error.max(abs);
        max_rel_error = max_rel_error.max(rel);
    }
    if expected.len() != actual.len() && first_mismatch.is_none() {
        first_mismatch = Some(expected.len().min(actual.len()));
    }

    Comparison {
        max_abs_error,
        max_rel_error,
        first_mismatch,
    }
}

/// Like [`compare`], but a mismatch becomes [`BenchError::Verification`].
pub fn ensure_match(expected: &[f32], actual: &[f32], rel_tol: f32) -> Result<Comparison> {
    let cmp = compare(expected, actual, rel_tol);
    match cmp.first_mismatch {
        None => Ok(cmp),
        Some(i) => Err(BenchError::Verification(format!(
            "index {i}: expected {}, got {} (max relative error {:e})",
            expected.get(i).copied().unwrap_or(f32::NAN),
            actual.get(i).copied().unwrap_or(f32::NAN),
            cmp.max_rel_error
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_slices_pass() {
        let c = compare(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], 1e-3);
        assert!(c.passed());
        assert_eq!(c.max_abs_error, 0.0);
    }

    #[test]
    fn small_relative_drift_passes() {
        let c = compare(&[128.0, 130.5], &[128.01, 130.49], 1e-3);
        assert!(c.passed(), "{c:?}");
        assert!(c.max_rel_error < 1e-3);
    }

    #[test]
    fn reports_first_mismatch() {
        let c = compare(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.5, 3.0, 9.0], 1e-3);
        assert_eq!(c.first_mismatch, Some(1));
        assert!((c.max_abs_error - 5.0).abs() < 1e-6);
    }

    #[test]
    fn nan_is_a_mismatch() {
        let c = compare(&[1.0], &[f32::NAN], 1e-3);
        assert!(!c.passed());
    }

    #[test]
    fn length_mismatch_fails() {
        let c = compare(&[1.0, 2.0], &[1.0], 1e-3);
        assert_eq!(c.first_mismatch, Some(1));
    }

    #[test]
    fn ensure_match_passes_through_comparison() {
        let c = ensure_match(&[1.0, 2.0], &[1.0, 2.0], 1e-3).unwrap();
        assert!(c.passed());
    }

    #[test]
    fn mismatch_is_a_verification_error() {
        let err = ensure_match(&[1.0, 2.0], &[1.0, 4.0], 1e-3).unwrap_err();
        match err {
            BenchError::Verification(msg) => {
                assert!(msg.contains("index 1"), "{msg}");
                assert!(msg.contains("expected 2"), "{msg}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
