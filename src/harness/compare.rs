//! Host/device numeric comparison.
//!
//! Element-wise closeness with the usual `|actual - expected| <= atol +
//! rtol * |expected|` rule. NaN never compares close.

use crate::diagnostic::Diagnostic;

/// Default relative tolerance for device-vs-host comparisons.
pub const REL_TOL: f32 = 1e-4;
/// Default absolute tolerance for device-vs-host comparisons.
pub const ABS_TOL: f32 = 1e-6;

#[derive(Clone, Copy, Debug)]
pub struct Tolerance {
    pub rel: f32,
    pub abs: f32,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            rel: REL_TOL,
            abs: ABS_TOL,
        }
    }
}

/// Outcome of an element-wise comparison.
#[derive(Clone, Debug, Default)]
pub struct Comparison {
    pub compared: usize,
    pub mismatches: usize,
    pub first_mismatch: Option<usize>,
    pub max_abs_diff: f32,
    pub length_mismatch: bool,
}

impl Comparison {
    pub fn passed(&self) -> bool {
        !self.length_mismatch && self.mismatches == 0
    }
}

pub fn all_close(expected: &[f32], actual: &[f32], tol: Tolerance) -> Comparison {
    let mut cmp = Comparison {
        compared: expected.len().min(actual.len()),
        length_mismatch: expected.len() != actual.len(),
        ..Default::default()
    };

    for (i, (&e, &a)) in expected.iter().zip(actual).enumerate() {
        let diff = (a - e).abs();
        // Comparing with <= keeps NaN on the mismatch side.
        let close = diff <= tol.abs + tol.rel * e.abs();
        if !close {
            cmp.mismatches += 1;
            if cmp.first_mismatch.is_none() {
                cmp.first_mismatch = Some(i);
            }
        }
        if diff > cmp.max_abs_diff {
            cmp.max_abs_diff = diff;
        }
    }
    cmp
}

/// Compare with default tolerances and turn a mismatch into a failure
/// diagnostic carrying the values a human needs to see.
pub fn check_close(label: &str, expected: &[f32], actual: &[f32]) -> Result<(), Diagnostic> {
    let cmp = all_close(expected, actual, Tolerance::default());
    if cmp.passed() {
        return Ok(());
    }

    if cmp.length_mismatch {
        return Err(Diagnostic::error(format!(
            "{}: device output has {} values, host reference has {}",
            label,
            actual.len(),
            expected.len()
        )));
    }

    let mut diag = Diagnostic::error(format!("{} does not match the host reference", label))
        .with_note(format!("expected (first 5): {:?}", preview(expected)))
        .with_note(format!("result (first 5):   {:?}", preview(actual)))
        .with_note(format!(
            "{} of {} values out of tolerance, max abs diff {:e}",
            cmp.mismatches, cmp.compared, cmp.max_abs_diff
        ));
    if let Some(i) = cmp.first_mismatch {
        diag = diag.with_note(format!(
            "first mismatch at index {}: expected {}, got {}",
            i, expected[i], actual[i]
        ));
    }
    Err(diag)
}

fn preview(values: &[f32]) -> &[f32] {
    &values[..values.len().min(5)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_values_pass() {
        let v = vec![0.0, 1.5, -3.25];
        assert!(all_close(&v, &v, Tolerance::default()).passed());
    }

    #[test]
    fn test_within_tolerance_passes() {
        // rtol * |2.0| = 2e-4 dominates; a diff of 1e-5 is well inside.
        let expected = vec![2.0_f32; 10];
        let actual = vec![2.00001_f32; 10];
        assert!(all_close(&expected, &actual, Tolerance::default()).passed());
    }

    #[test]
    fn test_outside_tolerance_fails() {
        let expected = vec![2.0_f32; 10];
        let mut actual = expected.clone();
        actual[3] = 2.001; // diff 1e-3 > 1e-6 + 1e-4 * 2.0
        let cmp = all_close(&expected, &actual, Tolerance::default());
        assert!(!cmp.passed());
        assert_eq!(cmp.mismatches, 1);
        assert_eq!(cmp.first_mismatch, Some(3));
        assert!(cmp.max_abs_diff > 9e-4);
    }

    #[test]
    fn test_absolute_tolerance_near_zero() {
        // Around zero the relative term vanishes and atol decides.
        let expected = vec![0.0_f32];
        assert!(all_close(&expected, &[5e-7], Tolerance::default()).passed());
        assert!(!all_close(&expected, &[1e-5], Tolerance::default()).passed());
    }

    #[test]
    fn test_nan_never_compares_close() {
        let cmp = all_close(&[1.0], &[f32::NAN], Tolerance::default());
        assert!(!cmp.passed());
        assert_eq!(cmp.first_mismatch, Some(0));
    }

    #[test]
    fn test_length_mismatch_fails() {
        let cmp = all_close(&[1.0, 2.0], &[1.0], Tolerance::default());
        assert!(cmp.length_mismatch);
        assert!(!cmp.passed());
    }

    #[test]
    fn test_check_close_reports_values() {
        let err = check_close("relu", &[1.0, 2.0], &[1.0, 9.0]).unwrap_err();
        assert!(err.message.contains("relu"));
        assert!(err.notes.iter().any(|n| n.contains("index 1")));
    }
}
