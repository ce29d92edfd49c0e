//! Order statistics over samples of per-bin values.

/// Sort `values` in place, placing NaN values at the end, and return the
/// number of non-NaN values (i.e. the length of the sorted finite prefix)
pub fn sort_finite(values: &mut [f64]) -> usize {
    values.sort_unstable_by(|a, b| match (a.is_nan(), b.is_nan()) {
        (false, false) => a.total_cmp(b),
        (true, false) => core::cmp::Ordering::Greater,
        (false, true) => core::cmp::Ordering::Less,
        (true, true) => core::cmp::Ordering::Equal,
    });
    values.iter().take_while(|x| !x.is_nan()).count()
}

/// Computes the `q`th quantile of an ascending slice by linear interpolation
/// between the closest ranks (numpy's default "linear" method).
///
/// Returns NaN for an empty slice. `q` is clamped to `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() || q.is_nan() {
        return f64::NAN;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * ((sorted.len() - 1) as f64);
    // NOTE: f64::floor can't be used in no_std crates. pos is non-negative,
    // so truncation gives the same answer
    let lo = pos as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = pos - (lo as f64);
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Computes the median of an ascending slice (NaN when empty)
pub fn median_sorted(sorted: &[f64]) -> f64 {
    quantile_sorted(sorted, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantiles_match_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile_sorted(&sorted, 0.0), 1.0);
        assert_eq!(quantile_sorted(&sorted, 1.0), 5.0);
        assert_eq!(quantile_sorted(&sorted, 0.5), 3.0);
        // pos = 0.16 * 4 = 0.64
        assert!((quantile_sorted(&sorted, 0.16) - 1.64).abs() < 1e-12);
        // pos = 0.84 * 4 = 3.36
        assert!((quantile_sorted(&sorted, 0.84) - 4.36).abs() < 1e-12);
    }

    #[test]
    fn quantile_edge_cases() {
        assert!(quantile_sorted(&[], 0.5).is_nan());
        assert_eq!(quantile_sorted(&[7.0], 0.16), 7.0);
        assert_eq!(quantile_sorted(&[7.0], 0.84), 7.0);
        assert_eq!(median_sorted(&[1.0, 3.0]), 2.0);
    }

    #[test]
    fn sort_finite_moves_nan_last() {
        let mut values = [3.0, f64::NAN, 1.0, 2.0, f64::NAN];
        let n_finite = sort_finite(&mut values);
        assert_eq!(n_finite, 3);
        assert_eq!(&values[..3], &[1.0, 2.0, 3.0]);
        assert!(values[3].is_nan() && values[4].is_nan());
    }
}
