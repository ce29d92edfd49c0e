//! Defines [`LightCurveDifferences`], the representation of a single cleaned
//! light curve together with every pairwise difference derived from it.

use rand::Rng;
use rand::seq::index;

use crate::Error;

/// The differences derived from a single pair of measurements `(m, n)`,
/// oriented so that `lag > 0` (i.e. `flux_diff` is the later flux minus the
/// earlier flux).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairDifference {
    pub lag: f64,
    pub flux_diff: f64,
    /// `σ_m² + σ_n²`
    pub sum_squared_error: f64,
}

/// One light curve, cleaned of NaN entries, plus all of its pairwise
/// differences.
///
/// The derived sequences (lags, flux differences, summed squared errors) are
/// computed once at construction and never mutated afterwards. Index `k` of
/// each derived sequence refers to the same originating pair.
///
/// A light curve also tracks a "current sample": the subset of the derived
/// pairs that calculators consume. Initially the sample holds every pair.
/// [`LightCurveDifferences::select_difference_samples`] replaces it with a
/// random subset, which is stored as a vector of indices into the derived
/// sequences (so the three sampled sequences can't fall out of alignment).
#[derive(Clone, Debug)]
pub struct LightCurveDifferences {
    times: Vec<f64>,
    fluxes: Vec<f64>,
    errors: Vec<f64>,

    lags: Vec<f64>,
    flux_diffs: Vec<f64>,
    sum_squared_errors: Vec<f64>,

    // None means "every pair"
    sample: Option<Vec<usize>>,
}

impl LightCurveDifferences {
    /// Builds the light curve from parallel columns.
    ///
    /// Rows where any of the time, flux or error is NaN are discarded. Then
    /// every pair of remaining rows with a strictly positive time separation
    /// contributes one difference (pairs with identical times are dropped).
    pub fn new(times: &[f64], fluxes: &[f64], errors: &[f64]) -> Result<Self, Error> {
        if fluxes.len() != times.len() {
            return Err(Error::length("flux", times.len(), fluxes.len()));
        }
        if errors.len() != times.len() {
            return Err(Error::length("error", times.len(), errors.len()));
        }

        let keep = |i: &usize| !(times[*i].is_nan() || fluxes[*i].is_nan() || errors[*i].is_nan());
        let kept: Vec<usize> = (0..times.len()).filter(keep).collect();
        let times: Vec<f64> = kept.iter().map(|&i| times[i]).collect();
        let fluxes: Vec<f64> = kept.iter().map(|&i| fluxes[i]).collect();
        let errors: Vec<f64> = kept.iter().map(|&i| errors[i]).collect();

        let n = times.len();
        let capacity = n * n.saturating_sub(1) / 2;
        let mut lags = Vec::with_capacity(capacity);
        let mut flux_diffs = Vec::with_capacity(capacity);
        let mut sum_squared_errors = Vec::with_capacity(capacity);

        for m in 0..n {
            for k in (m + 1)..n {
                let dt = times[k] - times[m];
                // orient every pair so that the lag is positive. A pair and
                // its mirror image are only visited once by this loop
                let (lag, flux_diff) = if dt > 0.0 {
                    (dt, fluxes[k] - fluxes[m])
                } else if dt < 0.0 {
                    (-dt, fluxes[m] - fluxes[k])
                } else {
                    continue;
                };
                lags.push(lag);
                flux_diffs.push(flux_diff);
                sum_squared_errors.push(errors[m] * errors[m] + errors[k] * errors[k]);
            }
        }

        Ok(Self {
            times,
            fluxes,
            errors,
            lags,
            flux_diffs,
            sum_squared_errors,
            sample: None,
        })
    }

    /// the cleaned times
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// the cleaned fluxes
    pub fn fluxes(&self) -> &[f64] {
        &self.fluxes
    }

    /// the cleaned errors
    pub fn errors(&self) -> &[f64] {
        &self.errors
    }

    /// every positive time lag (not just the current sample)
    pub fn lags(&self) -> &[f64] {
        &self.lags
    }

    pub fn flux_diffs(&self) -> &[f64] {
        &self.flux_diffs
    }

    pub fn sum_squared_errors(&self) -> &[f64] {
        &self.sum_squared_errors
    }

    /// the total number of pairwise differences
    pub fn n_differences(&self) -> usize {
        self.lags.len()
    }

    /// the number of pairwise differences in the current sample
    pub fn sample_len(&self) -> usize {
        match &self.sample {
            Some(indices) => indices.len(),
            None => self.lags.len(),
        }
    }

    /// the `i`th entry of the current sample
    pub fn sample_pair(&self, i: usize) -> PairDifference {
        let k = match &self.sample {
            Some(indices) => indices[i],
            None => i,
        };
        PairDifference {
            lag: self.lags[k],
            flux_diff: self.flux_diffs[k],
            sum_squared_error: self.sum_squared_errors[k],
        }
    }

    /// iterate over the current sample
    pub fn sample_iter(&self) -> impl Iterator<Item = PairDifference> + '_ {
        (0..self.sample_len()).map(move |i| self.sample_pair(i))
    }

    /// Replaces the current sample with `k` pairs drawn uniformly, without
    /// replacement, from all of the pairwise differences.
    ///
    /// The derived sequences are left untouched, so drawing again always
    /// samples from the full set of pairs.
    pub fn select_difference_samples<R: Rng + ?Sized>(
        &mut self,
        k: usize,
        rng: &mut R,
    ) -> Result<(), Error> {
        let available = self.n_differences();
        if k > available {
            return Err(Error::sample_size(k, available));
        }
        self.sample = Some(index::sample(rng, available, k).into_vec());
        Ok(())
    }

    /// Restores the current sample to the full set of pairs
    pub fn reset_samples(&mut self) {
        self.sample = None;
    }
}
