//! The binning & aggregation engine.
//!
//! There are 2 halves to this module:
//! - [`BinSpecification`] describes the time-lag bins. It can be built from
//!   explicit edges or from the observed lags under one of the
//!   [`BinMethod`] policies.
//! - [`BinnedPairs`] pools the current samples of one or more light curves,
//!   assigns each pair to a bin, and reduces the pairs of each bin to a
//!   scalar. Streaming statistics go through the [`Reducer`] machinery of
//!   `lcsf_nostd_internal`; statistics that need every value of a bin (e.g.
//!   a median) go through [`BinnedPairs::binned_values`].

use lcsf_nostd_internal::{
    Datum, EdgeSlice, LagBins, Reducer, StatePackViewMut, UniformBins, WeightedMean, check_edges,
    merge_full_statepacks, reset_full_statepack, sort_finite,
};
use ndarray::{Array2, ArrayViewMut1};

use crate::{
    ArgumentContainer, BinMethod, Error, LightCurveDifferences, PairDifference,
    StructureFunctionEstimate,
};

/// Bins holding fewer pairs than this are dropped from every result
pub const MIN_PAIRS_PER_BIN: usize = 2;

/// Ordered, non-overlapping, half-open time-lag intervals.
///
/// The edges are always finite and strictly increasing.
#[derive(Clone, Debug, PartialEq)]
pub struct BinSpecification {
    edges: Vec<f64>,
}

impl BinSpecification {
    /// Wraps explicit bin edges
    pub fn from_edges(edges: Vec<f64>) -> Result<Self, Error> {
        check_edges(&edges).map_err(|what| Error::bin_edge("bin edges", what))?;
        Ok(Self { edges })
    }

    /// Builds bins that each hold `target` lags, except for the last bin,
    /// which holds whatever remains (at least 1 lag).
    ///
    /// `lags` need not be sorted. For `N` distinct lags this produces
    /// `ceil(N / target)` bins. Tied lags can't be split across a bin
    /// boundary, so ties shift the boundary (and may merge bins).
    pub fn equal_count(lags: &[f64], target: usize) -> Result<Self, Error> {
        if target == 0 {
            return Err(Error::argument_value("bin_count_target", "must be at least 1"));
        }
        let mut sorted = lags.to_vec();
        let n_finite = sort_finite(&mut sorted);
        sorted.truncate(n_finite);
        let Some(&largest) = sorted.last() else {
            return Err(Error::argument_value(
                "lags",
                "at least one finite lag is needed to build bins",
            ));
        };

        let mut edges = Vec::with_capacity(n_finite.div_ceil(target) + 1);
        for start in (0..n_finite).step_by(target) {
            push_increasing(&mut edges, sorted[start]);
        }
        // the right edge is exclusive, so nudge it past the largest lag
        push_increasing(&mut edges, largest.next_up());
        Self::from_edges(edges)
    }

    /// Builds `n_bins` bins of equal width spanning `[min, max]`
    pub fn equal_width(min: f64, max: f64, n_bins: usize) -> Result<Self, Error> {
        let uniform = UniformBins::new(min, max.next_up(), n_bins)
            .map_err(|what| Error::bin_edge("equal width bins", what))?;
        let mut edges = Vec::with_capacity(n_bins + 1);
        for edge in uniform.edges() {
            push_increasing(&mut edges, edge);
        }
        Self::from_edges(edges)
    }

    /// Builds `n_bins` bins whose edges are equally spaced in `log(lag)`,
    /// spanning `[min, max]`. Requires `min > 0`.
    pub fn log_width(min: f64, max: f64, n_bins: usize) -> Result<Self, Error> {
        if !(min > 0.0) {
            return Err(Error::argument_value(
                "bin_method",
                "log-spaced bins require strictly positive lags",
            ));
        }
        let upper = max.next_up();
        let log_bins = match UniformBins::new(min.ln(), upper.ln(), n_bins) {
            Ok(log_bins) => log_bins,
            // ln() can't resolve the range (every lag is essentially the
            // same), so fall back to a single bin
            Err(_) => return Self::from_edges(vec![min, upper]),
        };

        let mut edges = Vec::with_capacity(n_bins + 1);
        edges.push(min);
        for i in 1..n_bins {
            push_increasing(&mut edges, log_bins.edge(i).exp());
        }
        // exp(ln(x)) needn't round-trip, so pin the outer edge exactly
        if edges.last().is_some_and(|&last| last >= upper) {
            edges.pop();
        }
        edges.push(upper);
        Self::from_edges(edges)
    }

    /// Builds the bins requested by `args` for the observed `lags`.
    ///
    /// Returns `Ok(None)` when fewer than [`MIN_PAIRS_PER_BIN`] lags are
    /// available: there is nothing to bin, which isn't an error.
    pub fn from_args(lags: &[f64], args: &ArgumentContainer) -> Result<Option<Self>, Error> {
        if let Some(edges) = &args.bins {
            return Self::from_edges(edges.clone()).map(Some);
        }
        if lags.len() < MIN_PAIRS_PER_BIN {
            return Ok(None);
        }

        let (min, max) = lags
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                (lo.min(x), hi.max(x))
            });
        let spec = match args.bin_method {
            BinMethod::Size => Self::equal_count(lags, args.bin_count_target)?,
            BinMethod::Length => Self::equal_width(min, max, args.bin_count_target)?,
            BinMethod::LogLength => Self::log_width(min, max, args.bin_count_target)?,
        };
        Ok(Some(spec))
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn into_edges(self) -> Vec<f64> {
        self.edges
    }

    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// the index of the bin holding `lag` (or `None` if it lies outside of
    /// every bin)
    pub fn bin_index(&self, lag: f64) -> Option<usize> {
        self.as_lag_bins().bin_of(lag)
    }

    fn as_lag_bins(&self) -> EdgeSlice<'_> {
        EdgeSlice::new(&self.edges).expect("edges are checked on construction and never mutated")
    }
}

/// push `edge` onto `edges` unless it would break strict ordering
fn push_increasing(edges: &mut Vec<f64>, edge: f64) {
    if edges.last().is_none_or(|&last| edge > last) {
        edges.push(edge);
    }
}

/// The weighted mean of a bin, and the total weight that went into it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BinMean {
    pub mean: f64,
    pub weight: f64,
}

/// The pooled current samples of a group of light curves, partitioned into
/// time-lag bins.
pub struct BinnedPairs {
    spec: BinSpecification,
    pairs: Vec<PairDifference>,
    // the bin of each entry in `pairs` (None when it falls outside the bins)
    bin_indices: Vec<Option<usize>>,
    // pairs[segment_ends[i-1]..segment_ends[i]] came from light curve i
    segment_ends: Vec<usize>,
    counts: Vec<usize>,
}

impl BinnedPairs {
    /// Pools the current samples of `lightcurves` and bins them as requested
    /// by `args`.
    ///
    /// Returns `Ok(None)` when fewer than [`MIN_PAIRS_PER_BIN`] pairs are
    /// available.
    pub fn new(
        lightcurves: &[LightCurveDifferences],
        args: &ArgumentContainer,
    ) -> Result<Option<Self>, Error> {
        let (pairs, segment_ends) = pool_samples(lightcurves);
        if pairs.len() < MIN_PAIRS_PER_BIN {
            return Ok(None);
        }
        let lags: Vec<f64> = pairs.iter().map(|p| p.lag).collect();
        let Some(spec) = BinSpecification::from_args(&lags, args)? else {
            return Ok(None);
        };
        Ok(Some(Self::from_parts(spec, pairs, segment_ends)))
    }

    /// Pools the current samples of `lightcurves` into the bins described by
    /// `spec`
    pub fn with_spec(lightcurves: &[LightCurveDifferences], spec: BinSpecification) -> Self {
        let (pairs, segment_ends) = pool_samples(lightcurves);
        Self::from_parts(spec, pairs, segment_ends)
    }

    fn from_parts(
        spec: BinSpecification,
        pairs: Vec<PairDifference>,
        segment_ends: Vec<usize>,
    ) -> Self {
        let bins = spec.as_lag_bins();
        let bin_indices: Vec<Option<usize>> = pairs.iter().map(|p| bins.bin_of(p.lag)).collect();
        let mut counts = vec![0_usize; bins.n_bins()];
        for bin in bin_indices.iter().flatten() {
            counts[*bin] += 1;
        }
        Self {
            spec,
            pairs,
            bin_indices,
            segment_ends,
            counts,
        }
    }

    pub fn spec(&self) -> &BinSpecification {
        &self.spec
    }

    pub fn n_pairs(&self) -> usize {
        self.pairs.len()
    }

    /// the number of pairs in each bin
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Computes the weighted mean of `datum(pair)` within each bin.
    ///
    /// Each light curve is reduced into its own statepack and the statepacks
    /// are then merged, so a pooled group and a lone light curve go through
    /// exactly the same reduction.
    pub fn binned_mean(&self, datum: impl Fn(&PairDifference) -> Datum) -> Vec<BinMean> {
        let reducer = WeightedMean;
        let n_bins = self.spec.n_bins();
        let shape = (reducer.accum_state_size(), n_bins);

        let mut total = Array2::<f64>::zeros(shape);
        let mut total_pack = StatePackViewMut::from_array_view(total.view_mut());
        reset_full_statepack(&reducer, &mut total_pack);

        let mut scratch = Array2::<f64>::zeros(shape);
        let mut start = 0;
        for &end in &self.segment_ends {
            let mut scratch_pack = StatePackViewMut::from_array_view(scratch.view_mut());
            reset_full_statepack(&reducer, &mut scratch_pack);
            for k in start..end {
                if let Some(bin) = self.bin_indices[k] {
                    reducer.consume(&mut scratch_pack.get_state_mut(bin), &datum(&self.pairs[k]));
                }
            }
            merge_full_statepacks(&reducer, &mut total_pack, &scratch_pack);
            start = end;
        }

        let mut buffer = [0.0; 2];
        (0..n_bins)
            .map(|bin| {
                reducer.value_from_accum_state(
                    &mut ArrayViewMut1::from(&mut buffer[..]),
                    &total_pack.get_state(bin),
                );
                BinMean {
                    mean: buffer[WeightedMean::VALUE_MEAN],
                    weight: buffer[WeightedMean::VALUE_WEIGHT],
                }
            })
            .collect()
    }

    /// Collects `value(pair)` for every pair of each bin
    pub fn binned_values(&self, value: impl Fn(&PairDifference) -> f64) -> Vec<Vec<f64>> {
        let mut out: Vec<Vec<f64>> = self.counts.iter().map(|&c| Vec::with_capacity(c)).collect();
        for (pair, bin) in self.pairs.iter().zip(&self.bin_indices) {
            if let Some(bin) = bin {
                out[*bin].push(value(pair));
            }
        }
        out
    }

    /// Applies `statistic` to the collected `value(pair)` of each bin.
    ///
    /// This is the generic entry point for statistics that can't be
    /// expressed as a streaming [`Reducer`].
    pub fn aggregate(
        &self,
        value: impl Fn(&PairDifference) -> f64,
        statistic: impl Fn(&[f64]) -> f64,
    ) -> Vec<f64> {
        self.binned_values(value)
            .iter()
            .map(|values| statistic(values))
            .collect()
    }

    /// Assembles the estimate from per-bin statistics.
    ///
    /// `statistic_per_bin` must hold one entry per bin. Bins with fewer than
    /// [`MIN_PAIRS_PER_BIN`] pairs are dropped. The representative lag of a
    /// bin is the mean lag of its pairs.
    ///
    /// # Errors
    /// Fails when `statistic_per_bin` doesn't hold exactly one entry per bin.
    pub fn estimate(&self, statistic_per_bin: &[f64]) -> Result<StructureFunctionEstimate, Error> {
        let n_bins = self.spec.n_bins();
        if statistic_per_bin.len() != n_bins {
            return Err(Error::argument_value(
                "statistic_per_bin",
                format!("holds {} values for {n_bins} bins", statistic_per_bin.len()),
            ));
        }
        let lag_means = self.binned_mean(|p| Datum::unweighted(p.lag));

        let mut estimate = StructureFunctionEstimate::default();
        for (bin, lag) in lag_means.iter().enumerate() {
            if self.counts[bin] < MIN_PAIRS_PER_BIN {
                continue;
            }
            estimate.bin_indices.push(bin);
            estimate.lags.push(lag.mean);
            estimate.values.push(statistic_per_bin[bin]);
            estimate.n_pairs.push(self.counts[bin]);
        }
        Ok(estimate)
    }
}

fn pool_samples(lightcurves: &[LightCurveDifferences]) -> (Vec<PairDifference>, Vec<usize>) {
    let total: usize = lightcurves.iter().map(|lc| lc.sample_len()).sum();
    let mut pairs = Vec::with_capacity(total);
    let mut segment_ends = Vec::with_capacity(lightcurves.len());
    for lc in lightcurves {
        pairs.extend(lc.sample_iter());
        segment_ends.push(pairs.len());
    }
    (pairs, segment_ends)
}
