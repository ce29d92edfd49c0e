//! Streaming per-bin reductions.
//!
//! A binned statistic is computed from a stream of `(lag, value, weight)`
//! triples. The lag only picks the bin; the rest is packaged in a [`Datum`]
//! and handed to a [`Reducer`], which folds it into the accumulator state of
//! that bin.
//!
//! A reducer never owns storage. The state of each bin lives in a column of
//! a statepack (see [`StatePackViewMut`]) that the caller allocates, so one
//! reducer can serve any number of bins, and the partial states of 2
//! disjoint streams (e.g. 2 light curves) can be merged afterwards.
//!
//! [`StatePackViewMut`]: crate::StatePackViewMut

use crate::state::{AccumStateView, AccumStateViewMut};
use ndarray::ArrayViewMut1;

/// A single weighted value
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Datum {
    pub value: f64,
    pub weight: f64,
}

impl Datum {
    /// a datum with unit weight
    pub fn unweighted(value: f64) -> Self {
        Datum { value, weight: 1.0 }
    }
}

pub trait Reducer {
    /// number of `f64` slots in one accumulator state
    fn accum_state_size(&self) -> usize;

    /// Overwrites `accum_state` with the state of an empty bin
    fn init_accum_state(&self, accum_state: &mut AccumStateViewMut);

    fn consume(&self, accum_state: &mut AccumStateViewMut, datum: &Datum);

    /// fold `other` into `accum_state`, as if every datum consumed by
    /// `other` had been consumed by `accum_state`
    fn merge(&self, accum_state: &mut AccumStateViewMut, other: &AccumStateView);

    /// the names of the values written by [`Reducer::value_from_accum_state`]
    fn output_names(&self) -> &'static [&'static str];

    /// Writes the finished values of `accum_state` into `value`, which must
    /// hold `self.output_names().len()` elements
    fn value_from_accum_state(&self, value: &mut ArrayViewMut1<f64>, accum_state: &AccumStateView);
}

/// The weighted mean `Σwᵢyᵢ / Σwᵢ`.
///
/// The second output is the total weight `Σwᵢ`, i.e. the number of
/// consumed values when every [`Datum`] is unweighted.
#[derive(Clone, Copy, Debug, Default)]
pub struct WeightedMean;

impl WeightedMean {
    const WEIGHTED_SUM: usize = 0;
    const TOTAL_WEIGHT: usize = 1;

    pub const VALUE_MEAN: usize = 0;
    pub const VALUE_WEIGHT: usize = 1;
}

impl Reducer for WeightedMean {
    fn accum_state_size(&self) -> usize {
        2
    }

    fn init_accum_state(&self, accum_state: &mut AccumStateViewMut) {
        accum_state.fill(0.0);
    }

    fn consume(&self, accum_state: &mut AccumStateViewMut, datum: &Datum) {
        accum_state[Self::WEIGHTED_SUM] += datum.weight * datum.value;
        accum_state[Self::TOTAL_WEIGHT] += datum.weight;
    }

    fn merge(&self, accum_state: &mut AccumStateViewMut, other: &AccumStateView) {
        for slot in [Self::WEIGHTED_SUM, Self::TOTAL_WEIGHT] {
            accum_state[slot] += other[slot];
        }
    }

    fn output_names(&self) -> &'static [&'static str] {
        &["mean", "weight"]
    }

    fn value_from_accum_state(&self, value: &mut ArrayViewMut1<f64>, accum_state: &AccumStateView) {
        let total_weight = accum_state[Self::TOTAL_WEIGHT];
        // NaN for an empty bin
        value[Self::VALUE_MEAN] = accum_state[Self::WEIGHTED_SUM] / total_weight;
        value[Self::VALUE_WEIGHT] = total_weight;
    }
}
