// this defines some basic utilities used in reductions.
// it's unclear if we want these things to be part of the public API, but
// they are shared by every binned reduction in `lcsf`

use crate::reducer::Reducer;
use crate::state::StatePackViewMut;

/// initialize every accumulator state held by `statepack`
pub fn reset_full_statepack(reducer: &impl Reducer, statepack: &mut StatePackViewMut) {
    for i in 0..statepack.n_states() {
        reducer.init_accum_state(&mut statepack.get_state_mut(i));
    }
}

/// merge each accumulator state in `other` into the corresponding state in
/// `statepack`
///
/// # Panics
/// Panics if the statepacks hold a different number of states. Both
/// statepacks are expected to be built from the same bin edges.
pub fn merge_full_statepacks(
    reducer: &impl Reducer,
    statepack: &mut StatePackViewMut,
    other: &StatePackViewMut,
) {
    let n_bins = statepack.n_states();
    assert_eq!(n_bins, other.n_states());
    for i in 0..n_bins {
        reducer.merge(&mut statepack.get_state_mut(i), &other.get_state(i));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::{Datum, WeightedMean};
    use ndarray::ArrayViewMut2;

    #[test]
    fn reset_then_merge() {
        let accum = WeightedMean;
        let mut main_storage = [9.0; 4];
        let mut other_storage = [9.0; 4];
        let mut main = StatePackViewMut::from_array_view(
            ArrayViewMut2::from_shape((2, 2), &mut main_storage).unwrap(),
        );
        let mut other = StatePackViewMut::from_array_view(
            ArrayViewMut2::from_shape((2, 2), &mut other_storage).unwrap(),
        );
        reset_full_statepack(&accum, &mut main);
        reset_full_statepack(&accum, &mut other);

        accum.consume(&mut main.get_state_mut(0), &Datum::unweighted(1.0));
        accum.consume(&mut other.get_state_mut(0), &Datum::unweighted(3.0));
        accum.consume(&mut other.get_state_mut(1), &Datum::unweighted(5.0));

        merge_full_statepacks(&accum, &mut main, &other);

        // row 0 holds totals, row 1 holds weights
        let view = main.as_array_view();
        assert_eq!(view[[0, 0]], 4.0);
        assert_eq!(view[[1, 0]], 2.0);
        assert_eq!(view[[0, 1]], 5.0);
        assert_eq!(view[[1, 1]], 1.0);
    }
}
