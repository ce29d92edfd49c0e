//! Introduces the [`AccumStateView`], [`AccumStateViewMut`] and
//! [`StatePackViewMut`] types
//!
//! Currently these simply wrap `ndarray` views. There is some benefit to
//! defining them anyway since it helps contain all references to the ndarray
//! package to a single file.
//!
//! We need separate immutable and mutable types for the same reason that
//! `&[f64]` and `&mut [f64]` are distinct: a statepack hands out views to
//! individual accumulator states that it constructs on the fly, so it can't
//! return references to views that it owns.

use core::ops::{Index, IndexMut};
use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis};

/// A read-only view of a single accumulator state
pub struct AccumStateView<'a> {
    data: ArrayView1<'a, f64>,
}

impl<'a> AccumStateView<'a> {
    pub fn from_array_view(data: ArrayView1<'a, f64>) -> Self {
        Self { data }
    }

    pub fn as_array_view(&self) -> ArrayView1<'_, f64> {
        self.data.view()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Index<usize> for AccumStateView<'_> {
    type Output = f64;

    #[inline(always)]
    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

/// A mutable view of a single accumulator state
pub struct AccumStateViewMut<'a> {
    data: ArrayViewMut1<'a, f64>,
}

impl<'a> AccumStateViewMut<'a> {
    pub fn from_array_view(data: ArrayViewMut1<'a, f64>) -> Self {
        Self { data }
    }

    pub fn from_contiguous_slice(data: &'a mut [f64]) -> Self {
        Self {
            data: ArrayViewMut1::from(data),
        }
    }

    pub fn as_view(&self) -> AccumStateView<'_> {
        AccumStateView {
            data: self.data.view(),
        }
    }

    pub fn fill(&mut self, val: f64) {
        self.data.fill(val);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Index<usize> for AccumStateViewMut<'_> {
    type Output = f64;

    #[inline(always)]
    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<usize> for AccumStateViewMut<'_> {
    #[inline(always)]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

/// Represents a collection of Accumulator States, one per time-lag bin.
///
/// The wrapped array has the shape `[accum_state_size, n_bins]`.
pub struct StatePackViewMut<'a> {
    data: ArrayViewMut2<'a, f64>,
}

impl<'a> StatePackViewMut<'a> {
    pub fn from_array_view(array_view: ArrayViewMut2<'a, f64>) -> Self {
        Self { data: array_view }
    }

    pub fn get_state(&self, i: usize) -> AccumStateView<'_> {
        AccumStateView::from_array_view(self.data.index_axis(Axis(1), i))
    }

    pub fn get_state_mut(&mut self, i: usize) -> AccumStateViewMut<'_> {
        AccumStateViewMut::from_array_view(self.data.index_axis_mut(Axis(1), i))
    }

    pub fn state_size(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn n_states(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn as_array_view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statepack_states_are_columns() {
        let mut storage = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let view = ArrayViewMut2::from_shape((2, 3), &mut storage).unwrap();
        let mut statepack = StatePackViewMut::from_array_view(view);

        assert_eq!(statepack.state_size(), 2);
        assert_eq!(statepack.n_states(), 3);

        let state = statepack.get_state(1);
        assert_eq!(state.len(), 2);
        assert_eq!(state[0], 2.0);
        assert_eq!(state[1], 5.0);

        statepack.get_state_mut(2)[1] = -1.0;
        assert_eq!(statepack.as_array_view()[[1, 2]], -1.0);
    }
}
