//! Numerical building blocks for the `lcsf` crate that don't require the
//! standard library.
//!
//! This crate holds the pieces of a structure-function calculation that are
//! pure arithmetic over borrowed buffers:
//! - time-lag bins ([`LagBins`], [`UniformBins`], [`EdgeSlice`])
//! - the accumulation machinery ([`Reducer`], [`WeightedMean`], [`Datum`]) and the
//!   views over accumulator storage ([`AccumStateView`],
//!   [`AccumStateViewMut`], [`StatePackViewMut`])
//! - quantiles of sorted samples
//!
//! Anything that needs to allocate or to call transcendental functions
//! (`ln`, `exp`, `sqrt`, ...) lives in `lcsf`.

#![no_std]
mod bins;
mod misc;
mod reduce_utils;
mod reducer;
mod state;

pub use bins::{EdgeSlice, LagBins, UniformBins, check_edges};
pub use misc::{median_sorted, quantile_sorted, sort_finite};
pub use reduce_utils::{merge_full_statepacks, reset_full_statepack};
pub use reducer::{Datum, Reducer, WeightedMean};
pub use state::{AccumStateView, AccumStateViewMut, StatePackViewMut};
