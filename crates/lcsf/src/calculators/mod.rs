//! The structure function calculators.
//!
//! Every calculator takes the current samples of a group of
//! [`LightCurveDifferences`] (a single light curve, or every light curve of
//! a band when results are combined), bins them, and reduces each bin to an
//! estimate of the structure function `SF²(Δt)`. The variants only differ in
//! how they turn the binned flux differences and measurement errors into
//! that estimate.
//!
//! The built-in variants are:
//!
//! | name | per-bin value |
//! |---|---|
//! | `basic` | `max(mean(Δf² − E), 0)` |
//! | `bauer_2009a` | `mean(max(Δf² − E, 0))` |
//! | `bauer_2009b` | `mean(Δf²) − mean(E)` |
//! | `macleod_2012` | `max(s² − mean(E), 0)`, `s` being the scale of `|Δf|` |
//! | `schmidt_2010` | `Σw·Δf²/Σw − Σw·E/Σw` with `w = 1/E` |
//!
//! where `Δf` is the flux difference of a pair and `E` is the sum of the
//! squared errors of its 2 measurements.

mod basic;
mod bauer_2009;
mod macleod_2012;
mod schmidt_2010;

pub use basic::Basic;
pub use bauer_2009::{Bauer2009a, Bauer2009b};
pub use macleod_2012::Macleod2012;
pub use schmidt_2010::Schmidt2010;

use crate::{ArgumentContainer, Error, Extensions, LightCurveDifferences};

/// The binned structure function computed by a calculator.
///
/// The vectors are parallel; entry `i` describes the bin with index
/// `bin_indices[i]` within the bin specification that the calculation used.
/// Bins with too few pairs are absent, so the indices may skip values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StructureFunctionEstimate {
    pub bin_indices: Vec<usize>,
    /// the representative time lag of each bin
    pub lags: Vec<f64>,
    /// the structure function estimate of each bin
    pub values: Vec<f64>,
    /// the number of pairs that contributed to each bin
    pub n_pairs: Vec<usize>,
}

impl StructureFunctionEstimate {
    pub fn len(&self) -> usize {
        self.bin_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bin_indices.is_empty()
    }
}

/// A named method of estimating a structure function from binned pairwise
/// differences.
///
/// Implementors can be made available by name through
/// [`crate::register_calculator`].
pub trait StructureFunctionCalculator: Send + Sync {
    /// the name the calculator is registered under
    fn name(&self) -> &'static str;

    /// Extension options the calculator reads from
    /// [`ArgumentContainer::extensions`], along with their default values.
    ///
    /// Before [`Self::calculate`] is called, missing fields are filled in
    /// from these defaults and present fields are checked to hold values of
    /// the same type.
    fn extension_defaults(&self) -> Extensions {
        Extensions::new()
    }

    /// Estimate the structure function from the current samples of
    /// `lightcurves`.
    ///
    /// An empty estimate is returned when fewer than 2 pairs are available.
    fn calculate(
        &self,
        lightcurves: &[LightCurveDifferences],
        args: &ArgumentContainer,
    ) -> Result<StructureFunctionEstimate, Error>;
}

#[cfg(test)]
pub(crate) mod test_utils {
    use crate::LightCurveDifferences;

    /// 5 evenly spaced measurements of a linear ramp, so every pair with lag
    /// `k` has a flux difference of `2k`
    pub(crate) fn ramp(error: f64) -> LightCurveDifferences {
        let times = [0.0, 1.0, 2.0, 3.0, 4.0];
        let fluxes = [0.0, 2.0, 4.0, 6.0, 8.0];
        LightCurveDifferences::new(&times, &fluxes, &[error; 5]).unwrap()
    }

    /// the bins [0.5, 1.5), [1.5, 2.5), [2.5, 4.5)
    pub(crate) fn ramp_edges() -> Vec<f64> {
        vec![0.5, 1.5, 2.5, 4.5]
    }
}
