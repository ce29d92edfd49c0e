//! The 2 estimators of Bauer et al. (2009).
//!
//! They differ in where the measurement noise is removed: `bauer_2009a`
//! subtracts it from each pair before binning (and floors each pair at zero)
//! while `bauer_2009b` bins the squared differences and the noise separately
//! and subtracts the binned means.

use lcsf_nostd_internal::Datum;

use crate::{
    ArgumentContainer, BinnedPairs, Error, LightCurveDifferences, StructureFunctionCalculator,
    StructureFunctionEstimate,
};

/// Each bin holds `mean(max(Δf² − E, 0))`
#[derive(Clone, Copy, Debug, Default)]
pub struct Bauer2009a;

impl StructureFunctionCalculator for Bauer2009a {
    fn name(&self) -> &'static str {
        "bauer_2009a"
    }

    fn calculate(
        &self,
        lightcurves: &[LightCurveDifferences],
        args: &ArgumentContainer,
    ) -> Result<StructureFunctionEstimate, Error> {
        let Some(binned) = BinnedPairs::new(lightcurves, args)? else {
            return Ok(StructureFunctionEstimate::default());
        };
        let values: Vec<f64> = binned
            .binned_mean(|p| {
                Datum::unweighted((p.flux_diff * p.flux_diff - p.sum_squared_error).max(0.0))
            })
            .iter()
            .map(|bin| bin.mean)
            .collect();
        binned.estimate(&values)
    }
}

/// Each bin holds `mean(Δf²) − mean(E)`.
///
/// The result is not floored, so a bin dominated by noise can be negative.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bauer2009b;

impl StructureFunctionCalculator for Bauer2009b {
    fn name(&self) -> &'static str {
        "bauer_2009b"
    }

    fn calculate(
        &self,
        lightcurves: &[LightCurveDifferences],
        args: &ArgumentContainer,
    ) -> Result<StructureFunctionEstimate, Error> {
        let Some(binned) = BinnedPairs::new(lightcurves, args)? else {
            return Ok(StructureFunctionEstimate::default());
        };
        // the 2 means are reduced into independent statepacks that share the
        // same bin edges
        let signal = binned.binned_mean(|p| Datum::unweighted(p.flux_diff * p.flux_diff));
        let noise = binned.binned_mean(|p| Datum::unweighted(p.sum_squared_error));
        let values: Vec<f64> = signal
            .iter()
            .zip(&noise)
            .map(|(signal, noise)| signal.mean - noise.mean)
            .collect();
        binned.estimate(&values)
    }
}
