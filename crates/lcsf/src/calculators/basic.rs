use lcsf_nostd_internal::Datum;

use crate::{
    ArgumentContainer, BinnedPairs, Error, LightCurveDifferences, StructureFunctionCalculator,
    StructureFunctionEstimate,
};

/// The error-corrected mean squared flux difference.
///
/// Each bin holds `max(mean(Δf² − E), 0)`: the measurement noise is
/// subtracted pair by pair and the binned mean is floored at zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct Basic;

impl StructureFunctionCalculator for Basic {
    fn name(&self) -> &'static str {
        "basic"
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
            .binned_mean(|p| Datum::unweighted(p.flux_diff * p.flux_diff - p.sum_squared_error))
            .iter()
            .map(|bin| bin.mean.max(0.0))
            .collect();
        binned.estimate(&values)
    }
}
