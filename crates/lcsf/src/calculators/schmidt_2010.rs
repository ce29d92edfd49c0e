use lcsf_nostd_internal::Datum;

use crate::{
    ArgumentContainer, BinnedPairs, Error, LightCurveDifferences, StructureFunctionCalculator,
    StructureFunctionEstimate,
};

/// The inverse-variance weighted estimator of Schmidt et al. (2010).
///
/// Every pair is weighted by `w = 1/E` and each bin holds
/// `Σw·Δf²/Σw − Σw·E/Σw`. When no error floor applies, the noise term
/// reduces to `1/mean(w)`.
///
/// `E` is clamped from below by
/// [`crate::Schmidt2010Options::error_floor`] before it is inverted, so
/// pairs of noiseless measurements all receive the same (large) weight.
#[derive(Clone, Copy, Debug, Default)]
pub struct Schmidt2010;

impl StructureFunctionCalculator for Schmidt2010 {
    fn name(&self) -> &'static str {
        "schmidt_2010"
    }

    fn calculate(
        &self,
        lightcurves: &[LightCurveDifferences],
        args: &ArgumentContainer,
    ) -> Result<StructureFunctionEstimate, Error> {
        let Some(binned) = BinnedPairs::new(lightcurves, args)? else {
            return Ok(StructureFunctionEstimate::default());
        };
        let floor = args.schmidt_2010.error_floor;
        let weight = |e: f64| 1.0 / e.max(floor);

        let signal = binned.binned_mean(|p| Datum {
            value: p.flux_diff * p.flux_diff,
            weight: weight(p.sum_squared_error),
        });
        let noise = binned.binned_mean(|p| Datum {
            value: p.sum_squared_error,
            weight: weight(p.sum_squared_error),
        });
        let values: Vec<f64> = signal
            .iter()
            .zip(&noise)
            .map(|(signal, noise)| signal.mean - noise.mean)
            .collect();
        binned.estimate(&values)
    }
}
