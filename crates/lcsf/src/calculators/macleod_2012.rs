use lcsf_nostd_internal::{Datum, median_sorted, sort_finite};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::{
    ArgumentContainer, BinnedPairs, Error, LightCurveDifferences, ScaleEstimator,
    StructureFunctionCalculator, StructureFunctionEstimate,
};

/// The estimator of MacLeod et al. (2012).
///
/// The absolute flux differences of a bin are treated as draws from a
/// half-normal distribution; its squared scale, less the mean measurement
/// noise, gives `max(s² − mean(E), 0)`. How `s` is estimated is controlled
/// by [`crate::Macleod2012Options::scale_estimator`].
///
/// The default [`ScaleEstimator::RootMeanSquare`] makes `s² = mean(Δf²)`,
/// so by default this reports the same values as [`crate::Bauer2009b`]
/// floored at 0. It is *not* the robust quantile-based estimator; select
/// [`ScaleEstimator::MedianAbsolute`] for `s = median(|Δf|) / Φ⁻¹(0.75)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Macleod2012;

impl StructureFunctionCalculator for Macleod2012 {
    fn name(&self) -> &'static str {
        "macleod_2012"
    }

    fn calculate(
        &self,
        lightcurves: &[LightCurveDifferences],
        args: &ArgumentContainer,
    ) -> Result<StructureFunctionEstimate, Error> {
        let Some(binned) = BinnedPairs::new(lightcurves, args)? else {
            return Ok(StructureFunctionEstimate::default());
        };
        let scale_squared: Vec<f64> = match args.macleod_2012.scale_estimator {
            ScaleEstimator::RootMeanSquare => binned
                .binned_mean(|p| Datum::unweighted(p.flux_diff * p.flux_diff))
                .iter()
                .map(|bin| bin.mean)
                .collect(),
            ScaleEstimator::MedianAbsolute => {
                let quartile = Normal::standard().inverse_cdf(0.75);
                binned.aggregate(
                    |p| p.flux_diff.abs(),
                    |values| {
                        let mut values = values.to_vec();
                        let n_finite = sort_finite(&mut values);
                        let scale = median_sorted(&values[..n_finite]) / quartile;
                        scale * scale
                    },
                )
            }
        };
        let noise = binned.binned_mean(|p| Datum::unweighted(p.sum_squared_error));

        let values: Vec<f64> = scale_squared
            .iter()
            .zip(&noise)
            .map(|(s2, noise)| (s2 - noise.mean).max(0.0))
            .collect();
        binned.estimate(&values)
    }
}
