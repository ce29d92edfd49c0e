//! The top-level entry point: [`calculate_structure_function`].
//!
//! The driver splits the input columns into bands and light curves, picks
//! the calculator, and runs it once per group (a single light curve, or a
//! whole band when results are combined). Depending on the options, each
//! group is computed once, computed repeatedly on random subsets of its
//! pairs, or computed once with an uncertainty derived from such repeats.

use std::collections::{BTreeMap, BTreeSet};

use lcsf_nostd_internal::{median_sorted, quantile_sorted, sort_finite};
use log::{debug, warn};
use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;

use crate::{
    ArgumentContainer, BinSpecification, Error, GroupId, LightCurveDifferences,
    StructureFunctionCalculator, StructureFunctionRow, StructureFunctionTable, Uncertainty,
    calculator_from_name,
};

/// the band assigned to every measurement when no band column is given
pub const DEFAULT_BAND: &str = "default";
/// the light curve id assigned to every measurement when no id column is
/// given
pub const DEFAULT_LIGHTCURVE_ID: i64 = 0;
/// the calculator used when neither a method nor a container is given
pub const DEFAULT_METHOD: &str = "basic";

/// Borrowed, parallel columns of measurements.
///
/// Every column that is present must have the same length as `times`.
/// Without `errors`, every measurement is treated as noiseless.
#[derive(Clone, Copy, Debug)]
pub struct LightCurveColumns<'a> {
    pub times: &'a [f64],
    pub fluxes: &'a [f64],
    pub errors: Option<&'a [f64]>,
    pub bands: Option<&'a [&'a str]>,
    pub lightcurve_ids: Option<&'a [i64]>,
}

impl<'a> LightCurveColumns<'a> {
    pub fn new(times: &'a [f64], fluxes: &'a [f64]) -> Self {
        Self {
            times,
            fluxes,
            errors: None,
            bands: None,
            lightcurve_ids: None,
        }
    }

    pub fn with_errors(self, errors: &'a [f64]) -> Self {
        Self {
            errors: Some(errors),
            ..self
        }
    }

    pub fn with_bands(self, bands: &'a [&'a str]) -> Self {
        Self {
            bands: Some(bands),
            ..self
        }
    }

    pub fn with_lightcurve_ids(self, lightcurve_ids: &'a [i64]) -> Self {
        Self {
            lightcurve_ids: Some(lightcurve_ids),
            ..self
        }
    }

    fn check_lengths(&self) -> Result<(), Error> {
        let expected = self.times.len();
        let check = |name: &'static str, actual: usize| {
            if actual == expected {
                Ok(())
            } else {
                Err(Error::length(name, expected, actual))
            }
        };
        check("flux", self.fluxes.len())?;
        if let Some(errors) = self.errors {
            check("error", errors.len())?;
        }
        if let Some(bands) = self.bands {
            check("band", bands.len())?;
        }
        if let Some(ids) = self.lightcurve_ids {
            check("light curve id", ids.len())?;
        }
        Ok(())
    }
}

/// the measurements of one light curve, in input order
#[derive(Default)]
struct RawLightCurve {
    times: Vec<f64>,
    fluxes: Vec<f64>,
    errors: Vec<f64>,
}

type Partition = BTreeMap<String, BTreeMap<i64, RawLightCurve>>;

fn partition(columns: &LightCurveColumns) -> Partition {
    let mut out = Partition::new();
    for i in 0..columns.times.len() {
        let band = columns.bands.map_or(DEFAULT_BAND, |bands| bands[i]);
        let id = columns
            .lightcurve_ids
            .map_or(DEFAULT_LIGHTCURVE_ID, |ids| ids[i]);
        let lc = out
            .entry(band.to_owned())
            .or_default()
            .entry(id)
            .or_default();
        lc.times.push(columns.times[i]);
        lc.fluxes.push(columns.fluxes[i]);
        lc.errors.push(columns.errors.map_or(0.0, |errors| errors[i]));
    }
    out
}

/// applies the band and light curve allow-lists
fn select(mut partition: Partition, args: &ArgumentContainer) -> Result<Partition, Error> {
    if let Some(requested) = &args.band_to_calc {
        if !requested.iter().any(|band| partition.contains_key(band)) {
            return Err(Error::band_absent(
                requested.clone(),
                partition.keys().cloned().collect(),
            ));
        }
        partition.retain(|band, _| requested.contains(band));
    }

    if let Some(requested) = &args.lc_id {
        let available: BTreeSet<i64> = partition
            .values()
            .flat_map(|lightcurves| lightcurves.keys().copied())
            .collect();
        if !requested.iter().any(|id| available.contains(id)) {
            return Err(Error::lightcurve_absent(
                requested.iter().map(|id| id.to_string()).collect(),
                available.iter().map(|id| id.to_string()).collect(),
            ));
        }
        for lightcurves in partition.values_mut() {
            lightcurves.retain(|id, _| requested.contains(id));
        }
    }
    Ok(partition)
}

fn build_groups(
    lightcurves: BTreeMap<i64, RawLightCurve>,
    args: &ArgumentContainer,
) -> Result<Vec<(GroupId, Vec<LightCurveDifferences>)>, Error> {
    let mut built = Vec::with_capacity(lightcurves.len());
    for (id, raw) in lightcurves {
        let times = if args.ignore_timestamps {
            (0..raw.times.len()).map(|i| i as f64).collect()
        } else {
            raw.times
        };
        let lc = LightCurveDifferences::new(&times, &raw.fluxes, &raw.errors)?;
        // a light curve without a single pair contributes nothing
        if lc.n_differences() > 0 {
            built.push((id, lc));
        }
    }

    if args.combine {
        if built.is_empty() {
            Ok(Vec::new())
        } else {
            let pooled = built.into_iter().map(|(_, lc)| lc).collect();
            Ok(vec![(GroupId::Combined, pooled)])
        }
    } else {
        Ok(built
            .into_iter()
            .map(|(id, lc)| (GroupId::Id(id), vec![lc]))
            .collect())
    }
}

/// Computes the structure function of every selected band and light curve.
///
/// The calculator is taken from `argument_container.sf_method` when a
/// container is given; otherwise a default container is built for `method`
/// (or for `"basic"` when that is also `None`).
///
/// # Errors
/// Fails if the columns have mismatched lengths, the calculator name is
/// unknown, an option is invalid, none of the requested bands or light
/// curves exist, or more samples are requested than a light curve has
/// pairs. No partial result is ever returned.
pub fn calculate_structure_function(
    columns: &LightCurveColumns,
    method: Option<&str>,
    argument_container: Option<ArgumentContainer>,
) -> Result<StructureFunctionTable, Error> {
    let mut args = match argument_container {
        Some(args) => args,
        None => ArgumentContainer::with_method(method.unwrap_or(DEFAULT_METHOD)),
    };
    args.validate()?;
    let calculator = calculator_from_name(&args.sf_method)?;
    args.extensions
        .merge_defaults(&calculator.extension_defaults())?;
    columns.check_lengths()?;

    let partition = select(partition(columns), &args)?;
    debug!(
        "computing the \"{}\" structure function of {} band(s)",
        calculator.name(),
        partition.len()
    );

    // a single generator serves the whole call, so a seeded calculation is
    // reproducible as long as the traversal order is fixed
    let mut rng = match args.random_seed {
        Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
        None => Xoshiro256PlusPlus::from_rng(&mut rand::rng()),
    };

    let mut table = StructureFunctionTable::default();
    for (band, lightcurves) in partition {
        let groups = build_groups(lightcurves, &args)?;
        debug!("band \"{band}\": {} group(s)", groups.len());
        for (lc_id, mut group) in groups {
            let mut output = GroupOutput {
                table: &mut table,
                band: &band,
                lc_id,
            };
            if args.estimate_err {
                estimate_with_uncertainty(
                    calculator.as_ref(),
                    &mut group,
                    &args,
                    &mut rng,
                    &mut output,
                )?;
            } else {
                estimate_per_sample(
                    calculator.as_ref(),
                    &mut group,
                    &args,
                    &mut rng,
                    &mut output,
                )?;
            }
        }
    }
    Ok(table)
}

/// where the rows of one group go
struct GroupOutput<'a> {
    table: &'a mut StructureFunctionTable,
    band: &'a str,
    lc_id: GroupId,
}

impl GroupOutput<'_> {
    fn push(
        &mut self,
        sample_num: Option<usize>,
        dt: f64,
        sf2: f64,
        n_pairs: usize,
        uncertainty: Option<Uncertainty>,
    ) {
        self.table.push(StructureFunctionRow {
            band: self.band.to_owned(),
            lc_id: self.lc_id,
            sample_num,
            dt,
            sf2,
            n_pairs,
            uncertainty,
        });
    }
}

/// Determines how many pairs to draw from each light curve of `group`.
///
/// With `bootstrap`, each repetition must see a strict subsample to yield a
/// spread, so `bootstrap_sample_fraction` scales the pair count that applies
/// otherwise: the smallest pair count of the group under
/// `equally_weight_lightcurves`, or each light curve's own pair count. An
/// explicit `number_lightcurve_samples` is used as is.
fn sample_sizes(
    group: &[LightCurveDifferences],
    args: &ArgumentContainer,
    bootstrap: bool,
) -> Result<Vec<usize>, Error> {
    let available: Vec<usize> = group.iter().map(|lc| lc.n_differences()).collect();

    if let Some(k) = args.number_lightcurve_samples {
        if let Some(&n) = available.iter().find(|&&n| k > n) {
            return Err(Error::sample_size(k, n));
        }
        return Ok(vec![k; available.len()]);
    }
    let scale = |n: usize| match bootstrap {
        true => fraction_of(n, args.bootstrap_sample_fraction),
        false => n,
    };
    if args.equally_weight_lightcurves {
        let k = available.iter().copied().min().unwrap_or(0);
        return Ok(vec![scale(k); available.len()]);
    }
    Ok(available.into_iter().map(scale).collect())
}

/// `ceil(n * fraction)`, and at least 1 pair unless `n == 0`
fn fraction_of(n: usize, fraction: f64) -> usize {
    ((n as f64 * fraction).ceil() as usize).max(1).min(n)
}

fn draw_samples(
    group: &mut [LightCurveDifferences],
    sizes: &[usize],
    rng: &mut Xoshiro256PlusPlus,
) -> Result<(), Error> {
    for (lc, &k) in group.iter_mut().zip(sizes) {
        lc.select_difference_samples(k, rng)?;
    }
    Ok(())
}

fn reset_samples(group: &mut [LightCurveDifferences]) {
    for lc in group.iter_mut() {
        lc.reset_samples();
    }
}

/// Computes the group's structure function without an uncertainty.
///
/// When a sample size is requested (through `number_lightcurve_samples` or
/// `equally_weight_lightcurves`) every one of the `calculation_repetitions`
/// repetitions draws fresh samples and contributes its own rows. Otherwise
/// the full data is used once.
fn estimate_per_sample(
    calculator: &dyn StructureFunctionCalculator,
    group: &mut [LightCurveDifferences],
    args: &ArgumentContainer,
    rng: &mut Xoshiro256PlusPlus,
    output: &mut GroupOutput,
) -> Result<(), Error> {
    let resample = args.equally_weight_lightcurves || args.number_lightcurve_samples.is_some();
    if !resample {
        let estimate = calculator.calculate(group, args)?;
        for i in 0..estimate.len() {
            output.push(
                Some(0),
                estimate.lags[i],
                estimate.values[i],
                estimate.n_pairs[i],
                None,
            );
        }
        return Ok(());
    }

    let sizes = sample_sizes(group, args, false)?;
    debug!("{}: drawing {sizes:?} pairs per light curve", output.lc_id);
    for rep in 0..args.calculation_repetitions {
        draw_samples(group, &sizes, rng)?;
        let estimate = calculator.calculate(group, args)?;
        for i in 0..estimate.len() {
            output.push(
                Some(rep),
                estimate.lags[i],
                estimate.values[i],
                estimate.n_pairs[i],
                None,
            );
        }
    }
    reset_samples(group);
    Ok(())
}

/// Computes the group's structure function from its full data and attaches
/// an uncertainty derived from the spread over resampled repetitions.
///
/// The bin edges are derived once from the full data and shared by every
/// repetition, so that repetitions can be matched up bin by bin.
fn estimate_with_uncertainty(
    calculator: &dyn StructureFunctionCalculator,
    group: &mut [LightCurveDifferences],
    args: &ArgumentContainer,
    rng: &mut Xoshiro256PlusPlus,
    output: &mut GroupOutput,
) -> Result<(), Error> {
    let lags: Vec<f64> = group
        .iter()
        .flat_map(|lc| lc.lags().iter().copied())
        .collect();
    let Some(spec) = BinSpecification::from_args(&lags, args)? else {
        return Ok(());
    };
    let n_bins = spec.n_bins();
    let fixed_args = ArgumentContainer {
        bins: Some(spec.into_edges()),
        ..args.clone()
    };

    let full = calculator.calculate(group, &fixed_args)?;
    if full.is_empty() {
        return Ok(());
    }

    let sizes = sample_sizes(group, args, true)?;
    debug!(
        "{}: {} repetition(s) drawing {sizes:?} pairs per light curve",
        output.lc_id, args.calculation_repetitions
    );
    let mut samples: Vec<Vec<f64>> = vec![Vec::new(); n_bins];
    for _ in 0..args.calculation_repetitions {
        draw_samples(group, &sizes, rng)?;
        let estimate = calculator.calculate(group, &fixed_args)?;
        for (&bin, &value) in estimate.bin_indices.iter().zip(&estimate.values) {
            if let Some(values) = samples.get_mut(bin) {
                values.push(value);
            }
        }
    }
    reset_samples(group);

    for i in 0..full.len() {
        let bin = full.bin_indices[i];
        let values = samples.get_mut(bin).map(std::mem::take).unwrap_or_default();
        if values.is_empty() {
            warn!(
                "{}: no repetition populated the bin at dt = {}",
                output.lc_id, full.lags[i]
            );
        }
        let uncertainty = spread(values, args);
        output.push(
            None,
            full.lags[i],
            full.values[i],
            full.n_pairs[i],
            Some(uncertainty),
        );
    }
    Ok(())
}

/// Summarizes the distribution of `values` by the configured quantiles.
///
/// NaN values are ignored; with nothing left, the uncertainty is NaN.
fn spread(mut values: Vec<f64>, args: &ArgumentContainer) -> Uncertainty {
    let n_finite = sort_finite(&mut values);
    let sorted = &values[..n_finite];
    let lo = quantile_sorted(sorted, args.lower_error_quantile);
    let hi = quantile_sorted(sorted, args.upper_error_quantile);
    if args.report_upper_lower_error_separately {
        let median = median_sorted(sorted);
        Uncertainty::Separate {
            lower: median - lo,
            upper: hi - median,
        }
    } else {
        Uncertainty::Symmetric((hi - lo) / 2.0)
    }
}
