//! Defines [`ArgumentContainer`], the collection of options that configure a
//! structure function calculation.
//!
//! Every option has a default, so `ArgumentContainer::default()` always
//! describes a valid calculation. Options that only matter to one calculator
//! live in a struct embedded in the container (e.g.
//! [`ArgumentContainer::schmidt_2010`]); those fields are ignored when a
//! different calculator is selected. Calculators defined outside of this
//! crate keep their options in the open [`Extensions`] table instead.

use std::collections::BTreeMap;
use std::str::FromStr;

use lcsf_nostd_internal::check_edges;

use crate::Error;

/// How the time-lag bins are laid out
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BinMethod {
    /// Each bin receives (approximately) `bin_count_target` pairs
    #[default]
    Size,
    /// `bin_count_target` bins of equal width
    Length,
    /// `bin_count_target` bins of equal width in `log(lag)`
    LogLength,
}

impl FromStr for BinMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "size" => Ok(BinMethod::Size),
            "length" => Ok(BinMethod::Length),
            "loglength" => Ok(BinMethod::LogLength),
            other => Err(Error::argument_value(
                "bin_method",
                format!("\"{other}\" is not one of \"size\", \"length\", \"loglength\""),
            )),
        }
    }
}

/// How `macleod_2012` estimates the scale of the absolute flux differences.
///
/// The default is the plain root mean square; the robust, normal-quantile
/// based scale must be requested explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScaleEstimator {
    /// `sqrt(mean(|Δf|²))`, the maximum-likelihood scale of a half-normal
    /// distribution
    #[default]
    RootMeanSquare,
    /// `median(|Δf|) / Φ⁻¹(0.75)`, a robust scale that is consistent for
    /// normally distributed differences
    MedianAbsolute,
}

/// Options that only apply to the `macleod_2012` calculator
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Macleod2012Options {
    pub scale_estimator: ScaleEstimator,
}

/// Options that only apply to the `schmidt_2010` calculator
#[derive(Clone, Debug, PartialEq)]
pub struct Schmidt2010Options {
    /// Summed squared errors below this value are replaced by it before
    /// computing the inverse-error weights (so that error-free pairs get a
    /// large, finite weight)
    pub error_floor: f64,
}

impl Default for Schmidt2010Options {
    fn default() -> Self {
        Self { error_floor: 1e-12 }
    }
}

/// A value stored in the [`Extensions`] table
#[derive(Clone, Debug, PartialEq)]
pub enum ExtensionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ExtensionValue {
    /// a short name for the type of the held value (used in error messages)
    pub fn type_name(&self) -> &'static str {
        match self {
            ExtensionValue::Bool(_) => "bool",
            ExtensionValue::Int(_) => "int",
            ExtensionValue::Float(_) => "float",
            ExtensionValue::Text(_) => "text",
        }
    }
}

/// Open key-value table holding options for calculators defined outside of
/// this crate.
///
/// A calculator declares the fields it understands, together with their
/// defaults, through
/// [`StructureFunctionCalculator::extension_defaults`](crate::StructureFunctionCalculator::extension_defaults).
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Extensions(BTreeMap<String, ExtensionValue>);

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// builder-style insertion
    pub fn with(mut self, key: &str, value: ExtensionValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: ExtensionValue) -> Option<ExtensionValue> {
        self.0.insert(key.to_owned(), value)
    }

    pub fn get(&self, key: &str) -> Option<&ExtensionValue> {
        self.0.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.0.get(key) {
            Some(ExtensionValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.0.get(key) {
            Some(ExtensionValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.0.get(key) {
            Some(ExtensionValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(ExtensionValue::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtensionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fills in every field of `defaults` that is missing from `self`.
    ///
    /// Fails if a field is present with a different type than its default.
    pub(crate) fn merge_defaults(&mut self, defaults: &Extensions) -> Result<(), Error> {
        for (key, default) in defaults.iter() {
            match self.0.get(key) {
                None => {
                    self.0.insert(key.to_owned(), default.clone());
                }
                Some(existing) if existing.type_name() != default.type_name() => {
                    return Err(Error::extension_type(
                        key.to_owned(),
                        default.type_name(),
                        existing.type_name(),
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// The options that configure a structure function calculation
#[derive(Clone, Debug, PartialEq)]
pub struct ArgumentContainer {
    /// name of the registered calculator to use
    pub sf_method: String,
    /// only compute results for these bands (all bands when `None`)
    pub band_to_calc: Option<Vec<String>>,
    /// only compute results for these light curves (all when `None`)
    pub lc_id: Option<Vec<i64>>,
    /// pool the differences of all light curves in a band into one result
    pub combine: bool,
    /// explicit bin edges. When given, `bin_method` and `bin_count_target`
    /// are ignored
    pub bins: Option<Vec<f64>>,
    pub bin_method: BinMethod,
    /// pairs per bin for [`BinMethod::Size`], number of bins otherwise
    pub bin_count_target: usize,
    /// use each measurement's position within its light curve as its time
    pub ignore_timestamps: bool,
    /// seed for every random draw made during the calculation
    pub random_seed: Option<u64>,
    /// draw the same number of pairs from every light curve of a group
    pub equally_weight_lightcurves: bool,
    /// the number of pairs drawn from each light curve when resampling
    pub number_lightcurve_samples: Option<usize>,
    /// estimate an uncertainty by repeating the calculation on resampled data
    pub estimate_err: bool,
    pub calculation_repetitions: usize,
    pub lower_error_quantile: f64,
    pub upper_error_quantile: f64,
    pub report_upper_lower_error_separately: bool,
    /// fraction of each light curve's pairs drawn per error-estimation
    /// repetition when no other option decides the sample size
    pub bootstrap_sample_fraction: f64,

    pub macleod_2012: Macleod2012Options,
    pub schmidt_2010: Schmidt2010Options,
    pub extensions: Extensions,
}

impl Default for ArgumentContainer {
    fn default() -> Self {
        Self {
            sf_method: "basic".to_owned(),
            band_to_calc: None,
            lc_id: None,
            combine: false,
            bins: None,
            bin_method: BinMethod::Size,
            bin_count_target: 100,
            ignore_timestamps: false,
            random_seed: None,
            equally_weight_lightcurves: false,
            number_lightcurve_samples: None,
            estimate_err: false,
            calculation_repetitions: 1,
            lower_error_quantile: 0.16,
            upper_error_quantile: 0.84,
            report_upper_lower_error_separately: false,
            bootstrap_sample_fraction: 0.5,
            macleod_2012: Macleod2012Options::default(),
            schmidt_2010: Schmidt2010Options::default(),
            extensions: Extensions::default(),
        }
    }
}

impl ArgumentContainer {
    /// a default container that selects `sf_method`
    pub fn with_method(sf_method: &str) -> Self {
        Self {
            sf_method: sf_method.to_owned(),
            ..Self::default()
        }
    }

    /// Checks that every option holds a usable value
    pub fn validate(&self) -> Result<(), Error> {
        if self.bin_count_target == 0 {
            return Err(Error::argument_value("bin_count_target", "must be at least 1"));
        }
        if let Some(edges) = &self.bins {
            check_edges(edges).map_err(|what| Error::bin_edge("bins", what))?;
        }
        if self.calculation_repetitions == 0 {
            return Err(Error::argument_value(
                "calculation_repetitions",
                "must be at least 1",
            ));
        }
        if self.number_lightcurve_samples == Some(0) {
            return Err(Error::argument_value(
                "number_lightcurve_samples",
                "must be at least 1",
            ));
        }
        let in_unit_interval = |q: f64| (0.0..=1.0).contains(&q);
        if !in_unit_interval(self.lower_error_quantile) {
            return Err(Error::argument_value(
                "lower_error_quantile",
                format!("{} doesn't lie in [0, 1]", self.lower_error_quantile),
            ));
        }
        if !in_unit_interval(self.upper_error_quantile) {
            return Err(Error::argument_value(
                "upper_error_quantile",
                format!("{} doesn't lie in [0, 1]", self.upper_error_quantile),
            ));
        }
        if self.lower_error_quantile >= self.upper_error_quantile {
            return Err(Error::argument_value(
                "lower_error_quantile",
                "must be smaller than upper_error_quantile",
            ));
        }
        if !(self.bootstrap_sample_fraction > 0.0 && self.bootstrap_sample_fraction <= 1.0) {
            return Err(Error::argument_value(
                "bootstrap_sample_fraction",
                format!("{} doesn't lie in (0, 1]", self.bootstrap_sample_fraction),
            ));
        }
        if !(self.schmidt_2010.error_floor > 0.0 && self.schmidt_2010.error_floor.is_finite()) {
            return Err(Error::argument_value(
                "schmidt_2010.error_floor",
                "must be positive and finite",
            ));
        }
        Ok(())
    }
}
