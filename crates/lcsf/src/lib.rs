/*!
Computes empirical structure functions of astronomical light curves.

<div class="warning">

This crate is still in early development.

</div>

# High-Level: Structure Functions

A light curve is a time series of flux measurements (each with a
measurement error) of a single object in a single band. The (second order)
structure function `SF²(Δt)` describes how much the flux varies, on
average, between 2 measurements separated by a time lag `Δt`.

The calculation considers every pair of measurements of a light curve,
records the time lag and flux difference of each pair, partitions the pairs
into time-lag bins, and reduces each bin to a noise-corrected estimate of
`SF²`. The published estimators differ in that last step; each one is a
[`StructureFunctionCalculator`] (see [`Basic`], [`Bauer2009a`],
[`Bauer2009b`], [`Macleod2012`] and [`Schmidt2010`]).

# User Guide

The entry point is [`calculate_structure_function`]:

```
use lcsf::{ArgumentContainer, LightCurveColumns, calculate_structure_function};

let times = [1.0, 2.0, 3.0, 4.0];
let fluxes = [1.0, 2.0, 1.0, 2.0];
let columns = LightCurveColumns::new(&times, &fluxes);

let args = ArgumentContainer {
    bin_count_target: 6,
    ..ArgumentContainer::default()
};
let table = calculate_structure_function(&columns, None, Some(args)).unwrap();
assert_eq!(table.len(), 1);
```

Every option is described by [`ArgumentContainer`]. Calculators other than
the built-in ones can be made available through [`register_calculator`].

# Developer Guide

The bin-edge and reduction machinery lives in [`lcsf_nostd_internal`].

*/

#![deny(rustdoc::broken_intra_doc_links)]

// modules of this package
mod arguments;
mod binning;
mod calculators;
mod driver;
mod error;
mod lightcurve;
mod registry;
mod table;

// symbols visible outside of the package
pub use arguments::{
    ArgumentContainer, BinMethod, ExtensionValue, Extensions, Macleod2012Options, ScaleEstimator,
    Schmidt2010Options,
};
pub use binning::{BinMean, BinSpecification, BinnedPairs, MIN_PAIRS_PER_BIN};
pub use calculators::{
    Basic, Bauer2009a, Bauer2009b, Macleod2012, Schmidt2010, StructureFunctionCalculator,
    StructureFunctionEstimate,
};
pub use driver::{
    DEFAULT_BAND, DEFAULT_LIGHTCURVE_ID, DEFAULT_METHOD, LightCurveColumns,
    calculate_structure_function,
};
pub use error::Error;
pub use lcsf_nostd_internal::Datum;
pub use lightcurve::{LightCurveDifferences, PairDifference};
pub use registry::{
    calculator_from_name, register_calculator, registered_calculators, update_registry,
};
pub use table::{
    BAND_COLUMN, DT_COLUMN, GroupId, LC_ID_COLUMN, LOWER_ERROR_COLUMN, N_PAIRS_COLUMN,
    ONE_SIGMA_COLUMN, SAMPLE_NUM_COLUMN, SF2_COLUMN, StructureFunctionRow,
    StructureFunctionTable, UPPER_ERROR_COLUMN, Uncertainty,
};
