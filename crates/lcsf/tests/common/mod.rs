// the reason this is named mod.rs has to do with how integration tests are
// compiled (every file directly inside tests/ is its own crate)
//
// https://doc.rust-lang.org/book/ch11-03-test-organization.html#submodules-in-integration-tests

#![allow(dead_code)]

use lcsf::LightCurveColumns;
use rand::distr::{Distribution, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;

// based on numpy!
// https://numpy.org/doc/stable/reference/generated/numpy.isclose.html
pub fn isclose(actual: f64, ref_val: f64, rtol: f64, atol: f64) -> bool {
    let actual_nan = actual.is_nan();
    let ref_nan = ref_val.is_nan();
    if actual_nan || ref_nan {
        actual_nan && ref_nan
    } else {
        (actual - ref_val).abs() <= (atol + rtol * ref_val.abs())
    }
}

/// Owned columns of a synthetic survey
pub struct Survey {
    pub times: Vec<f64>,
    pub fluxes: Vec<f64>,
    pub errors: Vec<f64>,
    pub bands: Vec<&'static str>,
    pub ids: Vec<i64>,
}

impl Survey {
    pub fn columns(&self) -> LightCurveColumns<'_> {
        LightCurveColumns::new(&self.times, &self.fluxes)
            .with_errors(&self.errors)
            .with_bands(&self.bands)
            .with_lightcurve_ids(&self.ids)
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }
}

/// Builds `n_per_curve` measurements of a random walk for every combination
/// of `bands` and `ids`. Times are drawn uniformly from `[0, 1000)`.
///
/// Every error equals `error`.
pub fn random_walk_survey(
    bands: &[&'static str],
    ids: &[i64],
    n_per_curve: usize,
    error: f64,
    seed: u64,
) -> Survey {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let time_dist = Uniform::try_from(0.0..1000.0).unwrap();
    let step_dist = Uniform::try_from(-1.0..1.0).unwrap();

    let mut survey = Survey {
        times: Vec::new(),
        fluxes: Vec::new(),
        errors: Vec::new(),
        bands: Vec::new(),
        ids: Vec::new(),
    };
    for &band in bands {
        for &id in ids {
            let mut flux = 10.0;
            for _ in 0..n_per_curve {
                flux += step_dist.sample(&mut rng);
                survey.times.push(time_dist.sample(&mut rng));
                survey.fluxes.push(flux);
                survey.errors.push(error);
                survey.bands.push(band);
                survey.ids.push(id);
            }
        }
    }
    survey
}
