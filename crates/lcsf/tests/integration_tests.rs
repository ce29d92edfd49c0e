mod common;

use common::{isclose, random_walk_survey};
use lcsf::{
    ArgumentContainer, BinMethod, BinnedPairs, Error, ExtensionValue, Extensions, GroupId,
    LightCurveColumns, LightCurveDifferences, StructureFunctionCalculator,
    StructureFunctionEstimate, StructureFunctionTable, Uncertainty, calculate_structure_function,
    register_calculator, registered_calculators,
};

const BUILTIN_METHODS: [&str; 5] = [
    "basic",
    "bauer_2009a",
    "bauer_2009b",
    "macleod_2012",
    "schmidt_2010",
];

fn run(columns: &LightCurveColumns, args: ArgumentContainer) -> StructureFunctionTable {
    calculate_structure_function(columns, None, Some(args)).unwrap()
}

#[test]
fn single_lightcurve() {
    let times = [1.0, 2.0, 3.0, 4.0];
    let fluxes = [1.0, 2.0, 1.0, 2.0];
    let columns = LightCurveColumns::new(&times, &fluxes);
    let args = ArgumentContainer {
        bin_count_target: 6,
        ..ArgumentContainer::default()
    };
    let table = run(&columns, args);

    assert_eq!(table.len(), 1);
    let row = &table.rows()[0];
    assert_eq!(row.band, "default");
    assert_eq!(row.lc_id, GroupId::Id(0));
    assert_eq!(row.sample_num, Some(0));
    assert_eq!(row.n_pairs, 6);
    assert!(isclose(row.dt, 10.0 / 6.0, 1e-12, 0.0));
    assert!(isclose(row.sf2, 4.0 / 6.0, 1e-12, 0.0));
    assert_eq!(row.uncertainty, None);
}

#[test]
fn method_argument() {
    let times = [1.0, 2.0, 3.0, 4.0];
    let fluxes = [1.0, 2.0, 1.0, 2.0];
    let columns = LightCurveColumns::new(&times, &fluxes);

    let table = calculate_structure_function(&columns, Some("bauer_2009b"), None).unwrap();
    assert_eq!(table.len(), 1);

    // the container's method takes precedence
    let result = calculate_structure_function(
        &columns,
        Some("basic"),
        Some(ArgumentContainer::with_method("not_a_method")),
    );
    assert!(result.is_err());
}

#[test]
fn unknown_method() {
    let times = [1.0, 2.0, 3.0];
    let columns = LightCurveColumns::new(&times, &times);
    let Err(err) = calculate_structure_function(&columns, Some("bauer_2011"), None) else {
        panic!("an unknown method should be rejected");
    };
    let msg = err.to_string();
    for name in BUILTIN_METHODS {
        assert!(msg.contains(name), "\"{msg}\" doesn't list {name}");
    }
    for name in BUILTIN_METHODS {
        assert!(registered_calculators().iter().any(|n| n == name));
    }
}

#[test]
fn noiseless_methods_agree() {
    let survey = random_walk_survey(&["g"], &[7], 60, 0.0, 1234);
    let reference = run(&survey.columns(), ArgumentContainer::default());
    assert!(!reference.is_empty());

    for method in BUILTIN_METHODS {
        let table = run(&survey.columns(), ArgumentContainer::with_method(method));
        assert_eq!(table.len(), reference.len(), "{method}");
        for (row, ref_row) in table.iter().zip(&reference) {
            assert_eq!(row.n_pairs, ref_row.n_pairs);
            assert!(isclose(row.dt, ref_row.dt, 1e-12, 0.0));
            assert!(
                isclose(row.sf2, ref_row.sf2, 1e-9, 0.0),
                "{method}: {} vs {}",
                row.sf2,
                ref_row.sf2
            );
        }
    }
}

#[test]
fn equal_count_bins() {
    let survey = random_walk_survey(&["g"], &[0], 25, 0.1, 99);
    // 300 pairs: 6 bins of 45 plus one of 30
    let args = ArgumentContainer {
        bin_count_target: 45,
        ..ArgumentContainer::default()
    };
    let table = run(&survey.columns(), args);
    let n_pairs: Vec<usize> = table.iter().map(|row| row.n_pairs).collect();
    assert_eq!(n_pairs, vec![45, 45, 45, 45, 45, 45, 30]);
    // lags increase from bin to bin
    assert!(table.rows().windows(2).all(|w| w[0].dt < w[1].dt));
}

#[test]
fn width_based_bins() {
    let survey = random_walk_survey(&["g"], &[0], 30, 0.1, 5);
    for bin_method in [BinMethod::Length, BinMethod::LogLength] {
        let args = ArgumentContainer {
            bin_method,
            bin_count_target: 8,
            ..ArgumentContainer::default()
        };
        let table = run(&survey.columns(), args);
        assert!(table.len() <= 8);
        // sparsely populated bins may have been dropped
        let total: usize = table.iter().map(|row| row.n_pairs).sum();
        assert!(total <= 30 * 29 / 2 && total > 30 * 29 / 4);
    }
}

#[test]
fn combined_lightcurves() {
    let ids = [1, 2, 3];
    let survey = random_walk_survey(&["r"], &ids, 30, 0.0, 42);
    let bins = vec![0.0, 250.0, 500.0, 1000.0];

    let separate = run(
        &survey.columns(),
        ArgumentContainer {
            bins: Some(bins.clone()),
            ..ArgumentContainer::default()
        },
    );
    let combined = run(
        &survey.columns(),
        ArgumentContainer {
            bins: Some(bins),
            combine: true,
            ..ArgumentContainer::default()
        },
    );

    assert_eq!(combined.len(), 3);
    assert!(combined.iter().all(|row| row.lc_id == GroupId::Combined));
    let total: usize = combined.iter().map(|row| row.n_pairs).sum();
    assert_eq!(total, 3 * (30 * 29 / 2));

    // with noiseless data the pooled value is the pair-weighted average of
    // the individual values
    for (bin, combined_row) in combined.iter().enumerate() {
        let (mut weighted, mut count) = (0.0, 0);
        for &id in &ids {
            let row = separate.group("r", GroupId::Id(id))[bin];
            weighted += row.sf2 * row.n_pairs as f64;
            count += row.n_pairs;
        }
        assert_eq!(count, combined_row.n_pairs);
        assert!(isclose(combined_row.sf2, weighted / count as f64, 1e-10, 0.0));
    }
}

#[test]
fn band_selection() {
    let survey = random_walk_survey(&["g", "r"], &[0], 20, 0.05, 3);

    let all = run(&survey.columns(), ArgumentContainer::default());
    assert!(all.iter().any(|row| row.band == "g"));
    assert!(all.iter().any(|row| row.band == "r"));

    let args = ArgumentContainer {
        band_to_calc: Some(vec!["r".to_owned(), "i".to_owned()]),
        ..ArgumentContainer::default()
    };
    let table = run(&survey.columns(), args);
    assert!(!table.is_empty());
    assert!(table.iter().all(|row| row.band == "r"));
    let expected: Vec<_> = all.group("r", GroupId::Id(0)).into_iter().cloned().collect();
    assert_eq!(table.rows(), &expected[..]);

    let args = ArgumentContainer {
        band_to_calc: Some(vec!["i".to_owned()]),
        ..ArgumentContainer::default()
    };
    assert!(calculate_structure_function(&survey.columns(), None, Some(args)).is_err());
}

#[test]
fn lightcurve_selection() {
    let survey = random_walk_survey(&["g"], &[1, 2, 3], 15, 0.05, 8);

    let args = ArgumentContainer {
        lc_id: Some(vec![2, 99]),
        ..ArgumentContainer::default()
    };
    let table = run(&survey.columns(), args);
    assert!(!table.is_empty());
    assert!(table.iter().all(|row| row.lc_id == GroupId::Id(2)));

    let args = ArgumentContainer {
        lc_id: Some(vec![99]),
        ..ArgumentContainer::default()
    };
    assert!(calculate_structure_function(&survey.columns(), None, Some(args)).is_err());
}

#[test]
fn mismatched_columns() {
    let times = [1.0, 2.0, 3.0];
    let fluxes = [1.0, 2.0];
    let columns = LightCurveColumns::new(&times, &fluxes);
    assert!(calculate_structure_function(&columns, None, None).is_err());

    let errors = [0.1, 0.1];
    let columns = LightCurveColumns::new(&times, &times).with_errors(&errors);
    assert!(calculate_structure_function(&columns, None, None).is_err());

    let bands = ["g"];
    let columns = LightCurveColumns::new(&times, &times).with_bands(&bands);
    assert!(calculate_structure_function(&columns, None, None).is_err());
}

#[test]
fn too_few_pairs() {
    let times = [1.0, 2.0, 5.0];
    let fluxes = [1.0, 2.0, 3.0];
    let ids = [0, 0, 1];
    let columns = LightCurveColumns::new(&times, &fluxes).with_lightcurve_ids(&ids);
    // light curve 0 has a single pair, light curve 1 has none
    let table = calculate_structure_function(&columns, None, None).unwrap();
    assert!(table.is_empty());
}

#[test]
fn nan_measurements_are_ignored() {
    let times = [1.0, 2.0, 3.0, 4.0];
    let fluxes = [1.0, 2.0, 1.0, 2.0];
    let args = ArgumentContainer {
        bin_count_target: 6,
        ..ArgumentContainer::default()
    };
    let reference = run(&LightCurveColumns::new(&times, &fluxes), args.clone());

    let times = [1.0, 2.0, 2.5, 3.0, 4.0];
    let fluxes = [1.0, 2.0, f64::NAN, 1.0, 2.0];
    let table = run(&LightCurveColumns::new(&times, &fluxes), args);
    assert_eq!(table, reference);
}

#[test]
fn ignore_timestamps() {
    let times = [0.0, 100.0, 1000.0, 5000.0, 10000.0];
    let fluxes = [0.0, 1.0, 2.0, 3.0, 4.0];
    let args = ArgumentContainer {
        bins: Some(vec![0.5, 4.5]),
        ignore_timestamps: true,
        ..ArgumentContainer::default()
    };
    let table = run(&LightCurveColumns::new(&times, &fluxes), args);
    assert_eq!(table.len(), 1);
    // lags 1, 2, 3, 4 occur 4, 3, 2, 1 times
    assert!(isclose(table.rows()[0].dt, 2.0, 1e-12, 0.0));
    assert!(isclose(table.rows()[0].sf2, 5.0, 1e-12, 0.0));
}

#[test]
fn resampled_repetitions() {
    let mut survey = random_walk_survey(&["g"], &[1], 10, 0.01, 11);
    let other = random_walk_survey(&["g"], &[2], 20, 0.01, 12);
    survey.times.extend(other.times);
    survey.fluxes.extend(other.fluxes);
    survey.errors.extend(other.errors);
    survey.bands.extend(other.bands);
    survey.ids.extend(other.ids);

    let args = ArgumentContainer {
        combine: true,
        equally_weight_lightcurves: true,
        calculation_repetitions: 3,
        random_seed: Some(2024),
        ..ArgumentContainer::default()
    };
    let table = run(&survey.columns(), args.clone());
    for rep in 0..3 {
        let total: usize = table
            .iter()
            .filter(|row| row.sample_num == Some(rep))
            .map(|row| row.n_pairs)
            .sum();
        // 45 pairs drawn from each light curve
        assert_eq!(total, 90);
    }

    // seeded calculations are reproducible
    assert_eq!(run(&survey.columns(), args), table);

    let args = ArgumentContainer {
        number_lightcurve_samples: Some(46),
        ..ArgumentContainer::default()
    };
    assert!(calculate_structure_function(&survey.columns(), None, Some(args)).is_err());
}

#[test]
fn single_repetition_has_no_spread() {
    let survey = random_walk_survey(&["g"], &[0], 40, 0.1, 77);
    let args = ArgumentContainer {
        estimate_err: true,
        bootstrap_sample_fraction: 1.0,
        random_seed: Some(1),
        ..ArgumentContainer::default()
    };
    let table = run(&survey.columns(), args);
    assert!(!table.is_empty());
    for row in &table {
        assert_eq!(row.sample_num, None);
        assert_eq!(row.uncertainty, Some(Uncertainty::Symmetric(0.0)));
    }
}

#[test]
fn error_estimation() {
    let survey = random_walk_survey(&["g"], &[0], 50, 0.1, 31);
    let plain = run(&survey.columns(), ArgumentContainer::default());

    for separately in [false, true] {
        let args = ArgumentContainer {
            estimate_err: true,
            calculation_repetitions: 25,
            report_upper_lower_error_separately: separately,
            random_seed: Some(5),
            ..ArgumentContainer::default()
        };
        let table = run(&survey.columns(), args.clone());
        assert_eq!(run(&survey.columns(), args), table);

        // the reported values come from the full data
        assert_eq!(table.len(), plain.len());
        let mut n_spread = 0;
        for (row, plain_row) in table.iter().zip(&plain) {
            assert_eq!(row.dt, plain_row.dt);
            assert_eq!(row.sf2, plain_row.sf2);
            match row.uncertainty {
                Some(Uncertainty::Symmetric(sigma)) => {
                    assert!(!separately);
                    assert!(sigma.is_nan() || sigma >= 0.0);
                    if sigma.is_finite() && sigma > 0.0 {
                        n_spread += 1;
                    }
                }
                Some(Uncertainty::Separate { lower, upper }) => {
                    assert!(separately);
                    assert!(lower.is_nan() || lower >= 0.0);
                    assert!(upper.is_nan() || upper >= 0.0);
                    if lower.is_finite() && lower > 0.0 && upper.is_finite() && upper > 0.0 {
                        n_spread += 1;
                    }
                }
                None => panic!("missing uncertainty"),
            }
        }
        assert!(n_spread > 0, "every uncertainty vanished: {table:?}");
    }
}

/// largest finite symmetric uncertainty of `table`
fn largest_sigma(table: &StructureFunctionTable) -> f64 {
    table
        .iter()
        .filter_map(|row| match row.uncertainty {
            Some(Uncertainty::Symmetric(sigma)) if sigma.is_finite() => Some(sigma),
            _ => None,
        })
        .fold(0.0, f64::max)
}

#[test]
fn equally_weighted_error_estimation() {
    let survey = random_walk_survey(&["g"], &[0], 50, 0.1, 31);
    let args = ArgumentContainer {
        estimate_err: true,
        equally_weight_lightcurves: true,
        calculation_repetitions: 25,
        random_seed: Some(5),
        ..ArgumentContainer::default()
    };
    let table = run(&survey.columns(), args.clone());
    assert!(!table.is_empty());
    // a lone light curve holds the smallest pair count of its group, so the
    // repetitions only differ if each draws a strict subsample
    assert!(largest_sigma(&table) > 1e-6);

    let survey = random_walk_survey(&["g"], &[0, 1], 50, 0.1, 32);
    let combined = run(
        &survey.columns(),
        ArgumentContainer {
            combine: true,
            ..args
        },
    );
    assert!(!combined.is_empty());
    assert!(largest_sigma(&combined) > 1e-6);
}

/// reports a constant level, read from the "level" extension field, in
/// every bin
struct ConstantLevel;

impl StructureFunctionCalculator for ConstantLevel {
    fn name(&self) -> &'static str {
        "constant_level"
    }

    fn extension_defaults(&self) -> Extensions {
        Extensions::new().with("level", ExtensionValue::Float(1.0))
    }

    fn calculate(
        &self,
        lightcurves: &[LightCurveDifferences],
        args: &ArgumentContainer,
    ) -> Result<StructureFunctionEstimate, Error> {
        let Some(binned) = BinnedPairs::new(lightcurves, args)? else {
            return Ok(StructureFunctionEstimate::default());
        };
        let level = args.extensions.get_float("level").unwrap();
        binned.estimate(&vec![level; binned.spec().n_bins()])
    }
}

#[test]
fn custom_calculator() {
    register_calculator(ConstantLevel).unwrap();
    assert!(registered_calculators().iter().any(|n| n == "constant_level"));

    let survey = random_walk_survey(&["g"], &[0], 30, 0.1, 13);
    let table = calculate_structure_function(&survey.columns(), Some("constant_level"), None)
        .unwrap();
    assert!(!table.is_empty());
    assert!(table.iter().all(|row| row.sf2 == 1.0));

    let mut args = ArgumentContainer::with_method("constant_level");
    args.extensions.insert("level", ExtensionValue::Float(2.5));
    let table = run(&survey.columns(), args);
    assert!(table.iter().all(|row| row.sf2 == 2.5));

    let mut args = ArgumentContainer::with_method("constant_level");
    args.extensions
        .insert("level", ExtensionValue::Text("high".to_owned()));
    assert!(calculate_structure_function(&survey.columns(), None, Some(args)).is_err());
}

#[test]
fn numeric_columns() {
    let survey = random_walk_survey(&["g"], &[4], 20, 0.1, 21);
    let table = run(&survey.columns(), ArgumentContainer::default());
    let columns = table.numeric_columns();
    assert_eq!(columns["dt"].len(), table.len());
    assert!(columns["lc_id"].iter().all(|&id| id == 4.0));
    assert!(columns["sample_num"].iter().all(|&n| n == 0.0));
    assert!(!columns.contains_key("1_sigma"));
}
