//! The tabular result of a structure function calculation.

use std::collections::HashMap;
use std::fmt;

/// column holding the light curve identifier
pub const LC_ID_COLUMN: &str = "lc_id";
/// column holding the band label
pub const BAND_COLUMN: &str = "band";
/// column holding the resampling repetition a row came from
pub const SAMPLE_NUM_COLUMN: &str = "sample_num";
/// column holding the representative time lag
pub const DT_COLUMN: &str = "dt";
/// column holding the structure function estimate
pub const SF2_COLUMN: &str = "sf2";
/// column holding the number of pairs in the bin
pub const N_PAIRS_COLUMN: &str = "n_pairs";
/// column holding the symmetric uncertainty
pub const ONE_SIGMA_COLUMN: &str = "1_sigma";
/// column holding the distance from the median down to the lower quantile
pub const LOWER_ERROR_COLUMN: &str = "lower_error";
/// column holding the distance from the median up to the upper quantile
pub const UPPER_ERROR_COLUMN: &str = "upper_error";

/// Identifies the light curve (or pool of light curves) a row describes
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupId {
    Id(i64),
    /// every light curve of the band, pooled together
    Combined,
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GroupId::Id(id) => write!(f, "{id}"),
            GroupId::Combined => write!(f, "combined"),
        }
    }
}

/// The uncertainty attached to a row when errors are estimated
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Uncertainty {
    /// half the distance between the lower and upper quantiles
    Symmetric(f64),
    /// distances from the median to the lower and upper quantiles
    Separate { lower: f64, upper: f64 },
}

/// A single time-lag bin of one group's structure function
#[derive(Clone, Debug, PartialEq)]
pub struct StructureFunctionRow {
    pub band: String,
    pub lc_id: GroupId,
    /// the resampling repetition that produced the row (`None` when errors
    /// were estimated, since those rows summarize every repetition)
    pub sample_num: Option<usize>,
    pub dt: f64,
    pub sf2: f64,
    pub n_pairs: usize,
    pub uncertainty: Option<Uncertainty>,
}

/// The rows produced by [`crate::calculate_structure_function`].
///
/// Rows are ordered by band, then by group, then by repetition, then by lag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StructureFunctionTable {
    rows: Vec<StructureFunctionRow>,
}

impl StructureFunctionTable {
    pub(crate) fn push(&mut self, row: StructureFunctionRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[StructureFunctionRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<StructureFunctionRow> {
        self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StructureFunctionRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// the rows computed for `band` and `lc_id`
    pub fn group(&self, band: &str, lc_id: GroupId) -> Vec<&StructureFunctionRow> {
        self.rows
            .iter()
            .filter(|row| row.band == band && row.lc_id == lc_id)
            .collect()
    }

    /// The names of the columns present in the table.
    ///
    /// The uncertainty columns only appear when a row carries an
    /// uncertainty.
    pub fn column_names(&self) -> Vec<&'static str> {
        let mut out = vec![
            LC_ID_COLUMN,
            BAND_COLUMN,
            SAMPLE_NUM_COLUMN,
            DT_COLUMN,
            SF2_COLUMN,
            N_PAIRS_COLUMN,
        ];
        let (symmetric, separate) = self.uncertainty_kinds();
        if symmetric {
            out.push(ONE_SIGMA_COLUMN);
        }
        if separate {
            out.extend([LOWER_ERROR_COLUMN, UPPER_ERROR_COLUMN]);
        }
        out
    }

    /// Returns every numeric column, keyed by column name.
    ///
    /// The band column is left out. In the `lc_id` column, pooled rows are
    /// represented by NaN; so are rows without a `sample_num` in that column.
    pub fn numeric_columns(&self) -> HashMap<&'static str, Vec<f64>> {
        let column = |f: &dyn Fn(&StructureFunctionRow) -> f64| -> Vec<f64> {
            self.rows.iter().map(f).collect()
        };

        let mut out = HashMap::from([
            (
                LC_ID_COLUMN,
                column(&|row| match row.lc_id {
                    GroupId::Id(id) => id as f64,
                    GroupId::Combined => f64::NAN,
                }),
            ),
            (
                SAMPLE_NUM_COLUMN,
                column(&|row| row.sample_num.map_or(f64::NAN, |n| n as f64)),
            ),
            (DT_COLUMN, column(&|row| row.dt)),
            (SF2_COLUMN, column(&|row| row.sf2)),
            (N_PAIRS_COLUMN, column(&|row| row.n_pairs as f64)),
        ]);

        let (symmetric, separate) = self.uncertainty_kinds();
        if symmetric {
            out.insert(
                ONE_SIGMA_COLUMN,
                column(&|row| match row.uncertainty {
                    Some(Uncertainty::Symmetric(sigma)) => sigma,
                    _ => f64::NAN,
                }),
            );
        }
        if separate {
            out.insert(
                LOWER_ERROR_COLUMN,
                column(&|row| match row.uncertainty {
                    Some(Uncertainty::Separate { lower, .. }) => lower,
                    _ => f64::NAN,
                }),
            );
            out.insert(
                UPPER_ERROR_COLUMN,
                column(&|row| match row.uncertainty {
                    Some(Uncertainty::Separate { upper, .. }) => upper,
                    _ => f64::NAN,
                }),
            );
        }
        out
    }

    fn uncertainty_kinds(&self) -> (bool, bool) {
        let symmetric = self
            .rows
            .iter()
            .any(|row| matches!(row.uncertainty, Some(Uncertainty::Symmetric(_))));
        let separate = self
            .rows
            .iter()
            .any(|row| matches!(row.uncertainty, Some(Uncertainty::Separate { .. })));
        (symmetric, separate)
    }
}

impl<'a> IntoIterator for &'a StructureFunctionTable {
    type Item = &'a StructureFunctionRow;
    type IntoIter = std::slice::Iter<'a, StructureFunctionRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
