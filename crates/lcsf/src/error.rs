// Every failure that the calculation can report is a validation failure: the
// inputs or the options handed to us don't describe a calculation that we
// can carry out. We detect these at the point of detection and never return
// partial results.
//
// The internal crate returns `&'static str` errors (it is no_std). We wrap
// those strings here rather than defining the Error type in the internal
// crate; that is the more flexible approach and it is easy to migrate away
// from later.

/// The error type returned by every fallible operation in this crate.
///
/// All variants are validation errors (mismatched column lengths, unknown
/// calculator names, absent bands, oversized samples, invalid options, ...).
#[derive(Debug)]
pub struct Error {
    // I'm not so sure we want to directly expose this
    kind: ErrorKind,
}

/// The underlying internal error type
#[non_exhaustive]
#[derive(Clone, Debug)]
enum ErrorKind {
    /// A problematic argument value
    ArgumentValue(ArgumentValueError),
    /// Problematic bin edges
    BinEdge(BinEdgeError),
    /// A calculator name is already taken by a different calculator
    CalculatorConflict(CalculatorConflictError),
    /// An unknown calculator name was specified
    CalculatorName(CalculatorNameError),
    /// An extension field holds a value of the wrong type
    ExtensionType(ExtensionTypeError),
    /// None of the requested bands were present
    BandAbsent(SelectionAbsentError),
    /// None of the requested light curve ids were present
    LightCurveAbsent(SelectionAbsentError),
    /// Two columns that must be parallel have different lengths
    Length(LengthError),
    /// More samples were requested than there are pairwise differences
    SampleSize(SampleSizeError),
}

// define constructor methods for Error
impl Error {
    /// produce an error indicating that an option holds an invalid value
    pub(crate) fn argument_value(field: &'static str, what: impl Into<String>) -> Self {
        Error {
            kind: ErrorKind::ArgumentValue(ArgumentValueError {
                field,
                what: what.into(),
            }),
        }
    }

    /// wraps the error string, produced by `lcsf_nostd_internal`, describing
    /// a problem with the bin edges
    pub(crate) fn bin_edge(who: &'static str, what: &'static str) -> Self {
        Error {
            kind: ErrorKind::BinEdge(BinEdgeError { who, what }),
        }
    }

    /// produce an error indicating that `name` is already registered to a
    /// different calculator
    pub(crate) fn calculator_conflict(name: String) -> Self {
        Error {
            kind: ErrorKind::CalculatorConflict(CalculatorConflictError { name }),
        }
    }

    /// produce an error indicating that an unknown calculator name was
    /// specified
    pub(crate) fn calculator_name(actual: String, choices: Vec<String>) -> Self {
        Error {
            kind: ErrorKind::CalculatorName(CalculatorNameError { actual, choices }),
        }
    }

    /// produce an error indicating that the extension field `key` holds a
    /// value of the wrong type
    pub(crate) fn extension_type(
        key: String,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Error {
            kind: ErrorKind::ExtensionType(ExtensionTypeError {
                key,
                expected,
                actual,
            }),
        }
    }

    /// produce an error indicating that none of the requested bands exist
    pub(crate) fn band_absent(requested: Vec<String>, available: Vec<String>) -> Self {
        Error {
            kind: ErrorKind::BandAbsent(SelectionAbsentError {
                what: "band",
                requested,
                available,
            }),
        }
    }

    /// produce an error indicating that none of the requested light curve
    /// ids exist
    pub(crate) fn lightcurve_absent(requested: Vec<String>, available: Vec<String>) -> Self {
        Error {
            kind: ErrorKind::LightCurveAbsent(SelectionAbsentError {
                what: "light curve id",
                requested,
                available,
            }),
        }
    }

    /// produce an error indicating that column `name` doesn't have the
    /// expected length
    pub(crate) fn length(name: &'static str, expected: usize, actual: usize) -> Self {
        Error {
            kind: ErrorKind::Length(LengthError {
                name,
                expected,
                actual,
            }),
        }
    }

    /// produce an error indicating that a sample larger than the number of
    /// available pairwise differences was requested
    pub(crate) fn sample_size(requested: usize, available: usize) -> Self {
        Error {
            kind: ErrorKind::SampleSize(SampleSizeError {
                requested,
                available,
            }),
        }
    }
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for ErrorKind {}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            ErrorKind::ArgumentValue(ref err) => err.fmt(f),
            ErrorKind::BinEdge(ref err) => err.fmt(f),
            ErrorKind::CalculatorConflict(ref err) => err.fmt(f),
            ErrorKind::CalculatorName(ref err) => err.fmt(f),
            ErrorKind::ExtensionType(ref err) => err.fmt(f),
            ErrorKind::BandAbsent(ref err) => err.fmt(f),
            ErrorKind::LightCurveAbsent(ref err) => err.fmt(f),
            ErrorKind::Length(ref err) => err.fmt(f),
            ErrorKind::SampleSize(ref err) => err.fmt(f),
        }
    }
}

/// An error that occurs when an option holds an invalid value
#[derive(Clone, Debug)]
struct ArgumentValueError {
    field: &'static str,
    what: String,
}

impl std::error::Error for ArgumentValueError {}

impl core::fmt::Display for ArgumentValueError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid value for `{}`: {}", self.field, self.what)
    }
}

/// An error that occurs when a problematic bin edge is specified
#[derive(Clone, Debug)]
struct BinEdgeError {
    who: &'static str,
    what: &'static str,
}

impl std::error::Error for BinEdgeError {}

impl core::fmt::Display for BinEdgeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let BinEdgeError { who, what } = self;
        write!(f, "problem with {who}: {what}")
    }
}

/// An error that occurs when registering a calculator under a name that
/// belongs to a different calculator
#[derive(Clone, Debug)]
struct CalculatorConflictError {
    name: String,
}

impl std::error::Error for CalculatorConflictError {}

impl core::fmt::Display for CalculatorConflictError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "\"{}\" is already registered to a different calculator",
            self.name
        )
    }
}

/// An error occurs when an unknown calculator name is specified
#[derive(Clone, Debug)]
struct CalculatorNameError {
    actual: String,
    choices: Vec<String>,
}

impl std::error::Error for CalculatorNameError {}

impl core::fmt::Display for CalculatorNameError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{} is not a calculator name. Choices include: {:?}",
            self.actual, self.choices
        )
    }
}

/// An error that occurs when an extension field holds the wrong kind of
/// value for the selected calculator
#[derive(Clone, Debug)]
struct ExtensionTypeError {
    key: String,
    expected: &'static str,
    actual: &'static str,
}

impl std::error::Error for ExtensionTypeError {}

impl core::fmt::Display for ExtensionTypeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "extension field \"{}\" holds a {} value, the calculator expects a {} value",
            self.key, self.actual, self.expected
        )
    }
}

/// An error that occurs when none of the requested bands (or light curve
/// ids) are present in the data
#[derive(Clone, Debug)]
struct SelectionAbsentError {
    what: &'static str,
    requested: Vec<String>,
    available: Vec<String>,
}

impl std::error::Error for SelectionAbsentError {}

impl core::fmt::Display for SelectionAbsentError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "no requested {} is present in the data. Requested: {:?}, available: {:?}",
            self.what, self.requested, self.available
        )
    }
}

/// An error that occurs when parallel columns have different lengths
#[derive(Clone, Debug)]
struct LengthError {
    name: &'static str,
    expected: usize,
    actual: usize,
}

impl std::error::Error for LengthError {}

impl core::fmt::Display for LengthError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "the {} column has {} entries. It should have {} entries",
            self.name, self.actual, self.expected
        )
    }
}

/// An error that occurs when a sample larger than the population is
/// requested
#[derive(Clone, Debug)]
struct SampleSizeError {
    requested: usize,
    available: usize,
}

impl std::error::Error for SampleSizeError {}

impl core::fmt::Display for SampleSizeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "can't draw {} difference samples without replacement: only {} \
             pairwise differences are available",
            self.requested, self.available
        )
    }
}
