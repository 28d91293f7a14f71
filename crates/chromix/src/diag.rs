//! Diagnostics.

use std::fmt::{self, Display, Formatter};

use ecow::{EcoVec, eco_vec};

/// Early-return with a [`StrResult`] or [`HintedStrResult`].
///
/// You can also emit hints with the `; hint: "..."` syntax.
///
/// ```ignore
/// bail!("bailing with a {}", "string result");
/// bail!(
///     "bailing with a {}", "hinted result";
///     hint: "hint 1"
/// );
/// ```
#[macro_export]
#[doc(hidden)]
macro_rules! __bail {
    (
        $fmt:literal $(, $arg:expr)*
        $(; hint: $hint:literal $(, $hint_arg:expr)*)*
        $(,)?
    ) => {
        return Err($crate::diag::error!(
            $fmt $(, $arg)*
            $(; hint: $hint $(, $hint_arg)*)*
        ))
    };

    ($error:expr) => {
        return Err($error.into())
    };
}

/// Construct an [`EcoString`] or [`HintedString`].
#[macro_export]
#[doc(hidden)]
macro_rules! __error {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::diag::eco_format!($fmt, $($arg),*).into()
    };

    (
        $fmt:literal $(, $arg:expr)*
        $(; hint: $hint:literal $(, $hint_arg:expr)*)*
        $(,)?
    ) => {
        $crate::diag::HintedString::new(
            $crate::diag::eco_format!($fmt, $($arg),*)
        ) $(.with_hint($crate::diag::eco_format!($hint, $($hint_arg),*)))*
    };
}

#[rustfmt::skip]
#[doc(inline)]
pub use {
    crate::__bail as bail,
    crate::__error as error,
    ecow::{eco_format, EcoString},
};

/// A result type with a string error message.
pub type StrResult<T> = Result<T, EcoString>;

/// A result type with a string error message and hints.
pub type HintedStrResult<T> = Result<T, HintedString>;

/// A string message with hints.
///
/// This is internally represented by a vector of strings.
/// The first element of the vector contains the message.
/// The remaining elements are the hints.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct HintedString(EcoVec<EcoString>);

impl HintedString {
    /// Creates a new hinted string with the given message.
    pub fn new(message: EcoString) -> Self {
        Self(eco_vec![message])
    }

    /// A diagnostic message describing the problem.
    pub fn message(&self) -> &EcoString {
        &self.0[0]
    }

    /// Additional hints to the user, indicating how this error could be avoided
    /// or worked around.
    pub fn hints(&self) -> &[EcoString] {
        self.0.get(1..).unwrap_or(&[])
    }

    /// Adds a single hint to the hinted string.
    pub fn hint(&mut self, hint: impl Into<EcoString>) {
        self.0.push(hint.into());
    }

    /// Adds a single hint to the hinted string.
    pub fn with_hint(mut self, hint: impl Into<EcoString>) -> Self {
        self.hint(hint);
        self
    }
}

impl<S> From<S> for HintedString
where
    S: Into<EcoString>,
{
    fn from(value: S) -> Self {
        Self::new(value.into())
    }
}

/// Enrich a [`StrResult`] or [`HintedStrResult`] with a hint.
pub trait Hint<T> {
    /// Add the hint.
    fn hint(self, hint: impl Into<EcoString>) -> HintedStrResult<T>;
}

impl<T, S> Hint<T> for Result<T, S>
where
    S: Into<EcoString>,
{
    fn hint(self, hint: impl Into<EcoString>) -> HintedStrResult<T> {
        self.map_err(|message| HintedString::new(message.into()).with_hint(hint))
    }
}

impl<T> Hint<T> for HintedStrResult<T> {
    fn hint(self, hint: impl Into<EcoString>) -> HintedStrResult<T> {
        self.map_err(|mut error| {
            error.hint(hint.into());
            error
        })
    }
}

/// An error that occurred while setting up or running a search.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum SolveError {
    /// The target is not six hex digits (with an optional leading `#`).
    InvalidHexFormat(EcoString),
    /// The palette has no entries, so there is nothing to search.
    EmptyPalette,
    /// A color the configuration requires is not part of the palette.
    MissingRequiredColor(EcoString),
    /// The metric name is neither `rgb` nor `lab`.
    UnsupportedMetric(EcoString),
    /// A search parameter is out of range.
    InvalidParameter(EcoString),
    /// A palette name is empty or contains the `!` separator.
    InvalidColorName(EcoString),
    /// An expression references a color the palette does not define.
    UnknownColor(EcoString),
    /// An expression does not follow the `E!p!N` syntax.
    MalformedExpression(EcoString),
}

impl std::error::Error for SolveError {}

impl Display for SolveError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::InvalidHexFormat(hex) => {
                write!(f, "invalid hex color `{hex}` (expected six hex digits)")
            }
            Self::EmptyPalette => f.pad("palette contains no colors"),
            Self::MissingRequiredColor(name) => {
                write!(f, "palette is missing the required color `{name}`")
            }
            Self::UnsupportedMetric(metric) => {
                write!(f, "unsupported metric `{metric}` (expected `rgb` or `lab`)")
            }
            Self::InvalidParameter(message) => f.pad(message),
            Self::InvalidColorName(name) => write!(f, "invalid color name `{name}`"),
            Self::UnknownColor(name) => write!(f, "unknown color `{name}`"),
            Self::MalformedExpression(expr) => {
                write!(f, "malformed mixing expression `{expr}`")
            }
        }
    }
}

impl From<SolveError> for EcoString {
    fn from(error: SolveError) -> Self {
        eco_format!("{error}")
    }
}
