use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

use ecow::{EcoString, EcoVec};

use crate::color::Cmyk;
use crate::diag::SolveError;
use crate::palette::Palette;

/// A nested xcolor mixing expression like `red!50!white!80!Blue`.
///
/// Instead of a string, the expression is stored as its base color and the
/// flat list of mixes applied on top of it. The textual form is produced by
/// its [`Display`] implementation and can be parsed back with [`FromStr`].
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Expression {
    base: EcoString,
    steps: EcoVec<MixStep>,
}

/// One `!percent!name` segment of an [`Expression`].
///
/// Keeps `percent`% of the color so far and fills the rest with `name`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct MixStep {
    /// The share of the previous color, strictly between 0 and 100.
    pub percent: u8,
    /// The palette color mixed in.
    pub name: EcoString,
}

impl Expression {
    /// An expression consisting of a bare palette color.
    pub fn base(name: impl Into<EcoString>) -> Self {
        Self { base: name.into(), steps: EcoVec::new() }
    }

    /// Wraps this expression in one more mix.
    pub fn mixed(&self, percent: u8, name: impl Into<EcoString>) -> Self {
        let mut steps = self.steps.clone();
        steps.push(MixStep { percent, name: name.into() });
        Self { base: self.base.clone(), steps }
    }

    /// The number of mixes, also called the bang depth.
    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    /// The color everything starts from.
    pub fn base_name(&self) -> &EcoString {
        &self.base
    }

    /// The mixes in application order.
    pub fn steps(&self) -> &[MixStep] {
        &self.steps
    }

    /// The most recently mixed in color, or the base for a bare color.
    pub fn tail(&self) -> &EcoString {
        self.steps.last().map_or(&self.base, |step| &step.name)
    }

    /// Replays the mixes against a palette.
    pub fn evaluate(&self, palette: &Palette) -> Result<Cmyk, SolveError> {
        let lookup = |name: &EcoString| {
            palette.get(name).ok_or_else(|| SolveError::UnknownColor(name.clone()))
        };

        let mut cmyk = lookup(&self.base)?;
        for step in &self.steps {
            cmyk = cmyk.mix(lookup(&step.name)?, step.percent);
        }
        Ok(cmyk)
    }
}

impl FromStr for Expression {
    type Err = SolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SolveError::MalformedExpression(s.into());
        let mut parts = s.split('!');
        let base = parts
            .next()
            .filter(|base| !base.trim().is_empty())
            .ok_or_else(malformed)?;

        let mut expr = Self::base(base);
        while let Some(percent) = parts.next() {
            let name = parts.next().ok_or_else(malformed)?;
            let percent = percent
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|p| (1..100).contains(p))
                .ok_or_else(malformed)?;
            if name.trim().is_empty() {
                return Err(malformed());
            }
            expr.steps.push(MixStep { percent, name: name.into() });
        }

        Ok(expr)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.base)?;
        for MixStep { percent, name } in &self.steps {
            write!(f, "!{percent}!{name}")?;
        }
        Ok(())
    }
}

impl Debug for Expression {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Expression({self})")
    }
}
