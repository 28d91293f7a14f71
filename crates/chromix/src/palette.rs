use std::fmt::{self, Debug, Formatter};

use ecow::EcoString;
use indexmap::IndexMap;

use crate::color::Cmyk;
use crate::diag::SolveError;

/// An ordered collection of named base colors.
///
/// Iteration order is insertion order. It decides which candidate wins when
/// two expressions are equally close to the target, so it must be preserved
/// for reproducible results.
#[derive(Default, Clone, PartialEq)]
pub struct Palette(IndexMap<EcoString, Cmyk>);

impl Palette {
    /// Creates an empty palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a color or replaces the value of an existing one.
    ///
    /// A replaced color keeps its original position. Names must be non-empty
    /// and cannot contain the `!` mixing separator.
    pub fn insert(
        &mut self,
        name: impl Into<EcoString>,
        cmyk: Cmyk,
    ) -> Result<(), SolveError> {
        let name = name.into();
        if name.trim().is_empty() || name.contains('!') {
            return Err(SolveError::InvalidColorName(name));
        }
        self.0.insert(name, cmyk);
        Ok(())
    }

    /// Inserts every color of `other` in its order, overriding colors with the
    /// same name.
    pub fn overlay(&mut self, other: &Palette) {
        for (name, cmyk) in other.iter() {
            self.0.insert(name.clone(), cmyk);
        }
    }

    /// Looks up a color by name.
    pub fn get(&self, name: &str) -> Option<Cmyk> {
        self.0.get(name).copied()
    }

    /// Whether the palette defines a color with this name.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// The number of colors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no colors at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all colors in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&EcoString, Cmyk)> {
        self.0.iter().map(|(name, &cmyk)| (name, cmyk))
    }

    /// Iterates over all color names in order.
    pub fn names(&self) -> impl ExactSizeIterator<Item = &EcoString> {
        self.0.keys()
    }
}

impl Debug for Palette {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl<S: Into<EcoString>> FromIterator<(S, Cmyk)> for Palette {
    /// Collects colors in order. Invalid names are dropped.
    fn from_iter<I: IntoIterator<Item = (S, Cmyk)>>(iter: I) -> Self {
        let mut palette = Self::new();
        for (name, cmyk) in iter {
            palette.insert(name, cmyk).ok();
        }
        palette
    }
}
