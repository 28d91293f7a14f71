//! The chromix color approximation engine.
//!
//! # Steps
//! - **Parsing:** The target color is parsed from a hex string into an [`Rgb`]
//!   value.
//! - **Simulation:** Every palette color lives in a naive device CMYK space.
//!   Mixing happens there with linear interpolation, and the result is
//!   simulated back to RGB for comparison.
//! - **Searching:** Starting from the bare palette colors, a beam search wraps
//!   the best expressions of each depth in one more `!p!name` mix, keeping
//!   track of the best [`Candidate`] per depth in a [`ResultSet`].
//!
//! The palette is always handed in by the caller. This crate never touches the
//! network or the file system; see `chromix-kit` for palette acquisition.

pub mod diag;

mod color;
mod expr;
mod metric;
mod palette;
mod search;

pub use self::color::{Cmyk, Lab, Rgb};
pub use self::expr::{Expression, MixStep};
pub use self::metric::{Metric, Target, ciede2000, euclidean};
pub use self::palette::Palette;
pub use self::search::{
    Candidate, MissingColorPolicy, ResultSet, SearchConfig, SelfMixRule, Solver,
    search,
};

use crate::diag::SolveError;

/// Solves for the given target hex color.
///
/// This is the main entry point: it parses the target, runs the search over
/// the given palette and returns the parsed target together with the best
/// candidate of every depth.
pub fn solve(
    target_hex: &str,
    palette: &Palette,
    config: &SearchConfig,
) -> Result<(Rgb, ResultSet), SolveError> {
    let target: Rgb = target_hex.parse()?;
    let results = search(target, palette, config)?;
    Ok((target, results))
}
