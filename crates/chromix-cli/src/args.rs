use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

use chromix::{Metric, MissingColorPolicy, SearchConfig, SelfMixRule};
use chromix_kit::palettes::DEFAULT_CSV_URL;
use clap::{ArgAction, Parser, ValueEnum};

/// Finds xcolor mixing expressions that approximate a hex color.
#[derive(Debug, Clone, Parser)]
#[clap(name = "chromix", version, author)]
pub struct CliArguments {
    /// The target color as six hex digits (e.g. #3450a0)
    #[arg(value_name = "HEX")]
    pub hex: String,

    /// The maximum number of nested mixes
    #[arg(short = 'n', long = "bangs", default_value_t = 2)]
    pub bangs: usize,

    /// The distance metric: `rgb` (Euclidean) or `lab` (CIEDE2000)
    #[arg(
        short = 'm',
        long = "metric",
        default_value = "rgb",
        value_parser = Metric::from_str,
    )]
    pub metric: Metric,

    /// How many candidates are expanded at each depth
    #[arg(long = "beam", default_value_t = 1000)]
    pub beam: usize,

    /// The distance between tried mixing percentages
    #[arg(long = "step", default_value_t = 5)]
    pub step: u8,

    /// The table of named colors, as a URL or a local CSV file
    #[arg(
        long = "csv",
        env = "CHROMIX_PALETTE",
        value_name = "URL|PATH",
        default_value = DEFAULT_CSV_URL,
    )]
    pub csv: String,

    /// Uses only the standard base colors and never touches the network
    #[arg(long = "offline")]
    pub offline: bool,

    /// When a color counts as already mixed into an expression
    #[arg(long = "self-mix", default_value_t = SelfMix::Suffix)]
    pub self_mix: SelfMix,

    /// Fails if the palette lacks `White` instead of skipping the implicit
    /// lightening of base colors
    #[arg(long = "require-lightener")]
    pub require_lightener: bool,

    /// Writes a LaTeX report of the results
    #[arg(long = "tex")]
    pub tex: bool,

    /// Where to write the LaTeX report
    #[arg(long = "output", value_name = "FILE", default_value = "color_match.tex")]
    pub output: PathBuf,

    /// Custom path to a CA certificate for downloads
    #[arg(long = "cert", env = "CHROMIX_CERT", value_name = "PATH")]
    pub cert: Option<PathBuf>,

    /// Sets the level of logging verbosity:
    /// -v = warning & error, -vv = info, -vvv = debug, -vvvv = trace
    #[arg(short, long, action = ArgAction::Count)]
    pub verbosity: u8,

    /// Whether to use colors in diagnostics
    #[arg(long, default_value_t = clap::ColorChoice::Auto)]
    pub color: clap::ColorChoice,
}

impl CliArguments {
    /// The search configuration described by the arguments.
    pub fn config(&self) -> SearchConfig {
        SearchConfig {
            max_bangs: self.bangs,
            metric: self.metric,
            beam_width: self.beam,
            step_size: self.step,
            self_mix: self.self_mix.into(),
            missing_lightener: if self.require_lightener {
                MissingColorPolicy::Error
            } else {
                MissingColorPolicy::Skip
            },
            ..SearchConfig::default()
        }
    }

    /// Whether the palette table is fetched over the network.
    pub fn remote(&self) -> bool {
        self.csv.starts_with("https://") || self.csv.starts_with("http://")
    }
}

/// Which colors are not mixed into an expression again.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum SelfMix {
    /// Skip colors whose name ends the written expression
    Suffix,
    /// Skip only the most recently mixed color
    LastName,
}

impl From<SelfMix> for SelfMixRule {
    fn from(value: SelfMix) -> Self {
        match value {
            SelfMix::Suffix => Self::Suffix,
            SelfMix::LastName => Self::LastName,
        }
    }
}

impl Display for SelfMix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.to_possible_value()
            .expect("no values are skipped")
            .get_name()
            .fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn parse(args: &[&str]) -> CliArguments {
        let argv = std::iter::once("chromix").chain(args.iter().copied());
        CliArguments::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["#3450a0"]);
        assert_eq!(args.hex, "#3450a0");
        assert_eq!(args.output, PathBuf::from("color_match.tex"));
        assert!(!args.tex);
        assert!(!args.offline);
        assert_eq!(args.verbosity, 0);
        assert_eq!(args.config(), SearchConfig::default());
    }

    #[test]
    fn test_search_flags() {
        let args = parse(&[
            "3450A0",
            "-n",
            "3",
            "-m",
            "lab",
            "--beam",
            "50",
            "--step",
            "10",
            "--self-mix",
            "last-name",
            "--require-lightener",
            "-vv",
        ]);

        let config = args.config();
        assert_eq!(config.max_bangs, 3);
        assert_eq!(config.metric, Metric::Lab);
        assert_eq!(config.beam_width, 50);
        assert_eq!(config.step_size, 10);
        assert_eq!(config.self_mix, SelfMixRule::LastName);
        assert_eq!(config.missing_lightener, MissingColorPolicy::Error);
        assert_eq!(args.verbosity, 2);
    }

    #[test]
    fn test_palette_source() {
        assert!(parse(&["#fff000", "--csv", "https://example.com/c.csv"]).remote());
        assert!(!parse(&["#fff000", "--csv", "colors.csv"]).remote());
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(CliArguments::try_parse_from(["chromix"]).is_err());
        assert!(CliArguments::try_parse_from(["chromix", "#fff000", "-m", "hsv"]).is_err());
        assert!(CliArguments::try_parse_from(["chromix", "#fff000", "--step", "x"]).is_err());
    }

    #[test]
    fn test_self_mix_display() {
        assert_eq!(SelfMix::LastName.to_string(), "last-name");
    }
}
