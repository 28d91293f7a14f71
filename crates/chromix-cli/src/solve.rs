use chromix::diag::{
    Hint, HintedStrResult, HintedString, SolveError, bail, eco_format,
};
use chromix::{Palette, Rgb};
use chromix_kit::downloader::SystemDownloader;
use chromix_kit::palettes::{CsvFile, PaletteCache, RemoteCsv, SystemPalette};

use crate::args::CliArguments;
use crate::{print_warning, report};

/// The user agent sent with downloads.
const USER_AGENT: &str = concat!("chromix/", env!("CARGO_PKG_VERSION"));

/// Execute a search from the command line.
pub fn solve(args: &CliArguments) -> HintedStrResult<()> {
    let target: Rgb = args
        .hex
        .parse::<Rgb>()
        .hint("colors are given as six hex digits, like `#3450a0`")?;

    let config = args.config();
    print!("{}", report::header(&args.hex, args.bangs, args.beam, args.step, args.metric));

    let palette = palette(args);
    tracing::info!(colors = palette.len(), "palette ready");

    let results = chromix::search(target, &palette, &config).map_err(|err| {
        let hint = match &err {
            SolveError::MissingRequiredColor(_) => {
                Some("drop `--require-lightener` to search without it")
            }
            SolveError::InvalidParameter(_) => {
                Some("the beam must be at least 1 and the step between 1 and 99")
            }
            _ => None,
        };
        let mut error = HintedString::from(err);
        if let Some(hint) = hint {
            error.hint(hint);
        }
        error
    })?;

    if results.is_empty() {
        bail!(SolveError::EmptyPalette);
    }

    print!("{}", report::table(&results));

    if args.tex {
        let doc = report::latex(target, &results, args.metric);
        std::fs::write(&args.output, doc).map_err(|err| {
            eco_format!("failed to write LaTeX report to {} ({err})", args.output.display())
        })?;
        println!("LaTeX report saved to: {}", args.output.display());
    }

    Ok(())
}

/// Assembles the palette from the configured table and the standard colors.
fn palette(args: &CliArguments) -> Palette {
    let source = if args.offline {
        SystemPalette::offline()
    } else if args.remote() {
        let downloader = match &args.cert {
            Some(path) => SystemDownloader::with_cert_path(USER_AGENT, path.clone()),
            None => SystemDownloader::new(USER_AGENT),
        };
        let remote =
            RemoteCsv::new(downloader, args.csv.as_str()).with_cache(PaletteCache::system());
        SystemPalette::new(remote)
    } else {
        SystemPalette::new(CsvFile::new(&args.csv))
    };

    let (palette, failure) = source.load_with_fallback();
    if let Some(err) = failure {
        _ = print_warning(&eco_format!(
            "could not load palette table ({err}), using base colors only"
        ));
    }
    palette
}
