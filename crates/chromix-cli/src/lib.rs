pub mod args;
pub mod logging;
pub mod report;
pub mod solve;
pub mod terminal;

use std::cell::Cell;
use std::io;
use std::process::ExitCode;

use chromix::diag::HintedString;
use clap::Parser;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorSpec, WriteColor};
use once_cell::sync::Lazy;

use crate::args::CliArguments;

thread_local! {
    /// The CLI's exit code.
    pub static EXIT: Cell<ExitCode> = const { Cell::new(ExitCode::SUCCESS) };
}

/// The parsed command line arguments.
pub static ARGS: Lazy<CliArguments> = Lazy::new(CliArguments::parse);

/// Ensure a failure exit code.
pub fn set_failed() {
    EXIT.with(|cell| cell.set(ExitCode::FAILURE));
}

/// Print an application-level error together with its hints.
pub fn print_error(error: &HintedString) -> io::Result<()> {
    let styles = term::Styles::default();
    let mut output = terminal::out();
    print_labeled(&mut output, &styles.header_error, "error", error.message())?;
    for hint in error.hints() {
        print_labeled(&mut output, &styles.header_help, "hint", hint)?;
    }
    Ok(())
}

/// Print a warning that does not stop the search.
pub fn print_warning(message: &str) -> io::Result<()> {
    let styles = term::Styles::default();
    print_labeled(&mut terminal::out(), &styles.header_warning, "warning", message)
}

fn print_labeled(
    output: &mut impl WriteColor,
    style: &ColorSpec,
    label: &str,
    message: &str,
) -> io::Result<()> {
    output.set_color(style)?;
    write!(output, "{label}")?;
    output.reset()?;
    writeln!(output, ": {message}")
}
