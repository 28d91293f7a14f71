use std::process::ExitCode;

use chromix::diag::HintedStrResult;

use chromix_cli::{ARGS, EXIT, print_error, set_failed};

/// Entry point.
fn main() -> ExitCode {
    let res = dispatch();

    if let Err(err) = res {
        set_failed();
        print_error(&err).expect("failed to print error");
    }

    EXIT.with(|cell| cell.get())
}

/// Execute the search.
fn dispatch() -> HintedStrResult<()> {
    chromix_cli::logging::setup_tracing(&ARGS);
    chromix_cli::solve::solve(&ARGS)
}
