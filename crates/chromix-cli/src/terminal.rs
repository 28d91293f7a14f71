use std::io::{self, IsTerminal, Write};

use codespan_reporting::term::termcolor::{self, ColorChoice, WriteColor};

use crate::ARGS;

/// Returns a handle to the error stream, colored as requested.
pub fn out() -> TermOut {
    TermOut::new(ARGS.color)
}

/// Colored output on stderr.
///
/// Colors are only used if requested or if stderr is a terminal.
pub struct TermOut {
    stream: termcolor::StandardStream,
}

impl TermOut {
    /// Opens stderr with the given color preference.
    pub fn new(color: clap::ColorChoice) -> Self {
        let choice = match color {
            clap::ColorChoice::Auto if io::stderr().is_terminal() => ColorChoice::Auto,
            clap::ColorChoice::Always => ColorChoice::Always,
            _ => ColorChoice::Never,
        };
        Self { stream: termcolor::StandardStream::stderr(choice) }
    }
}

impl Write for TermOut {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

impl WriteColor for TermOut {
    fn supports_color(&self) -> bool {
        self.stream.supports_color()
    }

    fn set_color(&mut self, spec: &termcolor::ColorSpec) -> io::Result<()> {
        self.stream.set_color(spec)
    }

    fn reset(&mut self) -> io::Result<()> {
        self.stream.reset()
    }
}
