// SPDX-License-Identifier: GPL-3.0-only
//! Top-level run of a parsed invocation
//!
//! Turns the dispatcher's report or fatal error into user-facing output and
//! the process exit status.

use std::io::{self, Write};

use crate::adjustment::Adjuster;
use crate::cli::{self, Parsed};
use crate::config::Config;
use crate::error::AppError;
use crate::invocation::{Action, Invocation};
use crate::monitor::Dispatcher;
use crate::protocols::DisplayController;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Configuration for `parsed` with the command line overrides applied.
///
/// `help` does not read the file, so it still works when the configuration
/// is missing or broken.
pub fn configure(parsed: &Parsed) -> Result<Config, AppError> {
    if parsed.invocation.action == Action::Help {
        return Ok(Config::default());
    }
    let mut config = Config::load(parsed.options.config.as_deref())?;
    parsed.options.apply(&mut config);
    Ok(config)
}

/// Run `invocation` against `controller` and return the exit status.
///
/// `hints` is only called when no display was found and supplies extra
/// lines explaining why.
pub fn execute<C, H>(
    invocation: &Invocation,
    config: &Config,
    controller: C,
    hints: H,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<u8>
where
    C: DisplayController,
    H: FnOnce() -> Vec<String>,
{
    if invocation.action == Action::Help {
        write!(err, "{}", cli::usage())?;
        return Ok(EXIT_SUCCESS);
    }

    let mut dispatcher = Dispatcher::new(
        controller,
        Adjuster::new(config.relative_policy),
        config.max_displays,
    );

    match dispatcher.run(&invocation.action, out, err) {
        Ok(report) if report.success() => Ok(EXIT_SUCCESS),
        Ok(report) => {
            let failed: Vec<usize> = report.failed().map(|o| o.index).collect();
            info!(
                "{} of {} display(s) failed: {:?}",
                failed.len(),
                report.outcomes.len(),
                failed
            );
            Ok(EXIT_FAILURE)
        }
        Err(AppError::Io(e)) => Err(e),
        Err(AppError::NoDisplaysFound) => {
            debug!("No displays found");
            writeln!(err, "ERROR: {}", AppError::NoDisplaysFound)?;
            for hint in hints() {
                writeln!(err, "  {hint}")?;
            }
            Ok(EXIT_FAILURE)
        }
        Err(e) => {
            debug!(error = %e, "Run aborted");
            writeln!(err, "ERROR: {e}")?;
            Ok(EXIT_FAILURE)
        }
    }
}
