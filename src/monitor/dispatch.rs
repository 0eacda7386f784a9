// SPDX-License-Identifier: GPL-3.0-only
//! Action executors
//!
//! Runs `list`, `get` and `set` over the resolved displays one at a time.
//! Each display is opened, acted on and closed before the next one is
//! touched. A failure on one display is reported and the loop moves on.

use std::io::Write;

use crate::adjustment::Adjuster;
use crate::error::{DisplayError, Result};
use crate::invocation::{Action, Feature, Target, Value};
use crate::protocols::{DisplayController, VcpValue, WriteError};

use super::enumeration::{enumerate_displays, resolve};

/// What a display did when its action succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completed {
    Listed,
    Read(u16),
    Written(u16),
}

/// Result of processing one display
#[derive(Debug)]
pub struct DisplayOutcome {
    /// 1-based, as shown to the user
    pub index: usize,
    pub completed: Option<Completed>,
    /// Action failure first, then close failure
    pub errors: Vec<DisplayError>,
}

impl DisplayOutcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Per-display outcomes in processing order
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<DisplayOutcome>,
}

impl RunReport {
    /// True when no display failed
    pub fn success(&self) -> bool {
        self.outcomes.iter().all(DisplayOutcome::is_ok)
    }

    pub fn failed(&self) -> impl Iterator<Item = &DisplayOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }
}

pub struct Dispatcher<C: DisplayController> {
    controller: C,
    adjuster: Adjuster,
    max_displays: usize,
}

impl<C: DisplayController> Dispatcher<C> {
    pub fn new(controller: C, adjuster: Adjuster, max_displays: usize) -> Self {
        Self {
            controller,
            adjuster,
            max_displays,
        }
    }

    #[cfg(test)]
    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Run an action. `out` receives results, `err` per-display failures.
    ///
    /// Fatal errors (enumeration failure, no displays, target beyond the
    /// displays present) are returned before any display is opened.
    pub fn run(
        &mut self,
        action: &Action,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<RunReport> {
        match *action {
            Action::Help => Ok(RunReport::default()),
            Action::List => self.list(out),
            Action::Get { target, feature } => self.get(target, feature, out, err),
            Action::Set {
                target,
                feature,
                value,
            } => self.set(target, feature, value, err),
        }
    }

    fn list(&mut self, out: &mut dyn Write) -> Result<RunReport> {
        let displays = enumerate_displays(&mut self.controller, self.max_displays)?;
        let range = resolve(Target::All, displays.len())?;

        let mut report = RunReport::default();
        for i in range {
            writeln!(out, "Display {}", i + 1)?;
            for line in self.controller.describe(&displays[i]) {
                writeln!(out, "{line}")?;
            }
            writeln!(out)?;
            report.outcomes.push(DisplayOutcome {
                index: i + 1,
                completed: Some(Completed::Listed),
                errors: Vec::new(),
            });
        }
        Ok(report)
    }

    fn get(
        &mut self,
        target: Target,
        feature: Feature,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<RunReport> {
        let displays = enumerate_displays(&mut self.controller, self.max_displays)?;
        let range = resolve(target, displays.len())?;

        let mut report = RunReport::default();
        for i in range {
            let outcome = with_display(&mut self.controller, i + 1, &displays[i], |c, handle| {
                let value = c
                    .read_feature(handle, feature)
                    .map_err(|source| DisplayError::Read { feature, source })?;
                Ok(Completed::Read(value.value()))
            });

            if let Some(Completed::Read(value)) = outcome.completed {
                writeln!(out, "{value}")?;
            }
            report_errors(&outcome, err)?;
            report.outcomes.push(outcome);
        }
        Ok(report)
    }

    fn set(
        &mut self,
        target: Target,
        feature: Feature,
        value: Value,
        err: &mut dyn Write,
    ) -> Result<RunReport> {
        let displays = enumerate_displays(&mut self.controller, self.max_displays)?;
        let range = resolve(target, displays.len())?;

        let adjuster = &self.adjuster;
        let mut report = RunReport::default();
        for i in range {
            let outcome = with_display(&mut self.controller, i + 1, &displays[i], |c, handle| {
                let new_value = match value.delta() {
                    None => value.amount,
                    Some(delta) => {
                        let current = c
                            .read_feature(handle, feature)
                            .map_err(|source| DisplayError::Read { feature, source })?
                            .value();
                        adjuster.apply(current, delta).ok_or(
                            DisplayError::AdjustmentOutOfRange {
                                feature,
                                current,
                                delta,
                            },
                        )?
                    }
                };

                c.write_feature(handle, feature, VcpValue::from_value(new_value))
                    .map_err(|e| match e {
                        WriteError::Verification { expected, actual } => {
                            DisplayError::Verification {
                                feature,
                                expected,
                                actual,
                            }
                        }
                        WriteError::Other(source) => DisplayError::Write { feature, source },
                    })?;
                Ok(Completed::Written(new_value))
            });

            if let Some(Completed::Written(written)) = outcome.completed {
                info!(display = i + 1, %feature, value = written, "Feature set");
            }
            report_errors(&outcome, err)?;
            report.outcomes.push(outcome);
        }
        Ok(report)
    }
}

/// Open a display, run `act` on it and close it again. The handle is closed
/// on every path once the open succeeded.
fn with_display<C, F>(
    controller: &mut C,
    index: usize,
    display: &C::Display,
    act: F,
) -> DisplayOutcome
where
    C: DisplayController,
    F: FnOnce(&mut C, &mut C::Handle) -> std::result::Result<Completed, DisplayError>,
{
    let mut handle = match controller.open(display) {
        Ok(handle) => handle,
        Err(e) => {
            return DisplayOutcome {
                index,
                completed: None,
                errors: vec![DisplayError::Open(e)],
            };
        }
    };

    let mut errors = Vec::new();
    let completed = match act(controller, &mut handle) {
        Ok(completed) => {
            debug!(display = index, ?completed, "Display action completed");
            Some(completed)
        }
        Err(e) => {
            errors.push(e);
            None
        }
    };

    if let Err(e) = controller.close(handle) {
        errors.push(DisplayError::Close(e));
    }

    DisplayOutcome {
        index,
        completed,
        errors,
    }
}

fn report_errors(outcome: &DisplayOutcome, err: &mut dyn Write) -> std::io::Result<()> {
    for error in &outcome.errors {
        debug!(display = outcome.index, error = %error, "Display operation failed");
        writeln!(err, "ERROR: display {}: {error}", outcome.index)?;
    }
    Ok(())
}
