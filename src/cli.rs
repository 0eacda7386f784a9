// SPDX-License-Identifier: GPL-3.0-only
//! Command line front end
//!
//! clap handles the global options and the action word. The tokens after
//! `get`/`set` go through [`parse_selector`] because the leading TARGET is
//! optional, which a positional layout cannot express.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};

use crate::adjustment::RelativePolicy;
use crate::config::Config;
use crate::error::ArgumentError;
use crate::invocation::{Action, Invocation, parse_selector};

const EXAMPLES: &str = "\
TARGET:
    1..32        display number, in `list` order
    all          every display
    (omitted)    the first display

FEATURE:
    brightness | contrast | volume

VALUE:
    0..100       absolute percentage
    N+ / N-      raise or lower the current value by N

Examples:
    $ ddcctl get brightness
    $ ddcctl get 2 volume
    $ ddcctl set contrast 60
    $ ddcctl set all brightness 10-";

#[derive(Parser, Debug)]
#[command(
    name = "ddcctl",
    version,
    about = "Get and set monitor brightness, contrast and volume over DDC/CI",
    after_help = EXAMPLES,
    arg_required_else_help = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Reject relative adjustments that leave 0..100
    #[arg(long, global = true, overrides_with = "clamp")]
    pub strict: bool,

    /// Clamp relative adjustments to 0..100
    #[arg(long, global = true, overrides_with = "strict")]
    pub clamp: bool,

    /// Do not read values back after writing them
    #[arg(long, global = true)]
    pub no_verify: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print this help
    Help {
        /// Ignored, `help` short-circuits everything after it
        #[allow(dead_code)]
        #[arg(hide = true, num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        rest: Vec<String>,
    },
    /// Describe every attached display
    List,
    /// Print the current value of a feature
    Get {
        #[arg(value_name = "[TARGET] FEATURE", num_args = 0.., allow_negative_numbers = true)]
        selector: Vec<String>,
    },
    /// Set a feature to an absolute or relative value
    Set {
        #[arg(value_name = "[TARGET] FEATURE VALUE", num_args = 0.., allow_negative_numbers = true)]
        selector: Vec<String>,
    },
}

impl Command {
    pub fn to_invocation(&self) -> Result<Invocation, ArgumentError> {
        let action = match self {
            Command::Help { .. } => Action::Help,
            Command::List => Action::List,
            Command::Get { selector } => {
                let (target, feature, _) = parse_selector("get", selector, false)?;
                Action::Get { target, feature }
            }
            Command::Set { selector } => {
                let (target, feature, value) = parse_selector("set", selector, true)?;
                let value = value.ok_or(ArgumentError::MissingArgument {
                    what: "value",
                    after: feature.to_string(),
                })?;
                Action::Set {
                    target,
                    feature,
                    value,
                }
            }
        };
        Ok(Invocation { action })
    }
}

/// Global options that override the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub config: Option<PathBuf>,
    pub verbose: u8,
    pub policy: Option<RelativePolicy>,
    pub no_verify: bool,
}

impl Options {
    pub fn apply(&self, config: &mut Config) {
        if let Some(policy) = self.policy {
            config.relative_policy = policy;
        }
        if self.no_verify {
            config.verify_writes = false;
        }
    }
}

#[derive(Debug)]
pub struct Parsed {
    pub options: Options,
    pub invocation: Invocation,
}

/// Parse the full argv. Help and version requests come back as clap errors
/// of kind `DisplayHelp`/`DisplayVersion`, see [`exit_code`].
pub fn parse_from<I, T>(args: I) -> Result<Parsed, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;

    let invocation = cli.command.to_invocation().map_err(|e| {
        let kind = match e {
            ArgumentError::InvalidArgument { .. } => ErrorKind::InvalidValue,
            ArgumentError::MissingArgument { .. } => ErrorKind::MissingRequiredArgument,
            ArgumentError::OutOfRange { .. } => ErrorKind::ValueValidation,
        };
        Cli::command().error(kind, e)
    })?;

    let policy = if cli.strict {
        Some(RelativePolicy::Reject)
    } else if cli.clamp {
        Some(RelativePolicy::Clamp)
    } else {
        None
    };

    Ok(Parsed {
        options: Options {
            config: cli.config,
            verbose: cli.verbose,
            policy,
            no_verify: cli.no_verify,
        },
        invocation,
    })
}

/// Full help text for the `help` action
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

/// Exit status for a parse failure: 0 for help and version, 1 otherwise
pub fn exit_code(error: &clap::Error) -> u8 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}
