use std::io;
use std::process::ExitCode;

use clap::error::ErrorKind;

use crate::config::LogConfig;
use crate::protocols::ddc_ci::DdcCiController;

#[macro_use]
extern crate tracing;

mod adjustment;
mod app;
mod cli;
mod config;
mod error;
mod invocation;
mod monitor;
mod permissions;
mod protocols;

fn setup_logs(log: &LogConfig, verbose: u8) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => log.level.as_str(),
        1 => "info",
        _ => "debug",
    };

    let fmt_layer = fmt::layer().with_target(false).with_writer(io::stderr);
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level))
    });

    #[cfg(feature = "journald")]
    let journal_layer = match log.journald {
        true => tracing_journald::layer().ok(),
        false => None,
    };
    #[cfg(not(feature = "journald"))]
    let journal_layer: Option<tracing_subscriber::layer::Identity> = None;
    let journal_missing = log.journald && journal_layer.is_none();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(journal_layer)
        .init();

    if journal_missing {
        warn!("journald logging requested but the journal is not available");
    }
}

fn main() -> ExitCode {
    let parsed = match cli::parse_from(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(err) => {
            let code = cli::exit_code(&err);
            if err.kind() == ErrorKind::DisplayVersion {
                print!("{}", err.render());
            } else {
                eprint!("{}", err.render());
            }
            return ExitCode::from(code);
        }
    };

    let config = match app::configure(&parsed) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("ERROR: {err}");
            return ExitCode::from(app::EXIT_FAILURE);
        }
    };

    setup_logs(&config.log, parsed.options.verbose);
    debug!("{:?}", parsed.invocation);

    let hints = || {
        let check = permissions::check_i2c_permissions();
        if check.has_issues() {
            debug!("I2C access problems detected");
        }
        check.hints()
    };

    match app::execute(
        &parsed.invocation,
        &config,
        DdcCiController::new(config.verify_writes),
        hints,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    ) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            error!("failed to write output: {err}");
            ExitCode::from(app::EXIT_FAILURE)
        }
    }
}
