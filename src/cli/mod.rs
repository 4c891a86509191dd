//! The Trellis command-line entry point.
//!
//! A test binary's `main` (usually generated by [`crate::test_main!`]) lands
//! here: arguments are parsed, logging is set up and the registered suite
//! is run. The returned value is the process exit status.

use std::sync::Once;

use clap::Parser;
use tracing::debug;

use crate::cli::args::TrellisArgs;
use crate::runner;

pub mod args;
pub mod output;

/// Environment variable holding the log filter, e.g. `TRELLIS_LOG=trellis=debug`.
pub const LOG_ENV: &str = "TRELLIS_LOG";

static TRACING_INIT: Once = Once::new();

/// Initializes diagnostic logging on stderr.
///
/// Safe to call more than once. Logs at `warn` unless `TRELLIS_LOG` says
/// otherwise.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
        // Another subscriber may already be installed by an embedding binary.
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .try_init();
    });
}

/// Runs every registered test as directed by the command line.
///
/// Returns the number of failed tests, or -1 if the run could not start.
pub fn main() -> i32 {
    let args = TrellisArgs::parse();
    init_tracing();
    debug!(?args, "parsed arguments");

    match runner::run(args.into_options()) {
        Ok(summary) => summary.exit_code(),
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            -1
        }
    }
}
