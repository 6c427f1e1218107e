//! qstate CLI: the `qstate` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding the log filter directives.
const LOG_ENV: &str = "QSTATE_LOG";

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(env_filter)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            probes,
            any,
            negate,
            name,
            policy,
            fresh,
            repeat,
            interval_ms,
            config,
            json,
        } => commands::check::run(commands::check::Args {
            probes,
            any,
            negate,
            name,
            policy,
            fresh,
            repeat,
            interval_ms,
            config,
            json,
        }),

        Commands::Canonical { names, json } => commands::canonical::run(names, json),
    }
}
