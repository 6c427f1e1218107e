use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "qstate",
    about = "qstate: inspect cached boolean states over local observations",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Combine probes into one state and inspect it
    Check {
        /// Probe spec (repeatable): env:VAR, file:PATH, dir:PATH,
        /// nonempty:PATH; prefix with `!` to negate
        #[arg(long = "probe", required = true)]
        probes: Vec<String>,

        /// Combine probes with OR instead of AND
        #[arg(long)]
        any: bool,

        /// Negate the combined state
        #[arg(long)]
        negate: bool,

        /// Display name for the combined state
        #[arg(long)]
        name: Option<String>,

        /// Evaluation policy: short_circuit or exhaustive
        #[arg(long)]
        policy: Option<String>,

        /// Flush every probe cache before each round
        #[arg(long)]
        fresh: bool,

        /// Number of inspection rounds (1 to 10000)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=10_000))]
        repeat: u32,

        /// Pause between rounds, in milliseconds
        #[arg(long, default_value_t = 0)]
        interval_ms: u64,

        /// Path to a TOML config file
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the canonical form of one or more state names
    Canonical {
        /// Display names to canonicalize
        #[arg(required = true)]
        names: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
