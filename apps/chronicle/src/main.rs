mod commands;
mod infra;
mod obs;

use clap::{Parser, Subcommand};
use commands::Command;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chronicle")]
#[command(
    about = "Historical tick replay and bar aggregation",
    version,
    arg_required_else_help = true
)]
#[command(
    after_help = "Examples:\n  chronicle replay --config configs/sample.toml\n  chronicle validate --config configs/sample.toml\n  chronicle size --config configs/sample.toml --symbol IBM --position 300 --delta -500\n"
)]
struct Cli {
    /// Log filter used when CHRONICLE_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    /// pretty | json
    #[arg(long, global = true, default_value = "pretty")]
    log_format: String,
    /// Expose Prometheus metrics on host:port.
    #[arg(long, global = true)]
    metrics_addr: Option<String>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Replay every tick archive under the configured directory.
    Replay {
        #[arg(long)]
        config: PathBuf,
        /// Print a single JSON line instead of human output.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    Validate {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Size one order against the configured policy.
    Size {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        /// Current signed position.
        #[arg(long, allow_negative_numbers = true, default_value_t = 0)]
        position: i64,
        /// Requested signed adjustment; small magnitudes act as multipliers.
        #[arg(long, allow_negative_numbers = true)]
        delta: i64,
        #[arg(long, default_value = "cli")]
        label: String,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = obs::init_tracing(&cli.log_level, &cli.log_format) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    if let Err(err) = obs::init_metrics(cli.metrics_addr.as_deref()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let command = match cli.command {
        CliCommand::Replay { config, json } => Command::Replay { config, json },
        CliCommand::Validate { config, out } => Command::Validate { config, out },
        CliCommand::Size {
            config,
            symbol,
            position,
            delta,
            label,
        } => Command::Size {
            config,
            symbol,
            position,
            delta,
            label,
        },
    };

    if let Err(err) = commands::run(command) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
