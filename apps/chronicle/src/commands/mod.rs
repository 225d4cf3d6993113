mod replay;
mod size;
mod validate;

use std::path::PathBuf;

pub enum Command {
    Replay {
        config: PathBuf,
        json: bool,
    },
    Validate {
        config: PathBuf,
        out: Option<PathBuf>,
    },
    Size {
        config: PathBuf,
        symbol: String,
        position: i64,
        delta: i64,
        label: String,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Replay { .. } => "replay",
            Command::Validate { .. } => "validate",
            Command::Size { .. } => "size",
        }
    }
}

pub fn run(command: Command) -> Result<(), String> {
    let name = command.name();
    let result = match command {
        Command::Replay { config, json } => replay::run_replay(config, json),
        Command::Validate { config, out } => validate::run_validate(config, out),
        Command::Size {
            config,
            symbol,
            position,
            delta,
            label,
        } => size::run_size(config, &symbol, position, delta, &label),
    };
    let result_label = if result.is_ok() { "ok" } else { "err" };
    metrics::counter!(
        "chronicle.cli.commands_total",
        "command" => name,
        "result" => result_label
    )
    .increment(1);
    result
}
