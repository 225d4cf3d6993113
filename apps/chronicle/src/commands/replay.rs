use chronicle_application::config::load_config;
use chronicle_domain::repositories::broker::NullBroker;
use std::path::PathBuf;

pub(super) fn run_replay(config_path: PathBuf, json: bool) -> Result<(), String> {
    let config = load_config(&config_path)?;
    let collection = crate::infra::build_tick_directory(&config)?;
    let summary = chronicle_application::replay::run_replay(&config, &collection, NullBroker)?;

    if json {
        let line = serde_json::to_string(&summary)
            .map_err(|err| format!("failed to serialize replay summary: {err}"))?;
        println!("{line}");
        return Ok(());
    }

    println!(
        "chronicle: replay (run_id={}, source={}, instruments={})",
        summary.run_id,
        summary.source,
        summary.instruments.len()
    );
    println!(
        "released {} of ~{} ticks in {} steps, fills={}",
        summary.ticks_released, summary.approx_total_ticks, summary.steps, summary.fills
    );
    if let Some(stopped_at) = summary.stopped_at {
        println!("stopped at {stopped_at}");
    }
    for symbol in &summary.symbols {
        println!(
            "{}: ticks={}, trades={}",
            symbol.symbol, symbol.ticks, symbol.trades
        );
        for series in &symbol.series {
            let close = series
                .last
                .map(|bar| bar.close.to_string())
                .unwrap_or_else(|| "-".to_string());
            let sma = series
                .sma
                .map(|sma| sma.round_dp(4).to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:>6}  bars={:<6} close={:<12} sma={}",
                series.interval, series.bars, close, sma
            );
        }
    }
    Ok(())
}
