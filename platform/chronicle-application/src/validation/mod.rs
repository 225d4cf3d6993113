use crate::config::Config;
use crate::shared::{
    resolve_filter, resolve_intervals, resolve_policy, resolve_step, resolve_time_bar_seconds,
    resolve_until,
};
use chronicle_domain::repositories::broker::NullBroker;
use chronicle_domain::repositories::tick_source::SourceCollection;
use chronicle_domain::services::engine::simulator::{HistoricalSimulator, END_OF_SIMULATION};
use std::time::Instant;
use tracing::{info, info_span};

/// Checks the config and opens every instrument without replaying it.
pub fn validate(
    config: &Config,
    collection: &dyn SourceCollection,
) -> Result<serde_json::Value, String> {
    let _span = info_span!(
        "validate",
        run_id = %config.run.run_id,
        source = %collection.describe()
    )
    .entered();

    let stage_start = Instant::now();
    let step = resolve_step(config)?;
    let until = resolve_until(config)?;
    let intervals = resolve_intervals(config)?;
    let time_bar_seconds = resolve_time_bar_seconds(config)?;
    let policy = resolve_policy(config)?;

    let mut sim = HistoricalSimulator::with_filter(collection, NullBroker, resolve_filter(config));
    sim.initialize()
        .map_err(|err| format!("failed to open instruments: {err}"))?;
    metrics::histogram!("chronicle.validate.open_sources_ms")
        .record(stage_start.elapsed().as_millis() as f64);

    let first_tick = sim.next_tick_time();
    let first_tick = (first_tick != END_OF_SIMULATION).then_some(first_tick);
    if let (Some(limit), Some(first)) = (until, first_tick) {
        if limit < first {
            return Err(format!(
                "replay.until ({limit}) is before the first tick ({first})"
            ));
        }
    }

    info!(
        instruments = sim.instrument_count(),
        approx_ticks = sim.approx_total_ticks(),
        "validation complete"
    );

    Ok(serde_json::json!({
        "run_id": config.run.run_id,
        "source": collection.describe(),
        "instruments": sim.symbols(),
        "approx_total_ticks": sim.approx_total_ticks(),
        "byte_volume": sim.byte_volume(),
        "first_tick": first_tick.map(|first| first.to_string()),
        "step_seconds": step.num_seconds(),
        "until": until.map(|limit| limit.to_string()),
        "intervals": intervals.iter().map(|interval| interval.label()).collect::<Vec<_>>(),
        "time_bar_seconds": time_bar_seconds,
        "sizing": policy,
    }))
}
