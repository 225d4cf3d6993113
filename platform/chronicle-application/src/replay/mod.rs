use crate::config::Config;
use crate::shared::{
    resolve_filter, resolve_intervals, resolve_sma_window, resolve_step, resolve_time_bar_seconds,
    resolve_until,
};
use chrono::NaiveDateTime;
use chronicle_domain::repositories::broker::Broker;
use chronicle_domain::repositories::tick_source::SourceCollection;
use chronicle_domain::services::bars::{BarList, BarSeries, TimeBars};
use chronicle_domain::services::engine::simulator::{HistoricalSimulator, END_OF_SIMULATION};
use chronicle_domain::services::indicators::bar_sma;
use chronicle_domain::value_objects::bar::Bar;
use chronicle_domain::value_objects::bar_interval::BarInterval;
use chronicle_domain::value_objects::tick::Tick;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, info_span};

#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub run_id: String,
    pub source: String,
    pub instruments: Vec<String>,
    pub steps: u64,
    pub ticks_released: u64,
    pub fills: u64,
    pub approx_total_ticks: u64,
    pub stopped_at: Option<NaiveDateTime>,
    pub symbols: Vec<SymbolSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolSummary {
    pub symbol: String,
    pub ticks: u64,
    pub trades: u64,
    pub series: Vec<SeriesSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesSummary {
    pub interval: String,
    pub bars: usize,
    pub last: Option<Bar>,
    pub sma: Option<Decimal>,
}

/// Per-symbol aggregation state fed by released ticks.
struct SymbolBook {
    bars: BarList,
    time_bars: Option<TimeBars>,
    ticks: u64,
    trades: u64,
}

impl SymbolBook {
    fn new(
        symbol: &str,
        intervals: &[BarInterval],
        time_bar_seconds: Option<u32>,
    ) -> Result<Self, String> {
        let mut bars = BarList::new(symbol, intervals);
        bars.on_new_bar(|_, interval| {
            metrics::counter!(
                "chronicle.replay.bars_started_total",
                "interval" => interval.label()
            )
            .increment(1);
        });
        let time_bars = time_bar_seconds
            .map(|seconds| {
                TimeBars::new(symbol, seconds).map_err(|err| {
                    format!("failed to build {seconds}s bars for {symbol}: {err}")
                })
            })
            .transpose()?
            .map(|mut bars| {
                bars.on_new_bar(|_, _| {
                    metrics::counter!(
                        "chronicle.replay.bars_started_total",
                        "interval" => "custom"
                    )
                    .increment(1);
                });
                bars
            });
        Ok(Self {
            bars,
            time_bars,
            ticks: 0,
            trades: 0,
        })
    }

    fn consume(&mut self, tick: &Tick) {
        self.ticks += 1;
        if tick.is_trade() {
            self.trades += 1;
        }
        self.bars.consume(tick);
        if let Some(time_bars) = self.time_bars.as_mut() {
            time_bars.consume(tick);
        }
    }

    fn summary(&self, symbol: &str, sma_window: Option<usize>) -> SymbolSummary {
        let mut series: Vec<SeriesSummary> = self
            .bars
            .intervals()
            .filter_map(|interval| {
                self.bars
                    .series(interval)
                    .map(|bars| series_summary(interval.label().to_string(), bars, sma_window))
            })
            .collect();
        if let Some(time_bars) = &self.time_bars {
            series.push(series_summary(
                format!("{}s", time_bars.interval_seconds()),
                time_bars.series(),
                sma_window,
            ));
        }
        SymbolSummary {
            symbol: symbol.to_string(),
            ticks: self.ticks,
            trades: self.trades,
            series,
        }
    }
}

fn series_summary(interval: String, bars: &BarSeries, sma_window: Option<usize>) -> SeriesSummary {
    SeriesSummary {
        interval,
        bars: bars.count(),
        last: bars.last_index().map(|index| bars.bar(index)),
        sma: sma_window
            .filter(|_| !bars.is_empty())
            .map(|window| bar_sma(bars, window)),
    }
}

/// Replays every configured instrument in `step` increments of simulated
/// time, feeding released ticks to the broker and per-symbol bar builders.
pub fn run_replay<B: Broker>(
    config: &Config,
    collection: &dyn SourceCollection,
    broker: B,
) -> Result<ReplaySummary, String> {
    let _span = info_span!(
        "replay",
        run_id = %config.run.run_id,
        source = %collection.describe()
    )
    .entered();

    let run_start = Instant::now();
    let step = resolve_step(config)?;
    let until = resolve_until(config)?;
    let intervals = resolve_intervals(config)?;
    let time_bar_seconds = resolve_time_bar_seconds(config)?;
    let sma_window = resolve_sma_window(config);

    let mut sim = HistoricalSimulator::with_filter(collection, broker, resolve_filter(config));
    sim.on_debug(|message| debug!(target: "chronicle::simulator", "{message}"));
    sim.initialize()
        .map_err(|err| format!("failed to initialize replay: {err}"))?;
    info!(
        instruments = sim.instrument_count(),
        approx_ticks = sim.approx_total_ticks(),
        "replay initialized"
    );
    let instruments: Vec<String> = sim.symbols().into_iter().map(str::to_string).collect();

    let mut books: BTreeMap<String, SymbolBook> = BTreeMap::new();
    let mut steps = 0u64;
    let mut stopped_at: Option<NaiveDateTime> = None;
    loop {
        let next = sim.next_tick_time();
        if next == END_OF_SIMULATION {
            break;
        }
        if until.is_some_and(|limit| next > limit) {
            stopped_at = until;
            break;
        }

        let mut target = next.checked_add_signed(step).unwrap_or(END_OF_SIMULATION);
        if let Some(limit) = until {
            target = target.min(limit);
        }

        let mut book_error: Option<String> = None;
        let report = sim
            .play_to_with(target, |tick| {
                if book_error.is_some() {
                    return;
                }
                if !books.contains_key(&tick.symbol) {
                    match SymbolBook::new(&tick.symbol, &intervals, time_bar_seconds) {
                        Ok(book) => {
                            books.insert(tick.symbol.clone(), book);
                        }
                        Err(err) => {
                            book_error = Some(err);
                            return;
                        }
                    }
                }
                if let Some(book) = books.get_mut(&tick.symbol) {
                    book.consume(tick);
                }
            })
            .map_err(|err| format!("replay aborted at {target}: {err}"))?;
        if let Some(err) = book_error {
            return Err(err);
        }
        steps += 1;
        metrics::counter!("chronicle.replay.ticks_released_total").increment(report.released);
        metrics::counter!("chronicle.replay.fills_total").increment(report.fills);
        debug!(
            step = steps,
            target = %target,
            released = report.released,
            fills = report.fills,
            "replay step"
        );
    }

    let run_ms = run_start.elapsed().as_millis() as f64;
    metrics::histogram!("chronicle.replay.run_ms").record(run_ms);
    info!(
        steps,
        ticks = sim.ticks_released(),
        fills = sim.fill_count(),
        run_ms,
        "replay complete"
    );

    Ok(ReplaySummary {
        run_id: config.run.run_id.clone(),
        source: collection.describe(),
        instruments,
        steps,
        ticks_released: sim.ticks_released(),
        fills: sim.fill_count(),
        approx_total_ticks: sim.approx_total_ticks(),
        stopped_at,
        symbols: books
            .iter()
            .map(|(symbol, book)| book.summary(symbol, sma_window))
            .collect(),
    })
}
