//! Chronological replay of many per-instrument tick archives.
//!
//! The simulator keeps at most one read-but-unreleased tick per instrument.
//! The earliest of those is the next simulation time; `play_to` only
//! releases cached ticks at or before its target, refilling an instrument
//! right after its tick goes out, so no instrument can leak a later tick
//! ahead of another instrument's earlier one.

use crate::repositories::broker::Broker;
use crate::repositories::tick_source::{SourceCollection, SourceError, SourceFilter, TickSource};
use crate::value_objects::tick::{Tick, TickError};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Average on-disk size of one tick record, used to estimate tick counts.
pub const AVERAGE_TICK_BYTES: u64 = 39;

/// Reported as the next time once every instrument is exhausted.
pub const END_OF_SIMULATION: NaiveDateTime = NaiveDateTime::MAX;

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("no instruments found in {0}")]
    NoInstruments(String),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Tick(#[from] TickError),
    #[error("{symbol} ticks out of order: {next} after {previous}")]
    OutOfOrder {
        symbol: String,
        previous: NaiveDateTime,
        next: NaiveDateTime,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimState {
    Uninitialized,
    Initialized,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayReport {
    pub released: u64,
    pub fills: u64,
    pub next_time: NaiveDateTime,
}

pub type TickObserver = Box<dyn FnMut(&Tick)>;
pub type DebugSink = Box<dyn FnMut(&str)>;

struct Instrument {
    source: Box<dyn TickSource>,
    pending: bool,
    exhausted: bool,
    last_time: Option<NaiveDateTime>,
}

pub struct HistoricalSimulator<C, B> {
    collection: C,
    broker: B,
    filter: SourceFilter,
    state: SimState,
    instruments: Vec<Instrument>,
    // Keyed by time then registration index, which fixes the tie order.
    cache: BTreeMap<(NaiveDateTime, usize), Tick>,
    byte_volume: u64,
    ticks_read: u64,
    ticks_released: u64,
    fills: u64,
    subscribers: Vec<TickObserver>,
    debug_sinks: Vec<DebugSink>,
}

impl<C: SourceCollection, B: Broker> HistoricalSimulator<C, B> {
    pub fn new(collection: C, broker: B) -> Self {
        Self::with_filter(collection, broker, SourceFilter::all())
    }

    pub fn with_filter(collection: C, broker: B, filter: SourceFilter) -> Self {
        Self {
            collection,
            broker,
            filter,
            state: SimState::Uninitialized,
            instruments: Vec::new(),
            cache: BTreeMap::new(),
            byte_volume: 0,
            ticks_read: 0,
            ticks_released: 0,
            fills: 0,
            subscribers: Vec::new(),
            debug_sinks: Vec::new(),
        }
    }

    pub fn on_tick(&mut self, observer: impl FnMut(&Tick) + 'static) {
        self.subscribers.push(Box::new(observer));
    }

    pub fn on_debug(&mut self, sink: impl FnMut(&str) + 'static) {
        self.debug_sinks.push(Box::new(sink));
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn filter(&self) -> &SourceFilter {
        &self.filter
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    pub fn broker_mut(&mut self) -> &mut B {
        &mut self.broker
    }

    /// Opens the instrument set and primes one tick per instrument.
    /// Calling it again once initialized does nothing.
    pub fn initialize(&mut self) -> Result<(), SimError> {
        if self.state != SimState::Uninitialized {
            return Ok(());
        }

        let result = self.prime();
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn prime(&mut self) -> Result<(), SimError> {
        let sources = self.collection.open(&self.filter)?;
        if sources.is_empty() {
            return Err(SimError::NoInstruments(self.collection.describe()));
        }
        self.emit_debug(|| format!("got {} instruments", sources.len()));

        self.byte_volume = sources.iter().map(|source| source.byte_len()).sum();
        self.instruments = sources
            .into_iter()
            .map(|source| Instrument {
                source,
                pending: false,
                exhausted: false,
                last_time: None,
            })
            .collect();

        for index in 0..self.instruments.len() {
            self.refill(index)?;
        }

        self.state = SimState::Initialized;
        let count = self.instruments.len();
        let approx = self.approx_total_ticks();
        self.emit_debug(|| format!("initialized {count} instruments"));
        self.emit_debug(|| format!("approximately {approx} ticks to process"));
        Ok(())
    }

    /// Releases every tick at or before `time` in chronological order.
    pub fn play_to(&mut self, time: NaiveDateTime) -> Result<PlayReport, SimError> {
        self.play_to_with(time, |_| {})
    }

    /// Like [`play_to`](Self::play_to), also handing each released tick to
    /// `sink` after the broker and the registered subscribers.
    pub fn play_to_with(
        &mut self,
        time: NaiveDateTime,
        mut sink: impl FnMut(&Tick),
    ) -> Result<PlayReport, SimError> {
        self.initialize()?;
        self.state = SimState::Running;

        let mut released = 0u64;
        let mut fills = 0u64;
        loop {
            let Some(entry) = self.cache.first_entry() else {
                break;
            };
            if entry.key().0 > time {
                break;
            }
            let ((_, index), tick) = entry.remove_entry();
            if let Some(instrument) = self.instruments.get_mut(index) {
                instrument.pending = false;
            }

            let filled = u64::from(self.broker.execute(&tick));
            fills += filled;
            for subscriber in self.subscribers.iter_mut() {
                subscriber(&tick);
            }
            sink(&tick);
            released += 1;

            self.refill(index)?;
        }

        self.ticks_released += released;
        self.fills += fills;
        Ok(PlayReport {
            released,
            fills,
            next_time: self.next_tick_time(),
        })
    }

    pub fn play_to_end(&mut self, sink: impl FnMut(&Tick)) -> Result<PlayReport, SimError> {
        self.play_to_with(END_OF_SIMULATION, sink)
    }

    fn refill(&mut self, index: usize) -> Result<(), SimError> {
        let Some(instrument) = self.instruments.get_mut(index) else {
            return Ok(());
        };
        if instrument.pending || instrument.exhausted {
            return Ok(());
        }

        let tick = instrument.source.next_tick()?;
        if !tick.is_valid() {
            instrument.exhausted = true;
            let symbol = instrument.source.symbol().to_string();
            self.emit_debug(|| format!("{symbol} exhausted"));
            return Ok(());
        }

        let time = tick.timestamp()?;
        if let Some(previous) = instrument.last_time {
            if time < previous {
                return Err(SimError::OutOfOrder {
                    symbol: instrument.source.symbol().to_string(),
                    previous,
                    next: time,
                });
            }
        }
        instrument.last_time = Some(time);
        instrument.pending = true;
        self.ticks_read += 1;
        self.cache.insert((time, index), tick);
        Ok(())
    }

    /// Earliest cached tick time, or [`END_OF_SIMULATION`] when nothing is left.
    pub fn next_tick_time(&self) -> NaiveDateTime {
        self.cache
            .keys()
            .next()
            .map(|(time, _)| *time)
            .unwrap_or(END_OF_SIMULATION)
    }

    pub fn is_finished(&self) -> bool {
        self.state != SimState::Uninitialized && self.cache.is_empty()
    }

    /// Discards instruments, cached ticks, counters and broker state.
    pub fn reset(&mut self) {
        self.instruments.clear();
        self.cache.clear();
        self.byte_volume = 0;
        self.ticks_read = 0;
        self.ticks_released = 0;
        self.fills = 0;
        self.broker.reset();
        self.state = SimState::Uninitialized;
    }

    /// Swaps the instrument filter. An initialized simulator is reset and
    /// initialized again with the new filter.
    pub fn set_filter(&mut self, filter: SourceFilter) -> Result<(), SimError> {
        let was_initialized = self.state != SimState::Uninitialized;
        self.filter = filter;
        self.reset();
        if was_initialized {
            self.initialize()?;
        }
        Ok(())
    }

    pub fn instrument_count(&self) -> usize {
        self.instruments.len()
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.instruments
            .iter()
            .map(|instrument| instrument.source.symbol())
            .collect()
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// The tick waiting to be released for `symbol`, if any.
    pub fn pending(&self, symbol: &str) -> Option<&Tick> {
        self.cache.values().find(|tick| tick.symbol == symbol)
    }

    pub fn ticks_released(&self) -> u64 {
        self.ticks_released
    }

    pub fn ticks_read(&self) -> u64 {
        self.ticks_read
    }

    pub fn fill_count(&self) -> u64 {
        self.fills
    }

    pub fn byte_volume(&self) -> u64 {
        self.byte_volume
    }

    pub fn approx_total_ticks(&self) -> u64 {
        self.byte_volume / AVERAGE_TICK_BYTES
    }

    fn emit_debug(&mut self, message: impl FnOnce() -> String) {
        if self.debug_sinks.is_empty() {
            return;
        }
        let message = message();
        for sink in self.debug_sinks.iter_mut() {
            sink(&message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::broker::NullBroker;
    use crate::services::tick_source::{VecSourceCollection, VecTickSource};
    use rust_decimal_macros::dec;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn tick(symbol: &str, second: i32) -> Tick {
        Tick::new_trade(symbol, 20240105, 93000 + second, dec!(10), 1)
    }

    fn at(second: u32) -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 1, 5)
            .and_then(|date| date.and_hms_opt(9, 30, second))
            .unwrap()
    }

    fn collection(sources: Vec<(&str, Vec<i32>)>) -> VecSourceCollection {
        VecSourceCollection::new(
            sources
                .into_iter()
                .map(|(symbol, seconds)| {
                    VecTickSource::new(
                        symbol,
                        seconds.into_iter().map(|s| tick(symbol, s)).collect(),
                    )
                })
                .collect(),
        )
    }

    #[derive(Default)]
    struct CountingBroker {
        executed: u32,
        resets: u32,
    }

    impl Broker for CountingBroker {
        fn execute(&mut self, _tick: &Tick) -> u32 {
            self.executed += 1;
            1
        }

        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    #[test]
    fn initialize_primes_one_tick_per_instrument() {
        let mut sim = HistoricalSimulator::new(
            collection(vec![("IBM", vec![1, 2, 3]), ("MSFT", vec![2, 4])]),
            NullBroker,
        );
        sim.initialize().unwrap();
        assert_eq!(sim.state(), SimState::Initialized);
        assert_eq!(sim.cached_count(), 2);
        assert_eq!(sim.next_tick_time(), at(1));
        assert_eq!(sim.approx_total_ticks(), 5);

        sim.initialize().unwrap();
        assert_eq!(sim.cached_count(), 2);
        assert_eq!(sim.ticks_read(), 2);
    }

    #[test]
    fn empty_collection_fails_fast() {
        let mut sim = HistoricalSimulator::new(VecSourceCollection::default(), NullBroker);
        let err = sim.play_to(at(10)).unwrap_err();
        assert!(matches!(err, SimError::NoInstruments(_)));
        assert_eq!(sim.state(), SimState::Uninitialized);
    }

    #[test]
    fn play_to_counts_fills_and_releases() {
        let mut sim = HistoricalSimulator::new(
            collection(vec![("IBM", vec![1, 2, 3]), ("MSFT", vec![2, 4])]),
            CountingBroker::default(),
        );
        let report = sim.play_to(at(2)).unwrap();
        assert_eq!(report.released, 3);
        assert_eq!(report.fills, 3);
        assert_eq!(report.next_time, at(3));
        assert_eq!(sim.state(), SimState::Running);
        assert_eq!(sim.broker().executed, 3);

        let report = sim.play_to_end(|_| {}).unwrap();
        assert_eq!(report.released, 2);
        assert_eq!(report.next_time, END_OF_SIMULATION);
        assert!(sim.is_finished());
        assert_eq!(sim.ticks_released(), 5);
        assert_eq!(sim.fill_count(), 5);
    }

    #[test]
    fn out_of_order_source_is_fatal() {
        let mut sim =
            HistoricalSimulator::new(collection(vec![("IBM", vec![1, 5, 3])]), NullBroker);
        let err = sim.play_to(at(10)).unwrap_err();
        assert!(matches!(err, SimError::OutOfOrder { .. }));
    }

    #[test]
    fn malformed_timestamp_is_fatal() {
        let bad = Tick::new_trade("IBM", 20240105, 99999, dec!(10), 1);
        let mut sim = HistoricalSimulator::new(
            VecSourceCollection::new(vec![VecTickSource::new("IBM", vec![bad])]),
            NullBroker,
        );
        assert!(matches!(sim.initialize(), Err(SimError::Tick(_))));
        assert_eq!(sim.instrument_count(), 0);
    }

    #[test]
    fn reset_clears_state_and_resets_broker() {
        let mut sim = HistoricalSimulator::new(
            collection(vec![("IBM", vec![1, 2])]),
            CountingBroker::default(),
        );
        sim.play_to(at(1)).unwrap();
        sim.reset();
        assert_eq!(sim.state(), SimState::Uninitialized);
        assert_eq!(sim.cached_count(), 0);
        assert_eq!(sim.instrument_count(), 0);
        assert_eq!(sim.ticks_released(), 0);
        assert_eq!(sim.next_tick_time(), END_OF_SIMULATION);
        assert_eq!(sim.broker().resets, 1);

        sim.broker_mut().executed = 0;
        sim.play_to(at(2)).unwrap();
        assert_eq!(sim.broker().executed, 2);
    }

    #[test]
    fn set_filter_reinitializes_with_new_instruments() {
        let mut sim = HistoricalSimulator::new(
            collection(vec![("IBM", vec![1, 2]), ("MSFT", vec![3])]),
            NullBroker,
        );
        sim.play_to(at(1)).unwrap();
        sim.set_filter(SourceFilter::symbols(["MSFT"])).unwrap();
        assert_eq!(sim.state(), SimState::Initialized);
        assert_eq!(sim.symbols(), vec!["MSFT"]);
        assert_eq!(sim.next_tick_time(), at(3));
        assert!(sim.pending("IBM").is_none());
    }

    #[test]
    fn subscribers_and_debug_sink_are_notified() {
        let seen: Rc<RefCell<Vec<String>>> = Rc::default();
        let messages: Rc<RefCell<Vec<String>>> = Rc::default();
        let mut sim = HistoricalSimulator::new(
            collection(vec![("IBM", vec![1]), ("MSFT", vec![1])]),
            NullBroker,
        );
        let tick_sink = Rc::clone(&seen);
        sim.on_tick(move |tick| tick_sink.borrow_mut().push(tick.symbol.clone()));
        let debug_sink = Rc::clone(&messages);
        sim.on_debug(move |message| debug_sink.borrow_mut().push(message.to_string()));

        sim.play_to(at(1)).unwrap();
        assert_eq!(*seen.borrow(), vec!["IBM".to_string(), "MSFT".to_string()]);
        assert!(messages
            .borrow()
            .iter()
            .any(|message| message == "initialized 2 instruments"));
    }
}
