//! Streaming tick-to-bar aggregation.
//!
//! [`BarSeries`] holds one interval's history. [`BarList`] tracks several
//! calendar intervals for one symbol, [`TimeBars`] a single interval of any
//! number of seconds. Both only fold trade ticks (nonzero price).

mod calendar;
mod time_bars;

pub use calendar::{BarList, NewBarObserver};
pub use time_bars::{TimeBarObserver, TimeBars};

use crate::value_objects::bar::{bucket_id, Bar};
use crate::value_objects::tick::Tick;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct BarSeries {
    interval_seconds: u32,
    current_bucket: Option<i64>,
    bars: Vec<Bar>,
    recent_is_new: bool,
}

impl BarSeries {
    pub fn new(interval_seconds: u32) -> Self {
        Self {
            interval_seconds: interval_seconds.max(1),
            current_bucket: None,
            bars: Vec::new(),
            recent_is_new: false,
        }
    }

    pub fn interval_seconds(&self) -> u32 {
        self.interval_seconds
    }

    /// Folds one trade tick and reports whether it started a new bar.
    pub(crate) fn blend(&mut self, tick: &Tick) -> bool {
        let bucket = bucket_id(tick.date, tick.elapsed_seconds(), self.interval_seconds);
        let started = self.current_bucket != Some(bucket);
        if started {
            self.bars.push(Bar::started(tick.date, tick.time));
            self.current_bucket = Some(bucket);
        }
        self.recent_is_new = started;
        if let Some(bar) = self.bars.last_mut() {
            bar.blend(tick.trade, tick.size, tick.is_index);
        }
        started
    }

    pub fn reset(&mut self) {
        self.current_bucket = None;
        self.bars.clear();
        self.recent_is_new = false;
    }

    pub fn count(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.bars.len().checked_sub(1)
    }

    pub fn has(&self, bars: usize) -> bool {
        self.bars.len() >= bars
    }

    pub fn current_bucket(&self) -> Option<i64> {
        self.current_bucket
    }

    /// Bar at `index`, oldest first. Out of range yields [`Bar::EMPTY`].
    pub fn bar(&self, index: usize) -> Bar {
        let Some(bar) = self.bars.get(index) else {
            return Bar::EMPTY;
        };
        let mut bar = *bar;
        bar.is_new = Some(index) == self.last_index() && self.recent_is_new;
        bar
    }

    /// Bar `back` positions before the most recent one.
    pub fn bars_back(&self, back: usize) -> Bar {
        match self.last_index().and_then(|last| last.checked_sub(back)) {
            Some(index) => self.bar(index),
            None => Bar::EMPTY,
        }
    }

    pub fn recent(&self) -> Bar {
        self.bars_back(0)
    }

    pub fn is_recent_new(&self) -> bool {
        self.recent_is_new
    }

    pub fn iter(&self) -> impl Iterator<Item = Bar> + '_ {
        (0..self.bars.len()).map(move |index| self.bar(index))
    }

    pub fn opens(&self) -> Vec<Decimal> {
        self.bars.iter().map(|bar| bar.open).collect()
    }

    pub fn highs(&self) -> Vec<Decimal> {
        self.bars.iter().map(|bar| bar.high).collect()
    }

    pub fn lows(&self) -> Vec<Decimal> {
        self.bars.iter().map(|bar| bar.low).collect()
    }

    pub fn closes(&self) -> Vec<Decimal> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    pub fn volumes(&self) -> Vec<i64> {
        self.bars.iter().map(|bar| bar.volume).collect()
    }
}
