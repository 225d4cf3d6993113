use super::BarSeries;
use crate::value_objects::bar::Bar;
use crate::value_objects::tick::Tick;

pub type TimeBarObserver = Box<dyn FnMut(&str, u32)>;

/// Bars of one arbitrary length in seconds, not tied to calendar intervals.
pub struct TimeBars {
    symbol: String,
    series: BarSeries,
    observers: Vec<TimeBarObserver>,
}

impl TimeBars {
    pub fn new(symbol: impl Into<String>, interval_seconds: u32) -> Result<Self, String> {
        if interval_seconds == 0 {
            return Err("interval_seconds must be > 0".to_string());
        }
        Ok(Self {
            symbol: symbol.into(),
            series: BarSeries::new(interval_seconds),
            observers: Vec::new(),
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval_seconds(&self) -> u32 {
        self.series.interval_seconds()
    }

    pub fn series(&self) -> &BarSeries {
        &self.series
    }

    pub fn on_new_bar(&mut self, observer: impl FnMut(&str, u32) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn consume(&mut self, tick: &Tick) -> bool {
        if !tick.is_trade() {
            return false;
        }
        if self.symbol.is_empty() {
            self.symbol = tick.symbol.clone();
        } else if tick.symbol != self.symbol {
            return false;
        }

        let started = self.series.blend(tick);
        if started {
            let seconds = self.series.interval_seconds();
            for observer in self.observers.iter_mut() {
                observer(&self.symbol, seconds);
            }
        }
        started
    }

    pub fn reset(&mut self) {
        self.series.reset();
    }

    pub fn count(&self) -> usize {
        self.series.count()
    }

    pub fn has(&self, bars: usize) -> bool {
        self.series.has(bars)
    }

    pub fn last_index(&self) -> Option<usize> {
        self.series.last_index()
    }

    pub fn bar(&self, index: usize) -> Bar {
        self.series.bar(index)
    }

    pub fn recent(&self) -> Bar {
        self.series.recent()
    }

    pub fn is_recent_new(&self) -> bool {
        self.series.is_recent_new()
    }
}
