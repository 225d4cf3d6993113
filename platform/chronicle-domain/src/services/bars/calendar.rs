use super::BarSeries;
use crate::value_objects::bar::Bar;
use crate::value_objects::bar_interval::BarInterval;
use crate::value_objects::tick::Tick;

pub type NewBarObserver = Box<dyn FnMut(&str, BarInterval)>;

/// Calendar-interval bars for one symbol.
///
/// The first registered interval is the default used by unqualified
/// accessors. A list built with an empty symbol binds to the symbol of the
/// first trade it sees and ignores ticks for any other symbol.
pub struct BarList {
    symbol: String,
    series: Vec<(BarInterval, BarSeries)>,
    observers: Vec<NewBarObserver>,
}

impl BarList {
    /// Duplicate intervals are dropped, first occurrence wins. An empty
    /// slice registers [`BarInterval::DEFAULT_SET`].
    pub fn new(symbol: impl Into<String>, intervals: &[BarInterval]) -> Self {
        let requested: &[BarInterval] = if intervals.is_empty() {
            &BarInterval::DEFAULT_SET
        } else {
            intervals
        };

        let mut series: Vec<(BarInterval, BarSeries)> = Vec::with_capacity(requested.len());
        for interval in requested {
            if series.iter().any(|(known, _)| known == interval) {
                continue;
            }
            series.push((*interval, BarSeries::new(interval.seconds())));
        }

        Self {
            symbol: symbol.into(),
            series,
            observers: Vec::new(),
        }
    }

    pub fn with_default_intervals(symbol: impl Into<String>) -> Self {
        Self::new(symbol, &[])
    }

    pub fn from_ticks<'a>(
        symbol: impl Into<String>,
        intervals: &[BarInterval],
        ticks: impl IntoIterator<Item = &'a Tick>,
    ) -> Self {
        let mut list = Self::new(symbol, intervals);
        for tick in ticks {
            list.consume(tick);
        }
        list
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn default_interval(&self) -> BarInterval {
        self.series
            .first()
            .map(|(interval, _)| *interval)
            .unwrap_or(BarInterval::DEFAULT_SET[0])
    }

    pub fn intervals(&self) -> impl Iterator<Item = BarInterval> + '_ {
        self.series.iter().map(|(interval, _)| *interval)
    }

    pub fn series(&self, interval: BarInterval) -> Option<&BarSeries> {
        self.series
            .iter()
            .find(|(known, _)| *known == interval)
            .map(|(_, series)| series)
    }

    pub fn on_new_bar(&mut self, observer: impl FnMut(&str, BarInterval) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Folds a tick into every interval. Returns true if any interval
    /// started a new bar.
    pub fn consume(&mut self, tick: &Tick) -> bool {
        if !tick.is_trade() {
            return false;
        }
        if self.symbol.is_empty() {
            self.symbol = tick.symbol.clone();
        } else if tick.symbol != self.symbol {
            return false;
        }

        let mut any_started = false;
        for (interval, series) in self.series.iter_mut() {
            if !series.blend(tick) {
                continue;
            }
            any_started = true;
            for observer in self.observers.iter_mut() {
                observer(&self.symbol, *interval);
            }
        }
        any_started
    }

    pub fn reset(&mut self) {
        for (_, series) in self.series.iter_mut() {
            series.reset();
        }
    }

    pub fn count(&self) -> usize {
        self.count_in(self.default_interval())
    }

    pub fn count_in(&self, interval: BarInterval) -> usize {
        self.series(interval).map_or(0, BarSeries::count)
    }

    pub fn has(&self, bars: usize) -> bool {
        self.has_in(bars, self.default_interval())
    }

    pub fn has_in(&self, bars: usize, interval: BarInterval) -> bool {
        self.series(interval).is_some_and(|series| series.has(bars))
    }

    pub fn last_index(&self) -> Option<usize> {
        self.series(self.default_interval())
            .and_then(BarSeries::last_index)
    }

    pub fn bar(&self, index: usize) -> Bar {
        self.bar_in(index, self.default_interval())
    }

    pub fn bar_in(&self, index: usize, interval: BarInterval) -> Bar {
        self.series(interval)
            .map_or(Bar::EMPTY, |series| series.bar(index))
    }

    pub fn recent(&self) -> Bar {
        self.recent_in(self.default_interval())
    }

    pub fn recent_in(&self, interval: BarInterval) -> Bar {
        self.series(interval).map_or(Bar::EMPTY, BarSeries::recent)
    }

    pub fn is_recent_new(&self) -> bool {
        self.is_recent_new_in(self.default_interval())
    }

    pub fn is_recent_new_in(&self, interval: BarInterval) -> bool {
        self.series(interval)
            .is_some_and(BarSeries::is_recent_new)
    }
}
