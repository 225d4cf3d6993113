use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Multiplier applied to the date in a bucket id. Larger than the 86_400
/// one-second buckets a day can hold, so ids keep increasing across days.
pub const BUCKETS_PER_DAY_FACTOR: i64 = 100_000;

/// Open of a freshly started bar; replaced by the first trade.
pub const UNSET_OPEN: Decimal = Decimal::ZERO;
/// High of a freshly started bar; any positive trade raises it.
pub const UNSET_HIGH: Decimal = Decimal::ZERO;
/// Low of a freshly started bar; any trade lowers it.
pub const UNSET_LOW: Decimal = Decimal::MAX;

pub fn bucket_id(date: i32, elapsed_seconds: i64, interval_seconds: u32) -> i64 {
    let interval = i64::from(interval_seconds.max(1));
    i64::from(date) * BUCKETS_PER_DAY_FACTOR + elapsed_seconds.div_euclid(interval)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
    pub date: i32,
    pub time: i32,
    pub is_new: bool,
}

impl Bar {
    /// Returned for any index that does not address an existing bar.
    pub const EMPTY: Bar = Bar {
        open: Decimal::ZERO,
        high: Decimal::ZERO,
        low: Decimal::ZERO,
        close: Decimal::ZERO,
        volume: 0,
        date: 0,
        time: 0,
        is_new: false,
    };

    pub fn started(date: i32, time: i32) -> Self {
        Self {
            open: UNSET_OPEN,
            high: UNSET_HIGH,
            low: UNSET_LOW,
            close: Decimal::ZERO,
            volume: 0,
            date,
            time,
            is_new: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    pub fn blend(&mut self, price: Decimal, size: i64, is_index: bool) {
        if self.open == UNSET_OPEN {
            self.open = price;
        }
        if price > self.high {
            self.high = price;
        }
        if price < self.low {
            self.low = price;
        }
        self.close = price;
        if !is_index {
            self.volume += size;
        }
    }

    pub fn is_sane(&self) -> bool {
        self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}
