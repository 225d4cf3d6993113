use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TickError {
    #[error("malformed tick date {date} for {symbol}")]
    MalformedDate { symbol: String, date: i32 },
    #[error("malformed tick time {time}.{millis:03} for {symbol}")]
    MalformedTime {
        symbol: String,
        time: i32,
        millis: u16,
    },
}

/// One trade or quote event. `date` is `YYYYMMDD`, `time` is `HHMMSS`.
///
/// A zero `trade` price marks a quote or heartbeat rather than a trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub symbol: String,
    pub trade: Decimal,
    pub size: i64,
    pub date: i32,
    pub time: i32,
    pub millis: u16,
    pub is_index: bool,
    pub valid: bool,
}

impl Tick {
    pub fn new_trade(
        symbol: impl Into<String>,
        date: i32,
        time: i32,
        price: Decimal,
        size: i64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            trade: price,
            size,
            date,
            time,
            millis: 0,
            is_index: false,
            valid: true,
        }
    }

    pub fn new_index(symbol: impl Into<String>, date: i32, time: i32, value: Decimal) -> Self {
        Self {
            is_index: true,
            ..Self::new_trade(symbol, date, time, value, 0)
        }
    }

    /// Exhaustion sentinel returned by sources with nothing left to read.
    pub fn invalid() -> Self {
        Self {
            symbol: String::new(),
            trade: Decimal::ZERO,
            size: 0,
            date: 0,
            time: 0,
            millis: 0,
            is_index: false,
            valid: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_trade(&self) -> bool {
        !self.trade.is_zero()
    }

    pub fn elapsed_seconds(&self) -> i64 {
        let time = i64::from(self.time);
        let hours = time / 10_000;
        let minutes = (time / 100) % 100;
        let seconds = time % 100;
        hours * 3600 + minutes * 60 + seconds
    }

    pub fn timestamp(&self) -> Result<NaiveDateTime, TickError> {
        let malformed_date = || TickError::MalformedDate {
            symbol: self.symbol.clone(),
            date: self.date,
        };
        let malformed_time = || TickError::MalformedTime {
            symbol: self.symbol.clone(),
            time: self.time,
            millis: self.millis,
        };

        if self.date <= 0 {
            return Err(malformed_date());
        }
        let month = u32::try_from((self.date / 100) % 100).map_err(|_| malformed_date())?;
        let day = u32::try_from(self.date % 100).map_err(|_| malformed_date())?;
        let date =
            NaiveDate::from_ymd_opt(self.date / 10_000, month, day).ok_or_else(malformed_date)?;

        let raw = u32::try_from(self.time).map_err(|_| malformed_time())?;
        let time = NaiveTime::from_hms_milli_opt(
            raw / 10_000,
            (raw / 100) % 100,
            raw % 100,
            u32::from(self.millis),
        )
        .ok_or_else(malformed_time)?;

        Ok(date.and_time(time))
    }
}
