use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar-aligned bar lengths, measured in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BarInterval {
    Minute,
    FiveMin,
    FifteenMin,
    ThirtyMin,
    Hour,
    Day,
}

impl BarInterval {
    /// Registered when a bar list is built without explicit intervals.
    /// The first entry becomes the default interval.
    pub const DEFAULT_SET: [BarInterval; 6] = [
        BarInterval::FiveMin,
        BarInterval::Minute,
        BarInterval::Hour,
        BarInterval::ThirtyMin,
        BarInterval::FifteenMin,
        BarInterval::Day,
    ];

    pub fn minutes(self) -> u32 {
        match self {
            BarInterval::Minute => 1,
            BarInterval::FiveMin => 5,
            BarInterval::FifteenMin => 15,
            BarInterval::ThirtyMin => 30,
            BarInterval::Hour => 60,
            BarInterval::Day => 1440,
        }
    }

    pub fn seconds(self) -> u32 {
        self.minutes() * 60
    }

    pub fn label(self) -> &'static str {
        match self {
            BarInterval::Minute => "1min",
            BarInterval::FiveMin => "5min",
            BarInterval::FifteenMin => "15min",
            BarInterval::ThirtyMin => "30min",
            BarInterval::Hour => "1hour",
            BarInterval::Day => "1day",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        let normalized = value.trim().to_lowercase();
        match normalized.as_str() {
            "1m" | "1min" | "minute" => Ok(BarInterval::Minute),
            "5m" | "5min" => Ok(BarInterval::FiveMin),
            "15m" | "15min" => Ok(BarInterval::FifteenMin),
            "30m" | "30min" => Ok(BarInterval::ThirtyMin),
            "1h" | "1hour" | "60m" | "60min" | "hour" => Ok(BarInterval::Hour),
            "1d" | "1day" | "day" => Ok(BarInterval::Day),
            _ => Err(format!("unsupported bar interval: {value}")),
        }
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        match minutes {
            1 => Some(BarInterval::Minute),
            5 => Some(BarInterval::FiveMin),
            15 => Some(BarInterval::FifteenMin),
            30 => Some(BarInterval::ThirtyMin),
            60 => Some(BarInterval::Hour),
            1440 => Some(BarInterval::Day),
            _ => None,
        }
    }
}

impl fmt::Display for BarInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
