use crate::value_objects::tick::Tick;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("failed to open tick source {name}: {reason}")]
    Open { name: String, reason: String },
    #[error("failed to read tick from {symbol}: {reason}")]
    Read { symbol: String, reason: String },
    #[error("invalid tick data for {symbol}: {reason}")]
    InvalidData { symbol: String, reason: String },
}

/// One instrument's archive. Yields ticks in non-decreasing time order and
/// an invalid tick once nothing is left.
pub trait TickSource {
    fn symbol(&self) -> &str;

    fn next_tick(&mut self) -> Result<Tick, SourceError>;

    /// Size of the underlying archive, used to estimate total tick counts.
    fn byte_len(&self) -> u64;
}

/// Restricts which instruments a collection opens. An empty list admits all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFilter {
    pub symbols: Vec<String>,
}

impl SourceFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }

    pub fn admits(&self, symbol: &str) -> bool {
        self.symbols.is_empty()
            || self
                .symbols
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(symbol))
    }
}

pub trait SourceCollection {
    /// Human readable location of the collection, for logs.
    fn describe(&self) -> String;

    fn open(&self, filter: &SourceFilter) -> Result<Vec<Box<dyn TickSource>>, SourceError>;
}

impl<T: SourceCollection + ?Sized> SourceCollection for &T {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn open(&self, filter: &SourceFilter) -> Result<Vec<Box<dyn TickSource>>, SourceError> {
        (**self).open(filter)
    }
}
