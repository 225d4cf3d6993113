use crate::value_objects::order::Order;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub size: i64,
}

impl Position {
    pub fn new(symbol: impl Into<String>, size: i64) -> Self {
        Self {
            symbol: symbol.into(),
            size,
        }
    }

    pub fn flat(symbol: impl Into<String>) -> Self {
        Self::new(symbol, 0)
    }

    pub fn is_flat(&self) -> bool {
        self.size == 0
    }

    pub fn is_long(&self) -> bool {
        self.size > 0
    }

    pub fn is_short(&self) -> bool {
        self.size < 0
    }

    /// Applies a filled order. Orders for other symbols are ignored.
    pub fn apply(&mut self, order: &Order) -> bool {
        if order.symbol != self.symbol {
            return false;
        }
        self.size += order.size;
        true
    }

    pub fn reset(&mut self) {
        self.size = 0;
    }
}
