use crate::value_objects::side::Side;
use serde::{Deserialize, Serialize};

/// Signed order: positive buys, negative sells, zero does nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Order {
    pub symbol: String,
    pub size: i64,
    pub label: String,
}

impl Order {
    pub fn new(symbol: impl Into<String>, size: i64, label: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            size,
            label: label.into(),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_noop(&self) -> bool {
        self.size == 0
    }

    pub fn side(&self) -> Option<Side> {
        Side::of(self.size)
    }

    pub fn quantity(&self) -> u64 {
        self.size.unsigned_abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_is_recovered_from_sign() {
        assert_eq!(Order::new("IBM", 100, "").side(), Some(Side::Buy));
        assert_eq!(Order::new("IBM", -100, "").side(), Some(Side::Sell));
        assert_eq!(Order::none().side(), None);
        assert!(Order::none().is_noop());
        assert_eq!(Order::new("IBM", -300, "exit").quantity(), 300);
    }
}
