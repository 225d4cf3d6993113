use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingPolicy {
    /// Requests with a magnitude below this are read as position multipliers.
    pub multiplier_threshold: i64,
    pub min_size: i64,
    /// Largest absolute combined position. Zero or less disables the cap.
    pub max_position: i64,
}

impl Default for SizingPolicy {
    fn default() -> Self {
        Self {
            multiplier_threshold: 11,
            min_size: 100,
            max_position: 1000,
        }
    }
}

impl SizingPolicy {
    pub fn is_multiplier(&self, requested: i64) -> bool {
        requested.unsigned_abs() < self.multiplier_threshold.max(0).unsigned_abs()
    }

    /// Scales the current position by `multiplier` and rounds the magnitude
    /// up to a whole number of minimum units, never below one unit. A flat
    /// position takes the multiplier's sign.
    pub fn normalize_multiplier(&self, current: i64, multiplier: i64) -> i64 {
        let unit = self.min_size.max(1);
        let product = current.saturating_mul(multiplier);
        let sign = if product == 0 {
            multiplier.signum()
        } else {
            product.signum()
        };
        let magnitude = product.saturating_abs();
        let rounded = (magnitude.saturating_add(unit - 1) / unit).saturating_mul(unit);
        sign * rounded.max(unit)
    }

    pub fn allows_position(&self, combined: i64) -> bool {
        if self.max_position <= 0 {
            return true;
        }
        combined.saturating_abs() <= self.max_position
    }

    /// Truncates `size` so the combined position sits at the cap. Orders
    /// that do not add exposure pass through, and the result is never larger
    /// than `size`. Returns zero when truncation would reverse the order.
    pub fn cap(&self, current: i64, size: i64) -> i64 {
        let combined = current.saturating_add(size);
        let adds_exposure = combined.saturating_abs() > current.saturating_abs();
        if self.allows_position(combined) || !adds_exposure {
            return size;
        }
        let capped = combined.signum() * self.max_position - current;
        if capped.signum() != size.signum() {
            return 0;
        }
        capped
    }
}
