use crate::entities::sizing::SizingPolicy;
use crate::value_objects::order::Order;
use crate::value_objects::position::Position;

/// Turns a desired position delta into a bounded order.
///
/// Policies apply in order: small requests become position multipliers
/// normalized to the minimum unit, an order may flatten a position but never
/// flip it, and the combined position is capped.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionSizer {
    policy: SizingPolicy,
}

impl PositionSizer {
    pub fn new(policy: SizingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SizingPolicy {
        &self.policy
    }

    pub fn adjust(&self, position: &Position, requested: i64, label: &str) -> Order {
        if requested == 0 {
            return Order::none();
        }

        let current = position.size;
        let mut size = requested;
        if self.policy.is_multiplier(size) {
            size = self.policy.normalize_multiplier(current, size);
        }
        size = no_crossing_flat(current, size);
        size = self.policy.cap(current, size);

        if size == 0 {
            return Order::none();
        }
        Order::new(position.symbol.clone(), size, label)
    }
}

/// Clamps an order that would flip a non-flat position to one that flattens it.
pub fn no_crossing_flat(current: i64, size: i64) -> i64 {
    if current == 0 {
        return size;
    }
    let combined = current.saturating_add(size);
    if combined != 0 && combined.signum() != current.signum() {
        return -current;
    }
    size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::side::Side;

    fn sizer() -> PositionSizer {
        PositionSizer::new(SizingPolicy::default())
    }

    #[test]
    fn zero_request_is_noop_for_any_position() {
        for size in [-500, 0, 500] {
            let order = sizer().adjust(&Position::new("IBM", size), 0, "noop");
            assert!(order.is_noop());
            assert_eq!(order.side(), None);
        }
    }

    #[test]
    fn reversal_is_clamped_to_flatten() {
        let order = sizer().adjust(&Position::new("IBM", 50), -80, "exit");
        assert_eq!(order.size, -50);
        assert_eq!(order.symbol, "IBM");
        assert_eq!(order.label, "exit");

        let order = sizer().adjust(&Position::new("IBM", -200), 500, "cover");
        assert_eq!(order.size, 200);
    }

    #[test]
    fn combined_position_is_capped() {
        let order = sizer().adjust(&Position::new("IBM", 900), 300, "add");
        assert_eq!(order.size, 100);
    }

    #[test]
    fn small_request_scales_current_position() {
        let order = sizer().adjust(&Position::new("IBM", 40), 2, "double");
        assert!(order.size >= SizingPolicy::default().min_size);
        assert_eq!(order.size, 100);

        let order = sizer().adjust(&Position::new("IBM", 300), 2, "double");
        assert_eq!(order.size, 600);
    }

    #[test]
    fn small_request_from_flat_opens_one_unit() {
        let order = sizer().adjust(&Position::flat("IBM"), -1, "short");
        assert_eq!(order.size, -100);
    }

    #[test]
    fn multiplier_reversal_still_only_flattens() {
        let order = sizer().adjust(&Position::new("IBM", 50), -3, "exit");
        assert_eq!(order.size, -50);
    }

    #[test]
    fn position_over_cap_yields_noop_for_adds() {
        let order = sizer().adjust(&Position::new("IBM", 1200), 50, "add");
        assert!(order.is_noop());
    }

    #[test]
    fn position_over_cap_keeps_trims_as_requested() {
        let order = sizer().adjust(&Position::new("IBM", 1200), -50, "trim");
        assert_eq!(order.size, -50);
        assert_eq!(order.side(), Some(Side::Sell));
    }

    #[test]
    fn no_crossing_flat_passes_through_safe_orders() {
        assert_eq!(no_crossing_flat(0, -300), -300);
        assert_eq!(no_crossing_flat(100, -100), -100);
        assert_eq!(no_crossing_flat(100, 50), 50);
        assert_eq!(no_crossing_flat(-100, 250), 100);
    }
}
