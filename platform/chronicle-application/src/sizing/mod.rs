use crate::config::Config;
use crate::shared::resolve_policy;
use chronicle_domain::services::sizing::PositionSizer;
use chronicle_domain::value_objects::order::Order;
use chronicle_domain::value_objects::position::Position;
use tracing::{debug, info_span};

pub fn build_sizer(config: &Config) -> Result<PositionSizer, String> {
    Ok(PositionSizer::new(resolve_policy(config)?))
}

/// Sizes one adjustment with the configured policy. Clamped requests are
/// counted so callers can spot how often policy rewrote intent.
pub fn size_order(
    config: &Config,
    position: &Position,
    requested: i64,
    label: &str,
) -> Result<Order, String> {
    let _span = info_span!(
        "size_order",
        run_id = %config.run.run_id,
        symbol = %position.symbol,
        position = position.size,
        requested
    )
    .entered();

    let sizer = build_sizer(config)?;
    let order = sizer.adjust(position, requested, label);
    if order.size != requested {
        metrics::counter!("chronicle.sizing.clamped_total").increment(1);
    }
    debug!(size = order.size, label = %order.label, "order sized");
    Ok(order)
}
