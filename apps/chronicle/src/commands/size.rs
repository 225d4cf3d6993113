use chronicle_application::config::load_config;
use chronicle_application::sizing::size_order;
use chronicle_domain::value_objects::position::Position;
use std::path::PathBuf;

pub(super) fn run_size(
    config_path: PathBuf,
    symbol: &str,
    position: i64,
    delta: i64,
    label: &str,
) -> Result<(), String> {
    let config = load_config(&config_path)?;
    let order = size_order(&config, &Position::new(symbol, position), delta, label)?;
    let line = serde_json::json!({
        "symbol": symbol,
        "position": position,
        "requested": delta,
        "order": order,
        "resulting_position": position.saturating_add(order.size),
    });
    println!("{line}");
    Ok(())
}
