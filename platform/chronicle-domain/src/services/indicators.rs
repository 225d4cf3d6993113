use crate::services::bars::BarSeries;
use rust_decimal::Decimal;

/// Simple moving average of the last `bars_back` closes.
///
/// Falls back to the most recent close while the series is shorter than the
/// window, so callers never read past the start of history.
pub fn bar_sma(series: &BarSeries, bars_back: usize) -> Decimal {
    if bars_back == 0 || !series.has(bars_back) {
        return series.recent().close;
    }
    let start = series.count() - bars_back;
    let sum: Decimal = series.iter().skip(start).map(|bar| bar.close).sum();
    sum / Decimal::from(bars_back as u64)
}
