use crate::config::Config;
use chrono::{Duration, NaiveDateTime};
use chronicle_domain::entities::sizing::SizingPolicy;
use chronicle_domain::repositories::tick_source::SourceFilter;
use chronicle_domain::value_objects::bar_interval::BarInterval;

pub fn parse_duration_like(value: &str) -> Result<i64, String> {
    let trimmed = value.trim().to_lowercase();
    if trimmed.is_empty() {
        return Err("empty duration".to_string());
    }
    if let Ok(seconds) = trimmed.parse::<i64>() {
        return Ok(seconds);
    }

    let (number_part, unit) = if let Some(stripped) = trimmed.strip_suffix("min") {
        (stripped, "min")
    } else if let Some(stripped) = trimmed.strip_suffix("hour") {
        (stripped, "hour")
    } else if let Some(stripped) = trimmed.strip_suffix("day") {
        (stripped, "day")
    } else {
        let split = trimmed
            .char_indices()
            .last()
            .map(|(index, _)| index)
            .unwrap_or(0);
        trimmed.split_at(split)
    };

    let multiplier = match unit {
        "s" => 1,
        "m" | "min" => 60,
        "h" | "hour" => 3600,
        "d" | "day" => 86400,
        _ => return Err(format!("unsupported duration unit: {unit}")),
    };

    let number: i64 = number_part
        .parse()
        .map_err(|_| format!("invalid duration: {value}"))?;
    number
        .checked_mul(multiplier)
        .ok_or_else(|| format!("duration out of range: {value}"))
}

pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, String> {
    let trimmed = value.trim();
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| format!("invalid datetime (expected YYYY-MM-DD HH:MM:SS): {value}"))
}

pub fn resolve_step(config: &Config) -> Result<Duration, String> {
    let seconds = parse_duration_like(&config.replay.step)?;
    if seconds <= 0 {
        return Err("replay.step must be > 0".to_string());
    }
    Duration::try_seconds(seconds)
        .ok_or_else(|| format!("replay.step out of range: {}", config.replay.step))
}

pub fn resolve_until(config: &Config) -> Result<Option<NaiveDateTime>, String> {
    config
        .replay
        .until
        .as_deref()
        .map(parse_datetime)
        .transpose()
}

pub fn resolve_intervals(config: &Config) -> Result<Vec<BarInterval>, String> {
    let Some(labels) = config.bars.as_ref().and_then(|bars| bars.intervals.as_ref()) else {
        return Ok(BarInterval::DEFAULT_SET.to_vec());
    };
    labels
        .iter()
        .map(|label| BarInterval::parse(label))
        .collect()
}

pub fn resolve_time_bar_seconds(config: &Config) -> Result<Option<u32>, String> {
    match config.bars.as_ref().and_then(|bars| bars.time_bar_seconds) {
        Some(0) => Err("bars.time_bar_seconds must be > 0".to_string()),
        other => Ok(other),
    }
}

pub fn resolve_sma_window(config: &Config) -> Option<usize> {
    config
        .bars
        .as_ref()
        .and_then(|bars| bars.sma_window)
        .filter(|window| *window > 0)
}

pub fn resolve_filter(config: &Config) -> SourceFilter {
    config
        .sources
        .symbols
        .as_ref()
        .map(|symbols| SourceFilter::symbols(symbols.iter().cloned()))
        .unwrap_or_default()
}

pub fn resolve_policy(config: &Config) -> Result<SizingPolicy, String> {
    let defaults = SizingPolicy::default();
    let Some(sizing) = config.sizing.as_ref() else {
        return Ok(defaults);
    };
    let policy = SizingPolicy {
        multiplier_threshold: sizing
            .multiplier_threshold
            .unwrap_or(defaults.multiplier_threshold),
        min_size: sizing.min_size.unwrap_or(defaults.min_size),
        max_position: sizing.max_position.unwrap_or(defaults.max_position),
    };
    if policy.multiplier_threshold < 0 {
        return Err("sizing.multiplier_threshold must be >= 0".to_string());
    }
    if policy.min_size <= 0 {
        return Err("sizing.min_size must be > 0".to_string());
    }
    Ok(policy)
}
