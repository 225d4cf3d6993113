pub mod bars;
pub mod engine;
pub mod indicators;
pub mod sizing;
pub mod tick_source;
