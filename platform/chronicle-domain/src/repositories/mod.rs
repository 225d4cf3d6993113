pub mod broker;
pub mod tick_source;
