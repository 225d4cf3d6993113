pub mod config;
pub mod replay;
mod shared;
pub mod sizing;
pub mod validation;
