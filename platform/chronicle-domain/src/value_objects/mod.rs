pub mod bar;
pub mod bar_interval;
pub mod order;
pub mod position;
pub mod side;
pub mod tick;
