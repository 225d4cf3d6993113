use crate::value_objects::tick::Tick;

/// Simulated order broker driven by released ticks.
pub trait Broker {
    /// Matches resting orders against the tick and returns the number of fills.
    fn execute(&mut self, tick: &Tick) -> u32;

    fn reset(&mut self);
}

/// Broker that never fills. Used when a replay only feeds bars.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBroker;

impl Broker for NullBroker {
    fn execute(&mut self, _tick: &Tick) -> u32 {
        0
    }

    fn reset(&mut self) {}
}
