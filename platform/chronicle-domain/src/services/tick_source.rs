use crate::repositories::tick_source::{SourceCollection, SourceError, SourceFilter, TickSource};
use crate::services::engine::simulator::AVERAGE_TICK_BYTES;
use crate::value_objects::tick::Tick;

/// In-memory tick source. Reports the byte volume an archive of the same
/// tick count would occupy.
#[derive(Debug, Clone)]
pub struct VecTickSource {
    symbol: String,
    ticks: Vec<Tick>,
    index: usize,
}

impl VecTickSource {
    pub fn new(symbol: impl Into<String>, ticks: Vec<Tick>) -> Self {
        Self {
            symbol: symbol.into(),
            ticks,
            index: 0,
        }
    }
}

impl TickSource for VecTickSource {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn next_tick(&mut self) -> Result<Tick, SourceError> {
        if self.index >= self.ticks.len() {
            return Ok(Tick::invalid());
        }
        let tick = self.ticks[self.index].clone();
        self.index += 1;
        Ok(tick)
    }

    fn byte_len(&self) -> u64 {
        self.ticks.len() as u64 * AVERAGE_TICK_BYTES
    }
}

/// Collection over in-memory sources; every `open` starts each source afresh.
#[derive(Debug, Clone, Default)]
pub struct VecSourceCollection {
    sources: Vec<VecTickSource>,
}

impl VecSourceCollection {
    pub fn new(sources: Vec<VecTickSource>) -> Self {
        Self { sources }
    }

    pub fn push(&mut self, source: VecTickSource) {
        self.sources.push(source);
    }
}

impl SourceCollection for VecSourceCollection {
    fn describe(&self) -> String {
        format!("memory ({} sources)", self.sources.len())
    }

    fn open(&self, filter: &SourceFilter) -> Result<Vec<Box<dyn TickSource>>, SourceError> {
        Ok(self
            .sources
            .iter()
            .filter(|source| filter.admits(&source.symbol))
            .map(|source| {
                Box::new(VecTickSource::new(
                    source.symbol.clone(),
                    source.ticks.clone(),
                )) as Box<dyn TickSource>
            })
            .collect())
    }
}
