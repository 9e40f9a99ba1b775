use std::num::NonZeroUsize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// One task at a time, in submission order.
    Sequential,
    #[default]
    Parallel,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub max_in_flight: usize,
    pub mode: ExecutionMode,
}

impl RuntimeConfig {
    pub fn sequential() -> Self {
        Self {
            max_in_flight: 1,
            mode: ExecutionMode::Sequential,
        }
    }

    pub fn parallel(max_in_flight: usize) -> Self {
        Self {
            max_in_flight: max_in_flight.max(1),
            mode: ExecutionMode::Parallel,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::parallel(default_parallelism())
    }
}

pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
