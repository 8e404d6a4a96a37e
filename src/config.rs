use crate::core::state::Ticks;
use crate::scheduler::DEFAULT_QUANTUM;
use crate::sim::job::{Job, reference_workload};
use std::time::Duration;

/// Everything a run needs. The defaults reproduce the reference scenario.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub jobs: Vec<Job>,
    pub quantum: Ticks,
    /// Wall-clock length of one simulated tick. The quantum timer fires every
    /// `quantum * tick` and workers log one work unit per tick.
    pub tick: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            jobs: reference_workload(),
            quantum: DEFAULT_QUANTUM,
            tick: Duration::from_millis(100),
        }
    }
}

impl SimConfig {
    pub fn quantum_period(&self) -> Duration {
        self.tick
            .saturating_mul(u32::try_from(self.quantum).unwrap_or(u32::MAX))
    }
}
