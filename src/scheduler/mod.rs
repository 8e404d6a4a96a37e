pub mod round_robin;

use crate::core::state::{ProcIdx, SchedCtx, Ticks};
use crate::error::SchedError;
pub use round_robin::RoundRobin;

pub const DEFAULT_QUANTUM: Ticks = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueReason {
    /// First admission after arrival
    Arrival,
    /// Slice expired with work left
    Preempted,
}

/// A PCB picked to run next and how long it may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub idx: ProcIdx,
    pub slice: Ticks,
}

/// Selection policy. The engine owns the state and calls into the policy to
/// queue a Ready PCB or to pick the next one.
pub trait Scheduler {
    fn enqueue(
        &mut self,
        ctx: &mut SchedCtx,
        idx: ProcIdx,
        reason: EnqueueReason,
    ) -> Result<(), SchedError>;

    // None leaves the CPU idle
    fn dispatch(&mut self, ctx: &mut SchedCtx) -> Option<Dispatch>;
}
