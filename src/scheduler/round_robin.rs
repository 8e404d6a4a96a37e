use super::{DEFAULT_QUANTUM, Dispatch, EnqueueReason, Scheduler};
use crate::core::state::{ProcIdx, SchedCtx, Ticks};
use crate::error::SchedError;
use tracing::trace;

/// Plain Round-Robin: FIFO ready queue, fixed quantum, no priorities.
#[derive(Debug, Clone, Copy)]
pub struct RoundRobin {
    quantum: Ticks,
}

impl RoundRobin {
    pub fn new(quantum: Ticks) -> Self {
        assert!(quantum > 0, "Round-Robin requires a positive quantum");
        Self { quantum }
    }

    pub fn quantum(&self) -> Ticks {
        self.quantum
    }
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self::new(DEFAULT_QUANTUM)
    }
}

impl Scheduler for RoundRobin {
    fn enqueue(
        &mut self,
        ctx: &mut SchedCtx,
        idx: ProcIdx,
        reason: EnqueueReason,
    ) -> Result<(), SchedError> {
        trace!(pid = ctx.pcb(idx).id, ?reason, "enqueue at tail");
        ctx.ready.enqueue(idx)
    }

    fn dispatch(&mut self, ctx: &mut SchedCtx) -> Option<Dispatch> {
        let idx = ctx.ready.dequeue()?;
        let slice = ctx.pcb(idx).remaining_time.min(self.quantum);
        Some(Dispatch { idx, slice })
    }
}
