use crate::core::{ProcId, Ticks};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedEvent {
    Admitted {
        pid: ProcId,
    },
    // Slice expired with work left
    Preempted {
        pid: ProcId,
        ran: Ticks,
        remaining: Ticks,
    },
    Finished {
        pid: ProcId,
        ran: Ticks,
        at: Ticks,
    },
    Dispatched {
        pid: ProcId,
        slice: Ticks,
    },
    // Ready queue empty after selection
    CpuIdle,
    // Idle clock moved forward to the next arrival
    ClockJump {
        from: Ticks,
        to: Ticks,
    },
}
