use super::state::{ProcState, SchedCtx, Ticks};

#[derive(Debug, Default)]
pub struct Observer {
    cycles: u64,
    last_now: Ticks,
}

impl Observer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn observe(&mut self, ctx: &SchedCtx) {
        self.cycles += 1;

        debug_assert!(
            ctx.now >= self.last_now,
            "clock went backwards: {} -> {}",
            self.last_now,
            ctx.now
        );
        self.last_now = ctx.now;

        debug_assert!(
            ctx.running_count() <= 1,
            "{} PCBs Running at once",
            ctx.running_count()
        );
        if let Some(idx) = ctx.current {
            let pcb = ctx.pcb(idx);
            debug_assert_eq!(
                pcb.state,
                ProcState::Running,
                "current P{} must be Running",
                pcb.id
            );
            debug_assert!(
                pcb.slice > 0 && pcb.slice <= pcb.remaining_time,
                "P{} dispatched for {} with {} left",
                pcb.id,
                pcb.slice,
                pcb.remaining_time
            );
        }

        debug_assert!(ctx.ready.len() <= ctx.ready.capacity());
        for (pos, idx) in ctx.ready.iter().enumerate() {
            let pcb = ctx.pcb(idx);
            debug_assert_eq!(
                pcb.state,
                ProcState::Ready,
                "queued P{} must be Ready",
                pcb.id
            );
            debug_assert!(pcb.in_queue, "queued P{} lost its in_queue flag", pcb.id);
            debug_assert!(
                ctx.ready.iter().skip(pos + 1).all(|other| other != idx),
                "P{} queued twice",
                pcb.id
            );
        }

        for pcb in &ctx.pcbs {
            debug_assert!(pcb.remaining_time <= pcb.burst_time);
            if pcb.state == ProcState::Finished {
                debug_assert_eq!(pcb.remaining_time, 0, "finished P{} has work left", pcb.id);
                let finish = pcb.finish_time.unwrap_or_default();
                debug_assert_eq!(pcb.turnaround_time, finish - pcb.arrival_time);
                debug_assert_eq!(pcb.waiting_time, pcb.turnaround_time - pcb.burst_time);
            }
        }
    }
}
