use super::{
    event::SchedEvent,
    observer::Observer,
    state::{Pcb, ProcIdx, ProcState, SchedCtx, Ticks},
};
use crate::error::SchedError;
use crate::scheduler::{Dispatch, EnqueueReason, Scheduler};
use crate::worker::WorkerControl;
use tracing::{debug, info, warn};

/// The scheduling engine. Owns the PCB registry, the ready queue (through
/// `ctx`), the selection policy and the worker control capability.
pub struct SchedCore<S: Scheduler, W: WorkerControl> {
    pub ctx: SchedCtx,
    pub scheduler: S,
    workers: W,
    observer: Observer,
}

impl<S: Scheduler, W: WorkerControl> SchedCore<S, W> {
    /// `pcbs` must already be bound to suspended workers owned by `workers`.
    pub fn new(pcbs: Vec<Pcb>, scheduler: S, workers: W) -> Self {
        Self {
            ctx: SchedCtx::new(pcbs),
            scheduler,
            workers,
            observer: Observer::new(),
        }
    }

    /// One full dispatch cycle: admission, preemption accounting, selection.
    ///
    /// Any worker control failure aborts the cycle and is returned as is;
    /// the engine state must not be driven further afterwards.
    pub fn on_quantum_expired(&mut self) -> Result<Vec<SchedEvent>, SchedError> {
        let mut events = Vec::new();

        self.admit_arrivals(&mut events)?;

        if let Some(idx) = self.ctx.current.take() {
            self.preempt(idx, &mut events)?;
        }

        self.select(&mut events)?;

        self.observer.observe(&self.ctx);
        debug!(
            cycle = self.observer.cycles(),
            now = self.ctx.now,
            running = ?self.ctx.current.map(|idx| self.ctx.pcb(idx).id),
            queued = self.ctx.ready.len(),
            "dispatch cycle complete"
        );
        Ok(events)
    }

    // Ascending index order, so simultaneous arrivals keep input order
    fn admit_arrivals(&mut self, events: &mut Vec<SchedEvent>) -> Result<(), SchedError> {
        let now = self.ctx.now;
        for idx in 0..self.ctx.pcbs.len() {
            let pcb = self.ctx.pcb(idx);
            if pcb.state != ProcState::Ready || pcb.in_queue || !pcb.has_arrived(now) {
                continue;
            }
            let pid = pcb.id;
            self.scheduler
                .enqueue(&mut self.ctx, idx, EnqueueReason::Arrival)?;
            self.ctx.pcb_mut(idx).in_queue = true;
            events.push(SchedEvent::Admitted { pid });
        }
        Ok(())
    }

    fn preempt(&mut self, idx: ProcIdx, events: &mut Vec<SchedEvent>) -> Result<(), SchedError> {
        let handle = self.ctx.pcb(idx).worker;
        self.workers.suspend(handle)?;

        let slice = self.ctx.pcb(idx).slice;
        self.charge_waiters(idx, slice);

        let pcb = self.ctx.pcb_mut(idx);
        debug_assert!(slice <= pcb.remaining_time);
        pcb.remaining_time -= slice;
        let (pid, remaining) = (pcb.id, pcb.remaining_time);
        self.ctx.advance_time(slice);

        if remaining == 0 {
            self.ctx.mark_finished(idx);
            self.workers.terminate(handle)?;

            let pcb = self.ctx.pcb(idx);
            info!(
                pid,
                finish = self.ctx.now,
                turnaround = pcb.turnaround_time,
                waiting = pcb.waiting_time,
                "process finished"
            );
            events.push(SchedEvent::Finished {
                pid,
                ran: slice,
                at: self.ctx.now,
            });
        } else {
            self.ctx.mark_ready(idx);
            events.push(SchedEvent::Preempted {
                pid,
                ran: slice,
                remaining,
            });

            // Arrivals coincident with this tick queue ahead of the preempted job
            self.admit_arrivals(events)?;
            self.scheduler
                .enqueue(&mut self.ctx, idx, EnqueueReason::Preempted)?;
        }
        Ok(())
    }

    // Uniform approximation; overwritten by the exact value on completion
    fn charge_waiters(&mut self, running: ProcIdx, slice: Ticks) {
        let started = self.ctx.now;
        for (idx, pcb) in self.ctx.pcbs.iter_mut().enumerate() {
            if idx != running && pcb.state == ProcState::Ready && pcb.has_arrived(started) {
                pcb.waiting_time += slice;
            }
        }
    }

    fn select(&mut self, events: &mut Vec<SchedEvent>) -> Result<(), SchedError> {
        match self.scheduler.dispatch(&mut self.ctx) {
            Some(Dispatch { idx, slice }) => {
                self.ctx.set_running(idx, slice);
                let pcb = self.ctx.pcb(idx);
                let (pid, handle) = (pcb.id, pcb.worker);
                self.workers.resume(handle)?;
                debug!(pid, slice, now = self.ctx.now, "dispatched");
                events.push(SchedEvent::Dispatched { pid, slice });
            }
            None => {
                self.ctx.current = None;
                events.push(SchedEvent::CpuIdle);

                if let Some(next) = self.ctx.next_arrival() {
                    let from = self.ctx.now;
                    self.ctx.now = next;
                    debug!(from, to = next, "cpu idle until next arrival");
                    events.push(SchedEvent::ClockJump { from, to: next });
                }
            }
        }
        Ok(())
    }

    /// Terminate every worker whose PCB has not finished. Finished PCBs had
    /// their worker terminated on completion.
    pub fn shutdown(&mut self) {
        for pcb in self
            .ctx
            .pcbs
            .iter()
            .filter(|pcb| pcb.state != ProcState::Finished)
        {
            if let Err(err) = self.workers.terminate(pcb.worker) {
                warn!(pid = pcb.id, %err, "failed to terminate worker during shutdown");
            }
        }
        self.ctx.current = None;
    }

    pub fn all_finished(&self) -> bool {
        self.ctx.all_finished()
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn cycles(&self) -> u64 {
        self.observer.cycles()
    }

    pub fn workers(&self) -> &W {
        &self.workers
    }
}
