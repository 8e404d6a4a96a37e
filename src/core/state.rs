use super::queue::ReadyQueue;
use crate::worker::WorkerHandle;

// Index into the PCB Vec
pub type ProcIdx = usize;
pub type ProcId = u64;
pub type Ticks = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcState {
    Ready,
    Running,
    Finished,
}

#[derive(Debug, Clone)]
pub struct Pcb {
    pub id: ProcId,
    pub worker: WorkerHandle,
    pub state: ProcState,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub remaining_time: Ticks,
    pub finish_time: Option<Ticks>,
    pub waiting_time: Ticks,
    pub turnaround_time: Ticks,
    /// Set on admission, cleared on completion.
    pub in_queue: bool,
    /// Duration granted at the latest dispatch
    pub slice: Ticks,
}

impl Pcb {
    pub fn new(id: ProcId, arrival_time: Ticks, burst_time: Ticks, worker: WorkerHandle) -> Self {
        Self {
            id,
            worker,
            state: ProcState::Ready,
            arrival_time,
            burst_time,
            remaining_time: burst_time,
            finish_time: None,
            waiting_time: 0,
            turnaround_time: 0,
            in_queue: false,
            slice: 0,
        }
    }

    pub fn has_arrived(&self, now: Ticks) -> bool {
        self.arrival_time <= now
    }
}

/// Read-only projection used for the per-tick status view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcbSnapshot {
    pub id: ProcId,
    pub state: ProcState,
    pub remaining_time: Ticks,
    pub waiting_time: Ticks,
}

impl From<&Pcb> for PcbSnapshot {
    fn from(pcb: &Pcb) -> Self {
        Self {
            id: pcb.id,
            state: pcb.state,
            remaining_time: pcb.remaining_time,
            waiting_time: pcb.waiting_time,
        }
    }
}

#[derive(Debug)]
pub struct SchedCtx {
    pub now: Ticks,
    pub current: Option<ProcIdx>,
    pub pcbs: Vec<Pcb>,
    pub ready: ReadyQueue,
}

impl SchedCtx {
    pub fn new(pcbs: Vec<Pcb>) -> Self {
        let ready = ReadyQueue::with_capacity(pcbs.len());
        Self {
            now: 0,
            current: None,
            pcbs,
            ready,
        }
    }

    pub fn pcb(&self, idx: ProcIdx) -> &Pcb {
        &self.pcbs[idx]
    }

    pub fn pcb_mut(&mut self, idx: ProcIdx) -> &mut Pcb {
        &mut self.pcbs[idx]
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    pub fn all_finished(&self) -> bool {
        self.pcbs.iter().all(|pcb| pcb.state == ProcState::Finished)
    }

    /// Earliest arrival among PCBs that have not arrived yet.
    pub fn next_arrival(&self) -> Option<Ticks> {
        self.pcbs
            .iter()
            .filter(|pcb| pcb.state == ProcState::Ready && !pcb.has_arrived(self.now))
            .map(|pcb| pcb.arrival_time)
            .min()
    }

    pub fn snapshots(&self) -> Vec<PcbSnapshot> {
        self.pcbs.iter().map(PcbSnapshot::from).collect()
    }

    pub fn running_count(&self) -> usize {
        self.pcbs
            .iter()
            .filter(|pcb| pcb.state == ProcState::Running)
            .count()
    }

    pub fn set_running(&mut self, idx: ProcIdx, slice: Ticks) {
        debug_assert!(
            self.current.is_none(),
            "CPU already running P{}",
            self.current.map(|i| self.pcbs[i].id).unwrap_or_default()
        );
        debug_assert!(
            !self.ready.contains(idx),
            "Running PCB {idx} must not be enqueued"
        );

        let pcb = &mut self.pcbs[idx];
        debug_assert_eq!(pcb.state, ProcState::Ready, "P{} must be Ready", pcb.id);
        pcb.state = ProcState::Running;
        pcb.slice = slice;
        self.current = Some(idx);
    }

    pub fn mark_ready(&mut self, idx: ProcIdx) {
        let pcb = &mut self.pcbs[idx];
        debug_assert!(
            pcb.state != ProcState::Finished,
            "Finished P{} cannot become Ready",
            pcb.id
        );
        pcb.state = ProcState::Ready;
    }

    // Exact accounting overwrites whatever was charged incrementally
    pub fn mark_finished(&mut self, idx: ProcIdx) {
        let now = self.now;
        let pcb = &mut self.pcbs[idx];
        debug_assert_eq!(pcb.state, ProcState::Running, "P{} must be Running", pcb.id);
        debug_assert_eq!(pcb.remaining_time, 0, "P{} has work left", pcb.id);

        pcb.state = ProcState::Finished;
        pcb.in_queue = false;
        pcb.finish_time = Some(now);
        pcb.turnaround_time = now - pcb.arrival_time;
        pcb.waiting_time = pcb.turnaround_time - pcb.burst_time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn handles(n: usize) -> Vec<WorkerHandle> {
        let mut map = SlotMap::<WorkerHandle, ()>::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn new_pcb_starts_ready_and_unqueued() {
        let pcb = Pcb::new(7, 3, 4, handles(1)[0]);
        assert_eq!(pcb.state, ProcState::Ready);
        assert_eq!(pcb.remaining_time, 4);
        assert_eq!(pcb.finish_time, None);
        assert_eq!(pcb.waiting_time, 0);
        assert_eq!(pcb.turnaround_time, 0);
        assert!(!pcb.in_queue);
        assert!(!pcb.has_arrived(2));
        assert!(pcb.has_arrived(3));
    }

    #[test]
    fn finishing_applies_exact_formulas() {
        let mut ctx = SchedCtx::new(vec![Pcb::new(1, 2, 3, handles(1)[0])]);
        ctx.pcb_mut(0).in_queue = true;
        ctx.set_running(0, 3);
        ctx.pcb_mut(0).waiting_time = 99;
        ctx.pcb_mut(0).remaining_time = 0;
        ctx.now = 10;
        ctx.current = None;
        ctx.mark_finished(0);

        let pcb = ctx.pcb(0);
        assert_eq!(pcb.finish_time, Some(10));
        assert_eq!(pcb.turnaround_time, 8);
        assert_eq!(pcb.waiting_time, 5);
        assert!(!pcb.in_queue);
        assert!(ctx.all_finished());
    }

    #[test]
    fn next_arrival_ignores_arrived_jobs() {
        let h = handles(3);
        let mut ctx = SchedCtx::new(vec![
            Pcb::new(1, 0, 1, h[0]),
            Pcb::new(2, 9, 1, h[1]),
            Pcb::new(3, 5, 1, h[2]),
        ]);
        assert_eq!(ctx.next_arrival(), Some(5));
        ctx.now = 5;
        assert_eq!(ctx.next_arrival(), Some(9));
        ctx.now = 9;
        assert_eq!(ctx.next_arrival(), None);
    }
}
