//! Deterministic in-memory worker control for tests.
//!
//! Records every command it receives and can be armed to fail a specific
//! command, which is how the fatal paths of the engine are exercised.

use super::{WorkDescriptor, WorkerControl, WorkerHandle};
use crate::core::state::ProcId;
use crate::error::{SchedError, WorkerOp};
use slotmap::SlotMap;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerCommand {
    Spawn(ProcId),
    Resume(ProcId),
    Suspend(ProcId),
    Terminate(ProcId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FakeState {
    Suspended,
    Running,
    Terminated,
}

#[derive(Debug)]
struct FakeWorker {
    job: ProcId,
    state: FakeState,
}

#[derive(Debug, Default)]
pub struct FakeWorkers {
    workers: SlotMap<WorkerHandle, FakeWorker>,
    log: Vec<WorkerCommand>,
    peak_running: usize,
    fail_spawn: Option<ProcId>,
    fail_control: Option<(WorkerOp, ProcId)>,
}

impl FakeWorkers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the spawn of `job` fail.
    pub fn fail_spawn_of(mut self, job: ProcId) -> Self {
        self.fail_spawn = Some(job);
        self
    }

    /// Make the next `op` issued against `job`'s worker fail.
    pub fn fail_next(mut self, op: WorkerOp, job: ProcId) -> Self {
        self.fail_control = Some((op, job));
        self
    }

    pub fn commands(&self) -> &[WorkerCommand] {
        &self.log
    }

    /// Highest number of simultaneously running workers ever observed.
    pub fn peak_running(&self) -> usize {
        self.peak_running
    }

    pub fn live_count(&self) -> usize {
        self.workers
            .values()
            .filter(|w| w.state != FakeState::Terminated)
            .count()
    }

    fn control(
        &mut self,
        handle: WorkerHandle,
        op: WorkerOp,
        next: FakeState,
    ) -> Result<(), SchedError> {
        let worker = self
            .workers
            .get_mut(handle)
            .ok_or_else(|| SchedError::worker_control(handle, op, "unknown handle"))?;
        if worker.state == FakeState::Terminated {
            return Err(SchedError::worker_control(handle, op, "worker already terminated"));
        }
        if self.fail_control == Some((op, worker.job)) {
            self.fail_control = None;
            return Err(SchedError::worker_control(handle, op, "injected failure"));
        }

        worker.state = next;
        let job = worker.job;
        self.log.push(match op {
            WorkerOp::Resume => WorkerCommand::Resume(job),
            WorkerOp::Suspend => WorkerCommand::Suspend(job),
            WorkerOp::Terminate => WorkerCommand::Terminate(job),
        });
        self.peak_running = self.peak_running.max(self.running_count());
        Ok(())
    }
}

impl WorkerControl for FakeWorkers {
    fn spawn(&mut self, work: WorkDescriptor) -> Result<WorkerHandle, SchedError> {
        if self.fail_spawn == Some(work.job) {
            return Err(SchedError::WorkerSpawn {
                job: work.job,
                source: io::Error::other("injected spawn failure"),
            });
        }
        self.log.push(WorkerCommand::Spawn(work.job));
        Ok(self.workers.insert(FakeWorker {
            job: work.job,
            state: FakeState::Suspended,
        }))
    }

    fn resume(&mut self, handle: WorkerHandle) -> Result<(), SchedError> {
        self.control(handle, WorkerOp::Resume, FakeState::Running)
    }

    fn suspend(&mut self, handle: WorkerHandle) -> Result<(), SchedError> {
        self.control(handle, WorkerOp::Suspend, FakeState::Suspended)
    }

    fn terminate(&mut self, handle: WorkerHandle) -> Result<(), SchedError> {
        self.control(handle, WorkerOp::Terminate, FakeState::Terminated)
    }

    fn running_count(&self) -> usize {
        self.workers
            .values()
            .filter(|w| w.state == FakeState::Running)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn double_suspend_matches_single_suspend() {
        let mut once = FakeWorkers::new();
        let mut twice = FakeWorkers::new();
        let a = once.spawn(WorkDescriptor::new(1, Duration::ZERO)).unwrap();
        let b = twice.spawn(WorkDescriptor::new(1, Duration::ZERO)).unwrap();
        once.resume(a).unwrap();
        twice.resume(b).unwrap();

        once.suspend(a).unwrap();
        twice.suspend(b).unwrap();
        twice.suspend(b).unwrap();

        assert_eq!(once.running_count(), twice.running_count());
        assert_eq!(once.live_count(), twice.live_count());
        assert_eq!(twice.running_count(), 0);
    }

    #[test]
    fn injected_failure_fires_once() {
        let mut workers = FakeWorkers::new().fail_next(WorkerOp::Resume, 2);
        let h = workers.spawn(WorkDescriptor::new(2, Duration::ZERO)).unwrap();
        assert!(workers.resume(h).is_err());
        assert!(workers.resume(h).is_ok());
        assert_eq!(
            workers.commands(),
            &[WorkerCommand::Spawn(2), WorkerCommand::Resume(2)]
        );
    }

    #[test]
    fn terminated_worker_rejects_commands() {
        let mut workers = FakeWorkers::new();
        let h = workers.spawn(WorkDescriptor::new(1, Duration::ZERO)).unwrap();
        workers.terminate(h).unwrap();
        assert!(workers.suspend(h).is_err());
        assert_eq!(workers.live_count(), 0);
    }
}
