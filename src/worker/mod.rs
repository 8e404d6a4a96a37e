//! Worker control capability.
//!
//! A worker is the independently scheduled unit standing in for a simulated
//! job. The engine only ever talks to workers through [`WorkerControl`], so
//! any primitive that can park and unpark a unit of work satisfies it as long
//! as `suspend` is idempotent and callers issue stop-before-resume.

pub mod fake;
pub mod thread;

pub use fake::{FakeWorkers, WorkerCommand};
pub use thread::ThreadWorkers;

use crate::core::state::ProcId;
use crate::error::SchedError;
use slotmap::new_key_type;
use std::time::Duration;

new_key_type! {
    pub struct WorkerHandle;
}

/// What a freshly spawned worker should do once resumed.
#[derive(Debug, Clone)]
pub struct WorkDescriptor {
    pub job: ProcId,
    /// Wall-clock pause between two work units.
    pub unit: Duration,
}

impl WorkDescriptor {
    pub fn new(job: ProcId, unit: Duration) -> Self {
        Self { job, unit }
    }
}

pub trait WorkerControl {
    /// Create a worker in the suspended state. It performs no work until
    /// resumed.
    fn spawn(&mut self, work: WorkDescriptor) -> Result<WorkerHandle, SchedError>;

    fn resume(&mut self, handle: WorkerHandle) -> Result<(), SchedError>;

    /// Suspending an already suspended worker is a no-op.
    fn suspend(&mut self, handle: WorkerHandle) -> Result<(), SchedError>;

    fn terminate(&mut self, handle: WorkerHandle) -> Result<(), SchedError>;

    /// Number of workers currently allowed to make progress.
    fn running_count(&self) -> usize;
}

impl<W: WorkerControl + ?Sized> WorkerControl for &mut W {
    fn spawn(&mut self, work: WorkDescriptor) -> Result<WorkerHandle, SchedError> {
        (**self).spawn(work)
    }

    fn resume(&mut self, handle: WorkerHandle) -> Result<(), SchedError> {
        (**self).resume(handle)
    }

    fn suspend(&mut self, handle: WorkerHandle) -> Result<(), SchedError> {
        (**self).suspend(handle)
    }

    fn terminate(&mut self, handle: WorkerHandle) -> Result<(), SchedError> {
        (**self).terminate(handle)
    }

    fn running_count(&self) -> usize {
        (**self).running_count()
    }
}
