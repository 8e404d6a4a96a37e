use super::{WorkDescriptor, WorkerControl, WorkerHandle};
use crate::error::{SchedError, WorkerOp};
use slotmap::SlotMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Suspended,
    Running,
    Terminated,
}

#[derive(Debug)]
struct Shared {
    gate: Mutex<Gate>,
    cv: Condvar,
    units: AtomicU64,
}

#[derive(Debug)]
struct WorkerThread {
    shared: Arc<Shared>,
    join: Option<JoinHandle<()>>,
}

/// One OS thread per worker, parked on a condvar while suspended.
#[derive(Debug, Default)]
pub struct ThreadWorkers {
    workers: SlotMap<WorkerHandle, WorkerThread>,
}

impl ThreadWorkers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Work units performed so far by `handle`, if it is still known.
    pub fn units(&self, handle: WorkerHandle) -> Option<u64> {
        self.workers
            .get(handle)
            .map(|w| w.shared.units.load(Ordering::Relaxed))
    }

    fn set_gate(&self, handle: WorkerHandle, op: WorkerOp, next: Gate) -> Result<(), SchedError> {
        let worker = self
            .workers
            .get(handle)
            .ok_or_else(|| SchedError::worker_control(handle, op, "unknown handle"))?;
        let mut gate = worker
            .shared
            .gate
            .lock()
            .map_err(|_| SchedError::worker_control(handle, op, "worker lock poisoned"))?;

        if *gate == Gate::Terminated {
            return Err(SchedError::worker_control(handle, op, "worker already terminated"));
        }
        if worker.join.as_ref().is_some_and(|j| j.is_finished()) {
            return Err(SchedError::worker_control(handle, op, "worker thread exited"));
        }

        *gate = next;
        worker.shared.cv.notify_all();
        Ok(())
    }
}

impl WorkerControl for ThreadWorkers {
    fn spawn(&mut self, work: WorkDescriptor) -> Result<WorkerHandle, SchedError> {
        let shared = Arc::new(Shared {
            gate: Mutex::new(Gate::Suspended),
            cv: Condvar::new(),
            units: AtomicU64::new(0),
        });

        let job = work.job;
        let worker_shared = Arc::clone(&shared);
        let join = thread::Builder::new()
            .name(format!("worker-p{job}"))
            .spawn(move || run_worker(work, &worker_shared))
            .map_err(|source| SchedError::WorkerSpawn { job, source })?;

        Ok(self.workers.insert(WorkerThread {
            shared,
            join: Some(join),
        }))
    }

    fn resume(&mut self, handle: WorkerHandle) -> Result<(), SchedError> {
        self.set_gate(handle, WorkerOp::Resume, Gate::Running)
    }

    fn suspend(&mut self, handle: WorkerHandle) -> Result<(), SchedError> {
        self.set_gate(handle, WorkerOp::Suspend, Gate::Suspended)
    }

    fn terminate(&mut self, handle: WorkerHandle) -> Result<(), SchedError> {
        let op = WorkerOp::Terminate;
        let mut worker = self
            .workers
            .remove(handle)
            .ok_or_else(|| SchedError::worker_control(handle, op, "unknown handle"))?;

        {
            let mut gate = worker
                .shared
                .gate
                .lock()
                .map_err(|_| SchedError::worker_control(handle, op, "worker lock poisoned"))?;
            *gate = Gate::Terminated;
            worker.shared.cv.notify_all();
        }

        if let Some(join) = worker.join.take() {
            join.join()
                .map_err(|_| SchedError::worker_control(handle, op, "worker thread panicked"))?;
        }
        Ok(())
    }

    fn running_count(&self) -> usize {
        self.workers
            .values()
            .filter(|w| w.shared.gate.lock().is_ok_and(|g| *g == Gate::Running))
            .count()
    }
}

impl Drop for ThreadWorkers {
    fn drop(&mut self) {
        let handles: Vec<_> = self.workers.keys().collect();
        for handle in handles {
            let _ = self.terminate(handle);
        }
    }
}

fn run_worker(work: WorkDescriptor, shared: &Shared) {
    let Ok(mut gate) = shared.gate.lock() else {
        return;
    };

    loop {
        match *gate {
            Gate::Terminated => return,
            Gate::Suspended => {
                gate = match shared.cv.wait(gate) {
                    Ok(g) => g,
                    Err(_) => return,
                };
            }
            Gate::Running => {
                let units = shared.units.fetch_add(1, Ordering::Relaxed) + 1;
                trace!(job = work.job, units, "[P{}] executing", work.job);

                // Sleep out the unit, waking early on any gate change
                gate = match shared.cv.wait_timeout_while(gate, work.unit, |g| *g == Gate::Running)
                {
                    Ok((g, _)) => g,
                    Err(_) => return,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn descriptor(job: u64) -> WorkDescriptor {
        WorkDescriptor::new(job, Duration::from_millis(1))
    }

    #[test]
    fn spawned_worker_does_no_work_until_resumed() {
        let mut workers = ThreadWorkers::new();
        let h = workers.spawn(descriptor(1)).unwrap();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(workers.units(h), Some(0));
        assert_eq!(workers.running_count(), 0);

        workers.resume(h).unwrap();
        thread::sleep(Duration::from_millis(20));
        assert!(workers.units(h).unwrap() > 0);
        assert_eq!(workers.running_count(), 1);
        workers.terminate(h).unwrap();
    }

    #[test]
    fn suspend_is_idempotent() {
        let mut workers = ThreadWorkers::new();
        let h = workers.spawn(descriptor(1)).unwrap();
        workers.resume(h).unwrap();
        workers.suspend(h).unwrap();
        workers.suspend(h).unwrap();
        assert_eq!(workers.running_count(), 0);

        let before = workers.units(h).unwrap();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(workers.units(h), Some(before));
        workers.terminate(h).unwrap();
    }

    #[test]
    fn control_after_terminate_fails() {
        let mut workers = ThreadWorkers::new();
        let h = workers.spawn(descriptor(3)).unwrap();
        workers.terminate(h).unwrap();

        assert!(matches!(
            workers.resume(h),
            Err(SchedError::WorkerControl {
                op: WorkerOp::Resume,
                ..
            })
        ));
        assert!(workers.terminate(h).is_err());
        assert_eq!(workers.units(h), None);
    }
}
