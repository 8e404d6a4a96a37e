use crate::core::state::{ProcId, ProcIdx};
use crate::worker::WorkerHandle;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOp {
    Resume,
    Suspend,
    Terminate,
}

impl std::fmt::Display for WorkerOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self {
            Self::Resume => "resume",
            Self::Suspend => "suspend",
            Self::Terminate => "terminate",
        };
        f.write_str(op)
    }
}

/// Fatal conditions of a simulation run. None of them are retried.
#[derive(Debug, Error)]
pub enum SchedError {
    #[error("failed to spawn worker for P{job}")]
    WorkerSpawn {
        job: ProcId,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot {op} worker {handle:?}: {reason}")]
    WorkerControl {
        handle: WorkerHandle,
        op: WorkerOp,
        reason: String,
    },

    #[error("ready queue overflow enqueuing index {idx} (capacity {capacity})")]
    QueueOverflow { idx: ProcIdx, capacity: usize },

    #[error("invalid workload: {0}")]
    InvalidWorkload(String),

    #[error("failed to start quantum timer")]
    TimerSpawn(#[source] std::io::Error),

    #[error("quantum timer stopped while the scheduler was waiting")]
    TimerStopped,
}

impl SchedError {
    pub fn worker_control(handle: WorkerHandle, op: WorkerOp, reason: impl Into<String>) -> Self {
        Self::WorkerControl {
            handle,
            op,
            reason: reason.into(),
        }
    }
}
