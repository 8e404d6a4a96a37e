pub mod driver;
pub mod event;
pub mod observer;
pub mod queue;
pub mod state;

pub use driver::SchedCore;
pub use event::SchedEvent;
pub use queue::ReadyQueue;
pub use state::{Pcb, PcbSnapshot, ProcId, ProcIdx, ProcState, SchedCtx, Ticks};
