pub mod driver;
pub mod job;
pub mod report;
pub mod timer;

pub use driver::Sim;
pub use job::{Job, bernoulli_jobs, reference_workload};
pub use report::{ConsoleReporter, RecordingReporter, Reporter, RunSummary, SummaryRow};
pub use timer::{ImmediateTicks, QuantumTimer, TickSource};
