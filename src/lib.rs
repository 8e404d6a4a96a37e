pub mod config;
pub mod core;
pub mod error;
pub mod scheduler;
pub mod sim;
pub mod worker;

pub use config::SimConfig;
pub use crate::core::{SchedCore, SchedEvent};
pub use error::SchedError;
pub use scheduler::{RoundRobin, Scheduler};
pub use sim::{Job, Sim};
