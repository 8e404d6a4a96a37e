use crate::core::state::{ProcId, Ticks};
use rand::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pub id: ProcId,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
}

impl Job {
    pub const fn new(id: ProcId, arrival_time: Ticks, burst_time: Ticks) -> Self {
        Self {
            id,
            arrival_time,
            burst_time,
        }
    }
}

/// The five-process classroom workload.
pub fn reference_workload() -> Vec<Job> {
    vec![
        Job::new(1, 0, 5),
        Job::new(2, 1, 3),
        Job::new(3, 2, 1),
        Job::new(4, 3, 2),
        Job::new(5, 4, 3),
    ]
}

/// Seeded random workload: at each tick in `0..ticks` a job arrives with
/// probability `p_arrival`, short with probability `p_short`.
pub fn bernoulli_jobs(
    ticks: Ticks,
    p_arrival: f64,
    p_short: f64,
    short_ticks: Ticks,
    long_ticks: Ticks,
    seed: u64,
) -> Vec<Job> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut jobs = Vec::new();

    for t in 0..ticks {
        if rng.random::<f64>() < p_arrival {
            let burst = if rng.random::<f64>() < p_short {
                short_ticks
            } else {
                long_ticks
            };
            jobs.push(Job::new(jobs.len() as ProcId + 1, t, burst));
        }
    }

    jobs
}
