use super::job::Job;
use super::report::{Reporter, RunSummary};
use super::timer::TickSource;
use crate::config::SimConfig;
use crate::core::{driver::SchedCore, state::Pcb};
use crate::error::SchedError;
use crate::scheduler::RoundRobin;
use crate::worker::{WorkDescriptor, WorkerControl};
use rustc_hash::FxHashSet;
use tracing::{error, info};

/// A configured run: registry built, one suspended worker per job.
pub struct Sim<W: WorkerControl> {
    pub core: SchedCore<RoundRobin, W>,
}

impl<W: WorkerControl> Sim<W> {
    pub fn new(config: &SimConfig, mut workers: W) -> Result<Self, SchedError> {
        validate(&config.jobs)?;

        let mut pcbs = Vec::with_capacity(config.jobs.len());
        for job in &config.jobs {
            match workers.spawn(WorkDescriptor::new(job.id, config.tick)) {
                Ok(handle) => {
                    info!(pid = job.id, arrival = job.arrival_time, burst = job.burst_time, "process created");
                    pcbs.push(Pcb::new(job.id, job.arrival_time, job.burst_time, handle));
                }
                Err(err) => {
                    for pcb in &pcbs {
                        let _ = workers.terminate(pcb.worker);
                    }
                    return Err(err);
                }
            }
        }

        Ok(Self {
            core: SchedCore::new(pcbs, RoundRobin::new(config.quantum), workers),
        })
    }

    /// Block on `ticks`, one dispatch cycle per expiry, until every process
    /// has finished. On a fatal error all live workers are terminated before
    /// the error is returned.
    pub fn run<T, R>(&mut self, ticks: &mut T, reporter: &mut R) -> Result<RunSummary, SchedError>
    where
        T: TickSource,
        R: Reporter,
    {
        let result = self.drive(ticks, reporter);
        ticks.stop();

        match result {
            Ok(()) => {
                let summary = RunSummary::from_ctx(&self.core.ctx, self.core.cycles());
                info!(
                    avg_waiting = summary.avg_waiting,
                    avg_turnaround = summary.avg_turnaround,
                    cycles = summary.cycles,
                    "all processes finished"
                );
                reporter.on_summary(&summary);
                Ok(summary)
            }
            Err(err) => {
                error!(%err, now = self.core.now(), "simulation aborted");
                self.core.shutdown();
                Err(err)
            }
        }
    }

    fn drive<T: TickSource, R: Reporter>(&mut self, ticks: &mut T, reporter: &mut R) -> Result<(), SchedError> {
        while !self.core.all_finished() {
            ticks.wait()?;
            self.core.on_quantum_expired()?;
            reporter.on_tick(self.core.now(), &self.core.ctx.snapshots());
        }
        Ok(())
    }
}

fn validate(jobs: &[Job]) -> Result<(), SchedError> {
    if jobs.is_empty() {
        return Err(SchedError::InvalidWorkload("no jobs".into()));
    }

    let mut seen = FxHashSet::default();
    for job in jobs {
        if job.burst_time == 0 {
            return Err(SchedError::InvalidWorkload(format!(
                "P{} has a zero burst time",
                job.id
            )));
        }
        if !seen.insert(job.id) {
            return Err(SchedError::InvalidWorkload(format!(
                "duplicate process id P{}",
                job.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::report::RecordingReporter;
    use crate::sim::timer::ImmediateTicks;
    use crate::worker::{FakeWorkers, WorkerCommand};

    #[test]
    fn rejects_bad_workloads() {
        let mut config = SimConfig {
            jobs: Vec::new(),
            ..SimConfig::default()
        };
        assert!(matches!(
            Sim::new(&config, FakeWorkers::new()),
            Err(SchedError::InvalidWorkload(_))
        ));

        config.jobs = vec![Job::new(1, 0, 0)];
        assert!(Sim::new(&config, FakeWorkers::new()).is_err());

        config.jobs = vec![Job::new(1, 0, 1), Job::new(1, 2, 1)];
        assert!(Sim::new(&config, FakeWorkers::new()).is_err());
    }

    #[test]
    fn spawn_failure_aborts_setup() {
        let config = SimConfig::default();
        let mut workers = FakeWorkers::new().fail_spawn_of(3);
        let result = Sim::new(&config, &mut workers);
        assert!(matches!(result, Err(SchedError::WorkerSpawn { job: 3, .. })));
        assert_eq!(workers.live_count(), 0);
        assert_eq!(
            &workers.commands()[..2],
            &[WorkerCommand::Spawn(1), WorkerCommand::Spawn(2)]
        );
    }

    #[test]
    fn reports_every_tick_and_a_summary() {
        let config = SimConfig::default();
        let mut sim = Sim::new(&config, FakeWorkers::new()).unwrap();
        let mut reporter = RecordingReporter::new();
        let summary = sim.run(&mut ImmediateTicks::new(), &mut reporter).unwrap();

        assert_eq!(reporter.ticks.len() as u64, summary.cycles);
        assert_eq!(reporter.summary.unwrap().rows, summary.rows);
        assert_eq!(reporter.ticks.last().unwrap().0, 14);
    }
}
