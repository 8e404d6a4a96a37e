use rr_sim::error::WorkerOp;
use rr_sim::sim::{QuantumTimer, RecordingReporter};
use rr_sim::worker::{FakeWorkers, ThreadWorkers, WorkerControl};
use rr_sim::{Job, SchedError, Sim, SimConfig};
use std::time::Duration;

fn fast_config(jobs: Vec<Job>) -> SimConfig {
    SimConfig {
        jobs,
        quantum: 2,
        tick: Duration::from_millis(2),
    }
}

#[test]
fn reference_run_on_real_threads() {
    let config = fast_config(rr_sim::sim::reference_workload());
    let mut sim = Sim::new(&config, ThreadWorkers::new()).unwrap();
    let mut timer = QuantumTimer::start(config.quantum_period()).unwrap();
    let mut reporter = RecordingReporter::new();

    let summary = sim.run(&mut timer, &mut reporter).unwrap();

    assert_eq!(summary.cycles, 10);
    let waits: Vec<u64> = summary.rows.iter().map(|r| r.waiting_time).collect();
    assert_eq!(waits, vec![8, 8, 2, 4, 7]);
    assert_eq!(sim.core.workers().running_count(), 0);
}

#[test]
fn at_most_one_thread_runs_between_ticks() {
    let config = fast_config(vec![Job::new(1, 0, 3), Job::new(2, 0, 3), Job::new(3, 1, 2)]);
    let mut sim = Sim::new(&config, ThreadWorkers::new()).unwrap();

    while !sim.core.all_finished() {
        sim.core.on_quantum_expired().unwrap();
        assert!(sim.core.workers().running_count() <= 1);
        std::thread::sleep(config.tick);
    }
    assert_eq!(sim.core.workers().running_count(), 0);
}

#[test]
fn resume_failure_aborts_the_run() {
    let config = fast_config(vec![Job::new(1, 0, 4), Job::new(2, 0, 4)]);
    let mut workers = FakeWorkers::new().fail_next(WorkerOp::Resume, 2);
    let mut sim = Sim::new(&config, &mut workers).unwrap();
    let mut timer = QuantumTimer::start(config.quantum_period()).unwrap();
    let mut reporter = RecordingReporter::new();

    let err = sim.run(&mut timer, &mut reporter).unwrap_err();
    assert!(matches!(
        err,
        SchedError::WorkerControl {
            op: WorkerOp::Resume,
            ..
        }
    ));
    assert!(reporter.summary.is_none());
    drop(sim);

    assert_eq!(workers.live_count(), 0);
    assert_eq!(workers.running_count(), 0);
}
