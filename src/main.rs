use anyhow::Context;
use clap::Parser;
use rr_sim::sim::{ConsoleReporter, ImmediateTicks, QuantumTimer, bernoulli_jobs};
use rr_sim::worker::ThreadWorkers;
use rr_sim::{Sim, SimConfig};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Round-Robin CPU scheduling simulation over real worker threads.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Time quantum in ticks
    #[arg(short, long, default_value_t = 2)]
    quantum: u64,

    /// Wall-clock milliseconds per simulated tick
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    /// Replace the reference workload with a seeded random one
    #[arg(long, value_name = "SEED")]
    bernoulli: Option<u64>,

    /// Do not wait on the timer; run cycles back to back
    #[arg(long)]
    fast: bool,

    /// Print the final table only
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.quantum > 0, "quantum must be positive");

    let mut config = SimConfig {
        quantum: args.quantum,
        tick: Duration::from_millis(args.tick_ms),
        ..SimConfig::default()
    };
    if let Some(seed) = args.bernoulli {
        config.jobs = bernoulli_jobs(40, 0.3, 0.3, 1, 6, seed);
    }

    println!("Round Robin Scheduler Simulation");
    println!("Time Quantum: {}", config.quantum);
    info!(jobs = config.jobs.len(), quantum = config.quantum, "creating processes");

    let mut sim = Sim::new(&config, ThreadWorkers::new()).context("setting up simulation")?;

    let mut reporter = ConsoleReporter::stdout();
    if args.quiet {
        reporter = reporter.summary_only();
    }

    let result = if args.fast {
        sim.run(&mut ImmediateTicks::new(), &mut reporter)
    } else {
        let mut timer =
            QuantumTimer::start(config.quantum_period()).context("starting quantum timer")?;
        sim.run(&mut timer, &mut reporter)
    };
    result.context("simulation aborted")?;

    Ok(())
}
