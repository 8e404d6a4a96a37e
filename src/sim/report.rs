use crate::core::state::{PcbSnapshot, ProcId, ProcState, SchedCtx, Ticks};
use average::{Estimate, Mean};
use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub id: ProcId,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub finish_time: Ticks,
    pub waiting_time: Ticks,
    pub turnaround_time: Ticks,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rows: Vec<SummaryRow>,
    pub avg_waiting: f64,
    pub avg_turnaround: f64,
    pub cycles: u64,
}

impl RunSummary {
    /// Fold over a fully finished registry.
    pub fn from_ctx(ctx: &SchedCtx, cycles: u64) -> Self {
        debug_assert!(ctx.all_finished(), "summary requested before completion");

        let rows: Vec<SummaryRow> = ctx
            .pcbs
            .iter()
            .map(|pcb| SummaryRow {
                id: pcb.id,
                arrival_time: pcb.arrival_time,
                burst_time: pcb.burst_time,
                finish_time: pcb.finish_time.unwrap_or_default(),
                waiting_time: pcb.waiting_time,
                turnaround_time: pcb.turnaround_time,
            })
            .collect();

        Self {
            avg_waiting: avg(rows.iter().map(|r| r.waiting_time as f64)),
            avg_turnaround: avg(rows.iter().map(|r| r.turnaround_time as f64)),
            rows,
            cycles,
        }
    }
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<Mean>().estimate()
}

/// Consumer of the live status view and the final summary.
pub trait Reporter {
    fn on_tick(&mut self, now: Ticks, snapshots: &[PcbSnapshot]);

    fn on_summary(&mut self, summary: &RunSummary);
}

fn state_label(state: ProcState) -> &'static str {
    match state {
        ProcState::Ready => "READY",
        ProcState::Running => "RUNNING",
        ProcState::Finished => "FINISHED",
    }
}

/// Plain-text status view and result table.
pub struct ConsoleReporter<O: Write> {
    out: O,
    live: bool,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<O: Write> ConsoleReporter<O> {
    pub fn new(out: O) -> Self {
        Self { out, live: true }
    }

    /// Skip the per-tick status view; print the summary only.
    pub fn summary_only(mut self) -> Self {
        self.live = false;
        self
    }

    pub fn into_inner(self) -> O {
        self.out
    }

    fn write_tick(&mut self, now: Ticks, snapshots: &[PcbSnapshot]) -> io::Result<()> {
        writeln!(self.out, "\n[TIME {now}]")?;
        for s in snapshots {
            writeln!(
                self.out,
                "P{} | State: {:<8} | Remaining: {} | Waiting: {}",
                s.id,
                state_label(s.state),
                s.remaining_time,
                s.waiting_time
            )?;
        }
        Ok(())
    }

    fn write_summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        writeln!(self.out, "\nFinal Result:")?;
        writeln!(self.out, "PID | AT | BT | FT | WT | TAT")?;
        for r in &summary.rows {
            writeln!(
                self.out,
                "P{:<3}| {:<3}| {:<3}| {:<3}| {:<3}| {}",
                r.id, r.arrival_time, r.burst_time, r.finish_time, r.waiting_time, r.turnaround_time
            )?;
        }
        writeln!(self.out, "\nAverage Waiting Time = {:.2}", summary.avg_waiting)?;
        writeln!(self.out, "Average Turnaround Time = {:.2}", summary.avg_turnaround)?;
        writeln!(self.out, "Dispatch cycles = {}", summary.cycles)
    }
}

impl<O: Write> Reporter for ConsoleReporter<O> {
    fn on_tick(&mut self, now: Ticks, snapshots: &[PcbSnapshot]) {
        if self.live {
            // Losing the console is not a scheduling failure
            let _ = self.write_tick(now, snapshots);
        }
    }

    fn on_summary(&mut self, summary: &RunSummary) {
        let _ = self.write_summary(summary).and_then(|()| self.out.flush());
    }
}

/// Keeps every view in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub ticks: Vec<(Ticks, Vec<PcbSnapshot>)>,
    pub summary: Option<RunSummary>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for RecordingReporter {
    fn on_tick(&mut self, now: Ticks, snapshots: &[PcbSnapshot]) {
        self.ticks.push((now, snapshots.to_vec()));
    }

    fn on_summary(&mut self, summary: &RunSummary) {
        self.summary = Some(summary.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RunSummary {
        let rows = vec![
            SummaryRow {
                id: 1,
                arrival_time: 0,
                burst_time: 2,
                finish_time: 2,
                waiting_time: 0,
                turnaround_time: 2,
            },
            SummaryRow {
                id: 2,
                arrival_time: 0,
                burst_time: 1,
                finish_time: 3,
                waiting_time: 2,
                turnaround_time: 3,
            },
        ];
        RunSummary {
            avg_waiting: avg(rows.iter().map(|r| r.waiting_time as f64)),
            avg_turnaround: avg(rows.iter().map(|r| r.turnaround_time as f64)),
            rows,
            cycles: 3,
        }
    }

    #[test]
    fn averages_are_arithmetic_means() {
        let s = summary();
        assert_eq!(s.avg_waiting, 1.0);
        assert_eq!(s.avg_turnaround, 2.5);
    }

    #[test]
    fn console_prints_status_and_table() {
        let mut console = ConsoleReporter::new(Vec::new());
        console.on_tick(
            4,
            &[PcbSnapshot {
                id: 3,
                state: ProcState::Running,
                remaining_time: 1,
                waiting_time: 2,
            }],
        );
        console.on_summary(&summary());

        let text = String::from_utf8(console.into_inner()).unwrap();
        assert!(text.contains("[TIME 4]"));
        assert!(text.contains("P3 | State: RUNNING  | Remaining: 1 | Waiting: 2"));
        assert!(text.contains("Average Waiting Time = 1.00"));
        assert!(text.contains("Average Turnaround Time = 2.50"));
    }

    #[test]
    fn summary_only_skips_ticks() {
        let mut console = ConsoleReporter::new(Vec::new()).summary_only();
        console.on_tick(0, &[]);
        let text = String::from_utf8(console.into_inner()).unwrap();
        assert!(text.is_empty());
    }
}
