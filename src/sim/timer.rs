use crate::error::SchedError;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{trace, warn};

/// Source of "quantum expired" notifications.
pub trait TickSource {
    /// Block until the next expiry.
    fn wait(&mut self) -> Result<(), SchedError>;

    /// Unsubscribe. No further expiries are delivered.
    fn stop(&mut self);
}

/// Periodic timer on its own thread.
///
/// Expiries travel over a channel of capacity one. An expiry that fires while
/// the previous one has not been consumed is dropped, so the consumer never
/// sees a backlog of overlapping ticks.
pub struct QuantumTimer {
    rx: Receiver<()>,
    stop_tx: Option<SyncSender<()>>,
    join: Option<JoinHandle<()>>,
}

impl QuantumTimer {
    pub fn start(period: Duration) -> Result<Self, SchedError> {
        let (tx, rx) = mpsc::sync_channel(1);
        let (stop_tx, stop_rx) = mpsc::sync_channel(1);

        let join = thread::Builder::new()
            .name("quantum-timer".into())
            .spawn(move || run_timer(period, &tx, &stop_rx))
            .map_err(SchedError::TimerSpawn)?;

        Ok(Self {
            rx,
            stop_tx: Some(stop_tx),
            join: Some(join),
        })
    }
}

fn run_timer(period: Duration, tx: &SyncSender<()>, stop_rx: &Receiver<()>) {
    loop {
        match stop_rx.recv_timeout(period) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }
        match tx.try_send(()) {
            Ok(()) => trace!("quantum expired"),
            Err(TrySendError::Full(())) => warn!("quantum expired while previous tick pending; coalesced"),
            Err(TrySendError::Disconnected(())) => return,
        }
    }
}

impl TickSource for QuantumTimer {
    fn wait(&mut self) -> Result<(), SchedError> {
        self.rx.recv().map_err(|_| SchedError::TimerStopped)
    }

    fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for QuantumTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Fires immediately on every wait. Runs a simulation as fast as the engine
/// can go.
#[derive(Debug, Default)]
pub struct ImmediateTicks {
    stopped: bool,
}

impl ImmediateTicks {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TickSource for ImmediateTicks {
    fn wait(&mut self) -> Result<(), SchedError> {
        if self.stopped {
            return Err(SchedError::TimerStopped);
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn delivers_periodic_ticks() {
        let mut timer = QuantumTimer::start(Duration::from_millis(5)).unwrap();
        let started = Instant::now();
        for _ in 0..3 {
            timer.wait().unwrap();
        }
        assert!(started.elapsed() >= Duration::from_millis(10));
        timer.stop();
    }

    #[test]
    fn slow_consumer_sees_coalesced_ticks() {
        let mut timer = QuantumTimer::start(Duration::from_millis(25)).unwrap();
        thread::sleep(Duration::from_millis(60));
        timer.wait().unwrap();
        // Only the single buffered tick survived the backlog
        assert!(timer.rx.try_recv().is_err());
        timer.stop();
    }

    #[test]
    fn stopped_timer_disconnects() {
        let mut timer = QuantumTimer::start(Duration::from_millis(1)).unwrap();
        timer.stop();
        while timer.rx.try_recv().is_ok() {}
        assert!(matches!(timer.wait(), Err(SchedError::TimerStopped)));

        let mut immediate = ImmediateTicks::new();
        immediate.wait().unwrap();
        immediate.stop();
        assert!(immediate.wait().is_err());
    }
}
