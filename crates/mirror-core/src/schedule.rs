//! Periodic cycle scheduler
//!
//! Runs one cycle, waits the configured interval, and repeats until a
//! shutdown is requested. Shutdown is only observed between cycles: a cycle
//! that has started always runs to completion.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

use tracing::{error, info};

use crate::Result;
use crate::sync::CycleReport;

/// Why the scheduler loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A shutdown was requested through a [`ShutdownHandle`]
    Interrupted,
    /// The configured number of cycles ran
    CycleLimit,
}

/// Totals for a scheduler run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub failed: u64,
    pub stopped_by: StopReason,
}

/// Requests a graceful stop of a running [`Scheduler`].
///
/// Cheap to clone; safe to call from a signal handler thread.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Sender<()>,
}

impl ShutdownHandle {
    pub fn request(&self) {
        // The scheduler may already be gone
        let _ = self.tx.send(());
    }
}

/// Fixed-interval cycle loop.
#[derive(Debug)]
pub struct Scheduler {
    interval: Duration,
    max_cycles: Option<u64>,
    stop_rx: Receiver<()>,
}

impl Scheduler {
    /// Create a scheduler and the handle that stops it.
    pub fn new(interval: Duration) -> (Self, ShutdownHandle) {
        let (tx, stop_rx) = mpsc::channel();
        let scheduler = Self {
            interval,
            max_cycles: None,
            stop_rx,
        };
        (scheduler, ShutdownHandle { tx })
    }

    /// Stop after `cycles` cycles instead of running until interrupted.
    pub fn with_max_cycles(mut self, cycles: u64) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    /// Run cycles until interrupted or the cycle limit is reached.
    ///
    /// `cycle` receives the 1-based cycle number. A failing cycle is logged
    /// and counted; the next tick runs as usual, since a full rescan picks
    /// up whatever the failed cycle left unapplied.
    pub fn run<F>(&self, mut cycle: F) -> RunSummary
    where
        F: FnMut(u64) -> Result<CycleReport>,
    {
        let mut cycles = 0;
        let mut failed = 0;

        let stopped_by = loop {
            if self.stop_requested() {
                break StopReason::Interrupted;
            }

            cycles += 1;
            match cycle(cycles) {
                Ok(report) if report.is_noop() => info!("Cycle {} found nothing to do", cycles),
                Ok(report) => info!("Cycle {}: {}", cycles, report),
                Err(e) => {
                    failed += 1;
                    error!("Cycle {} failed: {}", cycles, e);
                }
            }

            if self.max_cycles.is_some_and(|max| cycles >= max) {
                break StopReason::CycleLimit;
            }

            match self.stop_rx.recv_timeout(self.interval) {
                Ok(()) => break StopReason::Interrupted,
                Err(RecvTimeoutError::Timeout) => {}
                // No handle left to interrupt us; keep the cadence
                Err(RecvTimeoutError::Disconnected) => std::thread::sleep(self.interval),
            }
        };

        RunSummary {
            cycles,
            failed,
            stopped_by,
        }
    }

    fn stop_requested(&self) -> bool {
        match self.stop_rx.try_recv() {
            Ok(()) => true,
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => false,
        }
    }
}
