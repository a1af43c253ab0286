// CleanupSweeper - Periodic expiry of released port allocations
//
// Responsibilities:
// - Run cleanup_expired_allocations(max_age) every `interval`
// - Run an extra pass on demand (sweep_now)
// - Stop promptly on stop() or when the handle is dropped
//
// Architecture:
// - One named std thread per sweeper
// - Command channel: the worker waits on recv_timeout(interval), so a
//   timeout means "time for a pass" and a message means "do what it says"

use chrono::Duration;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration as StdDuration;
use tracing::{debug, info, warn};

use crate::errors::{PortError, Result};
use crate::port::PortRegistry;

enum Command {
    Sweep(Sender<usize>),
    Stop,
}

#[derive(Debug, Default)]
struct SweepStats {
    passes: AtomicU64,
    removed: AtomicU64,
}

/// Handle to a running background sweeper
pub struct CleanupSweeper {
    commands: Sender<Command>,
    worker: Option<JoinHandle<()>>,
    stats: Arc<SweepStats>,
}

impl CleanupSweeper {
    /// Start sweeping `registry` every `interval`
    ///
    /// # Arguments
    /// * `registry` - Registry to clean
    /// * `interval` - Time between passes
    /// * `max_age` - Released records older than this are removed
    pub fn spawn(
        registry: Arc<PortRegistry>,
        interval: StdDuration,
        max_age: Duration,
    ) -> Result<Self> {
        if interval.is_zero() {
            return Err(PortError::SweeperError(
                "sweep interval must be greater than zero".to_string(),
            ));
        }

        let (tx, rx) = mpsc::channel::<Command>();
        let stats = Arc::new(SweepStats::default());
        let worker_stats = Arc::clone(&stats);

        let worker = thread::Builder::new()
            .name("ckp-port-sweeper".to_string())
            .spawn(move || {
                info!(range = %registry.range(), ?interval, "[Sweeper] started");
                loop {
                    match rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            run_pass(&registry, max_age, &worker_stats);
                        }
                        Ok(Command::Sweep(reply)) => {
                            let removed = run_pass(&registry, max_age, &worker_stats);
                            let _ = reply.send(removed);
                        }
                        Ok(Command::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!("[Sweeper] stopped");
            })
            .map_err(|e| PortError::SweeperError(format!("Failed to spawn sweeper: {}", e)))?;

        Ok(CleanupSweeper {
            commands: tx,
            worker: Some(worker),
            stats,
        })
    }

    /// Run a pass immediately and wait for it
    ///
    /// # Returns
    /// Number of records removed by this pass
    pub fn sweep_now(&self) -> Result<usize> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.commands
            .send(Command::Sweep(reply_tx))
            .map_err(|_| PortError::SweeperError("sweeper is not running".to_string()))?;
        reply_rx
            .recv()
            .map_err(|_| PortError::SweeperError("sweeper exited during pass".to_string()))
    }

    /// Completed passes, periodic and on-demand
    pub fn passes(&self) -> u64 {
        self.stats.passes.load(Ordering::SeqCst)
    }

    /// Records removed across all passes
    pub fn removed_total(&self) -> u64 {
        self.stats.removed.load(Ordering::SeqCst)
    }

    /// Stop the worker and wait for it to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.commands.send(Command::Stop);
            if worker.join().is_err() {
                warn!("[Sweeper] worker panicked");
            }
        }
    }
}

impl Drop for CleanupSweeper {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_pass(registry: &PortRegistry, max_age: Duration, stats: &SweepStats) -> usize {
    let removed = registry.cleanup_expired_allocations(max_age);
    stats.passes.fetch_add(1, Ordering::SeqCst);
    stats.removed.fetch_add(removed as u64, Ordering::SeqCst);
    debug!(removed, "[Sweeper] pass complete");
    removed
}
