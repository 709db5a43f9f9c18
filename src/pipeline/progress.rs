//! Shared progress and worker accounting for one job.

use std::io::{self, Write};

use parking_lot::Mutex;

/// Mutable counters shared by the dispatch loop and every worker.
#[derive(Debug, Default, Clone, Copy)]
struct ProgressState {
    busy_workers: usize,
    peak_busy_workers: usize,
    percent: f32,
    stages_done: usize,
}

/// Lock-protected completion tracking.
///
/// The percentage advances by a fixed step, `100 / (2 × total_tasks)`, after
/// each stage slot of each task, so it reaches 100 when the job drains
/// regardless of per-stage outcomes.  In non-verbose mode every step rewrites
/// a single console percentage line; in verbose mode structured log lines are
/// emitted instead and nothing is printed.
#[derive(Debug)]
pub struct ProgressTracker {
    increment: f32,
    workers: usize,
    verbose: bool,
    state: Mutex<ProgressState>,
}

impl ProgressTracker {
    /// Create a tracker for `total_tasks` tasks on a pool of `workers`.
    pub fn new(total_tasks: usize, workers: usize, verbose: bool) -> Self {
        let increment = if total_tasks == 0 {
            0.0
        } else {
            100.0 / (2.0 * total_tasks as f32)
        };
        Self {
            increment,
            workers,
            verbose,
            state: Mutex::new(ProgressState::default()),
        }
    }

    /// Print the initial indicator line.  No-op in verbose mode.
    pub fn begin(&self) {
        if !self.verbose {
            print!("Progress:   0%");
            let _ = io::stdout().flush();
        }
    }

    /// Account a worker taking a pool slot.
    pub fn worker_started(&self) {
        let mut s = self.state.lock();
        s.busy_workers += 1;
        debug_assert!(s.busy_workers <= self.workers);
        if s.busy_workers > s.peak_busy_workers {
            s.peak_busy_workers = s.busy_workers;
        }
    }

    /// Account a worker releasing its pool slot.
    pub fn worker_finished(&self) {
        let mut s = self.state.lock();
        s.busy_workers = s.busy_workers.saturating_sub(1);
    }

    /// Record one finished stage slot and reflect the new percentage.
    pub fn stage_done(&self, file: &str, stage: &str) {
        let mut s = self.state.lock();
        s.percent += self.increment;
        s.stages_done += 1;
        if self.verbose {
            tracing::info!(file, stage, percent = s.percent, "stage finished");
        } else {
            print!("\rProgress: {:3.0}%", s.percent);
            let _ = io::stdout().flush();
        }
    }

    /// Current completion percentage.
    pub fn percent(&self) -> f32 {
        self.state.lock().percent
    }

    /// Workers currently holding a pool slot.
    pub fn busy_workers(&self) -> usize {
        self.state.lock().busy_workers
    }

    /// High-water mark of concurrently busy workers.
    pub fn peak_busy_workers(&self) -> usize {
        self.state.lock().peak_busy_workers
    }

    /// Total stage slots recorded so far.
    pub fn stages_done(&self) -> usize {
        self.state.lock().stages_done
    }

    /// Configured pool size.
    pub fn workers(&self) -> usize {
        self.workers
    }
}
