//! Bounded-concurrency dispatch of the ordered task list.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::progress::ProgressTracker;
use super::stage::StageCommand;
use crate::plan::{ConversionTask, OrderedTaskList};

/// Outcome of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageResult {
    /// The external process ran and exited successfully.
    Completed,
    /// The stage was not attempted (no-op task, or decode failed first).
    Skipped,
    /// The external process could not run or exited non-zero.
    Failed(String),
}

impl StageResult {
    /// Whether this stage counts as a failure.
    pub fn is_failed(&self) -> bool {
        matches!(self, StageResult::Failed(_))
    }
}

/// Per-task record of both stage results.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    /// Source filename of the task.
    pub source: String,
    /// True when source and destination formats matched.
    pub no_op: bool,
    /// Decode stage result.
    pub decode: StageResult,
    /// Encode stage result.
    pub encode: StageResult,
}

impl TaskOutcome {
    /// Whether either stage failed.
    pub fn failed(&self) -> bool {
        self.decode.is_failed() || self.encode.is_failed()
    }
}

/// Job-level tally reported once the pool drains.
#[derive(Debug, Default)]
pub struct JobSummary {
    /// Tasks that completed both stages.
    pub converted: usize,
    /// Tasks skipped because they were already in the destination format.
    pub no_op: usize,
    /// Tasks with at least one failed stage.
    pub failed: usize,
    /// Per-task records, in completion order.
    pub outcomes: Vec<TaskOutcome>,
}

impl JobSummary {
    fn record(&mut self, outcome: TaskOutcome) {
        if outcome.no_op {
            self.no_op += 1;
        } else if outcome.failed() {
            self.failed += 1;
        } else {
            self.converted += 1;
        }
        self.outcomes.push(outcome);
    }

    /// Print the closing report: counts, then per-task failure reasons.
    pub fn report(&self) {
        println!(
            "{} converted, {} already in target format, {} failed.",
            self.converted, self.no_op, self.failed
        );
        for outcome in self.outcomes.iter().filter(|o| o.failed()) {
            if let StageResult::Failed(reason) = &outcome.decode {
                println!("  {}: decode failed: {}", outcome.source, reason);
            }
            if let StageResult::Failed(reason) = &outcome.encode {
                println!("  {}: encode failed: {}", outcome.source, reason);
            }
        }
    }
}

/// Dispatches tasks across a bounded pool of concurrent workers.
///
/// Dispatch order is the list order (ascending filename) and is deterministic;
/// completion order depends on external-process duration and is not.
/// Admission is controlled by a semaphore with one permit per worker slot, so
/// the dispatch loop blocks without spinning while the pool is full.
pub struct Scheduler {
    workers: usize,
    cancel: CancellationToken,
}

impl Scheduler {
    /// Create a scheduler for a pool of `workers` slots.
    pub fn new(workers: usize, cancel: CancellationToken) -> Self {
        Self { workers, cancel }
    }

    /// Dispatch every task, wait for all workers, and return the summary.
    ///
    /// Each task is dispatched exactly once.  Cancellation stops new
    /// dispatches and interrupts running stages; already-dispatched workers
    /// are still awaited.
    pub async fn run(&self, list: OrderedTaskList, tracker: Arc<ProgressTracker>) -> JobSummary {
        let total = list.len();
        tracing::debug!(tasks = total, workers = self.workers, "dispatch starting");
        tracker.begin();

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut pool: JoinSet<TaskOutcome> = JoinSet::new();
        let mut worker_id = 0usize;

        for task in list {
            if self.cancel.is_cancelled() {
                tracing::info!("cancelled, no further tasks will be dispatched");
                break;
            }

            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(p) => p,
                Err(_) => break, // semaphore closed; cannot happen in practice
            };

            tracker.worker_started();
            let tracker = Arc::clone(&tracker);
            let cancel = self.cancel.clone();
            let id = worker_id;
            worker_id += 1;

            pool.spawn(async move {
                let outcome = run_task(id, task, &tracker, &cancel).await;
                tracker.worker_finished();
                drop(permit);
                outcome
            });
        }

        let mut summary = JobSummary::default();
        while let Some(joined) = pool.join_next().await {
            match joined {
                Ok(outcome) => summary.record(outcome),
                Err(e) => tracing::warn!("worker task failed to join: {e}"),
            }
        }

        tracing::debug!(
            converted = summary.converted,
            no_op = summary.no_op,
            failed = summary.failed,
            "dispatch finished"
        );
        summary
    }
}

/// Run one task's decode→encode pipeline on a worker.
async fn run_task(
    worker: usize,
    task: ConversionTask,
    tracker: &ProgressTracker,
    cancel: &CancellationToken,
) -> TaskOutcome {
    if !task.should_process {
        tracing::debug!(worker, file = %task.source, "already in destination format");
        tracker.stage_done(&task.short_name, "decode");
        tracker.stage_done(&task.short_name, "encode");
        return TaskOutcome {
            source: task.source,
            no_op: true,
            decode: StageResult::Skipped,
            encode: StageResult::Skipped,
        };
    }

    tracing::debug!(worker, file = %task.source, "decoding started");
    let decode = run_stage(&task.decoder, &task.decode_args, cancel).await;
    if let StageResult::Failed(reason) = &decode {
        tracing::warn!(worker, file = %task.source, %reason, "decode failed");
    }
    tracker.stage_done(&task.short_name, "decode");

    let encode = if decode.is_failed() {
        StageResult::Skipped
    } else {
        tracing::debug!(worker, file = %task.source, "encoding started");
        let encode = run_stage(&task.encoder, &task.encode_args, cancel).await;
        if let StageResult::Failed(reason) = &encode {
            tracing::warn!(worker, file = %task.source, %reason, "encode failed");
        }
        if task.delete_intermediate {
            if let Err(e) = std::fs::remove_file(&task.intermediate) {
                tracing::warn!(
                    worker,
                    file = %task.intermediate.display(),
                    "couldn't delete intermediate file: {e}"
                );
            }
        }
        encode
    };
    tracker.stage_done(&task.short_name, "encode");

    tracing::debug!(worker, file = %task.source, "finished");
    TaskOutcome {
        source: task.source,
        no_op: false,
        decode,
        encode,
    }
}

/// Run one stage process; the leading argument-vector token only names the
/// program and is not passed again.
async fn run_stage(program: &Path, argv: &[String], cancel: &CancellationToken) -> StageResult {
    let result = StageCommand::new(program.to_path_buf())
        .args(argv.iter().skip(1).cloned())
        .run(cancel)
        .await;

    match result {
        Ok(out) if out.status.success() => StageResult::Completed,
        Ok(out) => StageResult::Failed(format!(
            "exited with status {}: {}",
            out.status,
            out.stderr.trim()
        )),
        Err(e) => StageResult::Failed(e.to_string()),
    }
}
