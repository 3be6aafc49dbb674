//! Admission control and completion tracking for traversal tasks.
//!
//! # Overview
//!
//! The [`Coordinator`] owns a dedicated rayon pool with `K` worker threads.
//! Every directory becomes one task on that pool; tasks beyond `K` wait in
//! the pool's queue. A task never waits for the tasks it spawns, so a tree
//! deeper than `K` cannot exhaust the workers.
//!
//! Completion is the end of a [`rayon::Scope`]: the scope returns only when
//! every task spawned inside it, transitively, has returned. The consumer
//! of the delivery channel runs on its own thread for the whole traversal,
//! so sends from traversal tasks always make progress. When the scope ends
//! the last [`Sender`] is dropped, the consumer sees the channel close and
//! finishes.

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use rayon::{Scope, ThreadPool, ThreadPoolBuilder};

use super::walker::{DirTask, Walker};
use super::FileEntry;

/// Errors that prevent a traversal from running to completion.
#[derive(thiserror::Error, Debug)]
pub enum CoordinatorError {
    /// The traversal thread pool could not be created.
    #[error("Failed to build traversal thread pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    /// The consumer thread could not be started.
    #[error("Failed to start aggregator thread: {0}")]
    Spawn(#[source] io::Error),

    /// The consumer thread panicked; its results are lost.
    #[error("Aggregator thread panicked")]
    AggregatorPanicked,
}

/// Snapshot of task bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    /// Tasks admitted to the pool
    pub spawned: usize,
    /// Tasks that returned
    pub completed: usize,
    /// Tasks refused because shutdown was requested
    pub rejected: usize,
    /// Highest number of tasks running at the same time
    pub peak_active: usize,
}

impl TaskCounts {
    /// Whether every admitted task has completed.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.spawned == self.completed
    }
}

/// Atomic counters for traversal tasks.
#[derive(Debug, Default)]
pub struct TaskTracker {
    spawned: AtomicUsize,
    completed: AtomicUsize,
    rejected: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl TaskTracker {
    /// Create a tracker with all counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a task was admitted.
    pub fn admit(&self) {
        self.spawned.fetch_add(1, Ordering::SeqCst);
    }

    /// Record that a task was refused.
    pub fn reject(&self) {
        self.rejected.fetch_add(1, Ordering::SeqCst);
    }

    /// Mark a task as running. It is completed when the guard drops.
    pub fn start(&self) -> ActiveTask<'_> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        ActiveTask { tracker: self }
    }

    /// Tasks currently running.
    #[must_use]
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Tasks admitted but not yet completed.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.spawned
            .load(Ordering::SeqCst)
            .saturating_sub(self.completed.load(Ordering::SeqCst))
    }

    /// Current counters.
    #[must_use]
    pub fn counts(&self) -> TaskCounts {
        TaskCounts {
            spawned: self.spawned.load(Ordering::SeqCst),
            completed: self.completed.load(Ordering::SeqCst),
            rejected: self.rejected.load(Ordering::SeqCst),
            peak_active: self.peak.load(Ordering::SeqCst),
        }
    }
}

/// Guard for a running task.
#[derive(Debug)]
pub struct ActiveTask<'a> {
    tracker: &'a TaskTracker,
}

impl Drop for ActiveTask<'_> {
    fn drop(&mut self) {
        self.tracker.active.fetch_sub(1, Ordering::SeqCst);
        self.tracker.completed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Outcome of a completed traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport<R> {
    /// Whatever the consumer returned
    pub consumed: R,
    /// Final task counters
    pub tasks: TaskCounts,
}

/// Bounded-concurrency driver for [`Walker`] tasks.
#[derive(Debug)]
pub struct Coordinator {
    pool: ThreadPool,
    jobs: usize,
    channel_capacity: usize,
}

impl Coordinator {
    /// Create a coordinator with `jobs` workers (at least 1) and a delivery
    /// channel holding `channel_capacity` entries (0 = rendezvous).
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Pool`] if the thread pool cannot be built.
    pub fn new(jobs: usize, channel_capacity: usize) -> Result<Self, CoordinatorError> {
        let jobs = jobs.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(jobs)
            .thread_name(|i| format!("dupewalk-walk-{i}"))
            .build()?;
        log::debug!(
            "Coordinator: {} workers, channel capacity {}",
            jobs,
            channel_capacity
        );
        Ok(Self {
            pool,
            jobs,
            channel_capacity,
        })
    }

    /// Maximum number of concurrently active traversal tasks.
    #[must_use]
    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Delivery channel capacity.
    #[must_use]
    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Traverse the tree below `root` and feed every entry to `consume`.
    ///
    /// `consume` runs on a separate thread that is started before the first
    /// task and receives a channel that closes once traversal is complete.
    /// Its return value is handed back in the [`RunReport`].
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Spawn`] if the consumer thread cannot be
    /// started and [`CoordinatorError::AggregatorPanicked`] if it panics.
    pub fn run<C, R>(
        &self,
        walker: &Walker,
        root: &Path,
        consume: C,
    ) -> Result<RunReport<R>, CoordinatorError>
    where
        C: FnOnce(Receiver<FileEntry>) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (sender, receiver) = crossbeam_channel::bounded(self.channel_capacity);
        let consumer = thread::Builder::new()
            .name("dupewalk-aggregator".to_string())
            .spawn(move || consume(receiver))
            .map_err(CoordinatorError::Spawn)?;

        let tracker = TaskTracker::new();
        let root_task = walker.root_task(root);

        self.pool.scope(|scope| {
            spawn_task(scope, walker, &tracker, root_task, sender);
        });
        // Every sender is gone now; the consumer drains and returns.

        let tasks = tracker.counts();
        log::debug!(
            "Traversal finished: {} tasks, peak {} active, {} rejected",
            tasks.completed,
            tasks.peak_active,
            tasks.rejected
        );

        let consumed = consumer
            .join()
            .map_err(|_| CoordinatorError::AggregatorPanicked)?;
        Ok(RunReport { consumed, tasks })
    }
}

fn spawn_task<'scope>(
    scope: &Scope<'scope>,
    walker: &'scope Walker,
    tracker: &'scope TaskTracker,
    task: DirTask,
    sender: Sender<FileEntry>,
) {
    if walker.is_shutdown_requested() {
        tracker.reject();
        return;
    }

    tracker.admit();
    scope.spawn(move |scope| {
        let _active = tracker.start();
        let delivered = walker.visit(task, &sender, |child| {
            spawn_task(scope, walker, tracker, child, sender.clone());
        });
        if let Err(e) = delivered {
            log::error!("{}", e);
        }
    });
}
