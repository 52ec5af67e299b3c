//! Transcription dispatch queue.
//!
//! Unbounded FIFO between the segmenter (producer) and the transcription
//! worker (consumer), with a lossy admission policy for partials: finals
//! are always admitted, partials are dropped when a final from the same
//! batch supersedes them or when the backlog is already deep. A separate
//! outstanding-work counter lets `join` wait until every admitted task has
//! been fully processed, not merely dequeued.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Notify, mpsc};

use crate::defaults;
use crate::segment::SegmentTask;

struct Shared {
    /// Tasks enqueued but not yet dequeued.
    depth: AtomicUsize,
    /// Tasks admitted but not yet fully processed (queued or in flight).
    outstanding: AtomicUsize,
    drained: Notify,
}

/// Producer half: admission control and drain waiting.
#[derive(Clone)]
pub struct DispatchQueue {
    tx: mpsc::UnboundedSender<SegmentTask>,
    shared: Arc<Shared>,
    max_partial_backlog: usize,
}

/// Consumer half, owned by the transcription worker.
pub struct TaskReceiver {
    rx: mpsc::UnboundedReceiver<SegmentTask>,
    shared: Arc<Shared>,
}

/// Creates a connected queue/receiver pair.
pub fn channel() -> (DispatchQueue, TaskReceiver) {
    channel_with_backlog(defaults::MAX_PARTIAL_BACKLOG)
}

/// Creates a pair with a custom partial backlog cap (tests).
pub fn channel_with_backlog(max_partial_backlog: usize) -> (DispatchQueue, TaskReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let shared = Arc::new(Shared {
        depth: AtomicUsize::new(0),
        outstanding: AtomicUsize::new(0),
        drained: Notify::new(),
    });
    (
        DispatchQueue {
            tx,
            shared: Arc::clone(&shared),
            max_partial_backlog,
        },
        TaskReceiver { rx, shared },
    )
}

impl DispatchQueue {
    /// Applies admission control to one segmenter batch and enqueues the
    /// survivors in order.
    ///
    /// A final in the batch supersedes every partial in the same batch.
    /// Partials are also dropped while the queue already holds
    /// `max_partial_backlog` or more tasks. Returns the number admitted.
    pub fn admit(&self, tasks: Vec<SegmentTask>) -> usize {
        let has_final = tasks.iter().any(SegmentTask::is_final);
        let mut admitted = 0;

        for task in tasks {
            if task.is_partial() {
                if has_final {
                    tracing::trace!(segment_id = task.segment_id, "partial superseded by final");
                    continue;
                }
                if self.shared.depth.load(Ordering::SeqCst) >= self.max_partial_backlog {
                    tracing::debug!(segment_id = task.segment_id, "partial dropped, backlog full");
                    continue;
                }
            }
            self.push(task);
            admitted += 1;
        }
        admitted
    }

    fn push(&self, task: SegmentTask) {
        self.shared.outstanding.fetch_add(1, Ordering::SeqCst);
        self.shared.depth.fetch_add(1, Ordering::SeqCst);
        // Receiver gone means the connection is closing; the task can
        // only be dropped.
        if self.tx.send(task).is_err() {
            self.shared.depth.fetch_sub(1, Ordering::SeqCst);
            self.task_done_inner();
        }
    }

    /// Tasks currently enqueued (not yet dequeued by the worker).
    pub fn depth(&self) -> usize {
        self.shared.depth.load(Ordering::SeqCst)
    }

    /// Waits until every admitted task has been fully processed.
    pub async fn join(&self) {
        loop {
            let drained = self.shared.drained.notified();
            tokio::pin!(drained);
            // Register for the wakeup before re-checking the counter, so a
            // task_done landing in between cannot be missed.
            drained.as_mut().enable();
            if self.shared.outstanding.load(Ordering::SeqCst) == 0 {
                return;
            }
            drained.await;
        }
    }

    fn task_done_inner(&self) {
        if self.shared.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.shared.drained.notify_waiters();
        }
    }
}

impl TaskReceiver {
    /// Dequeues the next task. Returns None once every producer handle
    /// has been dropped and the queue is empty.
    pub async fn recv(&mut self) -> Option<SegmentTask> {
        let task = self.rx.recv().await?;
        self.shared.depth.fetch_sub(1, Ordering::SeqCst);
        Some(task)
    }

    /// Tasks still enqueued behind the one just received.
    pub fn backlog(&self) -> usize {
        self.shared.depth.load(Ordering::SeqCst)
    }

    /// Marks the most recently received task as fully processed.
    pub fn task_done(&self) {
        if self.shared.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.shared.drained.notify_waiters();
        }
    }
}
