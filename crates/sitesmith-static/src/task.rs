//! Background generation task with progress reporting and cancellation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::builder::{BuildError, BuildResult};

/// A unit of work in a site build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Render the HTML document
    Generate,
    /// Write the document to disk
    WriteSite,
    /// Render the preview page
    RenderPreview,
    /// Write the generation log
    WriteLog,
    /// Write the shared index, assets and manifest
    Finalize,
}

impl Stage {
    /// Stages run for every site, in order.
    pub const PER_SITE: [Stage; 4] = [
        Self::Generate,
        Self::WriteSite,
        Self::RenderPreview,
        Self::WriteLog,
    ];

    /// Short label for log output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::WriteSite => "write site",
            Self::RenderPreview => "render preview",
            Self::WriteLog => "write log",
            Self::Finalize => "finalize",
        }
    }
}

/// Snapshot of build progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Stages finished so far
    pub completed: usize,
    /// Stages in the whole build
    pub total: usize,
    /// `completed * 100 / total`
    pub percent: u8,
    /// Most recently finished stage, e.g. `nova-studio: render preview`
    pub current: Option<String>,
}

impl Progress {
    fn at(completed: usize, total: usize, current: Option<String>) -> Self {
        let percent = if total == 0 {
            0
        } else {
            (completed.min(total) * 100 / total) as u8
        };

        Self {
            completed,
            total,
            percent,
            current,
        }
    }

    /// Whether every stage has finished.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

/// Shared flag used to request cancellation of a running build.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Request cancellation. The build stops before its next stage.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Tracks stage completion for one build.
pub(crate) struct Tracker {
    cancel: CancelHandle,
    progress: Option<watch::Sender<Progress>>,
    completed: AtomicUsize,
    total: AtomicUsize,
}

impl Tracker {
    /// A tracker nobody observes or cancels.
    pub(crate) fn detached() -> Self {
        Self::new(CancelHandle::default(), None)
    }

    pub(crate) fn new(cancel: CancelHandle, progress: Option<watch::Sender<Progress>>) -> Self {
        Self {
            cancel,
            progress,
            completed: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
        }
    }

    /// Reset counters for a build with `total` stages.
    pub(crate) fn start(&self, total: usize) {
        self.completed.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);

        if let Some(tx) = &self.progress {
            tx.send_replace(Progress::at(0, total, None));
        }
    }

    /// Fail with [`BuildError::Cancelled`] if cancellation was requested.
    pub(crate) fn checkpoint(&self) -> Result<(), BuildError> {
        if self.cancel.is_cancelled() {
            return Err(BuildError::Cancelled);
        }
        Ok(())
    }

    /// Record a finished stage.
    pub(crate) fn advance(&self, site: &str, stage: Stage) {
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let total = self.total.load(Ordering::SeqCst);

        tracing::debug!("[{}/{}] {}: {}", done, total, site, stage.label());

        self.publish(done, total, format!("{}: {}", site, stage.label()));
    }

    /// Publish a stage count. Parallel sites may report out of order, so
    /// older counts are dropped.
    fn publish(&self, done: usize, total: usize, current: String) {
        if let Some(tx) = &self.progress {
            tx.send_modify(|p| {
                if done > p.completed {
                    *p = Progress::at(done, total, Some(current));
                }
            });
        }
    }
}

/// A build running on the blocking thread pool.
pub struct GenerationTask {
    handle: JoinHandle<Result<BuildResult, BuildError>>,
    progress: watch::Receiver<Progress>,
    cancel: CancelHandle,
}

impl GenerationTask {
    pub(crate) fn new(
        handle: JoinHandle<Result<BuildResult, BuildError>>,
        progress: watch::Receiver<Progress>,
        cancel: CancelHandle,
    ) -> Self {
        Self {
            handle,
            progress,
            cancel,
        }
    }

    /// Subscribe to progress updates.
    pub fn progress(&self) -> watch::Receiver<Progress> {
        self.progress.clone()
    }

    /// Handle that can cancel this task after it has been moved into `join`.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the build to finish.
    pub async fn join(self) -> Result<BuildResult, BuildError> {
        self.handle
            .await
            .map_err(|e| BuildError::TaskFailed(e.to_string()))?
    }
}
