//! File watching for rebuild on change.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// File was created
    Created(PathBuf),

    /// File was modified
    Modified(PathBuf),

    /// File was deleted
    Deleted(PathBuf),
}

impl WatchEvent {
    /// The path the event refers to.
    pub fn path(&self) -> &Path {
        match self {
            Self::Created(p) | Self::Modified(p) | Self::Deleted(p) => p,
        }
    }
}

/// A watched location.
#[derive(Debug, Clone)]
enum Target {
    /// Everything below a directory
    Dir(PathBuf),
    /// A single file, watched through its parent so replacements are seen
    File(PathBuf),
}

impl Target {
    /// Resolve a configured path. Files need not exist yet; their parent must.
    fn resolve(path: &Path) -> Option<Self> {
        if path.is_dir() {
            return path.canonicalize().ok().map(Self::Dir);
        }

        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let parent = parent.canonicalize().ok()?;
        let name = path.file_name()?;

        Some(Self::File(parent.join(name)))
    }

    fn root(&self) -> (&Path, RecursiveMode) {
        match self {
            Self::Dir(dir) => (dir, RecursiveMode::Recursive),
            Self::File(file) => (
                file.parent().unwrap_or(Path::new("/")),
                RecursiveMode::NonRecursive,
            ),
        }
    }

    fn matches(&self, path: &Path) -> bool {
        match self {
            Self::Dir(dir) => path.starts_with(dir),
            Self::File(file) => path == file,
        }
    }
}

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher for the given files or directories.
    ///
    /// Returns the watcher and a channel to receive events.
    pub fn new(
        paths: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let targets: Vec<Target> = paths
            .iter()
            .filter_map(|p| {
                let target = Target::resolve(p);
                if target.is_none() {
                    tracing::warn!("Not watching {}: parent directory missing", p.display());
                }
                target
            })
            .collect();

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        let mut roots = HashSet::new();
        for target in &targets {
            let (root, mode) = target.root();
            if roots.insert(root.to_path_buf()) {
                watcher.watch(root, mode).map_err(std::io::Error::other)?;
            }
        }

        std::thread::spawn(move || {
            let mut last_event_time: Option<Instant> = None;
            let debounce_duration = Duration::from_millis(100);

            while let Ok(event) = sync_rx.recv() {
                for path in event.paths {
                    if !targets.iter().any(|t| t.matches(&path)) {
                        continue;
                    }

                    let Some(watch_event) = classify_event(&path, &event.kind) else {
                        continue;
                    };

                    // Debounce rapid events
                    let now = Instant::now();
                    if last_event_time.is_some_and(|t| now.duration_since(t) < debounce_duration) {
                        continue;
                    }
                    last_event_time = Some(now);

                    if async_tx.blocking_send(watch_event).is_err() {
                        return;
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    match kind {
        EventKind::Create(_) => Some(WatchEvent::Created(path.to_path_buf())),
        EventKind::Remove(_) => Some(WatchEvent::Deleted(path.to_path_buf())),
        EventKind::Modify(_) => Some(WatchEvent::Modified(path.to_path_buf())),
        _ => None,
    }
}
