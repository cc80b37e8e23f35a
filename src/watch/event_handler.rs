// src/watch/event_handler.rs

//! Turning raw notify events into runtime events.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::engine::RuntimeEvent;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::render::targets::TargetMatcher;

/// Which watcher an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Targets,
    Data,
    Dependency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Updated,
    Removed,
}

/// Classify a notify event kind. Access events and the like are `None`.
pub fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Updated),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => Some(ChangeKind::Removed),
        EventKind::Modify(_) => Some(ChangeKind::Updated),
        EventKind::Remove(_) => Some(ChangeKind::Removed),
        _ => None,
    }
}

/// Decides which changed paths matter and what they mean.
///
/// Paths inside the output directory and the cache file are ignored on
/// every surface, so the session never reacts to its own writes.
pub struct WatchFilter {
    root_dir: PathBuf,
    /// Canonical form of `root_dir`; notify may report canonical paths
    /// (e.g. `/private/var/...` on macOS for `/var/...`).
    canonical_root: Option<PathBuf>,
    ignored: Vec<PathBuf>,
    matcher: TargetMatcher,
    fs: Arc<dyn FileSystem>,
}

impl std::fmt::Debug for WatchFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchFilter")
            .field("root_dir", &self.root_dir)
            .field("ignored", &self.ignored)
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}

impl WatchFilter {
    pub fn new(settings: &Settings, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let mut ignored = vec![settings.out_dir.clone()];
        ignored.extend(settings.cache.iter().cloned());
        // Also ignore canonical forms of the same paths.
        let canonical: Vec<PathBuf> = ignored
            .iter()
            .filter_map(|p| p.canonicalize().ok())
            .collect();
        ignored.extend(canonical);

        Ok(Self {
            root_dir: settings.root_dir.clone(),
            canonical_root: settings.root_dir.canonicalize().ok(),
            ignored,
            matcher: TargetMatcher::new(&settings.target)?,
            fs,
        })
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.ignored.iter().any(|p| path.starts_with(p))
    }

    /// Map a reported path back under the configured root directory.
    fn configured_form(&self, path: &Path) -> Option<PathBuf> {
        if path.starts_with(&self.root_dir) {
            return Some(path.to_path_buf());
        }
        let canonical = self.canonical_root.as_ref()?;
        let rel = path.strip_prefix(canonical).ok()?;
        Some(self.root_dir.join(rel))
    }

    pub fn classify(&self, surface: Surface, kind: &EventKind, path: &Path) -> Option<RuntimeEvent> {
        let change = change_kind(kind)?;
        if self.is_ignored(path) {
            return None;
        }

        match surface {
            Surface::Data => Some(RuntimeEvent::DataUpdated(path.to_path_buf())),
            Surface::Dependency => Some(RuntimeEvent::DependencyUpdated(path.to_path_buf())),
            Surface::Targets => {
                let target = self.configured_form(path)?;
                if self.is_ignored(&target) || !self.matcher.matches(&target) {
                    return None;
                }
                match change {
                    ChangeKind::Removed => Some(RuntimeEvent::TargetRemoved(target)),
                    ChangeKind::Updated if self.fs.is_dir(&target) => None,
                    ChangeKind::Updated => Some(RuntimeEvent::TargetUpdated(target)),
                }
            }
        }
    }
}

/// Forward every interesting path of `event` to the runtime.
///
/// Returns false once the runtime channel is closed.
pub async fn process_notify_event(
    filter: &WatchFilter,
    surface: Surface,
    event: Event,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> bool {
    for path in &event.paths {
        let Some(runtime_event) = filter.classify(surface, &event.kind, path) else {
            continue;
        };
        debug!(?surface, ?runtime_event, "watch match");
        if let Err(err) = runtime_tx.send(runtime_event).await {
            warn!("failed to send runtime event: {err}");
            return false;
        }
    }
    true
}
