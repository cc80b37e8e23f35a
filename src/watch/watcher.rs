// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::Settings;
use crate::engine::RuntimeEvent;
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::event_handler::{process_notify_event, Surface, WatchFilter};

/// Keeps the underlying watchers alive. Dropping it stops file watching.
pub struct WatcherHandle {
    _inner: Vec<RecommendedWatcher>,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("watchers", &self._inner.len())
            .finish()
    }
}

/// The locations to watch for `settings`, tagged with their surface.
pub fn surfaces(settings: &Settings) -> Vec<(Surface, PathBuf)> {
    let mut out = vec![(Surface::Targets, settings.root_dir.clone())];
    if let Some(data) = &settings.data {
        out.push((Surface::Data, data.clone()));
    }
    for dep in &settings.dependency {
        out.push((Surface::Dependency, dep.clone()));
    }
    out
}

/// Start one recursive watcher per surface and a task that classifies their
/// events into [`RuntimeEvent`]s sent on `runtime_tx`.
pub fn spawn_watchers(
    settings: &Settings,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let filter = WatchFilter::new(settings, fs)?;

    // Channel from the blocking notify callbacks into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<(Surface, Event)>();

    let mut watchers = Vec::new();
    for (surface, path) in surfaces(settings) {
        let tx = event_tx.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Err(err) = tx.send((surface, event)) {
                        eprintln!("myst: failed to forward notify event: {err}");
                    }
                }
                Err(err) => eprintln!("myst: file watch error: {err}"),
            },
            Config::default(),
        )?;
        watcher
            .watch(&path, RecursiveMode::Recursive)
            .with_context(|| format!("watching {}", path.display()))?;
        debug!(?surface, path = ?path, "watching");
        watchers.push(watcher);
    }

    info!("Watch started.");

    tokio::spawn(async move {
        while let Some((surface, event)) = event_rx.recv().await {
            debug!(?surface, ?event, "received notify event");
            if !process_notify_event(&filter, surface, event, &runtime_tx).await {
                break;
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watchers })
}
