// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::engine::backend::RebuildBackend;
use crate::engine::core::CoreRuntime;
use crate::engine::{RebuildCommand, RuntimeEvent};
use crate::errors::Result;

/// Drives the rebuild state machine from `RuntimeEvent`s and delegates the
/// rebuilds themselves to a [`RebuildBackend`].
///
/// Rebuilds run inline in the event loop. When one finishes, every event
/// that queued up meanwhile is fed to the core, which is still `Rendering`
/// and therefore drops them; then the core settles back to `Idle`. A
/// shutdown request seen during that drain still stops the loop.
pub struct Runtime<B: RebuildBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    backend: B,
}

impl<B: RebuildBackend> fmt::Debug for Runtime<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<B: RebuildBackend> Runtime<B> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, backend: B) -> Self {
        Self {
            core,
            event_rx,
            backend,
        }
    }

    /// Main event loop. Returns the backend once the loop stops, so callers
    /// (and tests) can inspect it.
    pub async fn run(mut self) -> Result<B> {
        debug!("rebuild runtime started");

        while let Some(event) = self.event_rx.recv().await {
            debug!(?event, "runtime received event");

            let step = self.core.step(event);
            if let Some(command) = step.command {
                self.execute(command).await;
                if !self.drain_and_settle() {
                    info!("shutdown requested; stopping watch");
                    return Ok(self.backend);
                }
            }

            if !step.keep_running {
                info!("shutdown requested; stopping watch");
                return Ok(self.backend);
            }
        }

        debug!("runtime event channel closed; exiting");
        Ok(self.backend)
    }

    /// Run one rebuild. Failures are logged, never propagated.
    async fn execute(&mut self, command: RebuildCommand) {
        match &command {
            RebuildCommand::RenderFile(path) => {
                info!("Target file is updated. Rerendering...");
                debug!(path = ?path, "updated file");
            }
            RebuildCommand::ReloadData | RebuildCommand::RescanDependencies => {
                info!("Dependency directory is updated. Rerendering...");
            }
        }

        match self.backend.rebuild(command).await {
            Ok(report) => {
                debug!(?report, "rebuild finished");
                info!("Rendering done.");
            }
            Err(e) => error!("{e}"),
        }
    }

    /// Drop the events that arrived during the rebuild, then go back to
    /// `Idle`. Returns false if one of them was a shutdown request.
    fn drain_and_settle(&mut self) -> bool {
        let mut keep_running = true;
        while let Ok(event) = self.event_rx.try_recv() {
            keep_running &= self.core.step(event).keep_running;
        }
        self.core.settle();
        keep_running
    }
}
