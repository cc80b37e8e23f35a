// src/engine/core.rs

//! Pure rebuild state machine.
//!
//! Two states: `Idle` and `Rendering`. Any change event seen while idle
//! starts a rebuild and moves to `Rendering`; events seen while rendering
//! are dropped. [`CoreRuntime::settle`] returns to `Idle` once the shell has
//! finished the rebuild, whatever its outcome.
//!
//! No channels, no Tokio, no IO: the core is tested on its own.

use tracing::debug;

use crate::engine::{RebuildCommand, RuntimeEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RebuildState {
    #[default]
    Idle,
    Rendering,
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    /// Rebuild the shell should run now, if any.
    pub command: Option<RebuildCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn idle() -> Self {
        Self {
            command: None,
            keep_running: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct CoreRuntime {
    state: RebuildState,
    dropped: usize,
}

impl CoreRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RebuildState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == RebuildState::Idle
    }

    /// Number of change events dropped because a rebuild was in flight.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        let command = match event {
            RuntimeEvent::ShutdownRequested => {
                return CoreStep {
                    command: None,
                    keep_running: false,
                };
            }
            RuntimeEvent::TargetRemoved(path) => {
                debug!(path = ?path, "target file is removed");
                return CoreStep::idle();
            }
            RuntimeEvent::TargetUpdated(path) => RebuildCommand::RenderFile(path),
            RuntimeEvent::DataUpdated(path) => {
                debug!(path = ?path, "data changed");
                RebuildCommand::ReloadData
            }
            RuntimeEvent::DependencyUpdated(path) => {
                debug!(path = ?path, "dependency changed");
                RebuildCommand::RescanDependencies
            }
        };

        if self.state == RebuildState::Rendering {
            self.dropped += 1;
            debug!(?command, "rebuild in progress; dropping event");
            return CoreStep::idle();
        }

        self.state = RebuildState::Rendering;
        CoreStep {
            command: Some(command),
            keep_running: true,
        }
    }

    /// The in-flight rebuild finished (successfully or not).
    pub fn settle(&mut self) {
        self.state = RebuildState::Idle;
    }
}
