// src/engine/mod.rs

//! Watch-mode rebuild engine.
//!
//! Change notifications from the watchers arrive as [`RuntimeEvent`]s. The
//! pure state machine in [`core`] turns each event into at most one
//! [`RebuildCommand`]; the async shell in [`runtime`] executes commands
//! through a [`RebuildBackend`] and drops whatever arrived while a rebuild
//! was in flight.

use std::path::PathBuf;

/// Events flowing into the runtime from the watchers and the signal handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// A target file was created or modified.
    TargetUpdated(PathBuf),
    /// A target file was removed. Outputs are not pruned.
    TargetRemoved(PathBuf),
    /// Something under the data directory changed.
    DataUpdated(PathBuf),
    /// Something under a dependency path changed.
    DependencyUpdated(PathBuf),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// Work the shell should perform for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildCommand {
    /// Render this one file.
    RenderFile(PathBuf),
    /// Reload the data directory, then render all targets.
    ReloadData,
    /// Rescan dependency mtimes, then render all targets.
    RescanDependencies,
}

pub mod backend;
pub mod core;
pub mod runtime;

pub use backend::{ContextBackend, RebuildBackend};
pub use core::{CoreRuntime, CoreStep, RebuildState};
pub use runtime::Runtime;
