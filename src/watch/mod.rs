// src/watch/mod.rs

//! File watching for `--watch` sessions.
//!
//! Three surfaces are watched: the root directory (render targets), the
//! data directory, and each dependency path. Each surface gets its own
//! `notify` watcher; all of them feed one channel of tagged events, which
//! an async task classifies into [`crate::engine::RuntimeEvent`]s.

pub mod event_handler;
pub mod watcher;

pub use event_handler::{change_kind, ChangeKind, Surface, WatchFilter};
pub use watcher::{spawn_watchers, surfaces, WatcherHandle};
