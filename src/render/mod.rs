// src/render/mod.rs

//! Incremental rendering.
//!
//! A [`RenderContext`] carries everything one build needs: resolved
//! settings, the merged data, the `base_mtime` high-water mark, the
//! renderer cache and the hook lists. Renderers are looked up per file
//! extension ([`registry`]), each file goes through the staleness check in
//! [`RenderContext::render`], and batches of files are rendered one after
//! another by the functions in [`batch`].

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use serde_json::Value;

use crate::errors::Result;

pub mod batch;
pub mod builtin;
pub mod context;
pub mod hooks;
pub mod registry;
pub mod staleness;
pub mod targets;

pub use batch::{render_all, render_directory, render_file, render_files, render_glob, BuildReport};
pub use context::RenderContext;
pub use hooks::{HookFuture, LoadFileHook, PostLoadFileHook, PostRenderHook, SyncHook};
pub use staleness::needs_render;

/// What happened to one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Output was (re)written at this path.
    Written(PathBuf),
    /// The target at this path was already newer than every input.
    UpToDate(PathBuf),
    /// The renderer produced nothing for this target; nothing was written.
    Declined(PathBuf),
    /// No renderer handles this file's extension.
    NoRenderer,
}

pub type RenderFuture<'a> = Pin<Box<dyn Future<Output = Result<RenderOutcome>> + Send + 'a>>;

/// Turns one source file into at most one output file.
///
/// `out_dir` is the directory the output belongs in; the renderer picks the
/// file name. Implementations normally hand their work to
/// [`RenderContext::render`], which makes repeated calls against unchanged
/// inputs a no-op.
pub trait Renderer: Send + Sync {
    fn render<'a>(
        &'a self,
        ctx: &'a RenderContext,
        source: &'a Path,
        out_dir: &'a Path,
        data: Value,
    ) -> RenderFuture<'a>;
}
