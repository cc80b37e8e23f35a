// src/render/hooks.rs

//! Extension points around data loading and rendering.
//!
//! Hooks run in registration order and each one sees the result of the
//! previous. A hook that returns `None` (where that is allowed) leaves the
//! value unchanged. Lists are append-only.
//!
//! The synchronous hooks are plain closures. The three file-content hooks
//! may need to await, so they are traits returning a boxed future;
//! [`SyncHook`] adapts an ordinary closure to any of them.

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::Result;
use crate::render::{RenderContext, Renderer};
use crate::types::{FileContent, LoadMode};

pub type HookFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Runs after the merged data changes.
pub type PostLoadDataHook = Arc<dyn Fn(&mut RenderContext) -> Result<()> + Send + Sync>;

/// Runs before each file is rendered and may replace the data it sees.
pub type PreRenderHook =
    Arc<dyn Fn(&RenderContext, &Path, &Value) -> Result<Option<Value>> + Send + Sync>;

/// Supplies a renderer for an extension nothing else handles.
pub type UnknownExtensionHook =
    Arc<dyn Fn(&RenderContext, &str) -> Option<Arc<dyn Renderer>> + Send + Sync>;

/// Transforms rendered content before it is written.
pub trait PostRenderHook: Send + Sync {
    fn apply<'a>(
        &'a self,
        ctx: &'a RenderContext,
        content: FileContent,
        target: &'a Path,
        original: &'a Path,
    ) -> HookFuture<'a, FileContent>;
}

/// Supplies the content of a file instead of reading it from disk.
pub trait LoadFileHook: Send + Sync {
    fn load<'a>(
        &'a self,
        ctx: &'a RenderContext,
        path: &'a Path,
        mode: LoadMode,
    ) -> HookFuture<'a, Option<FileContent>>;
}

/// Transforms loaded file content before an engine sees it.
pub trait PostLoadFileHook: Send + Sync {
    fn apply<'a>(
        &'a self,
        ctx: &'a RenderContext,
        path: &'a Path,
        content: &'a FileContent,
    ) -> HookFuture<'a, Option<FileContent>>;
}

/// Wraps a synchronous closure so it can be used as an async hook.
#[derive(Debug, Clone, Copy)]
pub struct SyncHook<F>(pub F);

impl<F> PostRenderHook for SyncHook<F>
where
    F: Fn(&RenderContext, FileContent, &Path, &Path) -> Result<FileContent> + Send + Sync,
{
    fn apply<'a>(
        &'a self,
        ctx: &'a RenderContext,
        content: FileContent,
        target: &'a Path,
        original: &'a Path,
    ) -> HookFuture<'a, FileContent> {
        let result = (self.0)(ctx, content, target, original);
        Box::pin(async move { result })
    }
}

impl<F> LoadFileHook for SyncHook<F>
where
    F: Fn(&RenderContext, &Path, LoadMode) -> Result<Option<FileContent>> + Send + Sync,
{
    fn load<'a>(
        &'a self,
        ctx: &'a RenderContext,
        path: &'a Path,
        mode: LoadMode,
    ) -> HookFuture<'a, Option<FileContent>> {
        let result = (self.0)(ctx, path, mode);
        Box::pin(async move { result })
    }
}

impl<F> PostLoadFileHook for SyncHook<F>
where
    F: Fn(&RenderContext, &Path, &FileContent) -> Result<Option<FileContent>> + Send + Sync,
{
    fn apply<'a>(
        &'a self,
        ctx: &'a RenderContext,
        path: &'a Path,
        content: &'a FileContent,
    ) -> HookFuture<'a, Option<FileContent>> {
        let result = (self.0)(ctx, path, content);
        Box::pin(async move { result })
    }
}

/// The six hook lists of a context.
#[derive(Clone, Default)]
pub struct Hooks {
    pub(crate) post_load_data: Vec<PostLoadDataHook>,
    pub(crate) pre_render: Vec<PreRenderHook>,
    pub(crate) post_render: Vec<Arc<dyn PostRenderHook>>,
    pub(crate) unknown_extension: Vec<UnknownExtensionHook>,
    pub(crate) load_file: Vec<Arc<dyn LoadFileHook>>,
    pub(crate) post_load_file: Vec<Arc<dyn PostLoadFileHook>>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("post_load_data", &self.post_load_data.len())
            .field("pre_render", &self.pre_render.len())
            .field("post_render", &self.post_render.len())
            .field("unknown_extension", &self.unknown_extension.len())
            .field("load_file", &self.load_file.len())
            .field("post_load_file", &self.post_load_file.len())
            .finish()
    }
}

impl RenderContext {
    pub fn add_post_load_data_hook<F>(&mut self, hook: F)
    where
        F: Fn(&mut RenderContext) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.post_load_data.push(Arc::new(hook));
    }

    pub fn add_pre_render_hook<F>(&mut self, hook: F)
    where
        F: Fn(&RenderContext, &Path, &Value) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        self.hooks.pre_render.push(Arc::new(hook));
    }

    pub fn add_post_render_hook<F>(&mut self, hook: F)
    where
        F: Fn(&RenderContext, FileContent, &Path, &Path) -> Result<FileContent>
            + Send
            + Sync
            + 'static,
    {
        self.hooks.post_render.push(Arc::new(SyncHook(hook)));
    }

    pub fn add_async_post_render_hook(&mut self, hook: impl PostRenderHook + 'static) {
        self.hooks.post_render.push(Arc::new(hook));
    }

    pub fn add_unknown_extension_hook<F>(&mut self, hook: F)
    where
        F: Fn(&RenderContext, &str) -> Option<Arc<dyn Renderer>> + Send + Sync + 'static,
    {
        self.hooks.unknown_extension.push(Arc::new(hook));
    }

    pub fn add_load_file_hook<F>(&mut self, hook: F)
    where
        F: Fn(&RenderContext, &Path, LoadMode) -> Result<Option<FileContent>>
            + Send
            + Sync
            + 'static,
    {
        self.hooks.load_file.push(Arc::new(SyncHook(hook)));
    }

    pub fn add_async_load_file_hook(&mut self, hook: impl LoadFileHook + 'static) {
        self.hooks.load_file.push(Arc::new(hook));
    }

    pub fn add_post_load_file_hook<F>(&mut self, hook: F)
    where
        F: Fn(&RenderContext, &Path, &FileContent) -> Result<Option<FileContent>>
            + Send
            + Sync
            + 'static,
    {
        self.hooks.post_load_file.push(Arc::new(SyncHook(hook)));
    }

    pub fn add_async_post_load_file_hook(&mut self, hook: impl PostLoadFileHook + 'static) {
        self.hooks.post_load_file.push(Arc::new(hook));
    }

    /// Run the post-load-data hooks in order.
    pub(crate) fn run_post_load_data_hooks(&mut self) -> Result<()> {
        let hooks = self.hooks.post_load_data.clone();
        for hook in &hooks {
            hook(self)?;
        }
        Ok(())
    }

    /// Fold the pre-render hooks over `data`. A replacement must be an object.
    pub(crate) fn run_pre_render_hooks(&self, file: &Path, mut data: Value) -> Result<Value> {
        for hook in &self.hooks.pre_render {
            match hook(self, file, &data)? {
                Some(replacement @ Value::Object(_)) => data = replacement,
                Some(_) => {
                    return Err(crate::errors::MystError::Extension(format!(
                        "pre-render hook for {} must return an object",
                        file.display()
                    )));
                }
                None => {}
            }
        }
        Ok(data)
    }

    /// Fold the post-render hooks over `content`. A hook may rewrite the
    /// content but not turn text into bytes or the other way round.
    pub(crate) async fn run_post_render_hooks(
        &self,
        mut content: FileContent,
        target: &Path,
        original: &Path,
    ) -> Result<FileContent> {
        for hook in &self.hooks.post_render {
            let was_text = matches!(content, FileContent::Text(_));
            content = hook.apply(self, content, target, original).await?;
            if was_text != matches!(content, FileContent::Text(_)) {
                return Err(crate::errors::MystError::Extension(format!(
                    "post-render hook changed the content type of {}",
                    target.display()
                )));
            }
        }
        Ok(content)
    }

    /// First load-file hook that claims `path`, if any.
    pub(crate) async fn run_load_file_hooks(
        &self,
        path: &Path,
        mode: LoadMode,
    ) -> Result<Option<FileContent>> {
        for hook in &self.hooks.load_file {
            if let Some(content) = hook.load(self, path, mode).await? {
                return Ok(Some(content));
            }
        }
        Ok(None)
    }

    pub(crate) async fn run_post_load_file_hooks(
        &self,
        path: &Path,
        mut content: FileContent,
    ) -> Result<FileContent> {
        for hook in &self.hooks.post_load_file {
            if let Some(replacement) = hook.apply(self, path, &content).await? {
                content = replacement;
            }
        }
        Ok(content)
    }

    /// First renderer offered by an unknown-extension hook.
    pub(crate) fn run_unknown_extension_hooks(&self, ext: &str) -> Option<Arc<dyn Renderer>> {
        self.hooks
            .unknown_extension
            .iter()
            .find_map(|hook| hook(self, ext))
    }
}
