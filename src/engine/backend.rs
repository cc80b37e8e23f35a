// src/engine/backend.rs

//! How the runtime carries out rebuilds.
//!
//! The runtime talks to a `RebuildBackend` instead of a `RenderContext`
//! directly, so tests can swap in a backend that records commands (see the
//! `myst-test-utils` crate) while production uses [`ContextBackend`].

use std::future::Future;
use std::pin::Pin;

use crate::engine::RebuildCommand;
use crate::errors::Result;
use crate::render::{render_all, render_files, BuildReport, RenderContext};

pub trait RebuildBackend: Send {
    fn rebuild(
        &mut self,
        command: RebuildCommand,
    ) -> Pin<Box<dyn Future<Output = Result<BuildReport>> + Send + '_>>;
}

/// Backend that owns the session's [`RenderContext`] and renders through it.
#[derive(Debug)]
pub struct ContextBackend {
    ctx: RenderContext,
}

impl ContextBackend {
    pub fn new(ctx: RenderContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    pub fn into_context(self) -> RenderContext {
        self.ctx
    }
}

impl RebuildBackend for ContextBackend {
    fn rebuild(
        &mut self,
        command: RebuildCommand,
    ) -> Pin<Box<dyn Future<Output = Result<BuildReport>> + Send + '_>> {
        Box::pin(async move {
            match command {
                RebuildCommand::RenderFile(path) => render_files(&self.ctx, &[path]).await,
                RebuildCommand::ReloadData => {
                    self.ctx.load_data()?;
                    render_all(&self.ctx).await
                }
                RebuildCommand::RescanDependencies => {
                    self.ctx.read_dependency()?;
                    render_all(&self.ctx).await
                }
            }
        })
    }
}
