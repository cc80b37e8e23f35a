// src/lib.rs

pub mod cli;
pub mod config;
pub mod data;
pub mod engine;
pub mod errors;
pub mod extension;
pub mod fs;
pub mod logging;
pub mod path_utils;
pub mod render;
pub mod templates;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_project, Project, SettingsOverrides};
use crate::engine::{ContextBackend, CoreRuntime, Runtime, RuntimeEvent};
use crate::extension::ExtensionRegistry;
use crate::fs::{FileSystem, RealFileSystem};
use crate::render::{render_all, BuildReport, RenderContext};

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<()> {
    run_with_extensions(args, ExtensionRegistry::new()).await
}

/// Like [`run`], with compiled-in extension units available to the
/// project's `extension` setting.
///
/// This wires together:
/// - project discovery and settings resolution
/// - the render context (data, dependency mtimes, extensions)
/// - the initial build (unless `--no-build`)
/// - with `--watch`: the watchers, Ctrl-C handling and the rebuild runtime
pub async fn run_with_extensions(args: CliArgs, extensions: ExtensionRegistry) -> Result<()> {
    let cwd = match &args.cwd {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => std::env::current_dir()?.join(dir),
        None => std::env::current_dir()?,
    };
    debug!(cwd = ?cwd, project = %args.project, "finding project");

    let overrides = SettingsOverrides {
        out_dir: args.out_dir.clone(),
        out_ext: args.out_ext.clone(),
        force: args.force,
    };
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let project = load_project(fs.as_ref(), &cwd, &args.project, &overrides)?;

    let ctx = make_context(&project, fs, &extensions)?;

    if !args.no_build {
        build(&ctx).await?;
    }

    if args.watch {
        watch_to_render(ctx).await?;
    }
    Ok(())
}

/// Create the render context for `project`: load data, read dependency
/// mtimes, then install extensions.
pub fn make_context(
    project: &Project,
    fs: Arc<dyn FileSystem>,
    extensions: &ExtensionRegistry,
) -> crate::errors::Result<RenderContext> {
    let mut ctx = RenderContext::with_fs(&project.project_dir, project.settings.clone(), fs);
    ctx.load_data()?;
    ctx.read_dependency()?;
    ctx.load_extensions(extensions)?;
    Ok(ctx)
}

/// Render every target once.
pub async fn build(ctx: &RenderContext) -> crate::errors::Result<BuildReport> {
    let report = render_all(ctx).await?;
    debug!(?report, "build report");
    info!("Build done.");
    Ok(report)
}

/// Watch the project and re-render on changes until Ctrl-C.
pub async fn watch_to_render(ctx: RenderContext) -> Result<()> {
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let _watchers = crate::watch::spawn_watchers(ctx.settings(), rt_tx.clone())
        .context("starting file watchers")?;

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let runtime = Runtime::new(CoreRuntime::new(), rt_rx, ContextBackend::new(ctx));
    runtime.run().await?;
    Ok(())
}

