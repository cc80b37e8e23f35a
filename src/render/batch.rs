// src/render/batch.rs

//! Rendering sets of files, strictly one at a time.
//!
//! A failing file aborts the rest of its batch.

use std::future::Future;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tracing::{debug, error};

use crate::errors::{MystError, Result};
use crate::path_utils::relative_within;
use crate::render::{targets, RenderContext, RenderOutcome};

/// Counts of what a batch did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub written: usize,
    pub up_to_date: usize,
    /// Files without a renderer or whose renderer declined.
    pub skipped: usize,
}

impl BuildReport {
    pub fn total(&self) -> usize {
        self.written + self.up_to_date + self.skipped
    }

    fn record(&mut self, outcome: &RenderOutcome) {
        match outcome {
            RenderOutcome::Written(_) => self.written += 1,
            RenderOutcome::UpToDate(_) => self.up_to_date += 1,
            RenderOutcome::Declined(_) | RenderOutcome::NoRenderer => self.skipped += 1,
        }
    }
}

impl AddAssign for BuildReport {
    fn add_assign(&mut self, other: Self) {
        self.written += other.written;
        self.up_to_date += other.up_to_date;
        self.skipped += other.skipped;
    }
}

/// Render every file selected by the configured target patterns.
pub async fn render_all(ctx: &RenderContext) -> Result<BuildReport> {
    render_glob(ctx, &ctx.settings().target).await
}

/// Render every file matching `patterns`. Files under the output directory
/// are never selected.
pub async fn render_glob(ctx: &RenderContext, patterns: &[String]) -> Result<BuildReport> {
    let files = targets::expand(ctx.fs(), patterns, Some(&ctx.settings().out_dir))?;
    debug!(count = files.len(), "expanded target patterns");
    render_files(ctx, &files).await
}

/// Render `files`, each into the output directory mirroring its place under
/// the root directory.
///
/// If any file lies outside the root directory nothing is rendered.
pub async fn render_files(ctx: &RenderContext, files: &[PathBuf]) -> Result<BuildReport> {
    let settings = ctx.settings();
    let mut placed = Vec::with_capacity(files.len());

    for file in files {
        let Some(rel) = relative_within(&settings.root_dir, file) else {
            error!(
                "Target file {} is out of the root directory {}",
                file.display(),
                settings.root_dir.display()
            );
            return Err(MystError::OutsideRoot {
                file: file.clone(),
                root: settings.root_dir.clone(),
            });
        };
        let out_dir = match rel.parent() {
            Some(parent) => settings.out_dir.join(parent),
            None => settings.out_dir.clone(),
        };
        placed.push((file.as_path(), out_dir));
    }

    let mut report = BuildReport::default();
    for (file, out_dir) in placed {
        report += render_file(ctx, file, &out_dir).await?;
    }
    Ok(report)
}

/// Render every entry of `dir` into `out_dir`.
pub async fn render_directory(
    ctx: &RenderContext,
    dir: &Path,
    out_dir: &Path,
) -> Result<BuildReport> {
    debug!(dir = ?dir, out_dir = ?out_dir, "started rendering directory");
    let entries = ctx.fs().read_dir(dir).map_err(|e| MystError::io(dir, e))?;

    let mut report = BuildReport::default();
    for entry in &entries {
        report += render_file(ctx, entry, out_dir).await?;
    }
    debug!(dir = ?dir, "finished rendering directory");
    Ok(report)
}

/// Render one file (or, for a directory, everything inside it into
/// `<out_dir>/<dir name>`).
pub fn render_file<'a>(
    ctx: &'a RenderContext,
    file: &'a Path,
    out_dir: &'a Path,
) -> Pin<Box<dyn Future<Output = Result<BuildReport>> + Send + 'a>> {
    Box::pin(async move {
        let fs = ctx.fs();
        if fs.is_dir(file) {
            let name = file.file_name().unwrap_or_default();
            return render_directory(ctx, file, &out_dir.join(name)).await;
        }
        if !fs.is_file(file) {
            return Err(MystError::io(
                file,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            ));
        }

        let mut report = BuildReport::default();
        let Some(renderer) = ctx.get_renderer(file) else {
            debug!(file = ?file, "skip: no renderer");
            report.record(&RenderOutcome::NoRenderer);
            return Ok(report);
        };

        debug!(file = ?file, "rendering file");
        let data = ctx.make_data(file)?;
        let outcome = renderer.render(ctx, file, out_dir, data).await?;
        report.record(&outcome);
        Ok(report)
    })
}
