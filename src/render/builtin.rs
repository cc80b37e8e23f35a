// src/render/builtin.rs

//! Renderers behind the built-in extension table.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::errors::{MystError, Result};
use crate::render::{RenderContext, RenderFuture, Renderer};
use crate::templates::{TemplateEngine, TemplateInput};
use crate::types::{FileContent, LoadMode};

const TEMPLATE_TOKEN: &str = r"\$(\w+)";

/// Renders a template through a [`TemplateEngine`] into
/// `<out_dir>/<stem><out_ext>`.
///
/// The source and every template it includes are read with
/// [`RenderContext::load_rendered_file`], so load-file hooks can supply them.
/// The data gains a `filename` field naming the source, unless present.
pub struct TemplateRenderer {
    engine: Arc<dyn TemplateEngine>,
}

impl fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRenderer")
            .field("engine", &self.engine.name())
            .finish()
    }
}

impl TemplateRenderer {
    pub fn new(engine: Arc<dyn TemplateEngine>) -> Self {
        Self { engine }
    }

    async fn load_includes(
        &self,
        ctx: &RenderContext,
        source: &Path,
        text: &str,
    ) -> Result<HashMap<String, String>> {
        let mut loaded = HashMap::new();
        let mut pending = self.engine.includes(text, source)?;
        if pending.is_empty() {
            return Ok(loaded);
        }
        let tokens = Regex::new(TEMPLATE_TOKEN).map_err(anyhow::Error::from)?;

        while let Some(reference) = pending.pop() {
            if loaded.contains_key(&reference) {
                continue;
            }
            let path = resolve_template_ref(ctx, &tokens, source, &reference);
            debug!(template = %reference, path = ?path, "loading included template");
            let content = ctx.load_rendered_file(&path, LoadMode::Text).await?.into_text();
            pending.extend(self.engine.includes(&content, &path)?);
            loaded.insert(reference, content);
        }
        Ok(loaded)
    }
}

impl Renderer for TemplateRenderer {
    fn render<'a>(
        &'a self,
        ctx: &'a RenderContext,
        source: &'a Path,
        out_dir: &'a Path,
        data: Value,
    ) -> RenderFuture<'a> {
        Box::pin(async move {
            let target = ctx.target_file(source, out_dir, None);
            ctx.render(source, &target, move || async move {
                let text = ctx
                    .load_rendered_file(source, LoadMode::Text)
                    .await?
                    .into_text();
                let includes = self.load_includes(ctx, source, &text).await?;

                let mut data = data;
                if let Value::Object(map) = &mut data {
                    map.entry("filename")
                        .or_insert_with(|| Value::String(source.to_string_lossy().into_owned()));
                }
                let input = TemplateInput {
                    path: source,
                    data: &data,
                    includes: &includes,
                };
                let html = self.engine.render(&text, &input)?;
                Ok::<_, MystError>(Some(FileContent::Text(html)))
            })
            .await
        })
    }
}

/// Resolve a template reference written inside `source`.
///
/// `$proj` and `$root` (any case) expand to the project directory and the
/// root directory; the result is taken relative to the source's directory.
pub fn resolve_template_ref(
    ctx: &RenderContext,
    tokens: &Regex,
    source: &Path,
    reference: &str,
) -> PathBuf {
    let expanded = tokens.replace_all(reference, |caps: &regex::Captures<'_>| {
        match caps[1].to_lowercase().as_str() {
            "proj" => ctx.project_dir().to_string_lossy().into_owned(),
            "root" => ctx.settings().root_dir.to_string_lossy().into_owned(),
            _ => caps[0].to_string(),
        }
    });
    let base = source.parent().unwrap_or_else(|| Path::new(""));
    crate::path_utils::resolve(base, expanded.as_ref())
}

/// Copies html/htm/css/js files unchanged, keeping their file name.
///
/// Files that decode as UTF-8 travel through the post-render hooks as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticRenderer;

impl Renderer for StaticRenderer {
    fn render<'a>(
        &'a self,
        ctx: &'a RenderContext,
        source: &'a Path,
        out_dir: &'a Path,
        _data: Value,
    ) -> RenderFuture<'a> {
        Box::pin(async move {
            let name = source.file_name().unwrap_or_default();
            let target = out_dir.join(name);
            ctx.render(source, &target, || async move {
                let content = ctx.load_rendered_file(source, LoadMode::Binary).await?;
                Ok::<_, MystError>(Some(content.textual()))
            })
            .await
        })
    }
}

/// Compiles `.sass`/`.scss` into `<stem>.css`.
///
/// Declines (writes nothing) when no `sass` engine is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct SassRenderer;

impl Renderer for SassRenderer {
    fn render<'a>(
        &'a self,
        ctx: &'a RenderContext,
        source: &'a Path,
        out_dir: &'a Path,
        data: Value,
    ) -> RenderFuture<'a> {
        Box::pin(async move {
            let target = ctx.target_file(source, out_dir, Some(".css"));
            ctx.render(source, &target, move || async move {
                let text = ctx
                    .load_rendered_file(source, LoadMode::Text)
                    .await?
                    .into_text();
                let Some(engine) = ctx.engines().find("sass") else {
                    debug!(file = ?source, "skipped: no sass compiler is available");
                    return Ok::<_, MystError>(None);
                };
                let includes = HashMap::new();
                let input = TemplateInput {
                    path: source,
                    data: &data,
                    includes: &includes,
                };
                Ok(Some(FileContent::Text(engine.render(&text, &input)?)))
            })
            .await
        })
    }
}
