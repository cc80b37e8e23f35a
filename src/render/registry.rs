// src/render/registry.rs

//! Extension-keyed renderer lookup.
//!
//! Resolution order for a file's lowercased extension:
//! 1. the context's renderer cache (which also holds explicit registrations);
//! 2. the built-in table below;
//! 3. the unknown-extension hooks, first `Some` wins.
//!
//! Whatever 2 or 3 produce is cached, so each extension resolves once.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::path_utils::normalize_ext;
use crate::render::builtin::{SassRenderer, StaticRenderer, TemplateRenderer};
use crate::render::{RenderContext, Renderer};

/// Registry key for `ext`: lowercased, with a leading dot.
pub fn ext_key(ext: &str) -> String {
    normalize_ext(&ext.to_lowercase())
}

/// Dispatch key for `path`: its lowercased extension with a leading dot, or
/// the empty string if it has none.
pub fn ext_of(path: &Path) -> String {
    path.extension()
        .map(|e| ext_key(&e.to_string_lossy()))
        .unwrap_or_default()
}

impl RenderContext {
    /// Renderer for `path`, or `None` if nothing handles its extension.
    pub fn get_renderer(&self, path: &Path) -> Option<Arc<dyn Renderer>> {
        let ext = ext_of(path);

        if let Some(found) = self.cached_renderer(&ext) {
            return Some(found);
        }

        let resolved = match builtin_renderer(self, &ext) {
            Builtin::Found(r) => Some(r),
            Builtin::Unavailable => return None,
            Builtin::Unknown => {
                let offered = self.run_unknown_extension_hooks(&ext);
                if offered.is_some() {
                    debug!(%ext, "renderer supplied by unknown-extension hook");
                }
                offered
            }
        }?;

        if let Ok(mut map) = self.renderers.lock() {
            map.entry(ext).or_insert_with(|| Arc::clone(&resolved));
        }
        Some(resolved)
    }

    /// Register `renderer` for `ext`, replacing any built-in or earlier one.
    pub fn add_renderer(&self, ext: &str, renderer: Arc<dyn Renderer>) {
        if let Ok(mut map) = self.renderers.lock() {
            map.insert(ext_key(ext), renderer);
        }
    }

    fn cached_renderer(&self, ext: &str) -> Option<Arc<dyn Renderer>> {
        self.renderers.lock().ok()?.get(ext).cloned()
    }
}

enum Builtin {
    Found(Arc<dyn Renderer>),
    /// A built-in extension whose engine could not be loaded.
    Unavailable,
    Unknown,
}

fn builtin_renderer(ctx: &RenderContext, ext: &str) -> Builtin {
    let engine = match ext {
        ".jade" | ".pug" => "pug",
        ".ejs" => "ejs",
        ".dust" => "dust",
        ".hbs" | ".handlebars" => "handlebars",
        ".html" | ".htm" | ".css" | ".js" => return Builtin::Found(Arc::new(StaticRenderer)),
        ".sass" | ".scss" => return Builtin::Found(Arc::new(SassRenderer)),
        _ => return Builtin::Unknown,
    };
    match ctx.engines().resolve(engine) {
        Some(engine) => Builtin::Found(Arc::new(TemplateRenderer::new(engine))),
        None => Builtin::Unavailable,
    }
}
