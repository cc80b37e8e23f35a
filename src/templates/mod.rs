// src/templates/mod.rs

//! Template engines and the capability lookup that finds them.
//!
//! An engine turns template source plus a data object into text. Engines
//! are looked up by name through an [`EngineCatalog`]: an engine provided
//! by the project (via an extension) wins over the copy bundled with this
//! crate; if neither exists the lookup yields `None` and the caller
//! degrades instead of failing.
//!
//! Bundled engines:
//! - [`ejs`]: `<%= %>` / `<%- %>` output tags.
//! - [`pug`]: indentation-based markup (`.pug`, `.jade`).
//! - [`dust`]: `{reference}` templates with sections and partials.
//! - [`hbs`]: Handlebars via the `handlebars` crate (feature `handlebars`).
//! - [`sass`]: SCSS/Sass via the `grass` crate (feature `sass`).

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;

pub mod dust;
pub mod ejs;
#[cfg(feature = "handlebars")]
pub mod hbs;
pub mod pug;
#[cfg(feature = "sass")]
pub mod sass;
pub mod value;

/// Everything an engine gets besides the template source.
#[derive(Debug, Clone, Copy)]
pub struct TemplateInput<'a> {
    /// Path of the template being rendered.
    pub path: &'a Path,
    pub data: &'a Value,
    /// Sources of templates referenced from this one (see
    /// [`TemplateEngine::includes`]), keyed by the reference as written.
    pub includes: &'a HashMap<String, String>,
}

pub trait TemplateEngine: Send + Sync {
    fn name(&self) -> &str;

    /// References to other templates that must be loaded before `source`
    /// can be rendered. Most engines have none.
    fn includes(&self, _source: &str, _path: &Path) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn render(&self, source: &str, input: &TemplateInput<'_>) -> Result<String>;
}

/// Name-keyed lookup of template engines, project-provided first.
#[derive(Clone, Default)]
pub struct EngineCatalog {
    provided: HashMap<String, Arc<dyn TemplateEngine>>,
    bundled_disabled: Vec<String>,
}

impl fmt::Debug for EngineCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut provided: Vec<_> = self.provided.keys().collect();
        provided.sort();
        f.debug_struct("EngineCatalog")
            .field("provided", &provided)
            .field("bundled_disabled", &self.bundled_disabled)
            .finish()
    }
}

impl EngineCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a project-provided engine under `name`.
    pub fn provide(&mut self, name: impl Into<String>, engine: Arc<dyn TemplateEngine>) {
        self.provided.insert(name.into(), engine);
    }

    /// Hide the bundled copy of `name`, so only a project-provided engine
    /// can satisfy lookups for it.
    pub fn disable_bundled(&mut self, name: impl Into<String>) {
        self.bundled_disabled.push(name.into());
    }

    /// Look up `name` without complaining if it is missing.
    pub fn find(&self, name: &str) -> Option<Arc<dyn TemplateEngine>> {
        if let Some(engine) = self.provided.get(name) {
            debug!(engine = %name, "using project-provided engine");
            return Some(Arc::clone(engine));
        }
        if self.bundled_disabled.iter().any(|n| n == name) {
            return None;
        }
        let engine = bundled(name)?;
        debug!(engine = %name, "using bundled engine");
        Some(engine)
    }

    /// Look up `name`, warning if no engine is available.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn TemplateEngine>> {
        let found = self.find(name);
        if found.is_none() {
            warn!("Failed to load template engine {name}");
        }
        found
    }
}

/// Engines compiled into this crate.
pub fn bundled(name: &str) -> Option<Arc<dyn TemplateEngine>> {
    match name {
        "ejs" => Some(Arc::new(ejs::EjsEngine)),
        "pug" => Some(Arc::new(pug::PugEngine)),
        "dust" => Some(Arc::new(dust::DustEngine)),
        #[cfg(feature = "handlebars")]
        "handlebars" => Some(Arc::new(hbs::HandlebarsEngine)),
        #[cfg(feature = "sass")]
        "sass" => Some(Arc::new(sass::SassEngine)),
        _ => None,
    }
}
