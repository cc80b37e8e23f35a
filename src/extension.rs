// src/extension.rs

//! Compiled-in extension units.
//!
//! A project lists extensions by name in its `extension` setting. Each name
//! must be registered in the [`ExtensionRegistry`] handed to
//! [`crate::run_with_extensions`]; installing one gives it mutable access to
//! the [`RenderContext`] so it can add hooks, renderers and engines.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error};

use crate::errors::{MystError, Result};
use crate::render::RenderContext;

pub trait Extension: Send + Sync {
    fn install(&self, ctx: &mut RenderContext) -> Result<()>;
}

impl<F> Extension for F
where
    F: Fn(&mut RenderContext) -> Result<()> + Send + Sync,
{
    fn install(&self, ctx: &mut RenderContext) -> Result<()> {
        self(ctx)
    }
}

#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    units: HashMap<String, Arc<dyn Extension>>,
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.units.keys().collect();
        names.sort();
        f.debug_struct("ExtensionRegistry")
            .field("units", &names)
            .finish()
    }
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, install: F) -> &mut Self
    where
        F: Fn(&mut RenderContext) -> Result<()> + Send + Sync + 'static,
    {
        self.units.insert(name.into(), Arc::new(install));
        self
    }

    pub fn register_unit(&mut self, name: impl Into<String>, unit: Arc<dyn Extension>) -> &mut Self {
        self.units.insert(name.into(), unit);
        self
    }

    /// Find the unit for a configured entry: first by the entry as written,
    /// then by the file stem of a path-like entry (`ext/banner.js` → `banner`).
    pub fn lookup(&self, entry: &str) -> Option<Arc<dyn Extension>> {
        if let Some(unit) = self.units.get(entry) {
            return Some(Arc::clone(unit));
        }
        let stem = Path::new(entry).file_stem()?.to_str()?;
        self.units.get(stem).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl RenderContext {
    /// Install the extensions named in the settings, in order.
    pub fn load_extensions(&mut self, registry: &ExtensionRegistry) -> Result<()> {
        let names = self.settings().extension.clone();
        if names.is_empty() {
            return Ok(());
        }
        debug!("loading extensions");
        for name in &names {
            let Some(unit) = registry.lookup(name) else {
                error!("Extension is not registered: {name}");
                return Err(MystError::Extension(format!("unknown extension: {name}")));
            };
            unit.install(self).map_err(|e| {
                error!("Error loading {name}: [ {e} ]");
                e
            })?;
            debug!(extension = %name, "installed extension");
        }
        debug!("loaded extensions");
        Ok(())
    }
}
