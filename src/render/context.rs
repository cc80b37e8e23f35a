// src/render/context.rs

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::debug;

use crate::config::Settings;
use crate::data;
use crate::errors::{MystError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::render::hooks::Hooks;
use crate::render::staleness::needs_render;
use crate::render::{RenderOutcome, Renderer};
use crate::templates::{EngineCatalog, TemplateEngine};
use crate::types::{FileContent, LoadMode, Mtime};

/// Key of the source path in the data handed to pre-render hooks.
pub const FILENAME_KEY: &str = "FILENAME";

/// State shared by every render of one build or watch session.
pub struct RenderContext {
    project_dir: PathBuf,
    settings: Settings,
    data: Value,
    base_mtime: Mtime,
    pub(crate) renderers: Mutex<HashMap<String, Arc<dyn Renderer>>>,
    pub(crate) hooks: Hooks,
    engines: EngineCatalog,
    fs: Arc<dyn FileSystem>,
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let renderers: Vec<String> = match self.renderers.lock() {
            Ok(map) => map.keys().cloned().collect(),
            Err(_) => Vec::new(),
        };
        f.debug_struct("RenderContext")
            .field("project_dir", &self.project_dir)
            .field("settings", &self.settings)
            .field("base_mtime", &self.base_mtime)
            .field("renderers", &renderers)
            .field("hooks", &self.hooks)
            .field("engines", &self.engines)
            .finish_non_exhaustive()
    }
}

impl RenderContext {
    pub fn new(project_dir: impl Into<PathBuf>, settings: Settings) -> Self {
        Self::with_fs(project_dir, settings, Arc::new(RealFileSystem))
    }

    pub fn with_fs(
        project_dir: impl Into<PathBuf>,
        settings: Settings,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            project_dir: project_dir.into(),
            settings,
            data: Value::Object(Default::default()),
            base_mtime: Mtime::NEG_INFINITY,
            renderers: Mutex::new(HashMap::new()),
            hooks: Hooks::default(),
            engines: EngineCatalog::new(),
            fs,
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// `force` is the only setting that may change after resolution.
    pub fn set_force(&mut self, force: bool) {
        self.settings.force = force;
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Mutable access for post-load-data hooks deriving extra fields.
    pub fn data_mut(&mut self) -> &mut Value {
        &mut self.data
    }

    pub fn base_mtime(&self) -> Mtime {
        self.base_mtime
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub fn engines(&self) -> &EngineCatalog {
        &self.engines
    }

    /// Make `engine` the one used for `name`, ahead of the bundled copy.
    pub fn provide_engine(&mut self, name: impl Into<String>, engine: Arc<dyn TemplateEngine>) {
        self.engines.provide(name, engine);
    }

    pub fn disable_bundled_engine(&mut self, name: impl Into<String>) {
        self.engines.disable_bundled(name);
    }

    fn raise_base_mtime(&mut self, mtime: Mtime) {
        if mtime > self.base_mtime {
            self.base_mtime = mtime;
        }
    }

    /// (Re)load the data directory into the context.
    ///
    /// In force mode the cache file is ignored. Post-load-data hooks run
    /// afterwards. Without a configured data directory the data is an empty
    /// object and no hooks run.
    pub fn load_data(&mut self) -> Result<()> {
        let Some(data_dir) = self.settings.data.clone() else {
            debug!("data directory is not specified");
            self.data = Value::Object(Default::default());
            return Ok(());
        };
        let cache_file = match (&self.settings.cache, self.settings.force) {
            (Some(cache), false) => Some(cache.clone()),
            _ => None,
        };
        debug!(data_dir = ?data_dir, cache = ?cache_file, "loading data");

        let merged = data::load_data(self.fs(), &data_dir, cache_file.as_deref())?;
        let mtime = data::mtime_of(&merged);
        if mtime.is_finite() {
            debug!(%mtime, "last modified time of data directory");
            self.raise_base_mtime(mtime);
        }
        self.data = merged;

        self.run_post_load_data_hooks()
    }

    /// Fold the dependency paths' newest mtime into `base_mtime`.
    pub fn read_dependency(&mut self) -> Result<()> {
        let mtime = data::get_mtime(self.fs(), &self.settings.dependency)?;
        if mtime.is_finite() {
            debug!(%mtime, "last modified time of dependencies");
            self.raise_base_mtime(mtime);
        }
        Ok(())
    }

    /// Output path for `file` in `out_dir`: the file stem plus `out_ext`
    /// (the configured output extension when `None`).
    pub fn target_file(&self, file: &Path, out_dir: &Path, out_ext: Option<&str>) -> PathBuf {
        let ext = out_ext.unwrap_or(&self.settings.out_ext);
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        out_dir.join(format!("{stem}{ext}"))
    }

    /// Data for rendering `file`: a shallow copy of the merged data with a
    /// `FILENAME` field, folded through the pre-render hooks.
    pub fn make_data(&self, file: &Path) -> Result<Value> {
        let mut data = serde_json::Map::new();
        data.insert(
            FILENAME_KEY.to_string(),
            Value::String(file.to_string_lossy().into_owned()),
        );
        if let Value::Object(merged) = &self.data {
            for (k, v) in merged {
                data.insert(k.clone(), v.clone());
            }
        }
        self.run_pre_render_hooks(file, Value::Object(data))
    }

    /// Load a file a renderer works from: the first load-file hook that
    /// claims it wins, otherwise it is read from disk. Post-load-file hooks
    /// then transform the content in order.
    pub async fn load_rendered_file(&self, path: &Path, mode: LoadMode) -> Result<FileContent> {
        let content = match self.run_load_file_hooks(path, mode).await? {
            Some(content) => content,
            None => match mode {
                LoadMode::Text => FileContent::Text(
                    self.fs
                        .read_to_string(path)
                        .map_err(|e| MystError::io(path, e))?,
                ),
                LoadMode::Binary => {
                    FileContent::Binary(self.fs.read(path).map_err(|e| MystError::io(path, e))?)
                }
            },
        };
        self.run_post_load_file_hooks(path, content).await
    }

    /// Render `original` into `target` if the target is stale.
    ///
    /// `producer` is only called when a render is needed. `Ok(None)` from it
    /// means the renderer declined and nothing is written. Produced content
    /// goes through the post-render hooks and is written after creating the
    /// target's parent directory.
    pub async fn render<F, Fut>(
        &self,
        original: &Path,
        target: &Path,
        producer: F,
    ) -> Result<RenderOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<FileContent>>>,
    {
        if !self.settings.force {
            let orig_mtime = self
                .fs
                .modified(original)
                .map_err(|e| MystError::io(original, e))?
                .ok_or_else(|| {
                    MystError::io(
                        original,
                        std::io::Error::new(std::io::ErrorKind::NotFound, "source file not found"),
                    )
                })?;
            let target_mtime = self
                .fs
                .modified(target)
                .map_err(|e| MystError::io(target, e))?;

            if !needs_render(false, orig_mtime, self.base_mtime, target_mtime) {
                debug!(file = ?original, "skipped rendering: no need to rerender");
                return Ok(RenderOutcome::UpToDate(target.to_path_buf()));
            }
        }

        let Some(content) = producer().await? else {
            debug!(file = ?target, "skipped rendering: renderer produced no content");
            return Ok(RenderOutcome::Declined(target.to_path_buf()));
        };

        let content = self.run_post_render_hooks(content, target, original).await?;

        if let Some(dir) = target.parent() {
            self.fs
                .create_dir_all(dir)
                .map_err(|e| MystError::io(dir, e))?;
        }
        self.save_file(target, &content)?;
        debug!(file = ?target, "rendered");
        Ok(RenderOutcome::Written(target.to_path_buf()))
    }

    pub fn save_file(&self, path: &Path, content: &FileContent) -> Result<()> {
        self.fs
            .write(path, content.as_bytes())
            .map_err(|e| MystError::io(path, e))
    }
}
