// src/config/validate.rs

use std::path::Path;

use tracing::debug;

use crate::config::model::{RawSettings, Settings, SettingsOverrides, OUT_EXT};
use crate::errors::{MystError, Result};
use crate::path_utils::{normalize_ext, resolve, slash_str};

impl Settings {
    /// Apply overrides and defaults to `raw` and make every path absolute.
    ///
    /// - `rootDir` defaults to the project directory.
    /// - `target` defaults to everything under `rootDir`.
    /// - `outDir` is mandatory.
    /// - `outExt` defaults to `.html` and always gets a leading dot.
    pub fn resolve(
        project_dir: &Path,
        raw: RawSettings,
        overrides: &SettingsOverrides,
    ) -> Result<Settings> {
        let root_dir = match raw.root_dir.as_deref() {
            Some(r) if !r.is_empty() => resolve(project_dir, r),
            _ => resolve(project_dir, "."),
        };

        let target = match raw.target {
            Some(t) => t
                .into_vec()
                .into_iter()
                .map(|p| slash_str(&resolve(project_dir, p)))
                .collect(),
            None => vec![format!("{}/**/*", slash_str(&root_dir))],
        };

        let out_dir = match (&overrides.out_dir, raw.out_dir.as_deref()) {
            (Some(o), _) => resolve(project_dir, o),
            (None, Some(o)) if !o.is_empty() => resolve(project_dir, o),
            _ => {
                return Err(MystError::ConfigError("outDir is not provided".to_string()));
            }
        };

        let out_ext = overrides
            .out_ext
            .clone()
            .or(raw.out_ext)
            .map(|e| normalize_ext(&e))
            .unwrap_or_else(|| OUT_EXT.to_string());

        let settings = Settings {
            root_dir,
            out_dir,
            out_ext,
            force: overrides.force || raw.force.unwrap_or(false),
            data: raw.data.map(|d| resolve(project_dir, d)),
            cache: raw.cache.map(|c| resolve(project_dir, c)),
            dependency: raw
                .dependency
                .map(|d| d.into_vec())
                .unwrap_or_default()
                .into_iter()
                .map(|d| resolve(project_dir, d))
                .collect(),
            target,
            extension: raw.extension.map(|e| e.into_vec()).unwrap_or_default(),
        };

        debug!(root_dir = ?settings.root_dir, "resolved rootDir");
        debug!(target = %settings.target.join(", "), "resolved target");
        debug!(out_dir = ?settings.out_dir, "resolved outDir");

        Ok(settings)
    }
}
