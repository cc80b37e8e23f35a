#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use myst::config::{OneOrMany, RawSettings, Settings, SettingsOverrides};
use myst::fs::mock::MockFileSystem;
use myst::render::RenderContext;

/// Builder for resolved `Settings`, going through the same resolution as a
/// project file would.
pub struct SettingsBuilder {
    project_dir: PathBuf,
    raw: RawSettings,
    overrides: SettingsOverrides,
}

impl SettingsBuilder {
    /// Settings for a project at `project_dir` writing to `out`.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            project_dir: project_dir.as_ref().to_path_buf(),
            raw: RawSettings {
                out_dir: Some("out".to_string()),
                ..RawSettings::default()
            },
            overrides: SettingsOverrides::default(),
        }
    }

    pub fn root_dir(mut self, dir: &str) -> Self {
        self.raw.root_dir = Some(dir.to_string());
        self
    }

    pub fn out_dir(mut self, dir: &str) -> Self {
        self.raw.out_dir = Some(dir.to_string());
        self
    }

    pub fn out_ext(mut self, ext: &str) -> Self {
        self.raw.out_ext = Some(ext.to_string());
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.raw.force = Some(force);
        self
    }

    pub fn data(mut self, dir: &str) -> Self {
        self.raw.data = Some(dir.to_string());
        self
    }

    pub fn cache(mut self, file: &str) -> Self {
        self.raw.cache = Some(file.to_string());
        self
    }

    pub fn dependency(mut self, path: &str) -> Self {
        self.raw.dependency = Some(push(self.raw.dependency.take(), path));
        self
    }

    pub fn target(mut self, pattern: &str) -> Self {
        self.raw.target = Some(push(self.raw.target.take(), pattern));
        self
    }

    pub fn extension(mut self, name: &str) -> Self {
        self.raw.extension = Some(push(self.raw.extension.take(), name));
        self
    }

    pub fn build(self) -> Settings {
        Settings::resolve(&self.project_dir, self.raw, &self.overrides)
            .expect("Failed to build valid settings from builder")
    }
}

fn push(list: Option<OneOrMany>, item: &str) -> OneOrMany {
    let mut items = list.map(OneOrMany::into_vec).unwrap_or_default();
    items.push(item.to_string());
    OneOrMany::Many(items)
}

/// An in-memory project rooted at `/proj`.
pub struct MockProject {
    pub fs: MockFileSystem,
    pub project_dir: PathBuf,
}

impl MockProject {
    pub fn new() -> Self {
        let fs = MockFileSystem::new();
        fs.add_dir("/proj");
        Self {
            fs,
            project_dir: PathBuf::from("/proj"),
        }
    }

    /// Absolute path of `rel` inside the project.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.project_dir.join(rel)
    }

    /// Write `content` to `rel`, stamped with the next clock tick.
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        self.fs.add_file(&path, content);
        path
    }

    pub fn settings(&self) -> SettingsBuilder {
        SettingsBuilder::new(&self.project_dir)
    }

    pub fn context(&self, settings: Settings) -> RenderContext {
        RenderContext::with_fs(&self.project_dir, settings, Arc::new(self.fs.clone()))
    }

    /// Contents of `rel`, if it exists.
    pub fn read(&self, rel: &str) -> Option<String> {
        self.fs.contents(self.path(rel))
    }
}

impl Default for MockProject {
    fn default() -> Self {
        Self::new()
    }
}
