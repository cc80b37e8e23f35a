// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::model::{RawSettings, Settings, SettingsOverrides};
use crate::data::parse::{parse_str, Format};
use crate::errors::{MystError, Result};
use crate::fs::FileSystem;

/// Default project file name.
pub const PROJECT_FILE: &str = "myst.toml";
/// Also accepted in a directory without [`PROJECT_FILE`] when the default
/// name is being searched for.
pub const JSON_PROJECT_FILE: &str = "myst.json";

/// A project file found on disk together with its resolved settings.
#[derive(Debug, Clone)]
pub struct Project {
    /// Directory containing the project file; anchors every relative setting.
    pub project_dir: PathBuf,
    pub project_file: PathBuf,
    pub settings: Settings,
}

/// Walk from `cwd` upwards looking for a file named `file_name`.
///
/// When `file_name` is [`PROJECT_FILE`], each directory is also checked for
/// [`JSON_PROJECT_FILE`], with the TOML file winning if both exist.
pub fn find_project(fs: &dyn FileSystem, cwd: &Path, file_name: &str) -> Result<PathBuf> {
    debug!(?cwd, project = %file_name, "searching for project file");

    let names: &[&str] = if file_name == PROJECT_FILE {
        &[PROJECT_FILE, JSON_PROJECT_FILE]
    } else {
        &[file_name]
    };

    let mut dir = Some(cwd);
    while let Some(d) = dir {
        if let Some(found) = names
            .iter()
            .map(|name| d.join(name))
            .find(|candidate| fs.is_file(candidate))
        {
            return Ok(found);
        }
        dir = d.parent();
    }

    Err(MystError::ConfigError(format!(
        "cannot find {file_name} from {}",
        cwd.display()
    )))
}

/// Load a project file and return the raw, unresolved settings.
///
/// The format is picked from the file extension (TOML, JSON or YAML). An
/// empty file yields default settings.
pub fn load_from_path(fs: &dyn FileSystem, path: &Path) -> Result<RawSettings> {
    let format = Format::from_path(path).ok_or_else(|| {
        MystError::ConfigError(format!(
            "unsupported project file format: {}",
            path.display()
        ))
    })?;
    let text = fs.read_to_string(path).map_err(|e| MystError::io(path, e))?;
    let value = parse_str(format, path, &text)?;
    if value.is_null() {
        return Ok(RawSettings::default());
    }
    serde_json::from_value(value).map_err(|e| MystError::parse(path, e))
}

/// Find, load and resolve the project starting at `cwd`.
pub fn load_project(
    fs: &dyn FileSystem,
    cwd: &Path,
    file_name: &str,
    overrides: &SettingsOverrides,
) -> Result<Project> {
    let project_file = find_project(fs, cwd, file_name)?;
    info!("Using project file {}", project_file.display());

    let project_dir = project_file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cwd.to_path_buf());

    let raw = load_from_path(fs, &project_file)?;
    let settings = Settings::resolve(&project_dir, raw, overrides)?;

    Ok(Project {
        project_dir,
        project_file,
        settings,
    })
}
