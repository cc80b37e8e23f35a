// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Default extension for rendered template output.
pub const OUT_EXT: &str = ".html";

/// A setting that may be written as a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// Project settings as written in the project file.
///
/// ```toml
/// rootDir = "src"
/// outDir = "dist"
/// data = "data"
/// cache = ".myst-cache.json"
/// dependency = ["partials", "layouts"]
/// target = ["src/**/*.ejs", "src/**/*.scss"]
/// extension = "ext/banner"
/// ```
///
/// All fields are optional here; [`Settings::resolve`] applies defaults and
/// checks the ones that are mandatory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSettings {
    #[serde(default)]
    pub root_dir: Option<String>,

    #[serde(default)]
    pub out_dir: Option<String>,

    #[serde(default)]
    pub out_ext: Option<String>,

    #[serde(default)]
    pub force: Option<bool>,

    /// Directory of structured data files merged into the render data.
    #[serde(default)]
    pub data: Option<String>,

    /// File the merged data is cached in between runs.
    #[serde(default)]
    pub cache: Option<String>,

    /// Paths outside the render tree whose changes invalidate every output.
    #[serde(default)]
    pub dependency: Option<OneOrMany>,

    /// Glob patterns selecting the files to render.
    #[serde(default)]
    pub target: Option<OneOrMany>,

    /// Names of compiled-in extensions to install at startup.
    #[serde(default)]
    pub extension: Option<OneOrMany>,
}

/// Values given on the command line that win over the project file.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub out_dir: Option<PathBuf>,
    pub out_ext: Option<String>,
    pub force: bool,
}

/// Fully resolved settings. Every path is absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub root_dir: PathBuf,
    pub out_dir: PathBuf,
    /// Always starts with a dot, e.g. `".html"`.
    pub out_ext: String,
    pub force: bool,
    pub data: Option<PathBuf>,
    pub cache: Option<PathBuf>,
    pub dependency: Vec<PathBuf>,
    /// Absolute glob patterns.
    pub target: Vec<String>,
    pub extension: Vec<String>,
}
