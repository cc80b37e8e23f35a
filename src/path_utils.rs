// src/path_utils.rs

//! Lexical path helpers shared by config resolution, target expansion and
//! the watcher.

use std::path::{Component, Path, PathBuf};

/// Lexically normalise `path`: drop `.` components and fold `..` into the
/// preceding component. Does not touch the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve `p` against `base` the way a shell would: absolute paths win,
/// relative ones are joined. The result is normalised.
pub fn resolve(base: &Path, p: impl AsRef<Path>) -> PathBuf {
    let p = p.as_ref();
    if p.is_absolute() {
        normalize(p)
    } else {
        normalize(&base.join(p))
    }
}

/// `"css"` -> `".css"`; a leading dot is kept and case is preserved.
pub fn normalize_ext(ext: &str) -> String {
    let ext = ext.trim();
    if ext.is_empty() || ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}

/// Path of `path` relative to `root`, or `None` if it lies outside `root`.
pub fn relative_within(root: &Path, path: &Path) -> Option<PathBuf> {
    normalize(path)
        .strip_prefix(normalize(root))
        .ok()
        .map(Path::to_path_buf)
}

/// Forward-slash string form of a path, for glob matching.
pub fn slash_str(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
