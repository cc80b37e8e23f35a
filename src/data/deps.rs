// src/data/deps.rs

use std::path::{Path, PathBuf};

use crate::errors::{MystError, Result};
use crate::fs::FileSystem;
use crate::types::Mtime;

/// Latest modification time across `paths`.
///
/// Directories contribute the maximum over their entries, recursively;
/// files contribute their own mtime. An empty list gives
/// [`Mtime::NEG_INFINITY`]. A missing path is an error.
pub fn get_mtime(fs: &dyn FileSystem, paths: &[PathBuf]) -> Result<Mtime> {
    let mut latest = Mtime::NEG_INFINITY;
    for path in paths {
        latest = latest.max(mtime_of_path(fs, path)?);
    }
    Ok(latest)
}

fn mtime_of_path(fs: &dyn FileSystem, path: &Path) -> Result<Mtime> {
    if fs.is_dir(path) {
        let children = fs.read_dir(path).map_err(|e| MystError::io(path, e))?;
        return get_mtime(fs, &children);
    }
    match fs.modified(path).map_err(|e| MystError::io(path, e))? {
        Some(m) => Ok(m),
        None => Err(MystError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "dependency path does not exist"),
        )),
    }
}
