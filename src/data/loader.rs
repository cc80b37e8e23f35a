// src/data/loader.rs

use std::io;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::data::parse::{parse_str, Format};
use crate::errors::{MystError, Result};
use crate::fs::FileSystem;
use crate::types::Mtime;

/// Synthetic key carrying the modification time of a data entry.
pub const MTIME_KEY: &str = "$mtime";

/// Load every data file under `data_dir` into one object.
///
/// With `cache_file`, a previous cache is read first (a missing file is not
/// an error) and used as a per-entry hint: a cached entry at least as new as
/// its file is reused verbatim instead of being re-parsed. The cache is
/// rewritten only when the merged `$mtime` moved past the previous one.
pub fn load_data(fs: &dyn FileSystem, data_dir: &Path, cache_file: Option<&Path>) -> Result<Value> {
    let previous = match cache_file {
        Some(path) => read_cache(fs, path)?,
        None => None,
    };

    let merged = load_directory(fs, data_dir, previous.as_ref())?;

    if let Some(path) = cache_file {
        let new_mtime = mtime_of(&merged);
        match &previous {
            Some(prev) if new_mtime <= mtime_of(prev) => {
                debug!(cache = ?path, "cache file is up to date");
            }
            _ => {
                debug!(cache = ?path, mtime = %new_mtime, "writing cache file");
                write_cache(fs, path, &merged)?;
            }
        }
    }

    Ok(merged)
}

/// Read a cache file. `Ok(None)` if it does not exist; any parse failure
/// is an error.
pub fn read_cache(fs: &dyn FileSystem, path: &Path) -> Result<Option<Value>> {
    let text = match fs.read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(MystError::io(path, e)),
    };
    let value = serde_json::from_str::<Value>(&text).map_err(|e| MystError::parse(path, e))?;
    Ok(Some(value))
}

fn write_cache(fs: &dyn FileSystem, path: &Path, merged: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs.create_dir_all(parent).map_err(|e| MystError::io(parent, e))?;
    }
    let text = serde_json::to_string(merged).map_err(|e| MystError::parse(path, e))?;
    fs.write(path, text.as_bytes())
        .map_err(|e| MystError::io(path, e))
}

/// Recursively load `dir`. Files are keyed by their stem, subdirectories by
/// their name. `hint` is the matching part of a previous cache, if any.
pub fn load_directory(fs: &dyn FileSystem, dir: &Path, hint: Option<&Value>) -> Result<Value> {
    let mut obj = Map::new();
    let mut latest = Mtime::NEG_INFINITY;

    for path in fs.read_dir(dir).map_err(|e| MystError::io(dir, e))? {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }

        if fs.is_dir(&path) {
            let child = load_directory(fs, &path, hint.and_then(|h| h.get(name)))?;
            latest = latest.max(mtime_of(&child));
            obj.insert(name.to_string(), child);
            continue;
        }

        let Some(format) = Format::from_path(&path) else {
            debug!(file = ?path, "skipping data file with unknown format");
            continue;
        };
        let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let file_mtime = fs
            .modified(&path)
            .map_err(|e| MystError::io(&path, e))?
            .unwrap_or(Mtime::NEG_INFINITY);

        let cached = hint
            .and_then(|h| h.get(key))
            .filter(|c| c.is_object() && mtime_of(c) >= file_mtime);

        let (entry, entry_mtime) = match cached {
            Some(c) => {
                debug!(file = ?path, "using cached data");
                (c.clone(), mtime_of(c))
            }
            None => {
                let text = fs
                    .read_to_string(&path)
                    .map_err(|e| MystError::io(&path, e))?;
                let mut value = parse_str(format, &path, &text)?;
                if let Value::Object(map) = &mut value {
                    map.insert(MTIME_KEY.to_string(), file_mtime.to_json());
                }
                (value, file_mtime)
            }
        };

        latest = latest.max(entry_mtime);
        obj.insert(key.to_string(), entry);
    }

    obj.insert(MTIME_KEY.to_string(), latest.to_json());
    Ok(Value::Object(obj))
}

/// The `$mtime` of a loaded (or cached) object.
pub fn mtime_of(value: &Value) -> Mtime {
    Mtime::from_json(value.get(MTIME_KEY))
}
