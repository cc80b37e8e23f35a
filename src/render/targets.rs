// src/render/targets.rs

//! Target patterns: expanding them into files and matching single paths.
//!
//! Patterns are absolute globs (see [`crate::config::Settings`]). `*` stays
//! within one path component; `**` crosses directories.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::errors::{MystError, Result};
use crate::fs::FileSystem;
use crate::path_utils::slash_str;

/// Compiled target patterns.
#[derive(Clone)]
pub struct TargetMatcher {
    patterns: Vec<String>,
    set: GlobSet,
}

impl fmt::Debug for TargetMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetMatcher")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl TargetMatcher {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pat in patterns {
            let glob = GlobBuilder::new(&slash_str(Path::new(pat)))
                .literal_separator(true)
                .build()?;
            builder.add(glob);
        }
        Ok(Self {
            patterns: patterns.to_vec(),
            set: builder.build()?,
        })
    }

    /// True if the absolute `path` is selected by any pattern.
    pub fn matches(&self, path: &Path) -> bool {
        self.set.is_match(slash_str(path))
    }
}

fn has_glob_meta(s: &str) -> bool {
    s.contains(['*', '?', '[', ']', '{', '}'])
}

/// The longest leading run of components without glob syntax.
pub fn literal_prefix(pattern: &str) -> PathBuf {
    let mut prefix = PathBuf::new();
    for comp in Path::new(pattern).components() {
        if let Component::Normal(part) = comp {
            if has_glob_meta(&part.to_string_lossy()) {
                break;
            }
        }
        prefix.push(comp.as_os_str());
    }
    prefix
}

/// Expand `patterns` into the sorted, de-duplicated list of matching files.
///
/// Directories are never returned. Anything under `exclude` (normally the
/// output directory) is skipped.
pub fn expand(
    fs: &dyn FileSystem,
    patterns: &[String],
    exclude: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let matcher = TargetMatcher::new(patterns)?;
    let excluded = |p: &Path| exclude.is_some_and(|ex| p.starts_with(ex));
    let mut found = BTreeSet::new();

    for pattern in patterns {
        let start = literal_prefix(pattern);
        if excluded(&start) {
            continue;
        }
        if fs.is_file(&start) {
            if matcher.matches(&start) {
                found.insert(start);
            }
            continue;
        }
        if !fs.is_dir(&start) {
            continue;
        }

        let mut stack = vec![start];
        while let Some(dir) = stack.pop() {
            for path in fs.read_dir(&dir).map_err(|e| MystError::io(&dir, e))? {
                if excluded(&path) {
                    continue;
                }
                if fs.is_dir(&path) {
                    stack.push(path);
                } else if fs.is_file(&path) && matcher.matches(&path) {
                    found.insert(path);
                }
            }
        }
    }

    Ok(found.into_iter().collect())
}
