// src/render/staleness.rs

use crate::types::Mtime;

/// Whether a target must be (re)rendered.
///
/// `target` is `None` when the target file does not exist. Without `force`
/// the target is stale iff it is older than both the source and the
/// context's `base_mtime`.
pub fn needs_render(force: bool, original: Mtime, base: Mtime, target: Option<Mtime>) -> bool {
    if force {
        return true;
    }
    match target {
        None => true,
        Some(t) => t < original.max(base),
    }
}

