// src/data/mod.rs

//! Out-of-band inputs of a build.
//!
//! - [`loader`] reads a directory of structured data files into one merged
//!   JSON object tagged with `$mtime`, optionally through a cache file.
//! - [`deps`] computes the latest modification time under a set of
//!   dependency paths.
//! - [`parse`] holds the structured formats both of the above (and the
//!   project file loader) understand.

pub mod deps;
pub mod loader;
pub mod parse;

pub use deps::get_mtime;
pub use loader::{load_data, load_directory, mtime_of, read_cache, MTIME_KEY};
