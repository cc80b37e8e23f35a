// src/config/mod.rs

//! Project configuration for myst.
//!
//! Responsibilities:
//! - Define the serde-backed settings model (`model.rs`).
//! - Find and load the project file from disk (`loader.rs`).
//! - Resolve raw settings into absolute, defaulted [`Settings`] (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    find_project, load_from_path, load_project, Project, JSON_PROJECT_FILE, PROJECT_FILE,
};
pub use model::{OneOrMany, RawSettings, Settings, SettingsOverrides, OUT_EXT};
