// src/data/parse.rs

//! Structured file formats understood by the data loader and the project
//! file loader.

use std::path::Path;

use serde_json::Value;

use crate::errors::{MystError, Result};

/// Supported structured formats, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }
}

/// Parse `text` in the given format into a JSON value.
pub fn parse_str(format: Format, path: &Path, text: &str) -> Result<Value> {
    let parsed = match format {
        Format::Json => serde_json::from_str::<Value>(text).map_err(|e| e.to_string()),
        Format::Yaml => {
            if text.trim().is_empty() {
                Ok(Value::Null)
            } else {
                serde_yaml::from_str::<Value>(text).map_err(|e| e.to_string())
            }
        }
        Format::Toml => toml::from_str::<Value>(text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| MystError::parse(path, message))
}
