// src/templates/hbs.rs

use std::path::Path;

use handlebars::Handlebars;
use regex::Regex;

use crate::errors::{MystError, Result};
use crate::templates::{TemplateEngine, TemplateInput};

/// `{{> name}}`, `{{~> name}}` and `{{#> name}}`, with the name bare or quoted.
const PARTIAL_REF: &str = r#"\{\{~?#?>\s*("[^"]+"|'[^']+'|[^\s}~()]+)"#;
/// `{{#*inline "name"}}` defines a partial inside the template itself.
const INLINE_DEF: &str = r#"\{\{~?#\*inline\s+["']([^"']+)["']"#;

/// Handlebars templates rendered with the `handlebars` crate.
///
/// Partial references are reported as includes, and every loaded include is
/// registered as a partial under its reference before rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandlebarsEngine;

impl TemplateEngine for HandlebarsEngine {
    fn name(&self) -> &str {
        "handlebars"
    }

    fn includes(&self, source: &str, _path: &Path) -> Result<Vec<String>> {
        let refs = Regex::new(PARTIAL_REF).map_err(anyhow::Error::from)?;
        let inline = Regex::new(INLINE_DEF).map_err(anyhow::Error::from)?;

        let defined: Vec<&str> = inline
            .captures_iter(source)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();

        let mut names: Vec<String> = Vec::new();
        for caps in refs.captures_iter(source) {
            let name = caps[1].trim_matches(|c| c == '"' || c == '\'');
            // `@partial-block` and friends are supplied by handlebars itself.
            if name.starts_with('@') || defined.contains(&name) {
                continue;
            }
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    fn render(&self, source: &str, input: &TemplateInput<'_>) -> Result<String> {
        let mut registry = Handlebars::new();
        for (name, partial) in input.includes {
            registry
                .register_partial(name, partial.as_str())
                .map_err(|e| MystError::template(input.path, e))?;
        }
        registry
            .render_template(source, input.data)
            .map_err(|e| MystError::template(input.path, e))
    }
}
