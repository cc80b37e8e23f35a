// src/templates/sass.rs

use grass::{InputSyntax, Options};

use crate::errors::{MystError, Result};
use crate::templates::{TemplateEngine, TemplateInput};

/// Sass and SCSS compiled with `grass`.
///
/// The indented syntax is chosen for `.sass` files, SCSS for everything
/// else. `@use`/`@import` resolve relative to the stylesheet's directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct SassEngine;

impl TemplateEngine for SassEngine {
    fn name(&self) -> &str {
        "sass"
    }

    fn render(&self, source: &str, input: &TemplateInput<'_>) -> Result<String> {
        let syntax = match input.path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("sass") => InputSyntax::Sass,
            _ => InputSyntax::Scss,
        };
        let load_paths: Vec<&std::path::Path> = input.path.parent().into_iter().collect();
        let options = Options::default()
            .input_syntax(syntax)
            .load_paths(&load_paths);

        grass::from_string(source.to_string(), &options)
            .map_err(|e| MystError::template(input.path, e))
    }
}
