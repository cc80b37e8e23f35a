// src/templates/ejs.rs

//! Output-only EJS.
//!
//! Supported tags:
//! - `<%= expr %>` writes `expr` HTML-escaped
//! - `<%- expr %>` writes `expr` unescaped
//! - `<%# ... %>` is a comment
//! - `<%%` writes a literal `<%`
//! - a closing `-%>` also swallows the newline that follows it
//!
//! `expr` is a dotted path into the data or a quoted string literal.
//! Scriptlets (`<% code %>`) are rejected: there is no JavaScript here.

use crate::errors::{MystError, Result};
use crate::templates::value::{escape_html, eval_to_string};
use crate::templates::{TemplateEngine, TemplateInput};

#[derive(Debug, Clone, Copy, Default)]
pub struct EjsEngine;

impl TemplateEngine for EjsEngine {
    fn name(&self) -> &str {
        "ejs"
    }

    fn render(&self, source: &str, input: &TemplateInput<'_>) -> Result<String> {
        let mut out = String::with_capacity(source.len());
        let mut rest = source;

        while let Some(start) = rest.find("<%") {
            out.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];

            if let Some(tail) = after_open.strip_prefix('%') {
                out.push_str("<%");
                rest = tail;
                continue;
            }

            let Some(end) = after_open.find("%>") else {
                return Err(MystError::template(input.path, "unclosed <% tag"));
            };
            let mut inner = &after_open[..end];
            let mut tail = &after_open[end + 2..];

            if let Some(stripped) = inner.strip_suffix('-') {
                inner = stripped;
                tail = tail
                    .strip_prefix("\r\n")
                    .or_else(|| tail.strip_prefix('\n'))
                    .unwrap_or(tail);
            }

            match inner.chars().next() {
                Some('=') => out.push_str(&escape_html(&eval_to_string(input.data, &inner[1..]))),
                Some('-') => out.push_str(&eval_to_string(input.data, &inner[1..])),
                Some('#') => {}
                _ => {
                    return Err(MystError::template(
                        input.path,
                        format!("scriptlet tags are not supported: <%{inner}%>"),
                    ));
                }
            }
            rest = tail;
        }

        out.push_str(rest);
        Ok(out)
    }
}
