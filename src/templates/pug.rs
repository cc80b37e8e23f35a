// src/templates/pug.rs

//! A pug (formerly jade) subset.
//!
//! Each non-blank line is one node; deeper indentation nests. A line is:
//! - `tag#id.class(attr="v", flag) text` / `tag= path` / `tag!= path`
//!   (the tag name defaults to `div` when the line starts with `.` or `#`)
//! - `tag: child` block expansion, `tag.` followed by an indented text block
//! - `| text` piped text, `<raw html>` literal lines
//! - `// comment` (emitted) and `//- comment` (dropped), with their children
//! - `doctype html`
//!
//! Text may contain `#{path}` (escaped) and `!{path}` (raw) interpolation.
//! Output is compact: no whitespace is added between tags.

use crate::errors::{MystError, Result};
use crate::templates::value::{display, escape_html, eval_to_string, lookup, string_literal};
use crate::templates::{TemplateEngine, TemplateInput};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct PugEngine;

impl TemplateEngine for PugEngine {
    fn name(&self) -> &str {
        "pug"
    }

    fn render(&self, source: &str, input: &TemplateInput<'_>) -> Result<String> {
        let lines: Vec<Line<'_>> = source
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty())
            .map(|(i, l)| {
                let trimmed = l.trim_start();
                Line {
                    number: i + 1,
                    indent: l.len() - trimmed.len(),
                    text: trimmed.trim_end(),
                }
            })
            .collect();

        let mut renderer = PugRenderer {
            lines: &lines,
            pos: 0,
            input,
            out: String::with_capacity(source.len()),
        };
        renderer.block(None)?;
        Ok(renderer.out)
    }
}

#[derive(Debug)]
struct Line<'s> {
    number: usize,
    indent: usize,
    text: &'s str,
}

struct PugRenderer<'l, 's, 'i> {
    lines: &'l [Line<'s>],
    pos: usize,
    input: &'i TemplateInput<'i>,
    out: String,
}

#[derive(Debug)]
enum Body<'s> {
    Empty,
    Text(&'s str),
    Buffered { expr: &'s str, escape: bool },
    Nested(&'s str),
    TextBlock,
}

#[derive(Debug)]
enum AttrValue<'s> {
    Literal(&'s str),
    Expr(&'s str),
    Flag,
}

#[derive(Debug)]
struct Tag<'s> {
    name: &'s str,
    id: Option<&'s str>,
    classes: Vec<&'s str>,
    attrs: Vec<(&'s str, AttrValue<'s>)>,
    body: Body<'s>,
}

impl<'l, 's, 'i> PugRenderer<'l, 's, 'i> {
    fn error(&self, line: usize, message: impl std::fmt::Display) -> MystError {
        MystError::template(self.input.path, format!("line {line}: {message}"))
    }

    /// Render the run of sibling lines starting at `self.pos` that are
    /// indented deeper than `parent`.
    fn block(&mut self, parent: Option<usize>) -> Result<()> {
        let lines = self.lines;
        let Some(first) = lines.get(self.pos) else {
            return Ok(());
        };
        if parent.is_some_and(|p| first.indent <= p) {
            return Ok(());
        }
        let indent = first.indent;
        let mut prev_text = false;

        while let Some(line) = lines.get(self.pos) {
            if line.indent < indent || parent.is_some_and(|p| line.indent <= p) {
                break;
            }
            if line.indent > indent {
                return Err(self.error(line.number, "unexpected indentation"));
            }
            self.pos += 1;
            prev_text = self.line(line, prev_text)?;
        }
        Ok(())
    }

    /// Render one line (and its children). Returns true if it was piped text.
    fn line(&mut self, line: &'l Line<'s>, prev_text: bool) -> Result<bool> {
        let text = line.text;

        if let Some(comment) = text.strip_prefix("//") {
            self.skip_children(line.indent);
            if !comment.starts_with('-') {
                self.out.push_str("<!--");
                self.out.push_str(comment);
                self.out.push_str("-->");
            }
            return Ok(false);
        }

        if let Some(piped) = text.strip_prefix('|') {
            if prev_text {
                self.out.push('\n');
            }
            let piped = piped.strip_prefix(' ').unwrap_or(piped);
            self.interpolate(piped, line.number)?;
            return Ok(true);
        }

        if text.starts_with('<') {
            self.interpolate(text, line.number)?;
            self.block(Some(line.indent))?;
            return Ok(false);
        }

        if let Some(kind) = text.strip_prefix("doctype") {
            let kind = kind.trim();
            if kind.is_empty() || kind == "html" {
                self.out.push_str("<!DOCTYPE html>");
            } else {
                self.out.push_str(&format!("<!DOCTYPE {kind}>"));
            }
            return Ok(false);
        }

        self.element(text, line)?;
        Ok(false)
    }

    fn element(&mut self, text: &'s str, line: &'l Line<'s>) -> Result<()> {
        let tag = parse_tag(text).map_err(|m| self.error(line.number, m))?;

        self.out.push('<');
        self.out.push_str(tag.name);
        if let Some(id) = tag.id {
            self.out.push_str(&format!(" id=\"{}\"", escape_html(id)));
        }

        let mut classes: Vec<String> = tag.classes.iter().map(|c| c.to_string()).collect();
        for (key, value) in &tag.attrs {
            if *key == "class" {
                if let Some(v) = self.attr_value(value) {
                    classes.push(v);
                }
            }
        }
        if !classes.is_empty() {
            self.out
                .push_str(&format!(" class=\"{}\"", escape_html(&classes.join(" "))));
        }

        for (key, value) in &tag.attrs {
            if *key == "class" {
                continue;
            }
            match value {
                AttrValue::Flag => {
                    self.out.push(' ');
                    self.out.push_str(key);
                }
                AttrValue::Expr(expr) if *expr == "true" => {
                    self.out.push(' ');
                    self.out.push_str(key);
                }
                other => {
                    if let Some(v) = self.attr_value(other) {
                        self.out.push_str(&format!(" {key}=\"{}\"", escape_html(&v)));
                    }
                }
            }
        }
        self.out.push('>');

        if VOID_ELEMENTS.contains(&tag.name) {
            self.skip_children(line.indent);
            return Ok(());
        }

        match tag.body {
            Body::Empty => self.block(Some(line.indent))?,
            Body::Text(t) => {
                self.interpolate(t, line.number)?;
                self.block(Some(line.indent))?;
            }
            Body::Buffered { expr, escape } => {
                let v = eval_to_string(self.input.data, expr);
                self.out.push_str(&if escape { escape_html(&v) } else { v });
                self.block(Some(line.indent))?;
            }
            Body::Nested(rest) => self.element(rest, line)?,
            Body::TextBlock => {
                let lines = self.lines;
                let mut block = Vec::new();
                let mut base = None;
                while let Some(child) = lines.get(self.pos) {
                    if child.indent <= line.indent {
                        break;
                    }
                    let base = *base.get_or_insert(child.indent);
                    block.push((child.indent.saturating_sub(base), child.text));
                    self.pos += 1;
                }
                let joined = block
                    .iter()
                    .map(|(extra, t)| format!("{}{}", " ".repeat(*extra), t))
                    .collect::<Vec<_>>()
                    .join("\n");
                self.interpolate(&joined, line.number)?;
            }
        }

        self.out.push_str("</");
        self.out.push_str(tag.name);
        self.out.push('>');
        Ok(())
    }

    fn attr_value(&self, value: &AttrValue<'_>) -> Option<String> {
        match value {
            AttrValue::Literal(s) => Some(s.to_string()),
            AttrValue::Flag => None,
            AttrValue::Expr(expr) => match *expr {
                "false" | "null" | "undefined" => None,
                e if e.parse::<f64>().is_ok() => Some(e.to_string()),
                e => match lookup(self.input.data, e) {
                    None | Some(serde_json::Value::Null) | Some(serde_json::Value::Bool(false)) => {
                        None
                    }
                    Some(v) => Some(display(v)),
                },
            },
        }
    }

    fn skip_children(&mut self, indent: usize) {
        while self.lines.get(self.pos).is_some_and(|l| l.indent > indent) {
            self.pos += 1;
        }
    }

    fn interpolate(&mut self, text: &str, line: usize) -> Result<()> {
        let mut rest = text;
        loop {
            let next = [rest.find("#{"), rest.find("!{")]
                .into_iter()
                .flatten()
                .min();
            let Some(start) = next else {
                self.out.push_str(rest);
                return Ok(());
            };

            if start > 0 && rest.as_bytes()[start - 1] == b'\\' {
                self.out.push_str(&rest[..start - 1]);
                self.out.push_str(&rest[start..start + 2]);
                rest = &rest[start + 2..];
                continue;
            }

            self.out.push_str(&rest[..start]);
            let escape = rest.as_bytes()[start] == b'#';
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                return Err(self.error(line, "unclosed interpolation"));
            };
            let v = eval_to_string(self.input.data, &after[..end]);
            self.out.push_str(&if escape { escape_html(&v) } else { v });
            rest = &after[end + 1..];
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(s: &str) -> (&str, &str) {
    let end = s
        .char_indices()
        .find(|(_, c)| !(is_ident_char(*c) || *c == ':'))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s.split_at(end)
}

fn parse_tag(text: &str) -> std::result::Result<Tag<'_>, String> {
    let (name, mut rest) = if text.starts_with(|c: char| c.is_ascii_alphabetic()) {
        let (name, rest) = take_ident(text);
        // `a: b` block expansion uses a colon that is not part of the name.
        match name.strip_suffix(':') {
            Some(n) => (n, &text[n.len()..]),
            None => (name, rest),
        }
    } else if text.starts_with('.') || text.starts_with('#') {
        ("div", text)
    } else {
        return Err(format!("cannot parse line: {text}"));
    };

    let mut id = None;
    let mut classes = Vec::new();
    loop {
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some('.'), Some(c)) if is_ident_char(c) => {
                let (class, r) = take_class(&rest[1..]);
                classes.push(class);
                rest = r;
            }
            (Some('#'), Some(c)) if is_ident_char(c) => {
                let (ident, r) = take_class(&rest[1..]);
                id = Some(ident);
                rest = r;
            }
            _ => break,
        }
    }

    let mut attrs = Vec::new();
    if let Some(inner) = rest.strip_prefix('(') {
        let end = find_closing_paren(inner).ok_or("unclosed attribute list")?;
        attrs = parse_attrs(&inner[..end])?;
        rest = &inner[end + 1..];
    }

    let body = if let Some(expr) = rest.strip_prefix("!=") {
        Body::Buffered {
            expr: expr.trim(),
            escape: false,
        }
    } else if let Some(expr) = rest.strip_prefix('=') {
        Body::Buffered {
            expr: expr.trim(),
            escape: true,
        }
    } else if let Some(nested) = rest.strip_prefix(':') {
        Body::Nested(nested.trim_start())
    } else if rest == "." {
        Body::TextBlock
    } else if let Some(text) = rest.strip_prefix(' ') {
        Body::Text(text)
    } else if rest.is_empty() {
        Body::Empty
    } else {
        return Err(format!("unexpected text after tag: {rest}"));
    };

    Ok(Tag {
        name,
        id,
        classes,
        attrs,
        body,
    })
}

fn take_class(s: &str) -> (&str, &str) {
    let end = s
        .char_indices()
        .find(|(_, c)| !is_ident_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s.split_at(end)
}

fn find_closing_paren(s: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, ')') => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_attrs(s: &str) -> std::result::Result<Vec<(&str, AttrValue<'_>)>, String> {
    let mut attrs = Vec::new();
    let mut rest = s;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            return Ok(attrs);
        }
        let key_end = rest
            .find(|c: char| c == '=' || c == ',' || c.is_whitespace())
            .unwrap_or(rest.len());
        let key = &rest[..key_end];
        if key.is_empty() {
            return Err(format!("invalid attribute list: {s}"));
        }
        rest = rest[key_end..].trim_start();

        let Some(value) = rest.strip_prefix('=') else {
            attrs.push((key, AttrValue::Flag));
            continue;
        };
        let value = value.trim_start();
        match value.chars().next() {
            Some(q @ ('"' | '\'')) => {
                let end = value[1..]
                    .find(q)
                    .ok_or_else(|| format!("unclosed attribute value for {key}"))?;
                let quoted = &value[..end + 2];
                attrs.push((key, AttrValue::Literal(string_literal(quoted).unwrap_or(""))));
                rest = &value[end + 2..];
            }
            _ => {
                let end = value
                    .find(|c: char| c == ',' || c.is_whitespace())
                    .unwrap_or(value.len());
                attrs.push((key, AttrValue::Expr(&value[..end])));
                rest = &value[end..];
            }
        }
    }
}
