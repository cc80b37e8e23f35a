// src/templates/dust.rs

//! A dust subset without helpers.
//!
//! - `{path}` writes the value HTML-escaped, `{path|s}` unescaped.
//! - `{#path}..{/path}` iterates arrays and enters objects; `{?path}` and
//!   `{^path}` test for presence and absence. All three take `{:else}`.
//! - `{>"name"/}` (or `{>name/}`) inlines a partial. Partial names are
//!   reported by [`TemplateEngine::includes`] and their sources arrive
//!   through [`TemplateInput::includes`].
//! - `{! comment !}` and the specials `{~n}`, `{~s}`, `{~r}`, `{~lb}`, `{~rb}`.
//!
//! A `{` that does not open a valid tag is kept as text.

use std::path::Path;

use serde_json::Value;

use crate::errors::{MystError, Result};
use crate::templates::value::{display, escape_html, is_truthy, step};
use crate::templates::{TemplateEngine, TemplateInput};

const MAX_PARTIAL_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, Default)]
pub struct DustEngine;

impl TemplateEngine for DustEngine {
    fn name(&self) -> &str {
        "dust"
    }

    fn includes(&self, source: &str, path: &Path) -> Result<Vec<String>> {
        let nodes = parse(source, path)?;
        let mut names = Vec::new();
        collect_partials(&nodes, &mut names);
        Ok(names)
    }

    fn render(&self, source: &str, input: &TemplateInput<'_>) -> Result<String> {
        let nodes = parse(source, input.path)?;
        let mut out = String::with_capacity(source.len());
        let mut stack = vec![input.data];
        render_nodes(&nodes, &mut stack, input, 0, &mut out)?;
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Each,
    Exists,
    NotExists,
}

#[derive(Debug)]
enum Node {
    Text(String),
    Ref { path: String, raw: bool },
    Section {
        kind: SectionKind,
        path: String,
        body: Vec<Node>,
        otherwise: Vec<Node>,
    },
    Partial(String),
}

struct Frame {
    kind: SectionKind,
    path: String,
    body: Vec<Node>,
    otherwise: Vec<Node>,
    in_else: bool,
}

impl Frame {
    fn current(&mut self) -> &mut Vec<Node> {
        if self.in_else {
            &mut self.otherwise
        } else {
            &mut self.body
        }
    }
}

fn is_path(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | '-'))
}

fn push_text(target: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text(prev)) = target.last_mut() {
        prev.push_str(text);
    } else {
        target.push(Node::Text(text.to_string()));
    }
}

fn parse(source: &str, path: &Path) -> Result<Vec<Node>> {
    let mut root = Vec::new();
    let mut frames: Vec<Frame> = Vec::new();
    let mut rest = source;

    macro_rules! target {
        () => {
            match frames.last_mut() {
                Some(frame) => frame.current(),
                None => &mut root,
            }
        };
    }

    while let Some(open) = rest.find('{') {
        push_text(target!(), &rest[..open]);
        let after = &rest[open + 1..];

        if let Some(comment) = after.strip_prefix('!') {
            let end = comment
                .find("!}")
                .ok_or_else(|| MystError::template(path, "unclosed comment"))?;
            rest = &comment[end + 2..];
            continue;
        }

        let close = after.find('}');
        let tag = match close {
            Some(end) => &after[..end],
            None => "",
        };
        if tag.is_empty() || tag.starts_with(char::is_whitespace) || tag.contains('\n') {
            push_text(target!(), "{");
            rest = after;
            continue;
        }
        let next = &after[tag.len() + 1..];

        let sigil_len = tag.chars().next().map_or(1, char::len_utf8);
        let (sigil, body) = tag.split_at(sigil_len);
        match sigil {
            "~" => {
                let special = match body {
                    "n" => "\n",
                    "s" => " ",
                    "r" => "\r",
                    "lb" => "{",
                    "rb" => "}",
                    other => {
                        return Err(MystError::template(
                            path,
                            format!("unknown special {{~{other}}}"),
                        ));
                    }
                };
                push_text(target!(), special);
            }
            ">" => {
                let name = body.strip_suffix('/').ok_or_else(|| {
                    MystError::template(path, format!("partial tag must self-close: {{{tag}}}"))
                })?;
                let name = name.trim();
                let name = name
                    .strip_prefix('"')
                    .and_then(|n| n.strip_suffix('"'))
                    .unwrap_or(name);
                target!().push(Node::Partial(name.to_string()));
            }
            "#" | "?" | "^" => {
                let kind = match sigil {
                    "#" => SectionKind::Each,
                    "?" => SectionKind::Exists,
                    _ => SectionKind::NotExists,
                };
                let (body, self_closing) = match body.strip_suffix('/') {
                    Some(b) => (b, true),
                    None => (body, false),
                };
                let name = body.split_whitespace().next().unwrap_or_default();
                if !is_path(name) {
                    return Err(MystError::template(
                        path,
                        format!("invalid section name: {{{tag}}}"),
                    ));
                }
                if self_closing {
                    target!().push(Node::Section {
                        kind,
                        path: name.to_string(),
                        body: Vec::new(),
                        otherwise: Vec::new(),
                    });
                } else {
                    frames.push(Frame {
                        kind,
                        path: name.to_string(),
                        body: Vec::new(),
                        otherwise: Vec::new(),
                        in_else: false,
                    });
                }
            }
            ":" => {
                let frame = frames.last_mut().filter(|_| body == "else").ok_or_else(|| {
                    MystError::template(path, format!("unexpected {{{tag}}}"))
                })?;
                frame.in_else = true;
            }
            "/" => {
                let frame = frames.pop().ok_or_else(|| {
                    MystError::template(path, format!("unmatched closing tag {{{tag}}}"))
                })?;
                if frame.path != body {
                    return Err(MystError::template(
                        path,
                        format!("expected {{/{}}}, found {{{tag}}}", frame.path),
                    ));
                }
                target!().push(Node::Section {
                    kind: frame.kind,
                    path: frame.path,
                    body: frame.body,
                    otherwise: frame.otherwise,
                });
            }
            "@" => {
                return Err(MystError::template(
                    path,
                    format!("helpers are not supported: {{{tag}}}"),
                ));
            }
            "<" | "+" => {
                return Err(MystError::template(
                    path,
                    format!("blocks are not supported: {{{tag}}}"),
                ));
            }
            _ => {
                let mut parts = tag.split('|');
                let reference = parts.next().unwrap_or_default();
                if !is_path(reference) {
                    push_text(target!(), "{");
                    rest = after;
                    continue;
                }
                let raw = parts.any(|f| f == "s");
                target!().push(Node::Ref {
                    path: reference.to_string(),
                    raw,
                });
            }
        }
        rest = next;
    }

    if let Some(frame) = frames.last() {
        return Err(MystError::template(
            path,
            format!("unclosed section {{{}}}", frame.path),
        ));
    }
    push_text(&mut root, rest);
    Ok(root)
}

fn collect_partials(nodes: &[Node], names: &mut Vec<String>) {
    for node in nodes {
        match node {
            Node::Partial(name) if !names.contains(name) => names.push(name.clone()),
            Node::Section {
                body, otherwise, ..
            } => {
                collect_partials(body, names);
                collect_partials(otherwise, names);
            }
            _ => {}
        }
    }
}

/// Resolve `path` against the context stack.
///
/// The first segment is searched from the innermost context outwards; a
/// leading `.` pins the lookup to the innermost context.
fn resolve<'a>(stack: &[&'a Value], path: &str) -> Option<&'a Value> {
    let top = *stack.last()?;
    if path == "." {
        return Some(top);
    }
    let (pinned, path) = match path.strip_prefix('.') {
        Some(p) => (true, p),
        None => (false, path),
    };
    let mut segments = path.split('.');
    let first = segments.next()?;

    let mut current = if pinned {
        step(top, first)?
    } else {
        stack.iter().rev().find_map(|ctx| step(*ctx, first))?
    };
    for segment in segments {
        current = step(current, segment)?;
    }
    Some(current)
}

fn render_nodes<'a>(
    nodes: &[Node],
    stack: &mut Vec<&'a Value>,
    input: &TemplateInput<'a>,
    depth: usize,
    out: &mut String,
) -> Result<()> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Ref { path, raw } => {
                if let Some(value) = resolve(stack, path) {
                    let text = display(value);
                    out.push_str(&if *raw { text } else { escape_html(&text) });
                }
            }
            Node::Section {
                kind,
                path,
                body,
                otherwise,
            } => {
                let value = resolve(stack, path);
                let truthy = value.is_some_and(is_truthy);
                match (kind, value) {
                    (SectionKind::Each, Some(Value::Array(items))) if truthy => {
                        for item in items {
                            stack.push(item);
                            render_nodes(body, stack, input, depth, out)?;
                            stack.pop();
                        }
                    }
                    (SectionKind::Each, Some(value)) if truthy => {
                        stack.push(value);
                        render_nodes(body, stack, input, depth, out)?;
                        stack.pop();
                    }
                    (SectionKind::Exists, _) if truthy => {
                        render_nodes(body, stack, input, depth, out)?
                    }
                    (SectionKind::NotExists, _) if !truthy => {
                        render_nodes(body, stack, input, depth, out)?
                    }
                    _ => render_nodes(otherwise, stack, input, depth, out)?,
                }
            }
            Node::Partial(name) => {
                if depth >= MAX_PARTIAL_DEPTH {
                    return Err(MystError::template(
                        input.path,
                        format!("partial {name} nests too deeply"),
                    ));
                }
                let source = input.includes.get(name).ok_or_else(|| {
                    MystError::template(input.path, format!("partial {name} was not loaded"))
                })?;
                let nodes = parse(source, Path::new(name))?;
                render_nodes(&nodes, stack, input, depth + 1, out)?;
            }
        }
    }
    Ok(())
}
