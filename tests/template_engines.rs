// tests/template_engines.rs

mod common;
use crate::common::TestResult;

use std::collections::HashMap;
use std::path::Path;

use serde_json::{json, Value};

use myst::errors::MystError;
use myst::templates::dust::DustEngine;
use myst::templates::ejs::EjsEngine;
use myst::templates::pug::PugEngine;
use myst::templates::{bundled, EngineCatalog, TemplateEngine, TemplateInput};

fn render_with(
    engine: &dyn TemplateEngine,
    source: &str,
    data: &Value,
    includes: &HashMap<String, String>,
) -> Result<String, MystError> {
    let input = TemplateInput {
        path: Path::new("/t/template"),
        data,
        includes,
    };
    engine.render(source, &input)
}

fn render(engine: &dyn TemplateEngine, source: &str, data: Value) -> Result<String, MystError> {
    render_with(engine, source, &data, &HashMap::new())
}

#[test]
fn ejs_escapes_and_raw_outputs() -> TestResult {
    let data = json!({ "foo": { "foobar": "<b>X</b>" }, "n": 3 });

    assert_eq!(
        render(&EjsEngine, "<p><%= foo.foobar %></p>", data.clone())?,
        "<p>&lt;b&gt;X&lt;/b&gt;</p>"
    );
    assert_eq!(render(&EjsEngine, "<%- foo.foobar %>", data.clone())?, "<b>X</b>");
    assert_eq!(render(&EjsEngine, "<%# note %>n=<%= n %>", data.clone())?, "n=3");
    assert_eq!(render(&EjsEngine, "<%%= literal", data.clone())?, "<%= literal");
    assert_eq!(render(&EjsEngine, "a <%= 'q' -%>\nb", data)?, "a qb");
    Ok(())
}

#[test]
fn ejs_missing_values_are_empty_and_scriptlets_fail() {
    assert_eq!(render(&EjsEngine, "[<%= nope.deeper %>]", json!({})).unwrap(), "[]");

    let err = render(&EjsEngine, "<% if (x) { %>", json!({})).unwrap_err();
    assert!(matches!(err, MystError::Template { .. }));

    let err = render(&EjsEngine, "<%= open", json!({})).unwrap_err();
    assert!(err.to_string().contains("unclosed"));
}

#[test]
fn pug_renders_nested_markup() -> TestResult {
    let source = "\
doctype html
html
  head
    title= site.title
  body#main.page(data-x=\"1\", hidden)
    //- dropped
    // kept
    ul
      li: a(href=site.url) Home
      li.active Blog
    p
      | one
      | two
    img(src=\"/logo.png\")
    p Hello #{user}, !{raw} \\#{not}
";
    let data = json!({
        "site": { "title": "T & T", "url": "/" },
        "user": "<ann>",
        "raw": "<i>r</i>",
    });

    let html = render(&PugEngine, source, data)?;

    assert_eq!(
        html,
        "<!DOCTYPE html><html><head><title>T &amp; T</title></head>\
<body id=\"main\" class=\"page\" data-x=\"1\" hidden>\
<!-- kept-->\
<ul><li><a href=\"/\">Home</a></li><li class=\"active\">Blog</li></ul>\
<p>one\ntwo</p>\
<img src=\"/logo.png\">\
<p>Hello &lt;ann&gt;, <i>r</i> #{not}</p>\
</body></html>"
    );
    Ok(())
}

#[test]
fn pug_text_block_and_false_attributes() -> TestResult {
    let source = "\
script.
  var a = 1;
    nested();
input(type=\"checkbox\", checked=false, value=n)
";
    let html = render(&PugEngine, source, json!({ "n": 5 }))?;

    assert_eq!(
        html,
        "<script>var a = 1;\n  nested();</script><input type=\"checkbox\" value=\"5\">"
    );
    Ok(())
}

#[test]
fn pug_bad_indentation_is_reported_with_line() {
    let err = render(&PugEngine, "p\n    a\n  b", json!({})).unwrap_err();
    assert!(err.to_string().contains("line 3"), "got {err}");
}

#[test]
fn dust_references_and_sections() -> TestResult {
    let source = "{! header !}<h1>{title}</h1>\
{#posts}<li>{name}{?draft} (draft){/draft} by {author}</li>{/posts}\
{^posts}none{/posts}\
{#missing}x{:else}empty{/missing}\
{~lb}ok{~rb}{html|s}{html}";
    let data = json!({
        "title": "Blog",
        "author": "ann",
        "posts": [
            { "name": "a", "draft": true },
            { "name": "b" },
        ],
        "html": "<br>",
    });

    let out = render(&DustEngine, source, data)?;

    assert_eq!(
        out,
        "<h1>Blog</h1><li>a (draft) by ann</li><li>b by ann</li>empty{ok}<br>&lt;br&gt;"
    );
    Ok(())
}

#[test]
fn dust_dot_paths_stay_in_the_current_context() -> TestResult {
    let data = json!({ "name": "outer", "inner": { "x": 1 } });

    let out = render(&DustEngine, "{#inner}[{name}|{.name}]{/inner}", data)?;

    assert_eq!(out, "[outer|]");
    Ok(())
}

#[test]
fn dust_stray_braces_are_text() -> TestResult {
    let out = render(&DustEngine, "a { b } {c d} {}", json!({}))?;
    assert_eq!(out, "a { b } {c d} {}");
    Ok(())
}

#[test]
fn dust_partials_come_from_includes() -> TestResult {
    let source = "<body>{>\"partials/nav.dust\"/}</body>";
    assert_eq!(
        DustEngine.includes(source, Path::new("/t/page.dust"))?,
        vec!["partials/nav.dust".to_string()]
    );

    let mut includes = HashMap::new();
    includes.insert("partials/nav.dust".to_string(), "<nav>{site}</nav>".to_string());
    let out = render_with(&DustEngine, source, &json!({ "site": "S" }), &includes)?;
    assert_eq!(out, "<body><nav>S</nav></body>");

    let err = render(&DustEngine, source, json!({})).unwrap_err();
    assert!(err.to_string().contains("was not loaded"));
    Ok(())
}

#[test]
fn dust_rejects_helpers_and_mismatched_sections() {
    assert!(render(&DustEngine, "{@eq key=1}{/eq}", json!({})).is_err());
    assert!(render(&DustEngine, "{#a}x{/b}", json!({})).is_err());
    assert!(render(&DustEngine, "{#a}x", json!({})).is_err());
}

#[test]
fn provided_engine_wins_over_bundled() -> TestResult {
    struct Fixed;
    impl TemplateEngine for Fixed {
        fn name(&self) -> &str {
            "ejs"
        }
        fn render(&self, _source: &str, _input: &TemplateInput<'_>) -> myst::errors::Result<String> {
            Ok("fixed".into())
        }
    }

    let mut catalog = EngineCatalog::new();
    assert!(catalog.find("ejs").is_some());
    assert!(catalog.find("nunjucks").is_none());

    catalog.provide("ejs", std::sync::Arc::new(Fixed));
    let engine = catalog.resolve("ejs").expect("provided");
    assert_eq!(render(engine.as_ref(), "<%= x %>", json!({}))?, "fixed");

    catalog.disable_bundled("pug");
    assert!(catalog.resolve("pug").is_none());
    assert!(bundled("pug").is_some());
    Ok(())
}

#[cfg(feature = "handlebars")]
#[test]
fn handlebars_uses_partials_from_includes() -> TestResult {
    let engine = bundled("handlebars").expect("handlebars feature enabled");
    let mut includes = HashMap::new();
    includes.insert("footer".to_string(), "<footer>{{year}}</footer>".to_string());

    let out = render_with(
        engine.as_ref(),
        "<p>{{title}}</p>{{> footer}}",
        &json!({ "title": "Hi", "year": 2024 }),
        &includes,
    )?;

    assert_eq!(out, "<p>Hi</p><footer>2024</footer>");
    Ok(())
}

#[cfg(feature = "handlebars")]
#[test]
fn handlebars_reports_partial_references() -> TestResult {
    let engine = bundled("handlebars").expect("handlebars feature enabled");
    let source = concat!(
        "{{#*inline \"local\"}}x{{/inline}}",
        "{{> header}}{{~> \"nav/main\"}}{{> local}}",
        "{{#> layout}}{{> @partial-block}}{{/layout}}{{> header}}",
    );

    let names = engine.includes(source, Path::new("/t/page.hbs"))?;

    assert_eq!(names, vec!["header", "nav/main", "layout"]);
    Ok(())
}

#[cfg(feature = "sass")]
#[test]
fn sass_compiles_scss() -> TestResult {
    let engine = bundled("sass").expect("sass feature enabled");
    let input = TemplateInput {
        path: Path::new("/t/site.scss"),
        data: &json!({}),
        includes: &HashMap::new(),
    };

    let css = engine.render("$c: red;\na { b { color: $c; } }", &input)?;

    assert!(css.contains("a b"), "got {css}");
    assert!(css.contains("color: red"), "got {css}");
    Ok(())
}
