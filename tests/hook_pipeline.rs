// tests/hook_pipeline.rs

mod common;
use crate::common::{init_tracing, TestResult};

use std::path::Path;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use myst::errors::{MystError, Result};
use myst::render::{
    render_all, HookFuture, PostRenderHook, RenderContext, RenderFuture, Renderer,
};
use myst::types::{FileContent, LoadMode};
use myst_test_utils::builders::MockProject;

fn jade_site() -> (MockProject, RenderContext) {
    let project = MockProject::new();
    project.file("src/index.jade", "p pow!");
    let settings = project.settings().root_dir("src").build();
    let ctx = project.context(settings);
    (project, ctx)
}

#[tokio::test]
async fn post_render_hooks_run_in_registration_order() -> TestResult {
    init_tracing();
    let (project, mut ctx) = jade_site();

    ctx.add_post_render_hook(|_, content, target, _| {
        Ok(FileContent::Text(format!(
            "{}+{}",
            target.display(),
            content.as_text()
        )))
    });
    ctx.add_post_render_hook(|_, content, _, original| {
        Ok(FileContent::Text(format!(
            "{}+{}",
            content.as_text(),
            original.display()
        )))
    });

    render_all(&ctx).await?;

    assert_eq!(
        project.read("out/index.html").as_deref(),
        Some("/proj/out/index.html+<p>pow!</p>+/proj/src/index.jade")
    );
    Ok(())
}

struct Banner(&'static str);

impl PostRenderHook for Banner {
    fn apply<'a>(
        &'a self,
        _ctx: &'a RenderContext,
        content: FileContent,
        _target: &'a Path,
        _original: &'a Path,
    ) -> HookFuture<'a, FileContent> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            Ok(FileContent::Text(format!("{}{}", self.0, content.as_text())))
        })
    }
}

#[tokio::test]
async fn async_post_render_hook_is_awaited() -> TestResult {
    let (project, mut ctx) = jade_site();
    ctx.add_async_post_render_hook(Banner("<!-- built -->"));

    render_all(&ctx).await?;

    assert_eq!(
        project.read("out/index.html").as_deref(),
        Some("<!-- built --><p>pow!</p>")
    );
    Ok(())
}

#[tokio::test]
async fn post_render_hook_may_not_change_content_kind() {
    let (_project, mut ctx) = jade_site();
    ctx.add_post_render_hook(|_, content, _, _| Ok(FileContent::Binary(content.into_bytes())));

    let err = render_all(&ctx).await.unwrap_err();

    assert!(matches!(err, MystError::Extension(_)), "got {err:?}");
}

#[tokio::test]
async fn static_text_assets_flow_through_text_hooks() -> TestResult {
    let (project, mut ctx) = jade_site();
    project.file("src/site.css", "body{}");

    ctx.add_post_render_hook(|_, content, target, _| {
        Ok(FileContent::Text(format!(
            "{}+{}",
            target.display(),
            content.as_text()
        )))
    });
    ctx.add_post_render_hook(|_, content, _, original| {
        Ok(FileContent::Text(format!(
            "{}+{}",
            content.as_text(),
            original.display()
        )))
    });

    let report = render_all(&ctx).await?;

    assert_eq!(report.written, 2);
    assert_eq!(
        project.read("out/index.html").as_deref(),
        Some("/proj/out/index.html+<p>pow!</p>+/proj/src/index.jade")
    );
    assert_eq!(
        project.read("out/site.css").as_deref(),
        Some("/proj/out/site.css+body{}+/proj/src/site.css")
    );
    Ok(())
}

#[tokio::test]
async fn pre_render_replacement_must_be_an_object() {
    let project = MockProject::new();
    project.file("src/a.ejs", "<%= who %>|<%= filename %>");
    let mut ctx = project.context(project.settings().root_dir("src").build());
    ctx.add_pre_render_hook(|_, _, _| Ok(Some(json!("not an object"))));

    let err = render_all(&ctx).await.unwrap_err();

    assert!(matches!(err, MystError::Extension(_)), "got {err:?}");
    assert_eq!(project.read("out/a.html"), None);
}

#[tokio::test]
async fn pre_render_hooks_see_the_filename_and_may_replace_data() -> TestResult {
    let project = MockProject::new();
    project.file("src/a.ejs", "<%= who %> from <%= FILENAME %>");
    let mut ctx = project.context(project.settings().root_dir("src").build());

    ctx.add_pre_render_hook(|_, _, data| {
        let mut data = data.clone();
        data["who"] = json!("first");
        Ok(Some(data))
    });
    // `None` keeps whatever the previous hook produced.
    ctx.add_pre_render_hook(|_, _, _| Ok(None));
    ctx.add_pre_render_hook(|_, file, data| {
        assert_eq!(data["who"], json!("first"));
        assert_eq!(data["FILENAME"], json!(file.to_string_lossy()));
        let mut data = data.clone();
        data["who"] = json!("second");
        Ok(Some(data))
    });

    render_all(&ctx).await?;

    assert_eq!(
        project.read("out/a.html").as_deref(),
        Some("second from /proj/src/a.ejs")
    );
    Ok(())
}

#[test]
fn post_load_data_hooks_derive_fields() -> TestResult {
    let project = MockProject::new();
    project.file("data/posts.json", r#"{ "items": [1, 2, 3] }"#);
    let mut ctx = project.context(project.settings().data("data").build());

    ctx.add_post_load_data_hook(|ctx| {
        let count = ctx.data()["posts"]["items"]
            .as_array()
            .map(Vec::len)
            .unwrap_or(0);
        ctx.data_mut()["postCount"] = json!(count);
        Ok(())
    });
    ctx.load_data()?;

    assert_eq!(ctx.data()["postCount"], json!(3));

    // Hooks run again on every reload.
    project.file("data/posts.json", r#"{ "items": [1] }"#);
    ctx.load_data()?;
    assert_eq!(ctx.data()["postCount"], json!(1));
    Ok(())
}

#[tokio::test]
async fn load_file_hook_supplies_missing_sources() -> TestResult {
    let project = MockProject::new();
    project.file("src/page.dust", "<main>{>\"$proj/virtual/header.dust\"/}{title}</main>");
    let mut ctx = project.context(project.settings().root_dir("src").build());
    ctx.data_mut()["title"] = json!("Home");

    ctx.add_load_file_hook(|_, path, mode| {
        if path == Path::new("/proj/virtual/header.dust") && mode == LoadMode::Text {
            return Ok(Some(FileContent::Text("<h1>{title}</h1>".into())));
        }
        Ok(None)
    });

    render_all(&ctx).await?;

    assert_eq!(
        project.read("out/page.html").as_deref(),
        Some("<main><h1>Home</h1>Home</main>")
    );
    Ok(())
}

#[tokio::test]
async fn template_refs_expand_root_and_project_tokens_in_any_case() -> TestResult {
    let project = MockProject::new();
    project.file(
        "src/pages/index.dust",
        "{>\"$ROOT/parts/a.dust\"/}|{>\"$Proj/shared/b.dust\"/}|{>\"$root/parts/c.dust\"/}",
    );
    let mut ctx = project.context(project.settings().root_dir("src").build());

    let asked = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&asked);
    ctx.add_load_file_hook(move |_, path, _| {
        let body = match path.to_str() {
            Some("/proj/src/parts/a.dust") => "A",
            Some("/proj/shared/b.dust") => "B",
            Some("/proj/src/parts/c.dust") => "C",
            _ => return Ok(None),
        };
        seen.lock().unwrap().push(path.to_path_buf());
        Ok(Some(FileContent::Text(body.into())))
    });

    render_all(&ctx).await?;

    assert_eq!(project.read("out/pages/index.html").as_deref(), Some("A|B|C"));
    assert_eq!(asked.lock().unwrap().len(), 3);
    Ok(())
}

#[cfg(feature = "handlebars")]
#[tokio::test]
async fn handlebars_partials_load_through_the_pipeline() -> TestResult {
    let project = MockProject::new();
    project.file("src/page.hbs", "<main>{{> header}}{{body}}</main>");
    let mut ctx = project.context(project.settings().root_dir("src").build());
    ctx.data_mut()["body"] = json!("text");
    ctx.data_mut()["title"] = json!("Home");

    ctx.add_load_file_hook(|_, path, _| {
        if path == Path::new("/proj/src/header") {
            return Ok(Some(FileContent::Text("<h1>{{title}}</h1>".into())));
        }
        Ok(None)
    });

    render_all(&ctx).await?;

    assert_eq!(
        project.read("out/page.html").as_deref(),
        Some("<main><h1>Home</h1>text</main>")
    );
    Ok(())
}

#[tokio::test]
async fn post_load_file_hooks_transform_sources() -> TestResult {
    let project = MockProject::new();
    project.file("src/page.ejs", "hello @NAME@");
    let mut ctx = project.context(project.settings().root_dir("src").build());

    ctx.add_post_load_file_hook(|_, _, content| {
        Ok(Some(FileContent::Text(
            content.as_text().replace("@NAME@", "<%= name %>"),
        )))
    });
    ctx.data_mut()["name"] = json!("world");

    render_all(&ctx).await?;

    assert_eq!(project.read("out/page.html").as_deref(), Some("hello world"));
    Ok(())
}

/// Writes the uppercased source next to where an `.html` would go.
struct Shout;

impl Renderer for Shout {
    fn render<'a>(
        &'a self,
        ctx: &'a RenderContext,
        source: &'a Path,
        out_dir: &'a Path,
        _data: Value,
    ) -> RenderFuture<'a> {
        Box::pin(async move {
            let target = ctx.target_file(source, out_dir, Some(".txt"));
            ctx.render(source, &target, || async move {
                let text = ctx.load_rendered_file(source, LoadMode::Text).await?;
                Ok::<_, MystError>(Some(FileContent::Text(text.as_text().to_uppercase())))
            })
            .await
        })
    }
}

#[tokio::test]
async fn unknown_extension_hook_supplies_a_renderer_once() -> TestResult {
    init_tracing();
    let project = MockProject::new();
    project.file("src/a.orz", "orz");
    project.file("src/b.ORZ", "upper");
    let mut ctx = project.context(project.settings().root_dir("src").build());

    let asked = Arc::new(Mutex::new(Vec::<String>::new()));
    let seen = Arc::clone(&asked);
    ctx.add_unknown_extension_hook(move |_, ext| {
        seen.lock().unwrap().push(ext.to_string());
        (ext == ".orz").then(|| Arc::new(Shout) as Arc<dyn Renderer>)
    });

    let report = render_all(&ctx).await?;

    assert_eq!(report.written, 2);
    assert_eq!(project.read("out/a.txt").as_deref(), Some("ORZ"));
    assert_eq!(project.read("out/b.txt").as_deref(), Some("UPPER"));
    assert_eq!(*asked.lock().unwrap(), vec![".orz".to_string()]);
    Ok(())
}

#[tokio::test]
async fn added_renderer_overrides_builtin() -> Result<()> {
    let project = MockProject::new();
    project.file("src/a.ejs", "<%= nope %>");
    let ctx = project.context(project.settings().root_dir("src").build());

    ctx.add_renderer("ejs", Arc::new(Shout));
    render_all(&ctx).await?;

    assert_eq!(project.read("out/a.txt").as_deref(), Some("<%= NOPE %>"));
    assert!(project.read("out/a.html").is_none());
    Ok(())
}

#[tokio::test]
async fn renderer_extensions_match_without_regard_to_case() -> Result<()> {
    let project = MockProject::new();
    project.file("src/a.Orz", "mixed");
    let ctx = project.context(project.settings().root_dir("src").build());

    ctx.add_renderer(" .ORZ", Arc::new(Shout));
    render_all(&ctx).await?;

    assert_eq!(project.read("out/a.txt").as_deref(), Some("MIXED"));
    Ok(())
}
