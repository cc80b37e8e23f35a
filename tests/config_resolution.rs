// tests/config_resolution.rs

mod common;
use crate::common::{init_tracing, TestResult};

use std::path::{Path, PathBuf};

use myst::config::{
    find_project, load_project, RawSettings, Settings, SettingsOverrides, PROJECT_FILE,
};
use myst::errors::MystError;
use myst::fs::mock::MockFileSystem;
use myst_test_utils::builders::SettingsBuilder;

fn resolve(raw: RawSettings) -> Result<Settings, MystError> {
    Settings::resolve(Path::new("/proj"), raw, &SettingsOverrides::default())
}

#[test]
fn defaults_fill_root_target_and_ext() -> TestResult {
    init_tracing();

    let settings = resolve(RawSettings {
        out_dir: Some("out".into()),
        ..RawSettings::default()
    })?;

    assert_eq!(settings.root_dir, PathBuf::from("/proj"));
    assert_eq!(settings.out_dir, PathBuf::from("/proj/out"));
    assert_eq!(settings.out_ext, ".html");
    assert_eq!(settings.target, vec!["/proj/**/*".to_string()]);
    assert!(!settings.force);
    assert!(settings.data.is_none());
    assert!(settings.dependency.is_empty());
    Ok(())
}

#[test]
fn missing_out_dir_is_a_config_error() {
    init_tracing();

    let err = resolve(RawSettings::default()).unwrap_err();
    assert!(matches!(err, MystError::ConfigError(ref m) if m.contains("outDir")));
}

#[test]
fn relative_paths_resolve_against_project_dir() {
    let settings = SettingsBuilder::new("/proj")
        .root_dir("src")
        .out_dir("../dist")
        .out_ext("css")
        .data("data")
        .cache(".cache/data.json")
        .dependency("layouts")
        .dependency("/shared/partials")
        .target("src/**/*.ejs")
        .build();

    assert_eq!(settings.root_dir, PathBuf::from("/proj/src"));
    assert_eq!(settings.out_dir, PathBuf::from("/dist"));
    assert_eq!(settings.out_ext, ".css");
    assert_eq!(settings.data, Some(PathBuf::from("/proj/data")));
    assert_eq!(settings.cache, Some(PathBuf::from("/proj/.cache/data.json")));
    assert_eq!(
        settings.dependency,
        vec![PathBuf::from("/proj/layouts"), PathBuf::from("/shared/partials")]
    );
    assert_eq!(settings.target, vec!["/proj/src/**/*.ejs".to_string()]);
}

#[test]
fn overrides_win_over_project_file() -> TestResult {
    let overrides = SettingsOverrides {
        out_dir: Some(PathBuf::from("public")),
        out_ext: Some(".htm".into()),
        force: true,
    };
    let raw = RawSettings {
        out_dir: Some("out".into()),
        out_ext: Some(".xml".into()),
        force: Some(false),
        ..RawSettings::default()
    };

    let settings = Settings::resolve(Path::new("/proj"), raw, &overrides)?;

    assert_eq!(settings.out_dir, PathBuf::from("/proj/public"));
    assert_eq!(settings.out_ext, ".htm");
    assert!(settings.force);
    Ok(())
}

#[test]
fn project_file_is_found_from_a_subdirectory() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file(
        "/proj/myst.toml",
        r#"
rootDir = "src"
outDir = "out"
target = "src/**/*.pug"
extension = ["banner"]
"#,
    );
    fs.add_dir("/proj/src/pages/deep");

    let project = load_project(
        &fs,
        Path::new("/proj/src/pages/deep"),
        PROJECT_FILE,
        &SettingsOverrides::default(),
    )?;

    assert_eq!(project.project_dir, PathBuf::from("/proj"));
    assert_eq!(project.project_file, PathBuf::from("/proj/myst.toml"));
    assert_eq!(project.settings.root_dir, PathBuf::from("/proj/src"));
    assert_eq!(project.settings.target, vec!["/proj/src/**/*.pug".to_string()]);
    assert_eq!(project.settings.extension, vec!["banner".to_string()]);
    Ok(())
}

#[test]
fn yaml_and_json_project_files_are_accepted() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("/a/site.yaml", "outDir: build\nforce: true\n");
    fs.add_file("/b/site.json", r#"{ "outDir": "build", "outExt": "txt" }"#);

    let a = load_project(&fs, Path::new("/a"), "site.yaml", &SettingsOverrides::default())?;
    assert_eq!(a.settings.out_dir, PathBuf::from("/a/build"));
    assert!(a.settings.force);

    let b = load_project(&fs, Path::new("/b"), "site.json", &SettingsOverrides::default())?;
    assert_eq!(b.settings.out_ext, ".txt");
    Ok(())
}

#[test]
fn missing_project_file_is_reported() {
    let fs = MockFileSystem::new();
    fs.add_dir("/nowhere");

    let err = load_project(
        &fs,
        Path::new("/nowhere"),
        PROJECT_FILE,
        &SettingsOverrides::default(),
    )
    .unwrap_err();

    assert!(matches!(err, MystError::ConfigError(ref m) if m.contains("cannot find myst.toml")));
}

#[test]
fn malformed_project_file_is_a_parse_error() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/myst.toml", "outDir = [");

    let err = load_project(
        &fs,
        Path::new("/proj"),
        PROJECT_FILE,
        &SettingsOverrides::default(),
    )
    .unwrap_err();

    assert!(matches!(err, MystError::Parse { .. }), "got {err:?}");
}

#[test]
fn out_ext_gains_a_dot_and_keeps_its_case() -> TestResult {
    let settings = resolve(RawSettings {
        out_dir: Some("out".into()),
        out_ext: Some(" XHTML ".into()),
        ..RawSettings::default()
    })?;

    assert_eq!(settings.out_ext, ".XHTML");
    Ok(())
}

#[test]
fn default_search_falls_back_to_a_json_project_file() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/myst.json", r#"{ "rootDir": "src", "outDir": "out" }"#);
    fs.add_dir("/proj/src");

    let project = load_project(
        &fs,
        Path::new("/proj/src"),
        PROJECT_FILE,
        &SettingsOverrides::default(),
    )?;
    assert_eq!(project.project_file, PathBuf::from("/proj/myst.json"));
    assert_eq!(project.settings.root_dir, PathBuf::from("/proj/src"));

    fs.add_file("/proj/myst.toml", "outDir = \"out\"\n");
    let preferred = find_project(&fs, Path::new("/proj"), PROJECT_FILE)?;
    assert_eq!(preferred, PathBuf::from("/proj/myst.toml"));
    Ok(())
}

#[test]
fn explicit_project_name_has_no_fallback() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/myst.json", r#"{ "outDir": "out" }"#);

    let err = find_project(&fs, Path::new("/proj"), "site.toml").unwrap_err();

    assert!(matches!(err, MystError::ConfigError(_)));
}
