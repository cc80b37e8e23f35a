// tests/watch_classify.rs

mod common;
use crate::common::{init_tracing, TestResult};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::event::{AccessKind, CreateKind, DataChange, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use tokio::sync::mpsc;

use myst::config::Settings;
use myst::engine::RuntimeEvent;
use myst::fs::mock::MockFileSystem;
use myst::watch::event_handler::process_notify_event;
use myst::watch::{change_kind, surfaces, ChangeKind, Surface, WatchFilter};
use myst_test_utils::builders::SettingsBuilder;

fn settings() -> Settings {
    SettingsBuilder::new("/proj")
        .root_dir("src")
        .data("data")
        .cache("src/.cache.json")
        .dependency("layouts")
        .target("src/**/*.ejs")
        .target("src/**/*.pug")
        .build()
}

fn filter(fs: &MockFileSystem) -> WatchFilter {
    WatchFilter::new(&settings(), Arc::new(fs.clone())).expect("valid target patterns")
}

fn modified() -> EventKind {
    EventKind::Modify(ModifyKind::Data(DataChange::Content))
}

#[test]
fn change_kinds() {
    assert_eq!(change_kind(&EventKind::Create(CreateKind::File)), Some(ChangeKind::Updated));
    assert_eq!(change_kind(&modified()), Some(ChangeKind::Updated));
    assert_eq!(
        change_kind(&EventKind::Modify(ModifyKind::Name(RenameMode::To))),
        Some(ChangeKind::Updated)
    );
    assert_eq!(
        change_kind(&EventKind::Modify(ModifyKind::Name(RenameMode::From))),
        Some(ChangeKind::Removed)
    );
    assert_eq!(change_kind(&EventKind::Remove(RemoveKind::File)), Some(ChangeKind::Removed));
    assert_eq!(change_kind(&EventKind::Access(AccessKind::Read)), None);
}

#[test]
fn target_changes_must_match_a_pattern() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/src/a.ejs", "a");
    fs.add_file("/proj/src/notes.md", "n");
    let filter = filter(&fs);

    assert_eq!(
        filter.classify(Surface::Targets, &modified(), Path::new("/proj/src/a.ejs")),
        Some(RuntimeEvent::TargetUpdated(PathBuf::from("/proj/src/a.ejs")))
    );
    assert_eq!(
        filter.classify(Surface::Targets, &modified(), Path::new("/proj/src/notes.md")),
        None
    );
    assert_eq!(
        filter.classify(
            Surface::Targets,
            &EventKind::Remove(RemoveKind::File),
            Path::new("/proj/src/old.pug")
        ),
        Some(RuntimeEvent::TargetRemoved(PathBuf::from("/proj/src/old.pug")))
    );
}

#[test]
fn directory_updates_and_own_outputs_are_ignored() {
    let fs = MockFileSystem::new();
    fs.add_dir("/proj/src/dir.ejs");
    let filter = filter(&fs);

    assert_eq!(
        filter.classify(
            Surface::Targets,
            &EventKind::Create(CreateKind::Folder),
            Path::new("/proj/src/dir.ejs")
        ),
        None
    );
    assert_eq!(
        filter.classify(Surface::Data, &modified(), Path::new("/proj/src/.cache.json")),
        None
    );
    assert_eq!(
        filter.classify(Surface::Targets, &modified(), Path::new("/proj/out/a.ejs")),
        None
    );
}

#[test]
fn data_and_dependency_surfaces_take_any_path() {
    let fs = MockFileSystem::new();
    let filter = filter(&fs);

    assert_eq!(
        filter.classify(Surface::Data, &modified(), Path::new("/proj/data/site.yaml")),
        Some(RuntimeEvent::DataUpdated(PathBuf::from("/proj/data/site.yaml")))
    );
    assert_eq!(
        filter.classify(
            Surface::Dependency,
            &EventKind::Remove(RemoveKind::File),
            Path::new("/proj/layouts/base.pug")
        ),
        Some(RuntimeEvent::DependencyUpdated(PathBuf::from("/proj/layouts/base.pug")))
    );
    assert_eq!(
        filter.classify(
            Surface::Data,
            &EventKind::Access(AccessKind::Read),
            Path::new("/proj/data/site.yaml")
        ),
        None
    );
}

#[test]
fn every_configured_surface_is_watched() {
    let watched = surfaces(&settings());

    assert_eq!(
        watched,
        vec![
            (Surface::Targets, PathBuf::from("/proj/src")),
            (Surface::Data, PathBuf::from("/proj/data")),
            (Surface::Dependency, PathBuf::from("/proj/layouts")),
        ]
    );
}

#[tokio::test]
async fn notify_events_are_forwarded_per_path() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("/proj/src/a.ejs", "a");
    fs.add_file("/proj/src/b.pug", "b");
    let filter = filter(&fs);
    let (tx, mut rx) = mpsc::channel(8);

    let event = Event::new(modified())
        .add_path(PathBuf::from("/proj/src/a.ejs"))
        .add_path(PathBuf::from("/proj/src/skip.txt"))
        .add_path(PathBuf::from("/proj/src/b.pug"));
    assert!(process_notify_event(&filter, Surface::Targets, event, &tx).await);

    assert_eq!(
        rx.recv().await,
        Some(RuntimeEvent::TargetUpdated(PathBuf::from("/proj/src/a.ejs")))
    );
    assert_eq!(
        rx.recv().await,
        Some(RuntimeEvent::TargetUpdated(PathBuf::from("/proj/src/b.pug")))
    );
    assert!(rx.try_recv().is_err());

    drop(rx);
    let event = Event::new(modified()).add_path(PathBuf::from("/proj/src/a.ejs"));
    assert!(!process_notify_event(&filter, Surface::Targets, event, &tx).await);
    Ok(())
}
