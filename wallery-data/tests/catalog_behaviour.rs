//! Behavioural coverage for import, persistence and catalog mutations.

use std::cell::RefCell;

use camino::Utf8PathBuf;
use chrono::{DateTime, Duration, Utc};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;
use wallery_core::test_support::wallpaper;
use wallery_core::{SqliteWallpaperStore, WallpaperStore};
use wallery_data::{CatalogWriter, ImportSummary, import_export, persist_catalog_to_sqlite};

const EXPORT: &str = r#"{
  "__collections__": {
    "wallpapers": {
      "aurora": {"title": "Aurora", "category": "Nature", "tags": ["sky"]},
      "alley": {"title": "Neon Alley", "category": "City", "tags": ["neon"]},
      "broken": {"tags": "not-a-list"}
    }
  }
}"#;

/// Scratch directory holding the database for the scenario.
#[fixture]
pub fn workspace() -> RefCell<Option<TempDir>> {
    RefCell::new(None)
}

/// Raw export supplied to the import steps.
#[fixture]
pub fn export() -> RefCell<String> {
    RefCell::new(String::new())
}

/// Summary from the last import.
#[fixture]
pub fn summary() -> RefCell<Option<ImportSummary>> {
    RefCell::new(None)
}

/// Writer under test for mutation scenarios.
#[fixture]
pub fn writer() -> RefCell<Option<CatalogWriter>> {
    RefCell::new(None)
}

/// Identifiers published by the last scheduling run.
#[fixture]
pub fn published() -> RefCell<Vec<String>> {
    RefCell::new(Vec::new())
}

fn now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_700_000_000_000)
        .unwrap_or_else(|| panic!("fixed timestamp must be valid"))
}

fn database_path(workspace: &RefCell<Option<TempDir>>) -> Utf8PathBuf {
    let guard = workspace.borrow();
    let dir = guard
        .as_ref()
        .unwrap_or_else(|| panic!("workspace must be created"));
    Utf8PathBuf::from_path_buf(dir.path().join("catalog/wallery.db"))
        .unwrap_or_else(|path| panic!("non UTF-8 temp path {path:?}"))
}

fn with_writer<T>(
    writer: &RefCell<Option<CatalogWriter>>,
    action: impl FnOnce(&mut CatalogWriter) -> T,
) -> T {
    let mut guard = writer.borrow_mut();
    let active = guard
        .as_mut()
        .unwrap_or_else(|| panic!("catalog writer must be opened"));
    action(active)
}

fn category_count(writer: &RefCell<Option<CatalogWriter>>, name: &str) -> u64 {
    with_writer(writer, |active| {
        active
            .categories()
            .unwrap_or_else(|err| panic!("list categories: {err}"))
            .into_iter()
            .find(|category| category.name == name)
            .map_or(0, |category| category.wallpaper_count)
    })
}

#[given("an export with two wallpapers and one broken document")]
fn export_with_broken_document(export: &RefCell<String>) {
    *export.borrow_mut() = EXPORT.to_owned();
}

#[when("the export is imported into a fresh database twice")]
fn import_twice(
    workspace: &RefCell<Option<TempDir>>,
    export: &RefCell<String>,
    summary: &RefCell<Option<ImportSummary>>,
) {
    let dir = TempDir::new().unwrap_or_else(|err| panic!("create temp dir: {err}"));
    *workspace.borrow_mut() = Some(dir);
    let path = database_path(workspace);

    for _ in 0..2 {
        let catalog = import_export(export.borrow().as_bytes())
            .unwrap_or_else(|err| panic!("decode export: {err}"));
        persist_catalog_to_sqlite(&path, &catalog)
            .unwrap_or_else(|err| panic!("persist catalog: {err}"));
        *summary.borrow_mut() = Some(catalog.summary());
    }
}

#[then("the database holds two wallpapers")]
fn database_holds_two(workspace: &RefCell<Option<TempDir>>) {
    let path = database_path(workspace);
    let store = SqliteWallpaperStore::open(path.as_std_path())
        .unwrap_or_else(|err| panic!("open store: {err}"));
    let mut ids: Vec<String> = store
        .all_wallpapers()
        .unwrap_or_else(|err| panic!("list wallpapers: {err}"))
        .into_iter()
        .map(|w| w.id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["alley", "aurora"]);
}

#[then("one document was reported as skipped")]
fn one_skipped(summary: &RefCell<Option<ImportSummary>>) {
    let reported = summary
        .borrow()
        .unwrap_or_else(|| panic!("import must have run"));
    assert_eq!(reported.skipped, 1);
    assert_eq!(reported.wallpapers, 2);
}

#[given("a catalog with one wallpaper in the Nature category")]
fn catalog_with_nature(writer: &RefCell<Option<CatalogWriter>>) {
    let mut opened =
        CatalogWriter::open_in_memory().unwrap_or_else(|err| panic!("open catalog: {err}"));
    opened
        .create_wallpaper(&wallpaper("fern", "Nature", &["green"]))
        .unwrap_or_else(|err| panic!("create wallpaper: {err}"));
    *writer.borrow_mut() = Some(opened);
}

#[when("the wallpaper is moved to the City category")]
fn move_to_city(writer: &RefCell<Option<CatalogWriter>>) {
    with_writer(writer, |active| {
        active
            .update_wallpaper(&wallpaper("fern", "City", &["green"]))
            .unwrap_or_else(|err| panic!("update wallpaper: {err}"));
    });
}

#[then("the Nature category counts 0 wallpapers")]
fn nature_empty(writer: &RefCell<Option<CatalogWriter>>) {
    assert_eq!(category_count(writer, "Nature"), 0);
}

#[then("the City category counts 1 wallpaper")]
fn city_has_one(writer: &RefCell<Option<CatalogWriter>>) {
    assert_eq!(category_count(writer, "City"), 1);
}

#[then("the Nature category counts 2 wallpapers")]
fn nature_has_two(writer: &RefCell<Option<CatalogWriter>>) {
    assert_eq!(category_count(writer, "Nature"), 2);
}

#[given("a draft scheduled an hour ago and another scheduled for tomorrow")]
fn schedule_drafts(writer: &RefCell<Option<CatalogWriter>>) {
    with_writer(writer, |active| {
        active
            .schedule_wallpaper(
                &wallpaper("early", "Nature", &[]),
                now() - Duration::hours(1),
            )
            .unwrap_or_else(|err| panic!("schedule early draft: {err}"));
        active
            .schedule_wallpaper(&wallpaper("late", "Nature", &[]), now() + Duration::days(1))
            .unwrap_or_else(|err| panic!("schedule late draft: {err}"));
    });
}

#[when("due drafts are published")]
fn publish(writer: &RefCell<Option<CatalogWriter>>, published: &RefCell<Vec<String>>) {
    let ids = with_writer(writer, |active| {
        active
            .publish_due(now())
            .unwrap_or_else(|err| panic!("publish drafts: {err}"))
    });
    *published.borrow_mut() = ids;
}

#[then("only the earlier draft is published")]
fn only_early(writer: &RefCell<Option<CatalogWriter>>, published: &RefCell<Vec<String>>) {
    assert_eq!(*published.borrow(), vec!["early".to_owned()]);
    let remaining = with_writer(writer, |active| {
        active
            .scheduled_count()
            .unwrap_or_else(|err| panic!("count drafts: {err}"))
    });
    assert_eq!(remaining, 1);
}

#[scenario(path = "tests/features/catalog.feature", index = 0)]
fn reimport_is_idempotent(
    workspace: RefCell<Option<TempDir>>,
    export: RefCell<String>,
    summary: RefCell<Option<ImportSummary>>,
) {
    let _ = (workspace, export, summary);
}

#[scenario(path = "tests/features/catalog.feature", index = 1)]
fn category_move_moves_count(writer: RefCell<Option<CatalogWriter>>) {
    let _ = writer;
}

#[scenario(path = "tests/features/catalog.feature", index = 2)]
fn due_drafts_publish(
    writer: RefCell<Option<CatalogWriter>>,
    published: RefCell<Vec<String>>,
) {
    let _ = (writer, published);
}
