//! Test helpers for seeding catalogs and capturing command output.

use super::*;
use std::fs;
use tempfile::TempDir;
use wallery_core::Wallpaper;
use wallery_core::test_support::{wallpaper, write_sqlite_catalog};

pub(super) const EXPORT_JSON: &str = r#"{
  "__collections__": {
    "wallpapers": {
      "aurora": {"title": "Aurora", "category": "Nature", "tags": ["sky", "night"], "views": 40},
      "dunes": {"title": "Dunes", "category": "Nature", "tags": ["desert"], "views": 3},
      "neon": {"title": "Neon Alley", "category": "City", "tags": ["neon", "night"], "views": 90}
    },
    "categories": {
      "Nature": {"wallpaperCount": 2},
      "City": {"wallpaperCount": 1}
    }
  }
}"#;

/// Temporary directory holding an export and a database path inside it.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 temp dir");
        Self { _dir: dir, root }
    }

    pub(super) fn database(&self) -> Utf8PathBuf {
        self.root.join("catalog.db")
    }

    pub(super) fn export(&self) -> Utf8PathBuf {
        self.root.join("export.json")
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn write_export(&self) {
        fs::write(self.export(), EXPORT_JSON).expect("write export");
    }

    pub(super) fn seed_catalog(&self, wallpapers: &[Wallpaper]) {
        write_sqlite_catalog(self.database().as_std_path(), wallpapers).expect("seed catalog");
    }
}

/// Catalog with one isolated wallpaper and a clear popularity order.
pub(super) fn isolated_catalog() -> Vec<Wallpaper> {
    vec![
        wallpaper("lonely", "Abstract", &["fractal"]).with_engagement(0, 0, 1),
        wallpaper("busy", "City", &["neon"]).with_engagement(10, 5, 100),
        wallpaper("quiet", "Nature", &["lake"]).with_engagement(1, 1, 10),
    ]
}

/// Run `argv` through the real parser and dispatcher, capturing stdout.
pub(super) fn invoke<I, T>(argv: I, now: DateTime<Utc>) -> Result<String, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(argv)?;
    let mut out = Vec::new();
    dispatch(cli.command, now, &mut out)?;
    Ok(String::from_utf8(out).expect("UTF-8 output"))
}

/// Identifiers of the wallpapers in a JSON array.
pub(super) fn ids_in(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .expect("JSON array")
        .iter()
        .map(|entry| entry["id"].as_str().expect("string id").to_owned())
        .collect()
}
