//! `import` command: load a document export into the SQLite catalog.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use wallery_data::{import_export_file, persist_catalog_to_sqlite};

use crate::{
    ARG_DATABASE, ARG_EXPORT, CliError, ENV_IMPORT_EXPORT, database_or_default, require_existing,
    write_json,
};

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "import",
    long_about = "Decode a document-database JSON export (optionally wrapped \
                 in __collections__) and upsert its wallpapers, categories \
                 and collections into the SQLite catalog. Documents that do \
                 not decode are skipped and counted.",
    about = "Import a JSON export into the catalog"
)]
#[ortho_config(prefix = "WALLERY")]
pub(crate) struct ImportArgs {
    /// Path to the JSON export.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) export: Option<Utf8PathBuf>,
    /// SQLite catalog to write (default `wallery.db`).
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl ImportArgs {
    fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

/// Resolved `import` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    pub(crate) export: Utf8PathBuf,
    pub(crate) database: Utf8PathBuf,
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        let export = args.export.ok_or(CliError::MissingArgument {
            field: ARG_EXPORT,
            env: ENV_IMPORT_EXPORT,
        })?;
        Ok(Self {
            export,
            database: database_or_default(args.database),
        })
    }
}

pub(crate) fn run_import(args: ImportArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_import(&config, out)
}

pub(crate) fn execute_import(config: &ImportConfig, out: &mut dyn Write) -> Result<(), CliError> {
    require_existing(&config.export, ARG_EXPORT)?;
    let catalog = import_export_file(&config.export)?;
    persist_catalog_to_sqlite(&config.database, &catalog).map_err(|source| {
        CliError::PersistCatalog {
            path: config.database.clone(),
            source: Box::new(source),
        }
    })?;
    let summary = catalog.summary();
    info!(
        "imported {} wallpapers from {} into {}",
        summary.wallpapers, config.export, config.database
    );
    write_json(out, &summary)
}
