//! Catalog maintenance commands: `publish-due` and `reconcile-counts`.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use wallery_data::CatalogWriter;

use crate::{ARG_DATABASE, CliError, database_or_default, require_existing, write_json};

/// CLI arguments for the `publish-due` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "publish-due",
    long_about = "Move every scheduled draft whose publish time has passed \
                 into the live catalog and print the published identifiers. \
                 Drafts that cannot be published stay scheduled.",
    about = "Publish scheduled drafts that are due"
)]
#[ortho_config(prefix = "WALLERY")]
pub(crate) struct PublishDueArgs {
    /// SQLite catalog to update (default `wallery.db`).
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

/// CLI arguments for the `reconcile-counts` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "reconcile-counts",
    about = "Recompute category wallpaper counts from the catalog"
)]
#[ortho_config(prefix = "WALLERY")]
pub(crate) struct ReconcileCountsArgs {
    /// SQLite catalog to update (default `wallery.db`).
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl PublishDueArgs {
    fn into_database(self) -> Result<Utf8PathBuf, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(database_or_default(merged.database))
    }
}

impl ReconcileCountsArgs {
    fn into_database(self) -> Result<Utf8PathBuf, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(database_or_default(merged.database))
    }
}

fn open_writer(database: &Utf8Path) -> Result<CatalogWriter, CliError> {
    require_existing(database, ARG_DATABASE)?;
    Ok(CatalogWriter::open(database)?)
}

pub(crate) fn run_publish_due(
    args: PublishDueArgs,
    now: DateTime<Utc>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let database = args.into_database()?;
    execute_publish_due(&database, now, out)
}

pub(crate) fn execute_publish_due(
    database: &Utf8Path,
    now: DateTime<Utc>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let mut writer = open_writer(database)?;
    let published = writer.publish_due(now)?;
    info!("published {} scheduled wallpapers", published.len());
    write_json(out, &published)
}

pub(crate) fn run_reconcile_counts(
    args: ReconcileCountsArgs,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let database = args.into_database()?;
    execute_reconcile_counts(&database, out)
}

pub(crate) fn execute_reconcile_counts(
    database: &Utf8Path,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let mut writer = open_writer(database)?;
    let categories = writer.reconcile_category_counts()?;
    write_json(out, &categories)
}
