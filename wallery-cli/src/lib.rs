//! Command-line interface for the Wallery catalog.
//!
//! Every subcommand layers its settings from CLI flags, `WALLERY_*`
//! environment variables and configuration files through `ortho_config`,
//! resolves them into a validated config and prints its result as pretty
//! JSON on stdout.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;

mod error;
mod import;
mod maintenance;
mod query;

pub use error::CliError;

use import::ImportArgs;
use maintenance::{PublishDueArgs, ReconcileCountsArgs};
use query::{PopularArgs, RelatedArgs, SearchArgs};

const ARG_DATABASE: &str = "database";
const ARG_EXPORT: &str = "export";
const ARG_QUERY: &str = "query";
const ARG_ID: &str = "id";
const ARG_LIMIT: &str = "limit";
const ARG_EXCLUDE: &str = "exclude";
const ARG_COUNT: &str = "count";
const ENV_IMPORT_EXPORT: &str = "WALLERY_CMDS_IMPORT_EXPORT";
const ENV_SEARCH_QUERY: &str = "WALLERY_CMDS_SEARCH_QUERY";
const ENV_RELATED_ID: &str = "WALLERY_CMDS_RELATED_ID";

/// Database used when `--database` is not given.
pub const DEFAULT_DATABASE: &str = "wallery.db";
/// Number of related wallpapers returned when `--limit` is not given.
pub const DEFAULT_RELATED_LIMIT: usize = 12;
/// Number of popular wallpapers returned when `--count` is not given.
pub const DEFAULT_POPULAR_COUNT: usize = 20;

/// Run the Wallery CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns a [`CliError`] describing the first failing step.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, Utc::now(), &mut stdout)
}

fn dispatch(command: Command, now: DateTime<Utc>, out: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Import(args) => import::run_import(args, out),
        Command::Search(args) => query::run_search(args, out),
        Command::Related(args) => query::run_related(args, out),
        Command::Popular(args) => query::run_popular(args, out),
        Command::PublishDue(args) => maintenance::run_publish_due(args, now, out),
        Command::ReconcileCounts(args) => maintenance::run_reconcile_counts(args, out),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "wallery",
    about = "Search, recommend and maintain a Wallery wallpaper catalog",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import a document-database JSON export into the SQLite catalog.
    Import(ImportArgs),
    /// Rank wallpapers against a free-text query.
    Search(SearchArgs),
    /// Recommend wallpapers related to an existing one.
    Related(RelatedArgs),
    /// List the most popular wallpapers.
    Popular(PopularArgs),
    /// Publish scheduled drafts that are due.
    PublishDue(PublishDueArgs),
    /// Recompute every category's wallpaper count.
    ReconcileCounts(ReconcileCountsArgs),
}

fn database_or_default(database: Option<Utf8PathBuf>) -> Utf8PathBuf {
    database.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE))
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match wallery_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    out.write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    out.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
