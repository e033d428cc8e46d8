//! Read-only catalog commands: `search`, `related` and `popular`.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use wallery_core::{SqliteWallpaperStore, WallpaperStore};
use wallery_scorer::CatalogSearch;

use crate::{
    ARG_COUNT, ARG_DATABASE, ARG_EXCLUDE, ARG_ID, ARG_LIMIT, ARG_QUERY, CliError,
    DEFAULT_POPULAR_COUNT, DEFAULT_RELATED_LIMIT, ENV_RELATED_ID, ENV_SEARCH_QUERY,
    database_or_default, require_existing, write_json,
};

/// CLI arguments for the `search` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "search",
    long_about = "Rank every wallpaper in the catalog against a free-text \
                 query. Tags, categories and title words are matched exactly; \
                 tags and title words also match with typo tolerance, and \
                 descriptions match by substring. When nothing scores, \
                 wallpapers with a tag containing a query term are returned \
                 instead, ordered by downloads plus views.",
    about = "Search the catalog"
)]
#[ortho_config(prefix = "WALLERY")]
pub(crate) struct SearchArgs {
    /// Free-text query.
    #[arg(value_name = "query")]
    #[serde(default)]
    pub(crate) query: Option<String>,
    /// SQLite catalog to read (default `wallery.db`).
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl SearchArgs {
    fn into_config(self) -> Result<SearchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SearchConfig::try_from(merged)
    }
}

/// Resolved `search` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SearchConfig {
    pub(crate) query: String,
    pub(crate) database: Utf8PathBuf,
}

impl TryFrom<SearchArgs> for SearchConfig {
    type Error = CliError;

    fn try_from(args: SearchArgs) -> Result<Self, Self::Error> {
        let query = args.query.ok_or(CliError::MissingArgument {
            field: ARG_QUERY,
            env: ENV_SEARCH_QUERY,
        })?;
        Ok(Self {
            query,
            database: database_or_default(args.database),
        })
    }
}

/// CLI arguments for the `related` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "related",
    long_about = "Recommend wallpapers that share tags or the category with \
                 an existing wallpaper. When nothing qualifies, the most \
                 popular wallpapers are returned instead. The wallpaper \
                 itself is never recommended.",
    about = "Recommend related wallpapers"
)]
#[ortho_config(prefix = "WALLERY")]
pub(crate) struct RelatedArgs {
    /// Identifier of the wallpaper being viewed.
    #[arg(value_name = "id")]
    #[serde(default)]
    pub(crate) id: Option<String>,
    /// Maximum number of recommendations (default 12).
    #[arg(long = ARG_LIMIT, value_name = "n")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Wallpaper identifiers that must not be recommended.
    #[arg(long = ARG_EXCLUDE, value_name = "id")]
    #[serde(default)]
    pub(crate) exclude: Vec<String>,
    /// SQLite catalog to read (default `wallery.db`).
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl RelatedArgs {
    fn into_config(self) -> Result<RelatedConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RelatedConfig::try_from(merged)
    }
}

/// Resolved `related` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RelatedConfig {
    pub(crate) id: String,
    pub(crate) limit: usize,
    /// Excluded ids, always including `id` itself.
    pub(crate) exclude: Vec<String>,
    pub(crate) database: Utf8PathBuf,
}

impl TryFrom<RelatedArgs> for RelatedConfig {
    type Error = CliError;

    fn try_from(args: RelatedArgs) -> Result<Self, Self::Error> {
        let id = args.id.ok_or(CliError::MissingArgument {
            field: ARG_ID,
            env: ENV_RELATED_ID,
        })?;
        let mut exclude = args.exclude;
        if !exclude.contains(&id) {
            exclude.push(id.clone());
        }
        Ok(Self {
            id,
            limit: args.limit.unwrap_or(DEFAULT_RELATED_LIMIT),
            exclude,
            database: database_or_default(args.database),
        })
    }
}

/// CLI arguments for the `popular` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "popular",
    about = "List the most popular wallpapers by weighted engagement"
)]
#[ortho_config(prefix = "WALLERY")]
pub(crate) struct PopularArgs {
    /// Number of wallpapers to list (default 20).
    #[arg(long = ARG_COUNT, value_name = "n")]
    #[serde(default)]
    pub(crate) count: Option<usize>,
    /// SQLite catalog to read (default `wallery.db`).
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl PopularArgs {
    fn into_config(self) -> Result<PopularConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(PopularConfig::from(merged))
    }
}

/// Resolved `popular` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PopularConfig {
    pub(crate) count: usize,
    pub(crate) database: Utf8PathBuf,
}

impl From<PopularArgs> for PopularConfig {
    fn from(args: PopularArgs) -> Self {
        Self {
            count: args.count.unwrap_or(DEFAULT_POPULAR_COUNT),
            database: database_or_default(args.database),
        }
    }
}

fn open_catalog(database: &Utf8Path) -> Result<CatalogSearch<SqliteWallpaperStore>, CliError> {
    require_existing(database, ARG_DATABASE)?;
    let store = SqliteWallpaperStore::open(database.as_std_path())?;
    Ok(CatalogSearch::new(store))
}

pub(crate) fn run_search(args: SearchArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_search(&config, out)
}

pub(crate) fn execute_search(config: &SearchConfig, out: &mut dyn Write) -> Result<(), CliError> {
    let catalog = open_catalog(&config.database)?;
    let outcome = catalog.search_wallpapers(&config.query)?;
    write_json(out, &outcome)
}

pub(crate) fn run_related(args: RelatedArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_related(&config, out)
}

pub(crate) fn execute_related(
    config: &RelatedConfig,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let catalog = open_catalog(&config.database)?;
    let current = catalog
        .store()
        .wallpaper(&config.id)?
        .ok_or_else(|| CliError::UnknownWallpaper {
            id: config.id.clone(),
        })?;
    let related = catalog.more_related_wallpapers(&current, config.limit, &config.exclude)?;
    write_json(out, &related)
}

pub(crate) fn run_popular(args: PopularArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_popular(&config, out)
}

pub(crate) fn execute_popular(config: &PopularConfig, out: &mut dyn Write) -> Result<(), CliError> {
    let catalog = open_catalog(&config.database)?;
    let popular = catalog.store().popular_wallpapers(config.count)?;
    write_json(out, &popular)
}
