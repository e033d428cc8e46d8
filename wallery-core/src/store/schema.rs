//! SQLite schema shared by the read store and the data pipeline.

/// DDL for every catalog table.
///
/// Statements use `IF NOT EXISTS` so the batch can run against an existing
/// database. Tags and collection members are stored as JSON arrays;
/// timestamps are Unix epoch milliseconds.
pub const CATALOG_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS wallpapers (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL DEFAULT '',
    tags TEXT NOT NULL DEFAULT '[]',
    image_url TEXT NOT NULL DEFAULT '',
    downloads INTEGER NOT NULL DEFAULT 0,
    likes INTEGER NOT NULL DEFAULT 0,
    views INTEGER NOT NULL DEFAULT 0,
    premium INTEGER NOT NULL DEFAULT 0,
    is_exclusive INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER,
    updated_at INTEGER
);
CREATE INDEX IF NOT EXISTS wallpapers_category ON wallpapers (category);

CREATE TABLE IF NOT EXISTS categories (
    name TEXT PRIMARY KEY,
    wallpaper_count INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS collections (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    wallpaper_ids TEXT NOT NULL DEFAULT '[]',
    views INTEGER NOT NULL DEFAULT 0,
    downloads INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS likes (
    user_id TEXT NOT NULL,
    wallpaper_id TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, wallpaper_id)
);

CREATE TABLE IF NOT EXISTS downloads (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    wallpaper_id TEXT NOT NULL,
    user_id TEXT,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS views (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    wallpaper_id TEXT NOT NULL,
    user_id TEXT,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS scheduled_wallpapers (
    id TEXT PRIMARY KEY,
    payload TEXT NOT NULL,
    publish_at INTEGER NOT NULL
);
";
