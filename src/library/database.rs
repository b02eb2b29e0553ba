//! SQLite implementation of the shared asset library

use super::{AssetId, AssetInfo, AssetLibrary, LibraryError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const SCHEMA_VERSION: u32 = 1;

/// SQLite database acting as the saved pictures library
pub struct SqliteLibrary {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteLibrary").finish_non_exhaustive()
    }
}

impl SqliteLibrary {
    /// Open (or create) a library at `path`
    pub fn open(path: &Path) -> Result<Self, LibraryError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        Self::with_connection(conn)
    }

    /// Open a library that lives only as long as this value
    pub fn open_in_memory() -> Result<Self, LibraryError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, LibraryError> {
        let library = Self {
            conn: Mutex::new(conn),
        };
        library.initialize()?;
        Ok(library)
    }

    fn initialize(&self) -> Result<(), LibraryError> {
        let conn = self.lock()?;

        let version = Self::get_schema_version(&conn)?;
        if version == 0 {
            Self::create_schema(&conn)?;
        } else if version > SCHEMA_VERSION {
            return Err(LibraryError::InvalidState(format!(
                "library schema version {} is newer than supported version {}",
                version, SCHEMA_VERSION
            )));
        }

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, LibraryError> {
        self.conn
            .lock()
            .map_err(|_| LibraryError::InvalidState("library connection poisoned".to_string()))
    }

    fn get_schema_version(conn: &Connection) -> Result<u32, LibraryError> {
        let table_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !table_exists {
            return Ok(0);
        }

        let version: Option<u32> = conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        Ok(version.unwrap_or(0))
    }

    fn create_schema(conn: &Connection) -> Result<(), LibraryError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER DEFAULT (strftime('%s', 'now'))
            );

            CREATE TABLE IF NOT EXISTS saved_pictures (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                data BLOB NOT NULL,
                saved_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_saved_pictures_name ON saved_pictures(name, id);
            ",
        )?;

        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }

    fn row_to_info(row: &Row) -> rusqlite::Result<AssetInfo> {
        let id: i64 = row.get(0)?;
        let name: String = row.get(1)?;
        let size: i64 = row.get(2)?;
        let saved_at: i64 = row.get(3)?;

        Ok(AssetInfo {
            id: AssetId(id),
            name,
            size: usize::try_from(size)
                .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(2, size))?,
            saved_at: DateTime::from_timestamp_millis(saved_at)
                .ok_or(rusqlite::Error::IntegralValueOutOfRange(3, saved_at))?,
        })
    }
}

impl AssetLibrary for SqliteLibrary {
    fn find_last(&self, name: &str) -> Result<Option<AssetId>, LibraryError> {
        let conn = self.lock()?;
        let id: Option<i64> = conn
            .query_row(
                "SELECT id FROM saved_pictures WHERE name = ? ORDER BY id DESC LIMIT 1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id.map(AssetId))
    }

    fn read(&self, id: AssetId) -> Result<Vec<u8>, LibraryError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT data FROM saved_pictures WHERE id = ?",
            params![id.0],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(LibraryError::Missing(id))
    }

    fn save(&self, name: &str, data: &[u8]) -> Result<AssetId, LibraryError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO saved_pictures (name, data, saved_at) VALUES (?, ?, ?)",
            params![name, data, Utc::now().timestamp_millis()],
        )?;
        let id = AssetId(conn.last_insert_rowid());

        debug!("Saved asset {} ({} bytes) as {}", name, data.len(), id);
        Ok(id)
    }

    fn list(&self, name: &str) -> Result<Vec<AssetInfo>, LibraryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, length(data), saved_at
             FROM saved_pictures
             WHERE name = ?
             ORDER BY id ASC",
        )?;

        let assets = stmt
            .query_map(params![name], Self::row_to_info)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(assets)
    }
}
