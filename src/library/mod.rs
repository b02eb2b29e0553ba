//! Shared asset library abstraction
//!
//! The clipboard has no storage of its own. It rides on a library of named
//! picture assets that every application on the device can enumerate, read
//! and append to. This module defines that collaborator and ships two
//! implementations: an in-process one and a SQLite-backed one.

pub mod database;
pub mod memory;

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

pub use database::SqliteLibrary;
pub use memory::MemoryLibrary;

/// Identifier of a saved asset, unique within one library
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId(pub i64);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Metadata describing a saved asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    /// Library identifier
    pub id: AssetId,
    /// Name the asset was saved under
    pub name: String,
    /// Size of the asset in bytes
    pub size: usize,
    /// When the asset was saved
    pub saved_at: DateTime<Utc>,
}

/// Shared picture library the clipboard hides its data in.
///
/// Enumeration is ordered by save time: for a given name the most recently
/// saved asset is the one `find_last` returns. Assets are never replaced in
/// place, saving under an existing name adds another asset.
#[cfg_attr(test, mockall::automock)]
pub trait AssetLibrary: Send + Sync {
    /// Find the most recently saved asset with the given name
    fn find_last(&self, name: &str) -> Result<Option<AssetId>, LibraryError>;

    /// Read the full contents of an asset
    fn read(&self, id: AssetId) -> Result<Vec<u8>, LibraryError>;

    /// Save a new asset under `name`
    fn save(&self, name: &str, data: &[u8]) -> Result<AssetId, LibraryError>;

    /// List every asset saved under `name`, oldest first
    fn list(&self, name: &str) -> Result<Vec<AssetInfo>, LibraryError>;
}

/// Errors raised by an asset library
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The library handle has been released
    #[error("Library handle has been disposed")]
    Disposed,

    /// The library refused the call in its current state
    #[error("Invalid library state: {0}")]
    InvalidState(String),

    /// An asset disappeared between lookup and read
    #[error("Asset {0} not found")]
    Missing(AssetId),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}
