//! # CarrierClip
//!
//! A clipboard for hosts that have no clipboard API but do share a picture
//! library between applications.
//!
//! Clipboard contents (text or raw pixels) are appended to a fixed known
//! JPEG and saved to the library under a reserved name. Any application using
//! this crate against the same library sees the same clipboard.
//!
//! ```no_run
//! use carrierclip::{CarrierStore, SqliteLibrary};
//!
//! # fn main() -> carrierclip::Result<()> {
//! let library = SqliteLibrary::open("pictures.db".as_ref())?;
//! let store = CarrierStore::new(library);
//!
//! let mut proxy = store.generate_proxy()?;
//! proxy.set_text("hello");
//! proxy.persist()?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod library;

pub use clipboard::{
    CarrierStore, ClipboardContent, ClipboardError, ImageData, ProxyClipboard, StoreFault,
};
pub use config::Config;
pub use library::{AssetLibrary, LibraryError, MemoryLibrary, SqliteLibrary};

/// Result type alias for CarrierClip operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for CarrierClip operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Clipboard operation error
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] clipboard::ClipboardError),

    /// Asset library error
    #[error("Library error: {0}")]
    Library(#[from] library::LibraryError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
