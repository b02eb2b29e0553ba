//! Clipboard emulation on top of a shared picture library
//!
//! The host platform has no clipboard API, but every application can read and
//! save pictures in a shared library. The clipboard slot is therefore a JPEG:
//! a fixed known image followed by a tagged payload record. Picture viewers
//! stop at the end of the JPEG data and never see the payload.
//!
//! [`CarrierStore`] reads and writes that slot directly. [`ProxyClipboard`] is
//! the in-memory mirror an application takes once per session so that it
//! scans the library once and saves at most once.

pub mod carrier;
pub mod proxy;
pub mod record;

use crate::library::LibraryError;
use thiserror::Error;

pub use carrier::{CarrierStore, CARRIER_NAME, KNOWN_IMAGE, KNOWN_IMAGE_LENGTH};
pub use proxy::ProxyClipboard;
pub use record::{DataFormat, RecordError};

/// Maximum clipboard payload size (5MB)
pub const MAX_CLIPBOARD_SIZE: usize = 5 * 1024 * 1024;

/// Raw image held on the clipboard: one packed 4-byte pixel per position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Pixel bytes, row major, `width * height * 4` long
    pub bytes: Vec<u8>,
}

impl ImageData {
    /// Build an image, checking the pixel buffer matches the dimensions
    pub fn new(width: usize, height: usize, bytes: Vec<u8>) -> Result<Self, ClipboardError> {
        let image = Self {
            width,
            height,
            bytes,
        };
        image.validate()?;
        Ok(image)
    }

    /// Number of pixel bytes the dimensions call for
    pub fn expected_len(&self) -> usize {
        self.width
            .saturating_mul(self.height)
            .saturating_mul(record::BYTES_PER_PIXEL)
    }

    pub(crate) fn validate(&self) -> Result<(), ClipboardError> {
        if i32::try_from(self.width).is_err() || i32::try_from(self.height).is_err() {
            return Err(ClipboardError::invalid(
                "image",
                format!(
                    "dimensions {}x{} exceed the storable range",
                    self.width, self.height
                ),
            ));
        }

        if self.bytes.len() != self.expected_len() {
            return Err(ClipboardError::invalid(
                "image",
                format!(
                    "{}x{} image needs {} pixel bytes, got {}",
                    self.width,
                    self.height,
                    self.expected_len(),
                    self.bytes.len()
                ),
            ));
        }

        Ok(())
    }
}

/// What the clipboard slot currently holds. Only one kind at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClipboardContent {
    /// Nothing on the clipboard
    #[default]
    Empty,
    /// A string
    Text(String),
    /// An image
    Image(ImageData),
}

impl ClipboardContent {
    /// Check if content is text
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Check if content is an image
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image(_))
    }

    /// Check if the clipboard is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Text on the clipboard, or an empty string
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            _ => "",
        }
    }

    /// Image on the clipboard, if any
    pub fn image(&self) -> Option<&ImageData> {
        match self {
            Self::Image(image) => Some(image),
            _ => None,
        }
    }

    /// Format tag this content is stored under
    pub fn format(&self) -> DataFormat {
        match self {
            Self::Empty => DataFormat::None,
            Self::Text(_) => DataFormat::Text,
            Self::Image(_) => DataFormat::Image,
        }
    }
}

/// Underlying cause of a [`ClipboardError::StoreUnavailable`]
#[derive(Debug, Error)]
pub enum StoreFault {
    /// The shared library failed
    #[error(transparent)]
    Library(#[from] LibraryError),

    /// The carrier asset held an unreadable record
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Clipboard errors
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// A required value was missing or malformed
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// The shared library could not be used
    #[error("{context}")]
    StoreUnavailable {
        context: &'static str,
        #[source]
        source: StoreFault,
    },
}

impl ClipboardError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn unavailable(context: &'static str, source: impl Into<StoreFault>) -> Self {
        Self::StoreUnavailable {
            context,
            source: source.into(),
        }
    }

    /// Whether this error was caused by the caller rather than the library
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}
