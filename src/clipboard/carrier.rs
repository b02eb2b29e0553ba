//! Carrier store: the durable clipboard slot
//!
//! Every write saves a new picture named [`CARRIER_NAME`] whose bytes are the
//! known image followed by a payload record. Reads find the most recently
//! saved picture with that name and skip past the known image.
//!
//! Superseded carrier pictures are never deleted. The shared library offers
//! no way to replace an asset in place, so the last saved one wins and older
//! ones stay behind; [`CarrierStore::carrier_assets`] lists them.

use super::proxy::ProxyClipboard;
use super::record::{self, DataFormat, PayloadRecord};
use super::{ClipboardContent, ClipboardError, ImageData, MAX_CLIPBOARD_SIZE};
use crate::library::{AssetId, AssetInfo, AssetLibrary, LibraryError};
use tracing::{debug, info, warn};

/// Default name of the picture the clipboard is hidden in
pub const CARRIER_NAME: &str = "clipboard.jpg";

/// Length of the known image every carrier asset starts with
pub const KNOWN_IMAGE_LENGTH: usize = 1196;

/// The known image: a plain 8x8 grey baseline JPEG
pub const KNOWN_IMAGE: &[u8] = include_bytes!("../../assets/clipboard.jpg");

const _: () = assert!(KNOWN_IMAGE.len() == KNOWN_IMAGE_LENGTH);

/// Clipboard backed by a carrier picture in a shared asset library
#[derive(Debug)]
pub struct CarrierStore<L> {
    library: L,
    name: String,
    max_size: usize,
}

impl<L: AssetLibrary> CarrierStore<L> {
    /// Create a store using the default carrier name
    pub fn new(library: L) -> Self {
        Self::with_name(library, CARRIER_NAME)
    }

    /// Create a store that hides its data in pictures called `name`
    pub fn with_name(library: L, name: impl Into<String>) -> Self {
        Self {
            library,
            name: name.into(),
            max_size: MAX_CLIPBOARD_SIZE,
        }
    }

    /// Limit the size of payloads accepted by the setters
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// The underlying library
    pub fn library(&self) -> &L {
        &self.library
    }

    /// Name of the carrier picture
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Largest payload the setters accept
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Remove all data from the clipboard
    pub fn clear(&self) -> Result<(), ClipboardError> {
        self.write_record(DataFormat::None, &[])
            .map_err(|e| ClipboardError::unavailable("The clipboard could not be cleared", e))?;
        info!("Clipboard cleared");
        Ok(())
    }

    /// Whether the clipboard holds text
    pub fn contains_text(&self) -> Result<bool, ClipboardError> {
        let context = "Unable to check if clipboard contains text";
        let bytes = self
            .read_record()
            .map_err(|e| ClipboardError::unavailable(context, e))?;
        Ok(Self::format_of(bytes.as_deref()) == Some(DataFormat::Text))
    }

    /// Text on the clipboard, or an empty string when it holds something else
    pub fn get_text(&self) -> Result<String, ClipboardError> {
        let bytes = self
            .read_record()
            .map_err(|e| ClipboardError::unavailable("Unable to get clipboard text", e))?;
        Ok(bytes
            .as_deref()
            .and_then(PayloadRecord::parse)
            .and_then(|record| record.text())
            .unwrap_or_default())
    }

    /// Replace the clipboard contents with `text`
    pub fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        let payload = record::encode_text(text);
        self.check_size("text", payload.len())?;

        self.write_record(DataFormat::Text, &payload)
            .map_err(|e| ClipboardError::unavailable("Unable to set clipboard text", e))?;
        info!("Copied {} bytes of text to clipboard", payload.len());
        Ok(())
    }

    /// Whether the clipboard holds an image
    pub fn contains_image(&self) -> Result<bool, ClipboardError> {
        let context = "Unable to check if clipboard contains an image";
        let bytes = self
            .read_record()
            .map_err(|e| ClipboardError::unavailable(context, e))?;
        Ok(Self::format_of(bytes.as_deref()) == Some(DataFormat::Image))
    }

    /// Image on the clipboard, if it holds one
    pub fn get_image(&self) -> Result<Option<ImageData>, ClipboardError> {
        let context = "Unable to get clipboard image";
        let bytes = self
            .read_record()
            .map_err(|e| ClipboardError::unavailable(context, e))?;
        match bytes.as_deref().and_then(PayloadRecord::parse) {
            Some(record) => record
                .image()
                .map_err(|e| ClipboardError::unavailable(context, e)),
            None => Ok(None),
        }
    }

    /// Replace the clipboard contents with `image`
    pub fn set_image(&self, image: &ImageData) -> Result<(), ClipboardError> {
        image.validate()?;
        self.check_size("image", record::IMAGE_HEADER_LEN + image.bytes.len())?;

        let context = "Unable to set clipboard image";
        let payload =
            record::encode_image(image).map_err(|e| ClipboardError::unavailable(context, e))?;
        self.write_record(DataFormat::Image, &payload)
            .map_err(|e| ClipboardError::unavailable(context, e))?;
        info!(
            "Copied {}x{} image to clipboard",
            image.width, image.height
        );
        Ok(())
    }

    /// Read the whole clipboard slot in a single library scan
    pub fn content(&self) -> Result<ClipboardContent, ClipboardError> {
        Ok(self
            .read_slot("Unable to read clipboard contents")?
            .unwrap_or(ClipboardContent::Empty))
    }

    /// Take an in-memory proxy that mirrors the current clipboard.
    ///
    /// The library is scanned once here. When a carrier record is found the
    /// proxy starts clean, so persisting it without changes saves nothing.
    /// With no carrier asset, or only a foreign one shorter than the known
    /// image, the proxy starts empty and dirty, so persisting it writes an
    /// empty clipboard.
    pub fn generate_proxy(&self) -> Result<ProxyClipboard<'_, L>, ClipboardError> {
        match self.read_slot("Unable to initialize proxy")? {
            Some(content) => {
                debug!("Seeded clipboard proxy with {:?}", content.format());
                Ok(ProxyClipboard::seeded(self, content))
            }
            None => {
                debug!("No carrier record to seed from; proxy starts dirty");
                Ok(ProxyClipboard::new(self))
            }
        }
    }

    /// Every carrier picture saved so far, oldest first
    pub fn carrier_assets(&self) -> Result<Vec<AssetInfo>, ClipboardError> {
        self.library
            .list(&self.name)
            .map_err(|e| ClipboardError::unavailable("Unable to list clipboard assets", e))
    }

    /// `None` when no carrier record exists. A record without a tag byte or
    /// with an unknown tag reads as empty.
    fn read_slot(
        &self,
        context: &'static str,
    ) -> Result<Option<ClipboardContent>, ClipboardError> {
        let Some(bytes) = self
            .read_record()
            .map_err(|e| ClipboardError::unavailable(context, e))?
        else {
            return Ok(None);
        };

        let Some(record) = PayloadRecord::parse(&bytes) else {
            return Ok(Some(ClipboardContent::Empty));
        };
        if record.format().is_none() {
            warn!(
                "Carrier asset {} has unknown format tag {}; treating clipboard as empty",
                self.name,
                record.tag()
            );
        }
        record
            .into_content()
            .map(Some)
            .map_err(|e| ClipboardError::unavailable(context, e))
    }

    fn format_of(bytes: Option<&[u8]>) -> Option<DataFormat> {
        bytes
            .and_then(PayloadRecord::parse)
            .and_then(|record| record.format())
    }

    fn check_size(&self, name: &'static str, size: usize) -> Result<(), ClipboardError> {
        if size > self.max_size {
            return Err(ClipboardError::invalid(
                name,
                format!(
                    "payload of {} bytes exceeds the {} byte limit",
                    size, self.max_size
                ),
            ));
        }
        Ok(())
    }

    /// Bytes following the known image in the latest carrier asset.
    ///
    /// `None` when there is no carrier asset, or when the latest one is
    /// shorter than the known image and so was saved by someone else.
    fn read_record(&self) -> Result<Option<Vec<u8>>, LibraryError> {
        let Some(id) = self.library.find_last(&self.name)? else {
            debug!("No carrier asset named {}", self.name);
            return Ok(None);
        };

        let mut bytes = self.library.read(id)?;
        if bytes.len() < KNOWN_IMAGE_LENGTH {
            debug!(
                "Ignoring foreign asset {} {}: {} bytes is shorter than the known image",
                self.name,
                id,
                bytes.len()
            );
            return Ok(None);
        }

        Ok(Some(bytes.split_off(KNOWN_IMAGE_LENGTH)))
    }

    fn write_record(&self, format: DataFormat, payload: &[u8]) -> Result<AssetId, LibraryError> {
        let mut blob = Vec::with_capacity(KNOWN_IMAGE_LENGTH + 1 + payload.len());
        blob.extend_from_slice(KNOWN_IMAGE);
        blob.push(format.tag());
        blob.extend_from_slice(payload);

        let id = self.library.save(&self.name, &blob)?;
        debug!(
            "Wrote {:?} record ({} payload bytes) to {} {}",
            format,
            payload.len(),
            self.name,
            id
        );
        Ok(id)
    }
}
