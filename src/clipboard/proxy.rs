//! In-memory clipboard proxy
//!
//! Scanning the shared library is slow, and the platform does not allow an
//! application to hold the library open for long. A proxy is taken once at
//! the start of a session, used freely, and persisted once at the end.

use super::carrier::CarrierStore;
use super::{ClipboardContent, ClipboardError, ImageData};
use crate::library::AssetLibrary;
use tracing::debug;

/// Session-local mirror of the clipboard
#[derive(Debug)]
pub struct ProxyClipboard<'a, L> {
    store: &'a CarrierStore<L>,
    content: ClipboardContent,
    changed: bool,
}

impl<'a, L: AssetLibrary> ProxyClipboard<'a, L> {
    /// Create an empty proxy bound to `store`.
    ///
    /// A fresh proxy counts as changed: persisting it without touching it
    /// clears the clipboard. Use [`CarrierStore::generate_proxy`] to mirror
    /// what the clipboard currently holds.
    pub fn new(store: &'a CarrierStore<L>) -> Self {
        Self {
            store,
            content: ClipboardContent::Empty,
            changed: true,
        }
    }

    pub(crate) fn seeded(store: &'a CarrierStore<L>, content: ClipboardContent) -> Self {
        Self {
            store,
            content,
            changed: false,
        }
    }

    /// Remove all data from the clipboard
    pub fn clear(&mut self) {
        self.content = ClipboardContent::Empty;
        self.changed = true;
    }

    /// Whether there is text on the clipboard
    pub fn contains_text(&self) -> bool {
        self.content.is_text()
    }

    /// Text on the clipboard, or an empty string
    pub fn get_text(&self) -> &str {
        self.content.text()
    }

    /// Replace the clipboard contents with `text`
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.content = ClipboardContent::Text(text.into());
        self.changed = true;
    }

    /// Whether there is an image on the clipboard
    pub fn contains_image(&self) -> bool {
        self.content.is_image()
    }

    /// Image on the clipboard, if any
    pub fn get_image(&self) -> Option<&ImageData> {
        self.content.image()
    }

    /// Replace the clipboard contents with `image`
    pub fn set_image(&mut self, image: ImageData) -> Result<(), ClipboardError> {
        image.validate()?;
        self.content = ClipboardContent::Image(image);
        self.changed = true;
        Ok(())
    }

    /// Current contents
    pub fn content(&self) -> &ClipboardContent {
        &self.content
    }

    /// Whether the proxy holds changes not yet saved
    pub fn is_dirty(&self) -> bool {
        self.changed
    }

    /// Save the proxy back to the carrier store if it changed.
    ///
    /// Performs exactly one store write when dirty and none otherwise.
    /// Returns whether a write happened. The dirty flag is only consumed when
    /// the write succeeds.
    pub fn persist(&mut self) -> Result<bool, ClipboardError> {
        if !self.changed {
            debug!("Clipboard proxy unchanged, nothing to persist");
            return Ok(false);
        }

        match &self.content {
            ClipboardContent::Text(text) => self.store.set_text(text)?,
            ClipboardContent::Image(image) => self.store.set_image(image)?,
            ClipboardContent::Empty => self.store.clear()?,
        }

        self.changed = false;
        debug!("Clipboard proxy persisted");
        Ok(true)
    }
}
