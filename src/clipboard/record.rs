//! Payload record codec
//!
//! A payload record is what follows the known image inside a carrier asset:
//!
//! ```text
//! [tag: u8][payload ...]
//!
//! tag 1  None   no payload
//! tag 2  Text   UTF-8 bytes
//! tag 3  Image  [width: i32 LE][height: i32 LE][width * height * 4 pixel bytes]
//! ```

use super::{ClipboardContent, ImageData};
use thiserror::Error;

/// Bytes used by the image header (width + height)
pub const IMAGE_HEADER_LEN: usize = 8;

/// Bytes per packed pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// Format tag stored in front of every payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataFormat {
    /// Clipboard is empty
    None = 1,
    /// Clipboard holds a string
    Text = 2,
    /// Clipboard holds packed pixel data
    Image = 3,
}

impl DataFormat {
    /// Map a stored tag byte back to a format
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::None),
            2 => Some(Self::Text),
            3 => Some(Self::Image),
            _ => None,
        }
    }

    /// The byte written to the carrier for this format
    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// Errors decoding or encoding a payload record
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// The record ended before a required field
    #[error("Record truncated: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    /// An image dimension was negative or does not fit the wire format
    #[error("Image dimension out of range: {0}")]
    DimensionOutOfRange(i64),

    /// Pixel block length disagrees with the dimensions
    #[error("Pixel data is {actual} bytes, dimensions require {expected}")]
    PixelLength { expected: usize, actual: usize },
}

/// Record read back from a carrier asset, borrowed from the asset bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadRecord<'a> {
    tag: u8,
    payload: &'a [u8],
}

impl<'a> PayloadRecord<'a> {
    /// Split a record into tag and payload. An empty slice has no record.
    pub fn parse(bytes: &'a [u8]) -> Option<Self> {
        let (&tag, payload) = bytes.split_first()?;
        Some(Self { tag, payload })
    }

    /// Known format of this record, `None` for foreign tags
    pub fn format(&self) -> Option<DataFormat> {
        DataFormat::from_tag(self.tag)
    }

    /// The raw tag byte
    pub fn tag(&self) -> u8 {
        self.tag
    }

    /// Bytes following the tag
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Text held by the record, if it is a text record
    pub fn text(&self) -> Option<String> {
        match self.format() {
            Some(DataFormat::Text) => Some(String::from_utf8_lossy(self.payload).into_owned()),
            _ => None,
        }
    }

    /// Image held by the record, if it is an image record
    pub fn image(&self) -> Result<Option<ImageData>, RecordError> {
        match self.format() {
            Some(DataFormat::Image) => decode_image(self.payload).map(Some),
            _ => Ok(None),
        }
    }

    /// Decode the record into clipboard content. Foreign tags decode as empty.
    pub fn into_content(self) -> Result<ClipboardContent, RecordError> {
        Ok(match self.format() {
            Some(DataFormat::Text) => {
                ClipboardContent::Text(String::from_utf8_lossy(self.payload).into_owned())
            }
            Some(DataFormat::Image) => ClipboardContent::Image(decode_image(self.payload)?),
            Some(DataFormat::None) | None => ClipboardContent::Empty,
        })
    }
}

/// Encode a text payload
pub fn encode_text(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// Encode an image payload: dimensions followed by the pixel block
pub fn encode_image(image: &ImageData) -> Result<Vec<u8>, RecordError> {
    let width = wire_dimension(image.width)?;
    let height = wire_dimension(image.height)?;
    let expected = image.expected_len();
    if image.bytes.len() != expected {
        return Err(RecordError::PixelLength {
            expected,
            actual: image.bytes.len(),
        });
    }

    let mut buffer = Vec::with_capacity(IMAGE_HEADER_LEN + image.bytes.len());
    buffer.extend_from_slice(&width.to_le_bytes());
    buffer.extend_from_slice(&height.to_le_bytes());
    buffer.extend_from_slice(&image.bytes);
    Ok(buffer)
}

/// Decode an image payload
pub fn decode_image(payload: &[u8]) -> Result<ImageData, RecordError> {
    if payload.len() < IMAGE_HEADER_LEN {
        return Err(RecordError::Truncated {
            needed: IMAGE_HEADER_LEN,
            available: payload.len(),
        });
    }

    let (header, pixels) = payload.split_at(IMAGE_HEADER_LEN);
    let width = read_dimension(&header[..4])?;
    let height = read_dimension(&header[4..])?;

    let expected = width
        .checked_mul(height)
        .and_then(|area| area.checked_mul(BYTES_PER_PIXEL))
        .ok_or(RecordError::PixelLength {
            expected: usize::MAX,
            actual: pixels.len(),
        })?;
    if pixels.len() != expected {
        return Err(RecordError::PixelLength {
            expected,
            actual: pixels.len(),
        });
    }

    Ok(ImageData {
        width,
        height,
        bytes: pixels.to_vec(),
    })
}

fn wire_dimension(value: usize) -> Result<i32, RecordError> {
    i32::try_from(value).map_err(|_| {
        RecordError::DimensionOutOfRange(i64::try_from(value).unwrap_or(i64::MAX))
    })
}

fn read_dimension(bytes: &[u8]) -> Result<usize, RecordError> {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(bytes);
    let value = i32::from_le_bytes(raw);
    usize::try_from(value).map_err(|_| RecordError::DimensionOutOfRange(i64::from(value)))
}
