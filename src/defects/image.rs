//! # Image Codec
//!
//! Turns the `data:image/<subtype>;base64,<payload>` strings produced by the
//! capture widget into raw bytes. This module does no I/O: writing the bytes
//! is a [`crate::store::DataStore`] concern.
//!
//! A rejected data URL is an ordinary outcome, reported as [`InvalidImage`],
//! which the create command turns into a 400 for the caller.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use thiserror::Error;
use uuid::Uuid;

const DATA_URL_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";
const IMAGE_EXT: &str = ".png";

// Browsers are not consistent about padding; accept both.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidImage {
    #[error("image data is missing")]
    Missing,
    #[error("not a base64 image data URL")]
    NotDataUrl,
    #[error("data URL is missing the image subtype or base64 marker")]
    MalformedHeader,
    #[error("payload is not valid base64")]
    BadEncoding,
    #[error("payload decodes to an empty image")]
    EmptyPayload,
}

/// A successfully decoded data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// The `<subtype>` from the header, e.g. `png` or `jpeg`.
    pub subtype: String,
    pub bytes: Vec<u8>,
}

/// Validates and decodes an inbound image data URL.
///
/// Checks run in order: non-empty, `data:image/` prefix, a word-character
/// subtype followed by `;base64,`, then a payload that decodes to at least
/// one byte. ASCII whitespace inside the payload is ignored.
pub fn decode_data_url(input: &str) -> Result<DecodedImage, InvalidImage> {
    if input.is_empty() {
        return Err(InvalidImage::Missing);
    }
    let rest = input
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or(InvalidImage::NotDataUrl)?;

    let (subtype, payload) = rest
        .split_once(BASE64_MARKER)
        .ok_or(InvalidImage::MalformedHeader)?;
    if subtype.is_empty() || !subtype.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(InvalidImage::MalformedHeader);
    }

    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = PAYLOAD_ENGINE
        .decode(compact.as_bytes())
        .map_err(|_| InvalidImage::BadEncoding)?;
    if bytes.is_empty() {
        return Err(InvalidImage::EmptyPayload);
    }

    Ok(DecodedImage {
        subtype: subtype.to_string(),
        bytes,
    })
}

/// Fresh, collision-resistant name for a stored image. Independent of the
/// defect id so that ids never leak into the image directory.
pub fn new_image_filename() -> String {
    format!("{}{}", Uuid::new_v4(), IMAGE_EXT)
}

/// True when `name` can only ever resolve to a direct child of the image
/// directory.
pub fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
