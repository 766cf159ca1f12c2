//! Inbound data-URI image decoding.
//!
//! The `image` field arrives as `data:<mime>;base64,<payload>`. The string
//! is split on the FIRST comma; everything after it is base64-decoded and
//! the raster format is sniffed from the bytes — the declared mime type is
//! never trusted. Any malformation here is a request-validation failure and
//! the generator is never invoked.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use inkmath_core::error::RequestError;
use inkmath_core::media::ImagePayload;

/// Decode a data URI into validated image bytes plus a sniffed mime type.
pub fn decode_data_uri(uri: &str) -> Result<ImagePayload, RequestError> {
    let (_, payload) = uri.split_once(',').ok_or(RequestError::MissingPayload)?;

    let bytes = BASE64_STANDARD
        .decode(payload.trim())
        .map_err(|e| RequestError::InvalidBase64(e.to_string()))?;

    let format =
        image::guess_format(&bytes).map_err(|e| RequestError::UndecodableImage(e.to_string()))?;

    // Fully decode to reject byte soup that merely starts with a magic
    // number.
    image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| RequestError::UndecodableImage(e.to_string()))?;

    Ok(ImagePayload::new(bytes, format.to_mime_type()))
}
