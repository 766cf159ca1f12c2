//! Decoded image payload.
//!
//! The gateway decodes inbound data URIs into this type; providers forward
//! it to the model. The mime type is always the one sniffed from the bytes,
//! never the one declared in the data URI.

/// Raw image bytes plus the sniffed mime type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor() {
        let payload = ImagePayload::new(vec![0x89, 0x50], "image/png");
        assert_eq!(payload.bytes.len(), 2);
        assert_eq!(payload.mime, "image/png");
    }
}
