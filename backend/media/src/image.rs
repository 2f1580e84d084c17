use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;

use crate::MediaError;
use crate::mime_detect::is_image;

/// Raw image bytes plus their declared MIME type.
///
/// Cheap to clone; the bytes are reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    mime_type: String,
    data: Bytes,
}

impl ImageBlob {
    pub fn new(data: impl Into<Bytes>, mime_type: impl Into<String>) -> Result<Self, MediaError> {
        let mime_type = mime_type.into();
        let data = data.into();
        if !is_image(&mime_type) {
            return Err(MediaError::NotAnImage(mime_type));
        }
        if data.is_empty() {
            return Err(MediaError::EmptyImage);
        }
        Ok(Self { mime_type, data })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bare base64 payload, without any `data:` prefix.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}
