//! Pasted-image handling: clipboard items, MIME detection, base64 encoding
//! and temporary preview files.

pub mod clipboard;
pub mod image;
pub mod mime_detect;
pub mod preview;

use thiserror::Error;

pub use clipboard::{
    copy_text, ClipboardItem, ClipboardWriter, CopyStatus, FileClipboard, MemoryClipboard,
    PasteEvent,
};
pub use image::ImageBlob;
pub use mime_detect::{detect_mime_type, extension_for, is_image, resolve_mime, sniff_image_mime};
pub use preview::PreviewHandle;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("clipboard does not contain an image")]
    NoImage,

    #[error("Could not read image file from clipboard.")]
    EmptyImage,

    #[error("unsupported media type '{0}', expected an image")]
    NotAnImage(String),

    #[error("clipboard error: {0}")]
    Clipboard(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
