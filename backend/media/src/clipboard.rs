//! Clipboard paste ingestion and copy-back of extracted text.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bytes::Bytes;
use tracing::{info, warn};

use crate::MediaError;
use crate::image::ImageBlob;
use crate::mime_detect::{is_image, resolve_mime};

/// One typed entry of a paste.
#[derive(Debug, Clone)]
pub struct ClipboardItem {
    pub mime_type: String,
    pub data: Bytes,
}

/// Everything delivered by a single paste.
#[derive(Debug, Clone, Default)]
pub struct PasteEvent {
    pub items: Vec<ClipboardItem>,
}

impl PasteEvent {
    pub fn new(items: Vec<ClipboardItem>) -> Self {
        Self { items }
    }

    /// Treat an image file on disk as if it had been pasted.
    pub fn from_file(path: &Path, mime_override: Option<&str>) -> Result<Self, MediaError> {
        let data = fs::read(path).map_err(|source| MediaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mime_type = match mime_override {
            Some(mime) => mime.to_string(),
            None => resolve_mime(path, &data).to_string(),
        };
        Ok(Self::new(vec![ClipboardItem { mime_type, data: data.into() }]))
    }

    /// The first item whose type mentions `image`, if any.
    pub fn first_image(&self) -> Option<&ClipboardItem> {
        self.items.iter().find(|item| is_image(&item.mime_type))
    }

    /// Pull the first image out of the paste as a validated blob.
    pub fn into_image(self) -> Result<ImageBlob, MediaError> {
        let item = self.first_image().cloned().ok_or(MediaError::NoImage)?;
        ImageBlob::new(item.data, item.mime_type)
    }
}

/// Destination for the "copy text" action.
pub trait ClipboardWriter: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), MediaError>;
}

/// Writes copied text to a file, overwriting it each time.
pub struct FileClipboard {
    path: PathBuf,
}

impl FileClipboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ClipboardWriter for FileClipboard {
    fn write_text(&self, text: &str) -> Result<(), MediaError> {
        fs::write(&self.path, text).map_err(|source| MediaError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }
}

/// Keeps the last copied text in memory.
#[derive(Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl ClipboardWriter for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), MediaError> {
        let mut contents = self
            .contents
            .lock()
            .map_err(|_| MediaError::Clipboard("clipboard lock poisoned".into()))?;
        *contents = Some(text.to_string());
        Ok(())
    }
}

/// Outcome of a copy action, shown to the user as a transient notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyStatus {
    Copied,
    Failed(String),
}

impl CopyStatus {
    pub fn message(&self) -> &'static str {
        match self {
            CopyStatus::Copied => "Text copied successfully!",
            CopyStatus::Failed(_) => "Failed to copy text.",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CopyStatus::Copied)
    }
}

/// Copy `text`, never failing: errors become a [`CopyStatus::Failed`].
pub fn copy_text(writer: &dyn ClipboardWriter, text: &str) -> CopyStatus {
    match writer.write_text(text) {
        Ok(()) => {
            info!(chars = text.chars().count(), "Copied text to clipboard");
            CopyStatus::Copied
        }
        Err(e) => {
            warn!(error = %e, "Failed to copy text");
            CopyStatus::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(mime: &str, data: &'static [u8]) -> ClipboardItem {
        ClipboardItem { mime_type: mime.into(), data: Bytes::from_static(data) }
    }

    #[test]
    fn picks_first_image_item() {
        let paste = PasteEvent::new(vec![
            item("text/plain", b"hello"),
            item("image/png", b"png-bytes"),
            item("image/jpeg", b"jpg-bytes"),
        ]);
        let blob = paste.into_image().unwrap();
        assert_eq!(blob.mime_type(), "image/png");
        assert_eq!(blob.data().as_ref(), b"png-bytes");
    }

    #[test]
    fn text_only_paste_has_no_image() {
        let paste = PasteEvent::new(vec![item("text/plain", b"hello")]);
        assert!(paste.first_image().is_none());
        assert!(matches!(paste.into_image(), Err(MediaError::NoImage)));
    }

    #[test]
    fn empty_image_item_is_unreadable() {
        let paste = PasteEvent::new(vec![item("image/png", b"")]);
        let err = paste.into_image().unwrap_err();
        assert_eq!(err.to_string(), "Could not read image file from clipboard.");
    }

    #[test]
    fn copy_reports_status() {
        let clipboard = MemoryClipboard::new();
        let status = copy_text(&clipboard, "Invoice #123");
        assert_eq!(status, CopyStatus::Copied);
        assert_eq!(status.message(), "Text copied successfully!");
        assert_eq!(clipboard.contents().as_deref(), Some("Invoice #123"));

        let broken = FileClipboard::new("/nonexistent-dir/for/sure/out.txt");
        let status = copy_text(&broken, "x");
        assert!(!status.is_success());
        assert_eq!(status.message(), "Failed to copy text.");
    }

    #[test]
    fn file_paste_uses_extension_then_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.jpg");
        fs::write(&path, b"\xFF\xD8\xFFdata").unwrap();

        let paste = PasteEvent::from_file(&path, None).unwrap();
        assert_eq!(paste.items[0].mime_type, "image/jpeg");

        let paste = PasteEvent::from_file(&path, Some("image/webp")).unwrap();
        assert_eq!(paste.items[0].mime_type, "image/webp");
    }
}
