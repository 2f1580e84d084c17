use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::MediaError;
use crate::image::ImageBlob;
use crate::mime_detect::extension_for;

/// A temporary on-disk copy of a pasted image, for local preview.
///
/// The file is deleted when the handle is dropped or released.
#[derive(Debug)]
pub struct PreviewHandle {
    file: NamedTempFile,
}

impl PreviewHandle {
    /// Write `image` to a fresh temp file, in `dir` or the system temp dir.
    pub fn create(image: &ImageBlob, dir: Option<&Path>) -> Result<Self, MediaError> {
        let suffix = format!(".{}", extension_for(image.mime_type()));
        let mut builder = tempfile::Builder::new();
        builder.prefix("simpledo-paste-").suffix(&suffix);
        let target = dir.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
        let io_err = |source| MediaError::Io {
            path: target.display().to_string(),
            source,
        };

        let mut file = builder.tempfile_in(&target).map_err(io_err)?;
        std::io::Write::write_all(&mut file, image.data()).map_err(io_err)?;
        debug!(path = %file.path().display(), bytes = image.len(), "Created image preview");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the preview file now.
    pub fn release(self) {
        debug!(path = %self.path().display(), "Releasing image preview");
        drop(self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_file_lives_until_release() {
        let dir = tempfile::tempdir().unwrap();
        let blob = ImageBlob::new(&b"\x89PNG"[..], "image/png").unwrap();
        let preview = PreviewHandle::create(&blob, Some(dir.path())).unwrap();
        let path = preview.path().to_path_buf();

        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "png");
        assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG");

        preview.release();
        assert!(!path.exists());
    }
}
