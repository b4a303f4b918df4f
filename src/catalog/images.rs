//! Image Asset Storage
//! Mission: Persist uploaded product images on the local filesystem

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Static prefix under which stored images are served back
pub const UPLOADS_PREFIX: &str = "/uploads";

/// Filesystem store for uploaded image assets
///
/// Files are stored under their (sanitized) upload filename. Name collisions
/// overwrite - last write wins. Assets referenced by deleted or re-imaged
/// products are left on disk.
pub struct ImageStore {
    upload_dir: PathBuf,
}

impl ImageStore {
    /// Create the store, making the upload directory if absent
    pub fn new(upload_dir: impl Into<PathBuf>) -> Result<Self> {
        let upload_dir = upload_dir.into();
        fs::create_dir_all(&upload_dir)
            .with_context(|| format!("Failed to create upload dir {}", upload_dir.display()))?;
        Ok(Self { upload_dir })
    }

    /// Directory backing the store (for static file serving)
    pub fn dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Write image bytes under the sanitized filename and return the public
    /// path to record in `Product.image_url`
    pub fn save(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        let name = sanitize_filename(filename)?;
        let path = self.upload_dir.join(&name);

        fs::write(&path, bytes)
            .with_context(|| format!("Failed to write image {}", path.display()))?;

        info!("🖼️  Stored image {} ({} bytes)", name, bytes.len());
        Ok(format!("{}/{}", UPLOADS_PREFIX, name))
    }
}

/// Reduce an upload filename to its final path component
///
/// Strips directory components (both separators) so a crafted name like
/// `../../etc/passwd` cannot escape the upload directory.
fn sanitize_filename(raw: &str) -> Result<String> {
    let candidate = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    if candidate.is_empty() || candidate == "." || candidate == ".." {
        bail!("Invalid image filename: {:?}", raw);
    }

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_writes_file_and_returns_public_path() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path()).unwrap();

        let url = store.save("shirt.png", b"png-bytes").unwrap();
        assert_eq!(url, "/uploads/shirt.png");

        let stored = fs::read(dir.path().join("shirt.png")).unwrap();
        assert_eq!(stored, b"png-bytes");
    }

    #[test]
    fn test_save_overwrites_on_name_collision() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path()).unwrap();

        store.save("shirt.png", b"first").unwrap();
        store.save("shirt.png", b"second").unwrap();

        let stored = fs::read(dir.path().join("shirt.png")).unwrap();
        assert_eq!(stored, b"second");
    }

    #[test]
    fn test_path_traversal_is_stripped() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path()).unwrap();

        let url = store.save("../../etc/passwd", b"data").unwrap();
        assert_eq!(url, "/uploads/passwd");

        assert!(dir.path().join("passwd").exists());
        assert!(!dir.path().parent().unwrap().join("etc").exists());
    }

    #[test]
    fn test_empty_and_dot_filenames_rejected() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path()).unwrap();

        assert!(store.save("", b"data").is_err());
        assert!(store.save("..", b"data").is_err());
        assert!(store.save("uploads/", b"data").is_err());
    }
}
