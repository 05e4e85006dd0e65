// Multipart image uploads shared by the TMDB and users clients
use reqwest::multipart::{Form, Part};
use std::path::Path;

use crate::error::{ApiError, Result};

/// Form field the upload endpoints expect the file under
pub const FILE_FIELD: &str = "file";

/// An image read into memory, ready to be turned into a form (again, on retry)
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub async fn read(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                ApiError::InvalidRequest(format!("Not a file path: {}", path.display()))
            })?;

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ApiError::InvalidRequest(format!("Cannot read {}: {}", path.display(), e))
        })?;

        Ok(Self {
            mime: image_mime(path),
            file_name,
            bytes,
        })
    }

    /// The `file` part on its own
    pub fn part(&self) -> Result<Part> {
        Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(self.mime)
            .map_err(ApiError::from_transport)
    }

    pub fn form(&self) -> Result<Form> {
        Ok(Form::new().part(FILE_FIELD, self.part()?))
    }
}

/// Guess the image mime type from the extension, falling back to a generic image type
pub fn image_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("heic") => "image/heic",
        _ => "image/*",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_image_mime_from_extension() {
        assert_eq!(image_mime(Path::new("poster.JPG")), "image/jpeg");
        assert_eq!(image_mime(Path::new("a/b/still.png")), "image/png");
        assert_eq!(image_mime(Path::new("no_extension")), "image/*");
        assert_eq!(image_mime(Path::new("notes.txt")), "image/*");
    }

    #[tokio::test]
    async fn test_read_image_file() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"\x89PNG fake").unwrap();

        let image = ImageFile::read(file.path()).await.unwrap();
        assert_eq!(image.mime, "image/png");
        assert_eq!(image.bytes, b"\x89PNG fake");
        assert!(image.file_name.ends_with(".png"));
        assert!(image.form().is_ok());
    }

    #[tokio::test]
    async fn test_missing_file_is_invalid_request() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageFile::read(&dir.path().join("gone.jpg")).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }
}
