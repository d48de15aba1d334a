use crate::error::{AppError, Result};
use crate::models::image_types::UploadedImage;
use base64::Engine;
use image::ImageReader;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Largest image accepted, in decoded pixels.
pub const MAX_PIXELS: u64 = 64 * 1024 * 1024;

/// Files handed over by a file picker. Only the first one is used.
#[derive(Debug, Clone, Default)]
pub struct FileSelection {
    pub files: Vec<PathBuf>,
}

impl FileSelection {
    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self {
            files: vec![path.into()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// `Ok(None)` when nothing was picked.
pub fn read_selection(selection: &FileSelection) -> Result<Option<UploadedImage>> {
    match selection.files.first() {
        Some(path) => read_image_file(path).map(Some),
        None => Ok(None),
    }
}

pub fn read_image_file(path: &Path) -> Result<UploadedImage> {
    let bytes = std::fs::read(path).map_err(|e| {
        AppError::InvalidImage(format!("Cannot read {}: {}", path.display(), e))
    })?;
    let file_name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    from_bytes(file_name, bytes)
}

/// Sniffs the format from content, not the extension.
pub fn from_bytes(file_name: String, bytes: Vec<u8>) -> Result<UploadedImage> {
    let format = image::guess_format(&bytes)
        .map_err(|_| AppError::InvalidImage(format!("{} is not a recognized image", file_name)))?;

    let (width, height) = ImageReader::with_format(Cursor::new(&bytes), format)
        .into_dimensions()
        .map_err(|e| AppError::InvalidImage(format!("{}: {}", file_name, e)))?;
    check_dimensions(&file_name, width, height)?;

    let mime = format.to_mime_type();
    let url = format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(&bytes)
    );

    tracing::debug!(file = %file_name, width, height, mime, "image selected");

    Ok(UploadedImage {
        file_name,
        mime,
        width,
        height,
        bytes: Arc::from(bytes),
        url,
    })
}

/// Rejects images whose decoded size would exceed [`MAX_PIXELS`].
pub fn check_dimensions(file_name: &str, width: u32, height: u32) -> Result<()> {
    let pixels = width as u64 * height as u64;
    if pixels == 0 {
        return Err(AppError::InvalidImage(format!("{} has no pixels", file_name)));
    }
    if pixels > MAX_PIXELS {
        return Err(AppError::InvalidImage(format!(
            "{} is {}x{}, larger than {} pixels",
            file_name, width, height, MAX_PIXELS
        )));
    }
    Ok(())
}
