use serde::Serialize;
use std::sync::Arc;

/// An image picked by the user. Cheap to clone; the bytes are shared.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
    pub bytes: Arc<[u8]>,
    /// Displayable reference, a `data:` URL over `bytes`.
    pub url: String,
}

impl UploadedImage {
    pub fn preview(&self) -> ImagePreview {
        ImagePreview {
            file_name: self.file_name.clone(),
            width: self.width,
            height: self.height,
            url: self.url.clone(),
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ImagePreview {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub url: String,
}
