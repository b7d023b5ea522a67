use std::path;

/// A file the user picked, with the media type it claims to be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachmentFile {
    pub path: path::PathBuf,
    pub name: String,
    pub media_type: String,
}

impl AttachmentFile {
    pub fn from_path(path: path::PathBuf) -> AttachmentFile {
        let name = path
            .file_name()
            .map(|e| return e.to_string_lossy().to_string())
            .unwrap_or_default();

        let extension = path
            .extension()
            .map(|e| return e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let media_type = match extension.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "heic" => "image/heic",
            "heif" => "image/heif",
            "bmp" => "image/bmp",
            "svg" => "image/svg+xml",
            _ => "application/octet-stream",
        };

        return AttachmentFile {
            path,
            name,
            media_type: media_type.to_string(),
        };
    }

    pub fn is_image(&self) -> bool {
        return self.media_type.starts_with("image/");
    }
}

/// What a preview affordance needs to show a staged image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachmentPreview {
    pub name: String,
    pub media_type: String,
    pub size: usize,
}
