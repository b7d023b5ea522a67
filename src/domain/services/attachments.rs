#[cfg(test)]
#[path = "attachments_test.rs"]
mod tests;

use anyhow::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tokio::fs;

use crate::domain::models::AttachmentFile;
use crate::domain::models::AttachmentPreview;
use crate::domain::models::ChatError;
use crate::domain::models::ImageData;
use crate::domain::models::Session;

pub struct Attachments {}

impl Attachments {
    /// Stages `file` as the image for the next outgoing message, replacing
    /// whatever was staged before. The session is left untouched on failure.
    pub async fn attach(session: &mut Session, file: &AttachmentFile) -> Result<AttachmentPreview> {
        if !file.is_image() {
            return Err(ChatError::UnsupportedType {
                media_type: file.media_type.to_string(),
            }
            .into());
        }

        let bytes = match fs::read(&file.path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(error = ?err, path = ?file.path, "Failed to read attachment");
                return Err(ChatError::Read {
                    file_name: file.name.to_string(),
                    reason: err.to_string(),
                }
                .into());
            }
        };

        if bytes.is_empty() {
            return Err(ChatError::Read {
                file_name: file.name.to_string(),
                reason: "the file is empty".to_string(),
            }
            .into());
        }

        session.set_pending_attachment(ImageData {
            mime_type: file.media_type.to_string(),
            data: STANDARD.encode(&bytes),
        });

        return Ok(AttachmentPreview {
            name: file.name.to_string(),
            media_type: file.media_type.to_string(),
            size: bytes.len(),
        });
    }

    pub fn detach(session: &mut Session) {
        session.clear_pending_attachment();
    }
}
