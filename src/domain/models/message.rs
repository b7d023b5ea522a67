#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use anyhow::Result;

use super::ChatError;
use super::Role;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageData {
    pub mime_type: String,
    /// Base64 encoded file contents.
    pub data: String,
}

impl ImageData {
    pub fn data_uri(&self) -> String {
        return format!("data:{};base64,{}", self.mime_type, self.data);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    Image(ImageData),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    parts: Vec<ContentPart>,
}

impl Message {
    pub fn new(role: Role, parts: Vec<ContentPart>) -> Result<Message> {
        if parts.is_empty() {
            return Err(ChatError::EmptyInput.into());
        }

        return Ok(Message { role, parts });
    }

    pub fn new_text(role: Role, text: &str) -> Message {
        return Message {
            role,
            parts: vec![ContentPart::Text(text.to_string())],
        };
    }

    pub fn parts(&self) -> &[ContentPart] {
        return &self.parts;
    }

    /// All text parts joined by a blank line, skipping images.
    pub fn text(&self) -> String {
        return self
            .parts
            .iter()
            .filter_map(|part| {
                if let ContentPart::Text(text) = part {
                    return Some(text.as_str());
                }
                return None;
            })
            .collect::<Vec<&str>>()
            .join("\n\n");
    }
}
