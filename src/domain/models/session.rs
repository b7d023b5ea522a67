#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use anyhow::Result;

use super::ChatError;
use super::ContentPart;
use super::ImageData;
use super::Message;
use super::PersonaConfig;
use super::Role;

/// In-memory conversation state. History is append only; `reset` is the only
/// way to drop messages, and it greets again so the first entry is always the
/// model's greeting.
#[derive(Clone, Debug, Default)]
pub struct Session {
    history: Vec<Message>,
    pending_attachment: Option<ImageData>,
}

impl Session {
    pub fn initialize(persona: &PersonaConfig) -> Session {
        return Session {
            history: vec![Message::new_text(Role::Model, &persona.greeting)],
            pending_attachment: None,
        };
    }

    pub fn history(&self) -> &[Message] {
        return &self.history;
    }

    pub fn pending_attachment(&self) -> Option<&ImageData> {
        return self.pending_attachment.as_ref();
    }

    pub fn append_user_message(
        &mut self,
        text: Option<&str>,
        attachment: Option<ImageData>,
    ) -> Result<()> {
        let text = text.map(|e| return e.trim()).unwrap_or("");
        if text.is_empty() && attachment.is_none() {
            return Err(ChatError::EmptyInput.into());
        }

        let mut parts = vec![];
        if let Some(image) = attachment {
            parts.push(ContentPart::Image(image));
        }
        if !text.is_empty() {
            parts.push(ContentPart::Text(text.to_string()));
        }

        self.history.push(Message::new(Role::User, parts)?);
        return Ok(());
    }

    pub fn append_model_message(&mut self, text: &str) {
        self.history.push(Message::new_text(Role::Model, text));
    }

    pub fn set_pending_attachment(&mut self, image: ImageData) {
        self.pending_attachment = Some(image);
    }

    pub fn clear_pending_attachment(&mut self) {
        self.pending_attachment = None;
    }

    pub fn reset(&mut self, persona: &PersonaConfig) {
        *self = Session::initialize(persona);
    }
}
