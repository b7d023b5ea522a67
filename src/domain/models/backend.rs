#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

use super::Message;
use super::PersonaConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TransportMode {
    /// Call the Gemini API directly, with the API key in the query string.
    Direct,
    /// Post to a proxy that holds the key server side.
    Proxy,
}

impl TransportMode {
    pub fn parse(text: &str) -> Option<TransportMode> {
        return TransportMode::iter().find(|e| return e.to_string() == text);
    }
}

#[derive(Clone, Debug)]
pub struct BackendPrompt {
    pub contents: Vec<Message>,
    pub system_instruction: String,
}

impl BackendPrompt {
    pub fn new(history: &[Message], persona: &PersonaConfig) -> BackendPrompt {
        let contents = history
            .iter()
            .filter(|message| return message.role.is_conversational())
            .cloned()
            .collect();

        return BackendPrompt {
            contents,
            system_instruction: persona.system_instruction.to_string(),
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendResponse {
    Completion(String),
    /// Description of whatever went wrong during the request.
    Failure(String),
}

#[async_trait]
pub trait Backend {
    /// Used at startup to verify all configurations are available to work with
    /// the backend.
    async fn health_check(&self) -> Result<()>;

    /// Sends the whole conversation and returns the reply text. Retries,
    /// timeouts and response extraction all happen in here, so a returned
    /// error is final for this turn.
    async fn get_completion(&self, prompt: BackendPrompt) -> Result<String>;
}

pub type BackendBox = Arc<dyn Backend + Send + Sync>;
