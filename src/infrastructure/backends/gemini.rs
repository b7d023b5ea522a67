#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::retry::RetryPolicy;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendPrompt;
use crate::domain::models::ChatError;
use crate::domain::models::ContentPart;
use crate::domain::models::Message;
use crate::domain::models::TransportMode;

/// Upstream error bodies are cut down to this many characters before they
/// end up in the transcript.
const BODY_EXCERPT_LENGTH: usize = 500;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentPartsBlob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum ContentParts {
    Text(String),
    InlineData(ContentPartsBlob),
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<ContentParts>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SystemInstruction {
    parts: Vec<ContentParts>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest {
    contents: Vec<Content>,
    system_instruction: SystemInstruction,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CandidatePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl From<&Message> for Content {
    fn from(message: &Message) -> Content {
        let parts = message
            .parts()
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => return ContentParts::Text(text.to_string()),
                ContentPart::Image(image) => {
                    return ContentParts::InlineData(ContentPartsBlob {
                        mime_type: image.mime_type.to_string(),
                        data: image.data.to_string(),
                    });
                }
            })
            .collect();

        return Content {
            role: message.role.to_string(),
            parts,
        };
    }
}

impl From<&BackendPrompt> for CompletionRequest {
    fn from(prompt: &BackendPrompt) -> CompletionRequest {
        return CompletionRequest {
            contents: prompt.contents.iter().map(Content::from).collect(),
            system_instruction: SystemInstruction {
                parts: vec![ContentParts::Text(prompt.system_instruction.to_string())],
            },
        };
    }
}

/// First candidate, first part carrying text. Everything else is ignored.
fn extract_text(res: &GenerateContentResponse) -> Option<String> {
    let content = res.candidates.first()?.content.as_ref()?;

    return content.parts.iter().find_map(|part| {
        return part.text.as_ref().filter(|text| return !text.is_empty()).cloned();
    });
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_EXCERPT_LENGTH {
        return trimmed.to_string();
    }

    let cut = trimmed.chars().take(BODY_EXCERPT_LENGTH).collect::<String>();
    return format!("{cut}...");
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionConfig {
    pub transport: TransportMode,
    pub api_url: String,
    pub api_key: String,
    pub proxy_url: String,
    pub model: String,
    pub retry: RetryPolicy,
    /// Upper bound for a single attempt, not for the whole retry sequence.
    pub request_timeout: Duration,
}

impl CompletionConfig {
    pub fn from_config() -> Result<CompletionConfig> {
        let transport_str = Config::get(ConfigKey::Transport);
        let transport = match TransportMode::parse(&transport_str) {
            Some(transport) => transport,
            None => bail!(format!("Unknown transport {transport_str}")),
        };

        return Ok(CompletionConfig {
            transport,
            api_url: Config::get(ConfigKey::ApiURL),
            api_key: Config::get(ConfigKey::ApiKey),
            proxy_url: Config::get(ConfigKey::ProxyURL),
            model: Config::get(ConfigKey::Model),
            retry: RetryPolicy::new(
                Config::get(ConfigKey::MaxRetries).parse::<u32>()?,
                Duration::from_millis(Config::get(ConfigKey::RetryDelay).parse::<u64>()?),
            ),
            request_timeout: Duration::from_millis(
                Config::get(ConfigKey::RequestTimeout).parse::<u64>()?,
            ),
        });
    }
}

pub struct Gemini {
    client: reqwest::Client,
    config: CompletionConfig,
}

impl Gemini {
    pub fn new(config: CompletionConfig) -> Gemini {
        return Gemini {
            client: reqwest::Client::new(),
            config,
        };
    }

    fn model_path(&self) -> String {
        let model = self.config.model.trim();
        if model.starts_with("models/") {
            return model.to_string();
        }

        return format!("models/{model}");
    }

    fn origin(&self) -> String {
        match self.config.transport {
            TransportMode::Direct => return "Gemini API".to_string(),
            TransportMode::Proxy => return "Upstream proxy".to_string(),
        }
    }

    fn completion_url(&self) -> String {
        match self.config.transport {
            TransportMode::Direct => {
                return format!(
                    "{url}/v1beta/{model}:generateContent?key={key}",
                    url = self.config.api_url,
                    model = self.model_path(),
                    key = self.config.api_key,
                );
            }
            TransportMode::Proxy => return self.config.proxy_url.to_string(),
        }
    }
}

#[async_trait]
impl Backend for Gemini {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.config.transport == TransportMode::Proxy {
            if self.config.proxy_url.is_empty() {
                bail!("Proxy URL is not defined");
            }
            return Ok(());
        }

        if self.config.api_url.is_empty() {
            bail!("Gemini URL is not defined");
        }
        if self.config.api_key.is_empty() {
            bail!("Gemini API key is not defined");
        }
        if self.config.model.trim().is_empty() {
            bail!("Gemini model is not defined");
        }

        let url = format!(
            "{url}/v1beta/{model}?key={key}",
            url = self.config.api_url,
            model = self.model_path(),
            key = self.config.api_key
        );

        let res = self
            .client
            .get(&url)
            .timeout(self.config.request_timeout)
            .send()
            .await;

        let status = match res {
            Ok(res) => res.status().as_u16(),
            Err(err) => {
                tracing::error!(error = ?err, "Gemini is not reachable");
                bail!("Gemini is not reachable");
            }
        };
        if status >= 400 {
            tracing::error!(status = status, "Gemini health check failed");
            bail!(format!("Gemini health check failed, {status}"));
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn get_completion(&self, prompt: BackendPrompt) -> Result<String> {
        let req = CompletionRequest::from(&prompt);
        let url = self.completion_url();

        let sent = self
            .config
            .retry
            .send(|| {
                return self
                    .client
                    .post(&url)
                    .timeout(self.config.request_timeout)
                    .json(&req)
                    .send();
            })
            .await;

        let res = match sent {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, "Failed to reach the completion endpoint");
                return Err(ChatError::Network {
                    reason: err.to_string(),
                }
                .into());
            }
        };

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                "Failed to make completion request to Gemini"
            );
            return Err(ChatError::Upstream {
                origin: self.origin(),
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body: excerpt(&body),
            }
            .into());
        }

        let body = match res.text().await {
            Ok(body) => body,
            Err(err) => {
                return Err(ChatError::Network {
                    reason: err.to_string(),
                }
                .into());
            }
        };

        let parsed = match serde_json::from_str::<GenerateContentResponse>(&body) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::error!(error = ?err, "Unable to parse completion response");
                return Err(ChatError::MalformedResponse {
                    origin: self.origin(),
                }
                .into());
            }
        };

        if let Some(text) = extract_text(&parsed) {
            return Ok(text);
        }

        tracing::error!(candidates = parsed.candidates.len(), "No text in completion response");
        return Err(ChatError::MalformedResponse {
            origin: self.origin(),
        }
        .into());
    }
}
