use std::time::Duration;

use anyhow::Result;
use mockito::Matcher;
use serde_json::json;

use super::excerpt;
use super::extract_text;
use super::Candidate;
use super::CandidateContent;
use super::CandidatePart;
use super::CompletionConfig;
use super::CompletionRequest;
use super::Gemini;
use super::GenerateContentResponse;
use super::RetryPolicy;
use crate::domain::models::Backend;
use crate::domain::models::BackendPrompt;
use crate::domain::models::ChatError;
use crate::domain::models::ContentPart;
use crate::domain::models::ImageData;
use crate::domain::models::Message;
use crate::domain::models::PersonaConfig;
use crate::domain::models::Role;
use crate::domain::models::TransportMode;

impl Gemini {
    fn with_url(url: String, transport: TransportMode) -> Gemini {
        return Gemini::new(CompletionConfig {
            transport,
            api_url: url.to_string(),
            api_key: "abc".to_string(),
            proxy_url: format!("{url}/api/generate"),
            model: "gemini-test".to_string(),
            retry: RetryPolicy::new(3, Duration::from_millis(1)),
            request_timeout: Duration::from_millis(2000),
        });
    }
}

fn prompt() -> BackendPrompt {
    let history = vec![
        Message::new_text(Role::Model, "Hello!"),
        Message::new_text(Role::User, "What should I plant?"),
    ];

    return BackendPrompt::new(&history, &PersonaConfig::with_greeting("Hello!"));
}

fn completion_body(text: &str) -> String {
    return serde_json::to_string(&GenerateContentResponse {
        candidates: vec![Candidate {
            content: Some(CandidateContent {
                parts: vec![CandidatePart {
                    text: Some(text.to_string()),
                }],
            }),
        }],
    })
    .unwrap();
}

fn chat_error(err: anyhow::Error) -> ChatError {
    return err.downcast_ref::<ChatError>().unwrap().clone();
}

const COMPLETION_PATH: &str = "/v1beta/models/gemini-test:generateContent?key=abc";

#[test]
fn it_builds_the_request_body() -> Result<()> {
    let history = vec![
        Message::new_text(Role::Model, "Hello!"),
        Message::new(
            Role::User,
            vec![
                ContentPart::Image(ImageData {
                    mime_type: "image/png".to_string(),
                    data: "aGVsbG8=".to_string(),
                }),
                ContentPart::Text("Is this sunny?".to_string()),
            ],
        )?,
    ];
    let prompt = BackendPrompt::new(&history, &PersonaConfig::with_greeting("Hello!"));

    let body = serde_json::to_value(CompletionRequest::from(&prompt))?;
    assert_eq!(
        body,
        json!({
            "contents": [
                { "role": "model", "parts": [{ "text": "Hello!" }] },
                {
                    "role": "user",
                    "parts": [
                        { "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } },
                        { "text": "Is this sunny?" }
                    ]
                }
            ],
            "systemInstruction": { "parts": [{ "text": "Be brief." }] }
        })
    );

    return Ok(());
}

#[test]
fn it_extracts_the_first_text_part() -> Result<()> {
    let res: GenerateContentResponse = serde_json::from_str(
        r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"AA=="}},{"text":"hi"},{"text":"ignored"}]}},{"content":{"parts":[{"text":"second"}]}}]}"#,
    )?;

    assert_eq!(extract_text(&res), Some("hi".to_string()));
    return Ok(());
}

#[test]
fn it_extracts_nothing_from_empty_responses() -> Result<()> {
    for body in [
        r#"{}"#,
        r#"{"candidates":[]}"#,
        r#"{"candidates":[{}]}"#,
        r#"{"candidates":[{"content":{}}]}"#,
        r#"{"candidates":[{"content":{"parts":[]}}]}"#,
        r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"AA=="}}]}}]}"#,
        r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#,
    ] {
        let res: GenerateContentResponse = serde_json::from_str(body)?;
        assert_eq!(extract_text(&res), None, "{body}");
    }

    return Ok(());
}

#[test]
fn it_cuts_long_bodies() {
    assert_eq!(excerpt("  short body \n"), "short body");

    let long = "x".repeat(600);
    let res = excerpt(&long);
    assert_eq!(res.len(), 503);
    assert!(res.ends_with("..."));
}

#[tokio::test]
async fn it_successfully_health_checks() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v1beta/models/gemini-test?key=abc")
        .with_status(200)
        .create();

    let backend = Gemini::with_url(server.url(), TransportMode::Direct);
    let res = backend.health_check().await;

    assert!(res.is_ok());
    mock.assert();
}

#[tokio::test]
async fn it_fails_health_checks() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v1beta/models/gemini-test?key=abc")
        .with_status(500)
        .create();

    let backend = Gemini::with_url(server.url(), TransportMode::Direct);
    let res = backend.health_check().await;

    assert!(res.is_err());
    mock.assert();
}

#[tokio::test]
async fn it_fails_health_checks_without_a_key() {
    let mut backend = Gemini::with_url("http://localhost".to_string(), TransportMode::Direct);
    backend.config.api_key = "".to_string();

    let err = backend.health_check().await.unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Gemini API key is not defined");
}

#[tokio::test]
async fn it_health_checks_the_proxy_without_a_key() {
    let mut backend = Gemini::with_url("http://localhost".to_string(), TransportMode::Proxy);
    backend.config.api_key = "".to_string();

    assert!(backend.health_check().await.is_ok());
}

#[tokio::test]
async fn it_gets_completions() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", COMPLETION_PATH)
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "contents": [
                { "role": "model", "parts": [{ "text": "Hello!" }] },
                { "role": "user", "parts": [{ "text": "What should I plant?" }] }
            ],
            "systemInstruction": { "parts": [{ "text": "Be brief." }] }
        })))
        .with_status(200)
        .with_body(completion_body("Try basil."))
        .create();

    let backend = Gemini::with_url(server.url(), TransportMode::Direct);
    let res = backend.get_completion(prompt()).await?;

    mock.assert();
    assert_eq!(res, "Try basil.");

    return Ok(());
}

#[tokio::test]
async fn it_gets_completions_through_the_proxy() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_body(completion_body("Try tulsi."))
        .create();

    let backend = Gemini::with_url(server.url(), TransportMode::Proxy);
    let res = backend.get_completion(prompt()).await?;

    mock.assert();
    assert_eq!(res, "Try tulsi.");

    return Ok(());
}

#[tokio::test]
async fn it_retries_server_errors_then_fails() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", COMPLETION_PATH)
        .with_status(503)
        .with_body("overloaded")
        .expect(4)
        .create();

    let backend = Gemini::with_url(server.url(), TransportMode::Direct);
    let err = backend.get_completion(prompt()).await.unwrap_err();

    mock.assert();
    assert_eq!(
        chat_error(err),
        ChatError::Upstream {
            origin: "Gemini API".to_string(),
            status: 503,
            status_text: "Service Unavailable".to_string(),
            body: "overloaded".to_string(),
        }
    );
}

#[tokio::test]
async fn it_does_not_retry_client_errors() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", COMPLETION_PATH)
        .with_status(404)
        .with_body("not found")
        .expect(1)
        .create();

    let backend = Gemini::with_url(server.url(), TransportMode::Direct);
    let err = backend.get_completion(prompt()).await.unwrap_err();

    mock.assert();
    insta::assert_snapshot!(err.to_string(), @"Gemini API error: 404 Not Found - not found");
}

#[tokio::test]
async fn it_labels_proxy_errors() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/generate")
        .with_status(400)
        .with_body("bad request")
        .create();

    let backend = Gemini::with_url(server.url(), TransportMode::Proxy);
    let err = backend.get_completion(prompt()).await.unwrap_err();

    mock.assert();
    insta::assert_snapshot!(err.to_string(), @"Upstream proxy error: 400 Bad Request - bad request");
}

#[tokio::test]
async fn it_fails_on_responses_without_candidates() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", COMPLETION_PATH)
        .with_status(200)
        .with_body(r#"{"candidates":[]}"#)
        .create();

    let backend = Gemini::with_url(server.url(), TransportMode::Direct);
    let err = backend.get_completion(prompt()).await.unwrap_err();

    mock.assert();
    assert_eq!(
        chat_error(err),
        ChatError::MalformedResponse {
            origin: "Gemini API".to_string()
        }
    );
}

#[tokio::test]
async fn it_fails_on_unparsable_responses() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", COMPLETION_PATH)
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create();

    let backend = Gemini::with_url(server.url(), TransportMode::Direct);
    let err = backend.get_completion(prompt()).await.unwrap_err();

    mock.assert();
    insta::assert_snapshot!(err.to_string(), @"Invalid response structure from Gemini API.");
}

#[tokio::test]
async fn it_fails_with_network_errors_once_retries_run_out() {
    // Nothing listens on port 1.
    let backend = Gemini::with_url("http://127.0.0.1:1".to_string(), TransportMode::Direct);
    let err = backend.get_completion(prompt()).await.unwrap_err();

    assert!(matches!(chat_error(err), ChatError::Network { .. }));
}
