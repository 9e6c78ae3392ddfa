use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::json;

use crate::logger;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

pub const PROMPT: &str = "Escreva uma mensagem de amor curta, profunda e poética para Flavia. \
A mensagem deve ser em português, carinhosa e cheia de admiração. Não use mais que 3 frases.";

/// Shown when the service answers but hands back no usable text.
pub const FALLBACK_EMPTY: &str = "Flavia, você é a luz que ilumina meus dias.";
/// Shown when the request fails outright. Never an error on screen.
pub const FALLBACK_ERROR: &str = "Flavia, cada batida do meu coração é por você.";

/// What the card displays. One instance per session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageState {
    pub text: String,
    pub is_loading: bool,
    pub is_visible: bool,
}

impl MessageState {
    /// Begin a request cycle. Returns false while one is already in flight,
    /// so the trigger stays a no-op until the current request settles.
    pub fn start(&mut self) -> bool {
        if self.is_loading {
            return false;
        }
        self.is_loading = true;
        true
    }

    pub fn settle(&mut self, text: String) {
        self.text = text;
        self.is_visible = true;
        self.is_loading = false;
    }
}

#[derive(Clone)]
pub struct NoteClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl NoteClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    async fn fetch_note(&self) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": PROMPT }] }],
        });

        let resp = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .context("love note request failed")?;

        if !resp.status().is_success() {
            return Err(anyhow!("love note HTTP {}", resp.status()));
        }

        let gen: GenerateResponse = resp.json().await.context("love note JSON parse failed")?;
        let text = gen
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(text.trim().to_string())
    }

    /// Fetch one love note. Always comes back with something to display:
    /// failures are logged and swallowed into a fallback sentence.
    pub async fn request_note(&self) -> String {
        match self.fetch_note().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => FALLBACK_EMPTY.to_string(),
            Err(e) => {
                logger::error(&format!("mensagem: {e:#}"));
                FALLBACK_ERROR.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> NoteClient {
        NoteClient::new(server.uri(), "test-key", DEFAULT_MODEL)
    }

    fn generate_path() -> String {
        format!("/v1beta/models/{DEFAULT_MODEL}:generateContent")
    }

    #[test]
    fn start_is_a_noop_while_loading() {
        let mut state = MessageState::default();
        assert!(state.start());
        assert!(state.is_loading);
        assert!(!state.start());
        assert!(state.is_loading);
    }

    #[test]
    fn settle_reveals_the_text_and_allows_another_cycle() {
        let mut state = MessageState::default();
        assert!(state.start());
        state.settle("Você é tudo.".to_string());
        assert_eq!(
            state,
            MessageState {
                text: "Você é tudo.".to_string(),
                is_loading: false,
                is_visible: true,
            }
        );
        // Re-entrant: a later invocation may load again, visibility sticks.
        assert!(state.start());
        assert!(state.is_visible);
    }

    #[tokio::test]
    async fn successful_response_settles_with_returned_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{ "text": PROMPT }] }],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "Você é tudo." }] },
                }],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut state = MessageState::default();
        assert!(state.start());
        let text = client_for(&server).request_note().await;
        state.settle(text);

        assert_eq!(
            state,
            MessageState {
                text: "Você é tudo.".to_string(),
                is_loading: false,
                is_visible: true,
            }
        );
    }

    #[tokio::test]
    async fn whitespace_only_text_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "  \n " }] },
                }],
            })))
            .mount(&server)
            .await;

        let text = client_for(&server).request_note().await;
        assert_eq!(text, FALLBACK_EMPTY);
    }

    #[tokio::test]
    async fn missing_candidates_fall_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let text = client_for(&server).request_note().await;
        assert_eq!(text, FALLBACK_EMPTY);
    }

    #[tokio::test]
    async fn http_error_falls_back_without_surfacing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let text = client_for(&server).request_note().await;
        assert_eq!(text, FALLBACK_ERROR);
    }

    #[tokio::test]
    async fn malformed_body_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let text = client_for(&server).request_note().await;
        assert_eq!(text, FALLBACK_ERROR);
    }

    #[tokio::test]
    async fn unreachable_service_falls_back() {
        // Nothing listens here; the transport error takes the fallback path.
        let client = NoteClient::new("http://127.0.0.1:9", "", DEFAULT_MODEL);
        let mut state = MessageState::default();
        assert!(state.start());
        let text = client.request_note().await;
        state.settle(text);

        assert_eq!(state.text, FALLBACK_ERROR);
        assert!(state.is_visible);
        assert!(!state.is_loading);
    }
}
