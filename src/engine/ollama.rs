use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{EngineError, ReasoningEngine};

/// Engine backed by an Ollama-style `POST /api/generate` endpoint
#[derive(Debug, Clone)]
pub struct OllamaEngine {
    client: Client,
    /// Full endpoint URL, e.g. `http://127.0.0.1:11434/api/generate`.
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaEngine {
    pub fn new(endpoint: String, model: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            model,
        }
    }
}

#[async_trait]
impl ReasoningEngine for OllamaEngine {
    async fn generate(&self, context: &str) -> Result<String, EngineError> {
        let request = OllamaRequest {
            model: &self.model,
            prompt: context,
            stream: false,
        };

        let res = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|source| EngineError::Request {
                engine: self.name(),
                source,
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(EngineError::Status {
                engine: self.name(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed = res
            .json::<OllamaResponse>()
            .await
            .map_err(|e| EngineError::Decode {
                engine: self.name(),
                reason: e.to_string(),
            })?;

        let text = parsed.response.trim().to_string();
        if text.is_empty() {
            return Err(EngineError::Empty(self.name()));
        }
        Ok(text)
    }

    fn name(&self) -> String {
        format!("ollama:{}", self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_trims_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({"model": "llama3.2", "stream": false})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"response": "  Never.\n"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let engine = OllamaEngine::new(
            format!("{}/api/generate", server.uri()),
            "llama3.2".to_string(),
        );
        assert_eq!(engine.generate("ctx").await.unwrap(), "Never.");
    }

    #[tokio::test]
    async fn test_generate_status_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let engine = OllamaEngine::new(server.uri(), "missing".to_string());
        let err = engine.generate("ctx").await.unwrap_err();
        assert!(matches!(err, EngineError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_generate_empty_reply() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "   "})))
            .mount(&server)
            .await;

        let engine = OllamaEngine::new(server.uri(), "llama3.2".to_string());
        let err = engine.generate("ctx").await.unwrap_err();
        assert!(matches!(err, EngineError::Empty(_)));
    }
}
