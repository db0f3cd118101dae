use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{EngineError, ReasoningEngine};

/// Engine backed by an OpenAI-compatible `/chat/completions` endpoint
#[derive(Debug, Clone)]
pub struct OpenAiEngine {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiEngine {
    pub fn new(base_url: String, model: String, api_key: String, temperature: f32) -> Self {
        Self {
            client: Client::new(),
            base_url,
            model,
            api_key,
            temperature,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ReasoningEngine for OpenAiEngine {
    async fn generate(&self, context: &str) -> Result<String, EngineError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: context,
            }],
            temperature: self.temperature,
        };

        let res = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
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
            .json::<ChatResponse>()
            .await
            .map_err(|e| EngineError::Decode {
                engine: self.name(),
                reason: e.to_string(),
            })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(EngineError::Empty(self.name()));
        }
        Ok(text)
    }

    fn name(&self) -> String {
        format!("openai:{}", self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn engine(base_url: String) -> OpenAiEngine {
        OpenAiEngine::new(base_url, "gpt-4o-mini".to_string(), "sk-test".to_string(), 0.9)
    }

    #[tokio::test]
    async fn test_generate_reads_first_choice() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "ctx"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Not today."}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let engine = engine(format!("{}/v1/", server.uri()));
        assert_eq!(engine.generate("ctx").await.unwrap(), "Not today.");
    }

    #[tokio::test]
    async fn test_generate_no_choices_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = engine(server.uri()).generate("ctx").await.unwrap_err();
        assert!(matches!(err, EngineError::Empty(_)));
    }

    #[tokio::test]
    async fn test_generate_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = engine(server.uri()).generate("ctx").await.unwrap_err();
        match err {
            EngineError::Status { status, body, .. } => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn test_completions_url_trims_slash() {
        let engine = engine("http://localhost:4000/v1/".to_string());
        assert_eq!(engine.completions_url(), "http://localhost:4000/v1/chat/completions");
    }
}
