//! Chat-completions client backing insight generation.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::application::insights::{InsightError, InsightGenerator, SYSTEM_PROMPT, build_prompt};
use crate::config::InsightsSettings;

use super::error::InfraError;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// OpenAI-compatible `chat/completions` client in JSON response mode.
pub struct OpenAiInsightGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiInsightGenerator {
    pub fn new(
        api_key: String,
        base_url: &str,
        model: String,
        temperature: f32,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("pageinsight/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model,
            temperature,
        })
    }
}

#[async_trait]
impl InsightGenerator for OpenAiInsightGenerator {
    async fn generate(&self, page: &Value) -> Result<Value, InsightError> {
        let prompt = build_prompt(page);
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| InsightError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InsightError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|err| InsightError::Malformed(err.to_string()))?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| InsightError::Malformed("response carried no message".to_string()))?;

        debug!(
            target = "pageinsight::insights",
            model = %self.model,
            bytes = content.len(),
            "Received insight completion"
        );
        serde_json::from_str(&content).map_err(|err| InsightError::Malformed(err.to_string()))
    }
}

/// Stand-in used when no API key is configured; every call fails.
pub struct UnconfiguredInsightGenerator;

#[async_trait]
impl InsightGenerator for UnconfiguredInsightGenerator {
    async fn generate(&self, _page: &Value) -> Result<Value, InsightError> {
        Err(InsightError::NotConfigured("insights.api_key is not set"))
    }
}

pub fn build_generator(settings: &InsightsSettings) -> Result<Arc<dyn InsightGenerator>, InfraError> {
    match settings.api_key.as_ref() {
        Some(key) => {
            let generator = OpenAiInsightGenerator::new(
                key.expose().to_string(),
                &settings.base_url,
                settings.model.clone(),
                settings.temperature,
            )
            .map_err(|err| InfraError::http_client(err.to_string()))?;
            Ok(Arc::new(generator))
        }
        None => Ok(Arc::new(UnconfiguredInsightGenerator)),
    }
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, http::HeaderMap, routing::post};
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;

    async fn serve(reply: Value) -> String {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let reply = reply.clone();
                async move {
                    assert_eq!(
                        headers.get("authorization").and_then(|v| v.to_str().ok()),
                        Some("Bearer test-key")
                    );
                    assert_eq!(body["model"], "gpt-4o-mini");
                    assert_eq!(body["response_format"]["type"], "json_object");
                    assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
                    assert!(
                        body["messages"][1]["content"]
                            .as_str()
                            .unwrap()
                            .contains("Company Name: Acme")
                    );
                    Json(reply)
                }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1/")
    }

    fn generator(base_url: &str) -> OpenAiInsightGenerator {
        OpenAiInsightGenerator::new(
            "test-key".to_string(),
            base_url,
            "gpt-4o-mini".to_string(),
            0.2,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn completion_content_is_decoded_as_json() {
        let base = serve(json!({
            "choices": [{"message": {"content": "{\"summary\": \"steady growth\"}"}}]
        }))
        .await;

        let insights = generator(&base)
            .generate(&json!({"name": "Acme"}))
            .await
            .unwrap();
        assert_eq!(insights, json!({"summary": "steady growth"}));
    }

    #[tokio::test]
    async fn non_json_content_is_malformed() {
        let base = serve(json!({"choices": [{"message": {"content": "not json"}}]})).await;
        let err = generator(&base)
            .generate(&json!({"name": "Acme"}))
            .await
            .unwrap_err();
        assert!(matches!(err, InsightError::Malformed(_)));
    }

    #[tokio::test]
    async fn unconfigured_generator_always_fails() {
        let err = UnconfiguredInsightGenerator
            .generate(&json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, InsightError::NotConfigured(_)));
    }
}
