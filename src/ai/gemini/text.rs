use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentRequest, GenerationConfig, Part};
use crate::ai::TextGenerationService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Strategies are a handful of words; keep the completion short.
const MAX_OUTPUT_TOKENS: u32 = 50;
const TEMPERATURE: f32 = 0.9;

pub struct GeminiTextClient {
    http: GeminiHttpClient,
}

impl GeminiTextClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(30),
                client,
            ),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }
}

#[async_trait]
impl TextGenerationService for GeminiTextClient {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(prompt)],
            }],
            generation_config: Some(GenerationConfig {
                max_output_tokens: Some(MAX_OUTPUT_TOKENS),
                temperature: Some(TEMPERATURE),
            }),
        };

        let response = self.http.generate_content(&request).await?;

        response
            .text()
            .map(|text| text.trim().to_string())
            .ok_or_else(|| Error::AiProvider("No text in Gemini response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "gemini-1.5-flash";

    fn make_client(server: &MockServer, api_key: &str, model: &str) -> GeminiTextClient {
        GeminiTextClient::new(api_key.to_string(), model.to_string()).with_base_url(server.uri())
    }

    fn text_response(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": text }]
                },
                "finishReason": "STOP"
            }]
        }))
    }

    #[tokio::test]
    async fn test_generate_text_parses_response() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(text_response("  Reverse the order of your last three actions\n"))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);

        let text = client.generate_text("Create 1 oblique strategy.").await.unwrap();
        assert_eq!(text, "Reverse the order of your last three actions");
    }

    #[tokio::test]
    async fn test_generate_text_sends_prompt_and_sampling_config() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_partial_json(serde_json::json!({
                "contents": [{ "role": "user", "parts": [{ "text": "the prompt" }] }],
                "generationConfig": { "maxOutputTokens": 50, "temperature": 0.9 }
            })))
            .respond_with(text_response("Freeze the chorus"))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);

        client.generate_text("the prompt").await.unwrap();
    }

    #[tokio::test]
    async fn test_api_error_returns_ai_provider_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = make_client(&server, "bad-key", DEFAULT_MODEL);

        let err = client.generate_text("prompt").await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_blocked_prompt_without_candidates_is_an_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);
        let err = client.generate_text("prompt").await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_malformed_json_is_an_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"candidates\":["))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);
        let err = client.generate_text("prompt").await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_strips_models_prefix_from_model_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(text_response("Whisper the loudest part"))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", "models/gemini-1.5-flash");
        assert_eq!(client.model(), "gemini-1.5-flash");

        client.generate_text("prompt").await.unwrap();
    }
}
