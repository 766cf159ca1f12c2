//! Google Gemini generator implementation.
//!
//! Uses the Generative Language REST API (`generateContent`).
//!
//! Features:
//! - `x-goog-api-key` header authentication
//! - Multimodal requests with `inlineData` image parts
//! - Conversation replay as prior `contents` entries (fresh session per
//!   call; role-agnostic by contract — every replayed turn goes out as a
//!   user message, only order is preserved)

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use inkmath_core::error::GeneratorError;
use inkmath_core::media::ImagePayload;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(120);

/// Gemini `generateContent` API client.
pub struct GeminiGenerator {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiGenerator {
    /// Create a new Gemini generator with the default request timeout.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_timeout(api_key, model, DEFAULT_TIMEOUT)
    }

    /// Create a new Gemini generator with an explicit request timeout.
    pub fn with_timeout(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: "gemini".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn post_generate(&self, contents: Vec<Content>) -> Result<String, GeneratorError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateContentRequest { contents };

        debug!(provider = "gemini", model = %self.model, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeneratorError::Timeout(e.to_string())
                } else {
                    GeneratorError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(GeneratorError::RateLimited {
                retry_after_secs: 5,
            });
        }
        if status == 401 || status == 403 {
            return Err(GeneratorError::AuthenticationFailed(
                "Invalid Gemini API key".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Gemini API error");
            return Err(GeneratorError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: GenerateContentResponse =
            response.json().await.map_err(|e| GeneratorError::ApiError {
                status_code: 200,
                message: format!("Failed to parse Gemini response: {e}"),
            })?;

        extract_text(api_resp)
    }
}

#[async_trait]
impl inkmath_core::Generator for GeminiGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<String, GeneratorError> {
        let contents = vec![Content::user(vec![
            Part::text(prompt),
            Part::inline_image(image),
        ])];
        self.post_generate(contents).await
    }

    async fn converse(
        &self,
        replay: &[String],
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<String, GeneratorError> {
        let mut contents: Vec<Content> = replay
            .iter()
            .map(|turn| Content::user(vec![Part::text(turn)]))
            .collect();
        contents.push(Content::user(vec![
            Part::text(prompt),
            Part::inline_image(image),
        ]));
        self.post_generate(contents).await
    }

    async fn health_check(&self) -> Result<bool, GeneratorError> {
        // Try a minimal text-only request to verify the API key
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = serde_json::json!({
            "contents": [{"role": "user", "parts": [{"text": "ping"}]}],
            "generationConfig": {"maxOutputTokens": 1},
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeneratorError::Network(e.to_string()))?;

        // 200 = works, 401/403 = bad key, anything else = reachable but error
        let status = response.status().as_u16();
        Ok(response.status().is_success() || !matches!(status, 401 | 403))
    }
}

/// Extract the text of the first candidate, joining multiple text parts.
fn extract_text(resp: GenerateContentResponse) -> Result<String, GeneratorError> {
    let text = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| match part {
                    Part::Text { text } => Some(text),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GeneratorError::EmptyResponse);
    }
    Ok(text)
}

// --- Gemini API types ---

#[derive(Debug, Serialize, Deserialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".into()),
            parts,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    /// Parts this client does not understand (function calls, thoughts).
    Other(serde_json::Value),
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    fn inline_image(image: &ImagePayload) -> Self {
        Part::InlineData {
            inline_data: Blob {
                mime_type: image.mime.clone(),
                data: BASE64_STANDARD.encode(&image.bytes),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Blob {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkmath_core::Generator as _;

    fn test_image() -> ImagePayload {
        ImagePayload::new(vec![1, 2, 3, 4], "image/png")
    }

    #[test]
    fn constructor() {
        let generator = GeminiGenerator::new("test-key", "gemini-2.0-flash");
        assert_eq!(generator.name(), "gemini");
        assert_eq!(generator.base_url, DEFAULT_BASE_URL);
        assert_eq!(generator.model, "gemini-2.0-flash");
    }

    #[test]
    fn constructor_with_base_url() {
        let generator = GeminiGenerator::new("test-key", "gemini-2.0-flash")
            .with_base_url("https://proxy.example.com/");
        assert_eq!(generator.base_url, "https://proxy.example.com");
    }

    #[test]
    fn request_serialization_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![
                Part::text("solve this"),
                Part::inline_image(&test_image()),
            ])],
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "solve this");
        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/png"
        );
        // 1,2,3,4 in standard base64
        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["data"],
            "AQIDBA=="
        );
    }

    #[test]
    fn replay_builds_ordered_contents() {
        let replay = vec!["first".to_string(), "second".to_string()];
        let mut contents: Vec<Content> = replay
            .iter()
            .map(|turn| Content::user(vec![Part::text(turn)]))
            .collect();
        contents.push(Content::user(vec![
            Part::text("final"),
            Part::inline_image(&test_image()),
        ]));

        let json = serde_json::to_value(&GenerateContentRequest { contents }).unwrap();
        let entries = json["contents"].as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["parts"][0]["text"], "first");
        assert_eq!(entries[1]["parts"][0]["text"], "second");
        assert_eq!(entries[2]["parts"][0]["text"], "final");
        assert_eq!(entries[2]["parts"].as_array().unwrap().len(), 2);
        // Replay is role-agnostic: everything goes out as "user".
        assert!(entries.iter().all(|e| e["role"] == "user"));
    }

    #[test]
    fn parse_text_response() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{"text": "[{\"expr\": \"2+2\", \"result\": 4}]"}]
                    },
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 100, "candidatesTokenCount": 20}
            }"#,
        )
        .unwrap();

        let text = extract_text(resp).unwrap();
        assert_eq!(text, r#"[{"expr": "2+2", "result": 4}]"#);
    }

    #[test]
    fn parse_multi_part_response() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {
                        "parts": [
                            {"text": "line one"},
                            {"functionCall": {"name": "noop", "args": {}}},
                            {"text": "line two"}
                        ]
                    }
                }]
            }"#,
        )
        .unwrap();

        let text = extract_text(resp).unwrap();
        assert_eq!(text, "line one\nline two");
    }

    #[test]
    fn empty_candidates_is_empty_response() {
        let resp: GenerateContentResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(matches!(
            extract_text(resp),
            Err(GeneratorError::EmptyResponse)
        ));
    }

    #[test]
    fn whitespace_only_text_is_empty_response() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "  \n "}]}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            extract_text(resp),
            Err(GeneratorError::EmptyResponse)
        ));
    }
}
