// src/core/gemini.rs
//! Client for the hosted generation endpoint (Gemini `generateContent`)

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::core::config_manager::GenerationSettings;

// ===== Wire format =====

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

// ===== Client =====

#[derive(Debug)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, settings: &GenerationSettings) -> Result<Self> {
        if api_key.trim().is_empty() {
            anyhow::bail!("API key is required");
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
        })
    }

    /// Send one prompt and return the generated text. The key travels as a
    /// query parameter, so the URL is never logged.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        info!("Sending request to generation endpoint: {}", self.model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .context("Failed to send request to generation endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&error_text)
                .ok()
                .and_then(|body| body.error)
                .map(|e| e.message)
                .unwrap_or_else(|| "Failed to generate content".to_string());

            error!("Generation endpoint error {}: {}", status, message);
            anyhow::bail!("Generation endpoint returned {}: {}", status, message);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse generation response")?;

        let text = extract_candidate_text(parsed)?;
        info!("Successfully received generated content");
        Ok(text)
    }
}

fn extract_candidate_text(response: GenerateContentResponse) -> Result<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .map(|part| part.text)
        .ok_or_else(|| anyhow::anyhow!("No content generated"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user".to_string(),
                parts: vec![Part {
                    text: "hello".to_string(),
                }],
            }],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "hello"}]}
                ]
            })
        );
    }

    #[test]
    fn test_extract_candidate_text() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Dear hiring manager,"}],"role":"model"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            extract_candidate_text(response).unwrap(),
            "Dear hiring manager,"
        );
    }

    #[test]
    fn test_empty_candidates_is_an_error() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        let err = extract_candidate_text(response).unwrap_err();
        assert_eq!(err.to_string(), "No content generated");

        // Absent candidate list behaves the same
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(extract_candidate_text(response).is_err());
    }

    #[test]
    fn test_error_body_parsing() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error":{"code":400,"message":"API key not valid"}}"#)
                .unwrap();
        assert_eq!(body.error.unwrap().message, "API key not valid");
    }

    #[test]
    fn test_blank_api_key_rejected() {
        let err = GeminiClient::new("  ".to_string(), &GenerationSettings::default()).unwrap_err();
        assert!(err.to_string().contains("API key"));
    }
}
