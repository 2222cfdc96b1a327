//! Google Gemini `generateContent` client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::LlmError;
use crate::provider::{LlmProvider, Message, Role};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_SECS: u64 = 1;

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            temperature: 0.4,
            max_output_tokens: 4096,
        }
    }

    /// Build from the `[llm]` config section, taking the key from
    /// `GOOGLE_API_KEY` when the config leaves it unset.
    pub fn from_params(params: &viemed_core::config::LlmParams) -> Result<Self, LlmError> {
        let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| LlmError::MissingApiKey)?;
        Ok(Self::new(api_key, params.model.clone())
            .with_temperature(params.temperature)
            .with_max_output_tokens(params.max_output_tokens))
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    fn build_body(&self, messages: &[Message]) -> RequestBody {
        let mut system_parts: Vec<Part> = Vec::new();
        let mut contents: Vec<Content> = Vec::new();
        for m in messages {
            match m.role {
                Role::System => system_parts.push(Part {
                    text: m.content.clone(),
                }),
                Role::User => contents.push(Content {
                    role: Some("user".to_string()),
                    parts: vec![Part {
                        text: m.content.clone(),
                    }],
                }),
                Role::Assistant => contents.push(Content {
                    role: Some("model".to_string()),
                    parts: vec![Part {
                        text: m.content.clone(),
                    }],
                }),
            }
        }
        let system_instruction = if system_parts.is_empty() {
            None
        } else {
            Some(Content {
                role: None,
                parts: system_parts,
            })
        };
        RequestBody {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }

    async fn send_request(&self, messages: &[Message]) -> Result<String, LlmError> {
        let url = format!("{}/{}:generateContent", API_BASE, self.model);
        let body = self.build_body(messages);

        for attempt in 0..=MAX_RETRIES {
            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await?;

            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                if attempt == MAX_RETRIES {
                    return Err(LlmError::RateLimited);
                }
                let delay = Duration::from_secs(BASE_BACKOFF_SECS << attempt);
                tracing::warn!(
                    "Gemini rate limited, retrying in {}s (attempt {}/{})",
                    delay.as_secs(),
                    attempt + 1,
                    MAX_RETRIES
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            let text = response.text().await?;

            if !status.is_success() {
                tracing::error!("Gemini API error {status}: {text}");
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: text,
                });
            }

            let resp: ApiResponse = serde_json::from_str(&text)?;
            return extract_text(&resp);
        }
        Err(LlmError::RateLimited)
    }
}

fn extract_text(resp: &ApiResponse) -> Result<String, LlmError> {
    let parts = resp
        .candidates
        .as_deref()
        .and_then(|c| c.first())
        .and_then(|c| c.content.as_ref())
        .and_then(|c| c.parts.as_deref())
        .ok_or_else(|| LlmError::InvalidResponse("no candidates in response".to_string()))?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect::<Vec<_>>()
        .join("");
    if text.is_empty() {
        return Err(LlmError::InvalidResponse(
            "candidate contained no text parts".to_string(),
        ));
    }
    Ok(text)
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.send_request(messages).await
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestBody {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct ApiResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_maps_roles_and_system_instruction() {
        let provider = GeminiProvider::new("k".to_string(), "gemini-2.0-flash".to_string());
        let body = provider.build_body(&[
            Message::system("hệ thống"),
            Message::user("câu hỏi"),
            Message::assistant("trả lời"),
        ]);
        let json = serde_json::to_value(&body).expect("json");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            "hệ thống"
        );
        assert!(json["generationConfig"]["maxOutputTokens"].is_number());
    }

    #[test]
    fn extract_text_rejects_empty_candidates() {
        let resp = ApiResponse { candidates: None };
        assert!(extract_text(&resp).is_err());
    }
}
