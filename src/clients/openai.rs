use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use serde_json::{Value, json};

use crate::clients::traits::{ModelError, VisionModel};
use crate::config::ModelEndpointConfig;

/// Client for any OpenAI-style `/v1/chat/completions` server that accepts
/// image parts (vLLM, Ollama, LM Studio, hosted APIs).
#[derive(Clone, Debug)]
pub struct OpenAiCompatClient {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    timeout_ms: u64,
    client: Client,
}

impl OpenAiCompatClient {
    pub fn new(cfg: &ModelEndpointConfig) -> Self {
        // Ensure endpoint has the correct path if not provided
        let endpoint = if cfg.endpoint.ends_with("/v1/chat/completions") {
            cfg.endpoint.clone()
        } else {
            format!("{}/v1/chat/completions", cfg.endpoint.trim_end_matches('/'))
        };

        let api_key = cfg
            .api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|k| !k.is_empty());

        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .unwrap_or_default();

        Self {
            endpoint,
            model: cfg.model.clone(),
            api_key,
            temperature: cfg.temperature,
            timeout_ms: cfg.timeout_ms,
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_body(&self, prompt: &str, image_url: Option<String>, max_new_tokens: Option<u32>) -> Value {
        let content = match image_url {
            Some(url) => json!([
                {"type": "text", "text": prompt},
                {"type": "image_url", "image_url": {"url": url}}
            ]),
            None => json!(prompt),
        };

        let mut body = json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": content}
            ],
            "temperature": self.temperature
        });
        if let Some(max_tokens) = max_new_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }
}

#[async_trait]
impl VisionModel for OpenAiCompatClient {
    async fn infer(
        &self,
        prompt: &str,
        image: Option<&Path>,
        max_new_tokens: Option<u32>,
    ) -> Result<Vec<String>, ModelError> {
        let image_url = match image {
            Some(path) => Some(encode_data_url(path).await?),
            None => None,
        };
        let body = self.build_body(prompt, image_url, max_new_tokens);

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let res = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ModelError::Timeout {
                    timeout_ms: self.timeout_ms,
                }
            } else {
                ModelError::from(e)
            }
        })?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ModelError::Status { status, body });
        }

        let response_json: Value = res
            .json()
            .await
            .map_err(|e| ModelError::Parse(format!("invalid completion JSON: {}", e)))?;

        Ok(extract_completions(&response_json))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Pull every `choices[*].message.content` string, trimmed, in choice order.
pub fn extract_completions(response: &Value) -> Vec<String> {
    response["choices"]
        .as_array()
        .map(|choices| {
            choices
                .iter()
                .filter_map(|c| c["message"]["content"].as_str())
                .map(|s| s.trim().to_string())
                .collect()
        })
        .unwrap_or_default()
}

async fn encode_data_url(path: &Path) -> Result<String, ModelError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ModelError::Image(format!("{}: {}", path.display(), e)))?;
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png",
    };
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{};base64,{}", mime, encoded))
}
