//! Client for a llama.cpp-compatible completion server, used as the last
//! generative fallback when no guide and no hosted answer is available.

use crate::backends::traits::TextGenerator;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_MAX_TOKENS: u32 = 200;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to an already running `llama-server`.
///
/// The process itself is managed outside this service; this client only
/// talks to its `/completion` and `/health` endpoints.
pub struct LlamaClient {
    server_url: Url,
    client: Client,
    auth_token: Option<String>,
    max_tokens: u32,
}

impl LlamaClient {
    pub fn new(server_url: &str, auth_token: Option<String>, max_tokens: u32) -> Result<Self, AppError> {
        let mut server_url = Url::parse(server_url)?;
        if !server_url.path().ends_with('/') {
            let path = format!("{}/", server_url.path());
            server_url.set_path(&path);
        }
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            server_url,
            client,
            auth_token,
            max_tokens,
        })
    }

    fn endpoint(&self, name: &str) -> Result<Url, AppError> {
        Ok(self.server_url.join(name)?)
    }

    fn headers(&self) -> Result<HeaderMap, AppError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.auth_token {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| AppError::Config(format!("Invalid fallback auth token: {}", e)))?;
            headers.insert(AUTHORIZATION, auth_value);
        }
        Ok(headers)
    }

    /// Probes `GET /health`. Used once at startup to decide whether the
    /// fallback capability is enabled.
    pub async fn health_check(&self) -> Result<(), AppError> {
        let res = self
            .client
            .get(self.endpoint("health")?)
            .headers(self.headers()?)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await?;

        if res.status().is_success() {
            info!("llama-server at {} is ready", self.server_url);
            Ok(())
        } else {
            Err(AppError::Backend(format!(
                "llama-server health check returned status {}",
                res.status()
            )))
        }
    }
}

#[async_trait]
impl TextGenerator for LlamaClient {
    fn name(&self) -> &'static str {
        "llama"
    }

    async fn generate(&self, prompt: String) -> Result<String, AppError> {
        debug!("llama-server generating for prompt: {}", prompt);

        let payload = serde_json::json!({
            "prompt": prompt,
            "stream": false,
            "n_predict": self.max_tokens
        });

        let res = self
            .client
            .post(self.endpoint("completion")?)
            .headers(self.headers()?)
            .json(&payload)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Backend(format!(
                "Completion request failed with status {}: {}",
                status, body
            )));
        }

        let json: serde_json::Value = res
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Malformed completion response: {}", e)))?;

        let content = json["content"].as_str().unwrap_or("");
        let text = strip_prompt_echo(&prompt, content);
        if text.is_empty() {
            return Err(AppError::Backend("Completion was empty".to_string()));
        }
        Ok(text)
    }
}

/// Some servers return the prompt followed by the continuation; keep only the continuation.
pub fn strip_prompt_echo(prompt: &str, generated: &str) -> String {
    generated
        .strip_prefix(prompt)
        .unwrap_or(generated)
        .trim()
        .to_string()
}
