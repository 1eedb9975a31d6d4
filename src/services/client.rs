use async_trait::async_trait;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use url::Url;

use crate::core::config::ServerConfig;
use crate::core::error::GenerateError;
use crate::core::io::PlatformBounds;
use crate::core::model::{FormState, GenerationOptions};

/// Body of `POST /generate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub idea: String,
    pub options: GenerationOptions,
}

impl From<&FormState> for GenerateRequest {
    fn from(form: &FormState) -> Self {
        Self {
            idea: form.idea.clone(),
            options: form.options.clone(),
        }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    pitch: Option<String>,
    error: Option<String>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait PitchClient: PlatformBounds + Debug {
    /// Returns the pitch markdown.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GenerateError>;
}

#[derive(Debug)]
pub struct HttpPitchClient {
    endpoint: Url,
    client: reqwest::Client,
}

impl HttpPitchClient {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let endpoint = generate_endpoint(&config.base_url)?;

        #[cfg(not(target_arch = "wasm32"))]
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to build HTTP client")?;
        #[cfg(target_arch = "wasm32")]
        let client = reqwest::Client::new();

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

pub fn generate_endpoint(base_url: &str) -> Result<Url> {
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    let base = Url::parse(&base).with_context(|| format!("Invalid server URL: {}", base_url))?;
    base.join("generate").context("Failed to build /generate URL")
}

/// Maps a completed HTTP exchange onto a pitch or a failure.
pub fn interpret_response(status: u16, body: &str) -> Result<String, GenerateError> {
    let ok = (200..300).contains(&status);

    let parsed: GenerateResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) if !ok => {
            return Err(GenerateError::Network(format!("HTTP error! Status: {}", status)))
        }
        Err(e) => return Err(GenerateError::MalformedResponse(e.to_string())),
    };

    if !ok {
        return Err(GenerateError::Network(
            parsed
                .error
                .unwrap_or_else(|| format!("HTTP error! Status: {}", status)),
        ));
    }

    if let Some(error) = parsed.error {
        return Err(GenerateError::Network(error));
    }

    parsed
        .pitch
        .ok_or_else(|| GenerateError::MalformedResponse("response has no pitch".to_string()))
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl PitchClient for HttpPitchClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GenerateError> {
        log::debug!("POST {}", self.endpoint);

        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        interpret_response(status, &body)
    }
}
