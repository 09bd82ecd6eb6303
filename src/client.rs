use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::generator::ImageGenerator;
use crate::types::{GeneratedImage, ImageSize};
use crate::{MosaicError, Result};

pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:8000/v1";
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(300);

pub(crate) fn join_endpoint(base_url: &str, endpoint: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let endpoint = endpoint.trim_start_matches('/');
    if base.ends_with(&format!("/{endpoint}")) {
        base.to_string()
    } else {
        format!("{base}/{endpoint}")
    }
}

pub(crate) fn default_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// HTTP client for an OpenAI-compatible images endpoint:
/// `POST {base}/images/generations` with `{model, prompt, size}`.
#[derive(Clone)]
pub struct ImagesClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl Default for ImagesClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ImagesClient {
    pub fn new() -> Self {
        Self {
            http: default_http_client(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = (!api_key.trim().is_empty()).then_some(api_key);
        self
    }

    fn endpoint(&self, path: &str) -> String {
        join_endpoint(&self.base_url, path)
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key.as_deref() {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    async fn generate_image(
        &self,
        model_id: &str,
        prompt: &str,
        size: ImageSize,
    ) -> Result<GeneratedImage> {
        let mut body = Map::<String, Value>::new();
        body.insert("model".to_string(), Value::String(model_id.to_string()));
        body.insert("prompt".to_string(), Value::String(prompt.to_string()));
        body.insert("size".to_string(), Value::String(size.as_str().to_string()));

        let url = self.endpoint("images/generations");
        let response = self
            .apply_auth(self.http.post(url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MosaicError::Api { status, body: text });
        }

        let parsed = response.json::<ImagesGenerationResponse>().await?;
        let image = parsed
            .data
            .into_iter()
            .find_map(|item| item.b64_json.filter(|data| !data.trim().is_empty()))
            .ok_or_else(|| {
                MosaicError::InvalidResponse(
                    "images response contains no b64_json payload".to_string(),
                )
            })?;
        Ok(GeneratedImage { b64_json: image })
    }
}

#[async_trait]
impl ImageGenerator for ImagesClient {
    async fn generate(
        &self,
        model_id: &str,
        prompt: &str,
        size: ImageSize,
    ) -> Result<GeneratedImage> {
        self.generate_image(model_id, prompt, size).await
    }
}

#[derive(Debug, Deserialize)]
struct ImagesGenerationResponse {
    #[serde(default)]
    data: Vec<ImageGenerationData>,
}

#[derive(Debug, Deserialize)]
struct ImageGenerationData {
    #[serde(default)]
    b64_json: Option<String>,
}

/// Extracts the message a failed unit should surface: the server-provided
/// `{error}` field when the body carries one, a generic status line for
/// other API errors, the error's display otherwise.
pub(crate) fn failure_message(err: &MosaicError) -> String {
    match err {
        MosaicError::Api { status, body } => {
            let server_message = serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|v| v.get("error").cloned())
                .and_then(|e| match e {
                    Value::String(s) => Some(s),
                    Value::Object(o) => o
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    _ => None,
                })
                .filter(|s| !s.trim().is_empty());
            server_message.unwrap_or_else(|| format!("Server error: {}", status.as_u16()))
        }
        other => other.to_string(),
    }
}
