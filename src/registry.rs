use std::sync::RwLock;

use serde::Deserialize;
use tracing::warn;

use crate::client::{default_http_client, join_endpoint};
use crate::types::ModelDescriptor;

fn fallback_models() -> Vec<ModelDescriptor> {
    vec![ModelDescriptor {
        id: "dummy/dummy".to_string(),
        publisher: "dummy".to_string(),
        family: "dummy".to_string(),
        version: "dummy".to_string(),
    }]
}

#[derive(Debug, Deserialize)]
struct ModelsListResponse {
    #[serde(default)]
    models: Vec<ModelListEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelListEntry {
    id: Option<String>,
    #[serde(default)]
    publisher: Option<String>,
    #[serde(default)]
    family: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

impl ModelListEntry {
    fn into_descriptor(self) -> Option<ModelDescriptor> {
        let id = self.id.filter(|id| !id.trim().is_empty())?;
        let or_unknown = |v: Option<String>| v.unwrap_or_else(|| "Unknown".to_string());
        Some(ModelDescriptor {
            id,
            publisher: or_unknown(self.publisher),
            family: or_unknown(self.family),
            version: or_unknown(self.version),
        })
    }
}

/// Owned list of available models, seeded with a static fallback and
/// refreshed once from `GET {base}/models` at application start. The list
/// is treated as static for the rest of the session.
pub struct ModelRegistry {
    http: reqwest::Client,
    base_url: String,
    models: RwLock<Vec<ModelDescriptor>>,
}

impl ModelRegistry {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: default_http_client(),
            base_url: base_url.into(),
            models: RwLock::new(fallback_models()),
        }
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Replaces the seeded list with a known set of models, bypassing the
    /// fallback. Useful when the caller already holds the model list.
    pub fn with_models(self, models: Vec<ModelDescriptor>) -> Self {
        *self.models.write().expect("model registry lock poisoned") = models;
        self
    }

    /// Refreshes the model list from the backend, swapping it in atomically.
    /// Fails soft: on any transport or parse error the current list stays
    /// in place and is returned, never an error.
    pub async fn refresh(&self) -> Vec<ModelDescriptor> {
        match self.fetch_models().await {
            Ok(fetched) if !fetched.is_empty() => {
                *self.models.write().expect("model registry lock poisoned") = fetched;
            }
            Ok(_) => {
                warn!("models endpoint returned an empty list, keeping current models");
            }
            Err(err) => {
                warn!(error = %err, "failed to fetch models, keeping current models");
            }
        }
        self.models()
    }

    async fn fetch_models(&self) -> crate::Result<Vec<ModelDescriptor>> {
        let url = join_endpoint(&self.base_url, "models");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(crate::MosaicError::Api { status, body });
        }
        let parsed = response.json::<ModelsListResponse>().await?;
        Ok(parsed
            .models
            .into_iter()
            .filter_map(ModelListEntry::into_descriptor)
            .collect())
    }

    pub fn models(&self) -> Vec<ModelDescriptor> {
        self.models
            .read()
            .expect("model registry lock poisoned")
            .clone()
    }

    pub fn get_by_id(&self, model_id: &str) -> Option<ModelDescriptor> {
        self.models
            .read()
            .expect("model registry lock poisoned")
            .iter()
            .find(|m| m.id == model_id)
            .cloned()
    }

    pub fn all_ids(&self) -> Vec<String> {
        self.models
            .read()
            .expect("model registry lock poisoned")
            .iter()
            .map(|m| m.id.clone())
            .collect()
    }

    pub fn by_publisher(&self, publisher: &str) -> Vec<ModelDescriptor> {
        self.models
            .read()
            .expect("model registry lock poisoned")
            .iter()
            .filter(|m| m.publisher == publisher)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.models
            .read()
            .expect("model registry lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
