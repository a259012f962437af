use serde::{Deserialize, Serialize};

use crate::core::error::SummarizeError;
use crate::core::providers::Provider;

/// Request body accepted by both summarize endpoints.
#[derive(Serialize, Clone, Debug)]
pub struct SummaryRequest {
    pub url: String,
    pub llm_provider: Provider,
    pub api_key: String,
    pub model_name: Option<String>,
    pub base_url: Option<String>,
}

impl SummaryRequest {
    /// Fill unset model and base-URL fields from the provider catalog.
    pub fn with_catalog_defaults(mut self) -> Self {
        if self.model_name.is_none() {
            self.model_name = Some(self.llm_provider.default_model());
        }
        if self.base_url.is_none() {
            self.base_url = self.llm_provider.default_base_url();
        }
        self
    }

    pub fn validate(&self) -> Result<(), SummarizeError> {
        if self.url.trim().is_empty() {
            return Err(SummarizeError::InvalidRequest(
                "a website URL is required".to_string(),
            ));
        }
        if self.llm_provider == Provider::Ollama
            && self
                .base_url
                .as_deref()
                .is_none_or(|url| url.trim().is_empty())
        {
            return Err(SummarizeError::InvalidRequest(
                "ollama requires a base URL (e.g. http://localhost:11434/v1)".to_string(),
            ));
        }
        Ok(())
    }

    /// Metadata used when a stream completes without reporting its own.
    pub fn fallback_metadata(&self) -> SummaryMetadata {
        SummaryMetadata {
            url: self.url.clone(),
            title: "Summary Complete".to_string(),
            provider: self.llm_provider.id().to_string(),
            model: self
                .model_name
                .clone()
                .unwrap_or_else(|| "default model".to_string()),
            processing_time: "Streamed".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SummaryMetadata {
    pub url: String,
    pub title: String,
    pub provider: String,
    pub model: String,
    pub processing_time: String,
}

/// Whole-body response of the non-streaming endpoint.
#[derive(Deserialize, Clone, Debug)]
pub struct SummaryResponse {
    pub summary: String,
    pub metadata: SummaryMetadata,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Payload of one SSE `data:` record.
///
/// The backend emits three shapes; a record carrying none of them is treated
/// as malformed and skipped by the ingestor.
#[derive(Deserialize, Debug)]
pub struct StreamPayload {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub metadata: Option<SummaryMetadata>,
}

impl StreamPayload {
    pub fn is_event(&self) -> bool {
        self.error.is_some() || self.content.is_some() || self.done
    }
}
