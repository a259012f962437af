//! HTTP client for the summarizer backend.

use tokio_util::sync::CancellationToken;

use crate::api::{SummaryRequest, SummaryResponse};
use crate::core::error::SummarizeError;
use crate::core::summary_stream::{ingest, StreamEvent, Summary};
use crate::utils::url::construct_api_url;

/// Client for the two summarize endpoints.
///
/// Sets no request deadline of its own; callers needing one should wrap the
/// call with a timer and trigger the cancellation token. Transport failures
/// are reported once and never retried.
pub struct SummarizerClient {
    client: reqwest::Client,
    api_url: String,
}

impl SummarizerClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
        }
    }

    /// POST /summarize/stream and feed the response body to the ingestor.
    ///
    /// `sink` observes every stream event in arrival order; the returned
    /// summary is the accumulated terminal outcome.
    pub async fn summarize_stream<F>(
        &self,
        request: &SummaryRequest,
        sink: F,
        cancel: &CancellationToken,
    ) -> Result<Summary, SummarizeError>
    where
        F: FnMut(StreamEvent),
    {
        request.validate()?;

        let endpoint = construct_api_url(&self.api_url, "summarize/stream");
        let response = self
            .client
            .post(endpoint)
            .json(request)
            .send()
            .await
            .map_err(|err| SummarizeError::transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(SummarizeError::http_status(status.as_u16(), body));
        }

        ingest(
            response.bytes_stream(),
            request.fallback_metadata(),
            sink,
            cancel,
        )
        .await
    }

    /// POST /summarize and parse the whole response body at once.
    pub async fn summarize(&self, request: &SummaryRequest) -> Result<Summary, SummarizeError> {
        request.validate()?;

        let endpoint = construct_api_url(&self.api_url, "summarize");
        let response = self
            .client
            .post(endpoint)
            .json(request)
            .send()
            .await
            .map_err(|err| SummarizeError::transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(SummarizeError::http_status(status.as_u16(), body));
        }

        let body: SummaryResponse = response
            .json()
            .await
            .map_err(|err| SummarizeError::transport(format!("invalid response body: {err}")))?;

        Ok(Summary {
            text: body.summary,
            metadata: body.metadata,
        })
    }
}
