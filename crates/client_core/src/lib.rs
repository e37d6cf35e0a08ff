//! HTTP client for the studio generation server.
//!
//! One method per user-visible action: the screenplay request that seeds the
//! server-side draft, the body-less follow-up steps, and the project-bible
//! export. Each call is a single JSON POST/GET; there is no retry layer.

use reqwest::Client;
use shared::{
    domain::{ExportFormat, FollowUpStep},
    error::ApiError,
    protocol::{GenerationReply, ScreenplayRequest},
};
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum StudioClientError {
    #[error("invalid studio server url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    /// The server replied, but with an application-level error field.
    #[error("{0}")]
    Generation(String),
    #[error("malformed generation reply: {0}")]
    MalformedReply(&'static str),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug)]
pub struct StudioClient {
    http: Client,
    base_url: String,
}

impl StudioClient {
    pub fn new(base_url: &str) -> Result<Self, StudioClientError> {
        let parsed = Url::parse(base_url).map_err(|source| StudioClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            http: Client::new(),
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn healthz(&self) -> Result<(), StudioClientError> {
        self.http
            .get(self.endpoint("/healthz"))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Submit the story concept. Any non-2xx status or transport failure is
    /// an error; the draft on the server is only advanced on success.
    pub async fn generate_screenplay(
        &self,
        story: &str,
        genre: &str,
    ) -> Result<String, StudioClientError> {
        debug!(genre, story_len = story.len(), "requesting screenplay");
        let reply: GenerationReply = self
            .http
            .post(self.endpoint("/generate_screenplay"))
            .json(&ScreenplayRequest {
                story: story.to_string(),
                genre: genre.to_string(),
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        reply
            .content
            .ok_or(StudioClientError::MalformedReply("missing content field"))
    }

    /// Run one chained step. The reply body is inspected even on a non-2xx
    /// status: a reply carrying an `error` field becomes
    /// [`StudioClientError::Generation`] so the caller can show the server's
    /// own message.
    pub async fn generate_next(&self, step: FollowUpStep) -> Result<String, StudioClientError> {
        let path = step.step().endpoint_path();
        debug!(%path, "requesting follow-up generation");
        let reply: GenerationReply = self
            .http
            .post(self.endpoint(path))
            .send()
            .await?
            .json()
            .await?;

        if let Some(message) = reply.error {
            return Err(StudioClientError::Generation(message));
        }
        reply
            .content
            .ok_or(StudioClientError::MalformedReply(
                "neither content nor error field present",
            ))
    }

    /// Download the concatenated project bible.
    pub async fn export_bible(
        &self,
        format: ExportFormat,
    ) -> Result<Vec<u8>, StudioClientError> {
        let response = self
            .http
            .get(self.endpoint(&format!("/export/{}", format.path_segment())))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.bytes().await?;
            return Err(match serde_json::from_slice::<ApiError>(&body) {
                Ok(api_error) => StudioClientError::Generation(api_error.message),
                Err(_) => StudioClientError::Generation(format!(
                    "export failed with status {status}"
                )),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests;
