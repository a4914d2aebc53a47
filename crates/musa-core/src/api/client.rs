use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{ChatRequest, ChatResponse, LanguagesResponse};
use super::AssistantBackend;
use crate::error::{ApiError, Result};

/// HTTP client for the farming assistant service
#[derive(Clone)]
pub struct AssistantClient {
    client: Client,
    base_url: String,
}

impl AssistantClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// `timeout` applies to every request; `None` leaves reqwest's default (no limit)
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidUrl(base_url));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build().map_err(ApiError::Network)?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status { status, body });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl AssistantBackend for AssistantClient {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat", self.base_url);
        debug!(url = %url, language = %request.language, "sending chat message");

        let response = self.client.post(&url).json(request).send().await?;
        Self::decode(response).await
    }

    async fn ping(&self) -> Result<()> {
        let url = format!("{}/ping", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        Ok(())
    }

    async fn supported_languages(&self) -> Result<Vec<String>> {
        let url = format!("{}/languages", self.base_url);

        let response = self.client.get(&url).send().await?;
        let languages: LanguagesResponse = Self::decode(response).await?;

        Ok(languages.supported_languages)
    }
}
