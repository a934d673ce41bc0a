//! HTTP implementation of the game backend using reqwest

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::error::{ApiError, Result};
use super::types::{CommandRequest, CommandResponse, NewGameRequest, NewGameResponse, SessionId};
use super::GameBackend;

/// Backend reached over HTTP
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    /// Create a backend client for `base_url`.
    ///
    /// Every request is bounded by `timeout`. Nothing is retried.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url.trim()).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "expected an http or https address".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("zaik-term/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base })
    }

    /// Build an endpoint URL below the base, encoding each segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| ApiError::InvalidBaseUrl {
                url: self.base.to_string(),
                reason: "cannot append path segments".to_string(),
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(ApiError::Decode)
    }

    /// Turn a non-2xx response into [`ApiError::Status`]
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to read error body: {}", e);
                String::new()
            }
        };
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl GameBackend for HttpBackend {
    async fn new_game(&self, request: &NewGameRequest) -> Result<NewGameResponse> {
        let url = self.endpoint(&["api", "game", "new"])?;
        let response: NewGameResponse = self.post_json(url, request).await?;
        if response.session_id.is_empty() {
            return Err(ApiError::MissingSessionId);
        }
        Ok(response)
    }

    async fn send_command(
        &self,
        session_id: &SessionId,
        request: &CommandRequest,
    ) -> Result<CommandResponse> {
        let url = self.endpoint(&["api", "game", session_id.as_str(), "command"])?;
        self.post_json(url, request).await
    }

    async fn delete_session(&self, session_id: &SessionId) -> Result<()> {
        let url = self.endpoint(&["api", "game", session_id.as_str()])?;
        debug!("DELETE {}", url);
        let response = self.client.delete(url).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
