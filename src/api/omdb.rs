//! HTTP client for the OMDb API.

use crate::api::backend::{FetchResult, MovieApi};
use crate::api::cancel::CancelToken;
use crate::api::models::{DetailPayload, SearchPayload};
use crate::domain::error::{PopcornError, Result};
use crate::domain::{FetchError, MovieDetail, MovieSummary};
use crate::Config;
use futures_util::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::Instrument;

/// `reqwest`-backed [`MovieApi`] for omdbapi.com.
#[derive(Debug, Clone)]
pub struct OmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PopcornError::Config`] when no API key is configured, or
    /// [`PopcornError::Fetch`] when the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(PopcornError::Config(
                "missing API key (set api_key in config.toml or POPCORN_API_KEY)".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(FetchError::from)?;

        tracing::debug!(base_url = %config.base_url, "omdb client created");

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn request(&self, param: &str, value: &str) -> reqwest::RequestBuilder {
        self.http
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.as_str()), (param, value)])
    }
}

/// Sends `request` and decodes the JSON body, settling early with
/// [`FetchError::Aborted`] once `cancel` fires.
async fn fetch_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    cancel: CancelToken,
) -> FetchResult<T> {
    let fetch = async {
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Transport(format!("HTTP {}", status.as_u16())));
        }

        let text = resp.text().await?;
        serde_json::from_str::<T>(&text).map_err(|e| {
            FetchError::Transport(format!(
                "Failed to parse response: {e}. Response: {}",
                text.chars().take(200).collect::<String>()
            ))
        })
    };

    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(FetchError::Aborted),
        result = fetch => result,
    }
}

impl MovieApi for OmdbClient {
    fn search(&self, query: &str, cancel: CancelToken) -> BoxFuture<'static, FetchResult<Vec<MovieSummary>>> {
        let request = self.request("s", query);
        let span = tracing::debug_span!("omdb_search", query = %query);
        async move { fetch_json::<SearchPayload>(request, cancel).await?.into_result() }
            .instrument(span)
            .boxed()
    }

    fn detail(&self, id: &str, cancel: CancelToken) -> BoxFuture<'static, FetchResult<MovieDetail>> {
        let request = self.request("i", id);
        let span = tracing::debug_span!("omdb_detail", id = %id);
        let id = id.to_string();
        async move {
            let payload = fetch_json::<DetailPayload>(request, cancel).await?;
            payload.into_result(&id)
        }
        .instrument(span)
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_a_config_error() {
        let config = Config::default();
        assert!(matches!(OmdbClient::new(&config), Err(PopcornError::Config(_))));
    }

    #[test]
    fn request_carries_key_and_param() {
        let config = Config {
            api_key: "k123".to_string(),
            ..Config::default()
        };
        let client = OmdbClient::new(&config).expect("client");
        let request = client.request("s", "bat man").build().expect("request");
        let url = request.url().as_str();
        assert!(url.starts_with("https://www.omdbapi.com/"));
        assert!(url.contains("apikey=k123"));
        assert!(url.contains("s=bat+man"));
    }

    #[tokio::test]
    async fn cancelled_fetch_is_aborted() {
        let config = Config {
            api_key: "k".to_string(),
            // Unroutable so the request cannot settle before the cancel.
            base_url: "http://10.255.255.1/".to_string(),
            ..Config::default()
        };
        let client = OmdbClient::new(&config).expect("client");
        let token = CancelToken::new();
        token.cancel();
        let result = client.search("batman", token).await;
        assert_eq!(result, Err(FetchError::Aborted));
    }
}
