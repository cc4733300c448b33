use crate::error::RemoteError;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument};

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("watchlist-builder/0.1.0")
            .build()?;

        Ok(Self { client })
    }

    #[instrument(skip(self, url), fields(url = %redact(url)))]
    pub async fn get(&self, url: &str) -> Result<Response, RemoteError> {
        debug!("Making GET request");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.without_url()))?;

        if !response.status().is_success() {
            error!("HTTP request failed with status: {}", response.status());
            return Err(RemoteError::Status(response.status().as_u16()));
        }

        Ok(response)
    }

    /// GET and decode; a body that does not match `T` is reported as malformed.
    #[instrument(skip(self, url), fields(url = %redact(url)))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RemoteError> {
        let response = self.get(url).await?;
        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::Transport(e.without_url()))?;
        serde_json::from_str(&body).map_err(|e| RemoteError::Malformed(e.to_string()))
    }
}

// Keeps api keys out of the logs.
fn redact(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(k, v)| {
                    let v = if k == "api_key" { "***".to_string() } else { v.into_owned() };
                    (k.into_owned(), v)
                })
                .collect();
            if !pairs.is_empty() {
                parsed.query_pairs_mut().clear().extend_pairs(pairs);
            }
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}
