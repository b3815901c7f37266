//! Shared JSON-over-HTTP capability used by every collaborator client.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{fmt::Debug, time::Duration};

use crate::error::{FetchError, truncate_body};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `GET url` and hand back the parsed body, or fail without a partial body.
#[async_trait]
pub trait FetchJson: Send + Sync + Debug {
    async fn fetch_json(&self, url: &Url) -> Result<Value, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http })
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl FetchJson for HttpFetcher {
    async fn fetch_json(&self, url: &Url) -> Result<Value, FetchError> {
        tracing::debug!(url = %redact(url), "GET");

        // reqwest errors carry the full URL, API key included.
        let res = self.http.get(url.clone()).send().await.map_err(|e| e.without_url())?;

        let status = res.status();
        let body = res.text().await.map_err(|e| e.without_url())?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: redact(url),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::decode("JSON", e))
    }
}

/// Build `base/segment?params`, tolerating a trailing slash on `base`.
pub(crate) fn endpoint(base: &str, segment: &str, params: &[(&str, &str)]) -> Result<Url, FetchError> {
    let joined = if segment.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), segment)
    };

    let parsed = if params.is_empty() {
        Url::parse(&joined)
    } else {
        Url::parse_with_params(&joined, params)
    };

    parsed.map_err(|e| FetchError::InvalidUrl(format!("{joined}: {e}")))
}

/// Decode a JSON value into one of the private wire structs.
pub(crate) fn decode<T: DeserializeOwned>(what: &'static str, value: Value) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|e| FetchError::decode(what, e))
}

/// URL with API-key query parameters masked, for logs and error messages.
fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "key" || k == "apikey" { "***".into() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();

    if pairs.is_empty() {
        return shown.to_string();
    }

    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}
