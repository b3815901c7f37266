use thiserror::Error;

use crate::{orchestrator::Stage, provider::ProviderId};

/// Shown when the core weather bundle could not be fetched.
pub const COULD_NOT_FETCH_WEATHER: &str = "Could not fetch weather data. Please try again.";

/// Shown when the automatic IP geolocation at startup fails.
pub const COULD_NOT_DETECT_LOCATION: &str =
    "Could not detect your location automatically. Please search for a location.";

/// Failure talking to one of the external collaborators.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}: {body}")]
    Status { status: u16, url: String, body: String },

    #[error("Failed to parse {what} response")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "No API key configured for provider '{0}'.\n\
         Hint: run `dashboard configure {0}` or set the matching environment variable."
    )]
    MissingApiKey(ProviderId),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    pub fn decode(what: &'static str, source: serde_json::Error) -> Self {
        FetchError::Decode { what, source }
    }

    pub fn is_missing_key(&self) -> bool {
        matches!(self, FetchError::MissingApiKey(_))
    }
}

/// A required pipeline stage failed and the search was aborted.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct SearchError {
    pub stage: Stage,
    #[source]
    pub source: FetchError,
}

impl SearchError {
    pub fn at(stage: Stage) -> impl FnOnce(FetchError) -> SearchError {
        move |source| SearchError { stage, source }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
