use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::FetchError,
    http::{FetchJson, decode, endpoint},
    provider::CountrySource,
};

pub const DEFAULT_COUNTRIES_URL: &str = "https://restcountries.com/v3.1/name";

#[derive(Debug, Clone)]
pub struct CountryClient {
    base_url: String,
    http: Arc<dyn FetchJson>,
}

impl CountryClient {
    pub fn new(base_url: impl Into<String>, http: Arc<dyn FetchJson>) -> Self {
        Self { base_url: base_url.into(), http }
    }
}

#[derive(Debug, Deserialize)]
struct RcCountry {
    cca2: Option<String>,
}

#[async_trait]
impl CountrySource for CountryClient {
    async fn country_code(&self, country_name: &str) -> Result<Option<String>, FetchError> {
        let segment = urlencoding::encode(country_name.trim());
        let url = endpoint(&self.base_url, &segment, &[])?;

        let matches: Vec<RcCountry> = decode("country lookup", self.http.fetch_json(&url).await?)?;

        Ok(matches
            .into_iter()
            .next()
            .and_then(|c| c.cca2)
            .map(|code| code.to_lowercase()))
    }
}
