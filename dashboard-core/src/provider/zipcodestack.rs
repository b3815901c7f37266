use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::FetchError,
    http::{FetchJson, decode, endpoint},
    model::NearbyLocation,
    provider::{NearbySource, ProviderId, lenient},
    units::DistanceUnit,
};

#[derive(Debug, Clone)]
pub struct ZipcodeStackClient {
    api_key: Option<String>,
    base_url: String,
    http: Arc<dyn FetchJson>,
}

impl ZipcodeStackClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>, http: Arc<dyn FetchJson>) -> Self {
        Self { api_key, base_url: base_url.into(), http }
    }

    fn api_key(&self) -> Result<&str, FetchError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(FetchError::MissingApiKey(ProviderId::ZipcodeStack))
    }
}

#[derive(Debug, Deserialize)]
struct ZsResult {
    code: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    state: String,
    #[serde(deserialize_with = "lenient::number", default)]
    distance: f64,
}

#[derive(Debug, Deserialize)]
struct ZsRadiusResponse {
    #[serde(default)]
    results: Vec<ZsResult>,
}

impl From<ZsResult> for NearbyLocation {
    fn from(r: ZsResult) -> Self {
        NearbyLocation { code: r.code, city: r.city, state: r.state, distance: r.distance }
    }
}

#[async_trait]
impl NearbySource for ZipcodeStackClient {
    async fn nearby(
        &self,
        postal_code: &str,
        country_code: &str,
        radius: u32,
        unit: DistanceUnit,
    ) -> Result<Vec<NearbyLocation>, FetchError> {
        let key = self.api_key()?;
        let radius = radius.to_string();

        let url = endpoint(
            &self.base_url,
            "radius",
            &[
                ("apikey", key),
                ("code", postal_code),
                ("country", country_code),
                ("radius", radius.as_str()),
                ("unit", unit.api_name()),
            ],
        )?;

        let parsed: ZsRadiusResponse = decode("postal radius", self.http.fetch_json(&url).await?)?;
        Ok(parsed.results.into_iter().map(NearbyLocation::from).collect())
    }
}
