use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::FetchError,
    http::{FetchJson, decode, endpoint},
    model::Coordinates,
    provider::GeolocationSource,
};

pub const DEFAULT_GEOLOCATION_URL: &str = "https://ipapi.co/json/";

/// Resolves the caller's approximate position from their public IP.
#[derive(Debug, Clone)]
pub struct IpGeolocationClient {
    url: String,
    http: Arc<dyn FetchJson>,
}

impl IpGeolocationClient {
    pub fn new(url: impl Into<String>, http: Arc<dyn FetchJson>) -> Self {
        Self { url: url.into(), http }
    }
}

#[derive(Debug, Deserialize)]
struct IpLocation {
    latitude: f64,
    longitude: f64,
}

#[async_trait]
impl GeolocationSource for IpGeolocationClient {
    async fn locate(&self) -> Result<Coordinates, FetchError> {
        let url = endpoint(&self.url, "", &[])?;
        let parsed: IpLocation = decode("IP geolocation", self.http.fetch_json(&url).await?)?;

        Ok(Coordinates { lat: parsed.latitude, lon: parsed.longitude })
    }
}
