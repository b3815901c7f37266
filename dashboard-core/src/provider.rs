use async_trait::async_trait;
use std::{collections::HashMap, convert::TryFrom, fmt::Debug};

use crate::{
    error::FetchError,
    model::{
        AstronomySnapshot, Coordinates, ForecastSnapshot, LocationInfo, MarineSnapshot,
        NearbyLocation, WeatherSnapshot,
    },
    units::DistanceUnit,
};

pub mod conditions;
pub mod countries;
pub mod geolocation;
pub mod weatherapi;
pub mod zipcodestack;

pub use conditions::IconTableClient;
pub use countries::CountryClient;
pub use geolocation::IpGeolocationClient;
pub use weatherapi::WeatherApiClient;
pub use zipcodestack::ZipcodeStackClient;

/// Providers that need an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    WeatherApi,
    ZipcodeStack,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::WeatherApi => "weatherapi",
            ProviderId::ZipcodeStack => "zipcodestack",
        }
    }

    /// Environment variable that overrides the configured key.
    pub fn key_env_var(&self) -> &'static str {
        match self {
            ProviderId::WeatherApi => "WEATHERAPI_KEY",
            ProviderId::ZipcodeStack => "ZIPCODESTACK_KEY",
        }
    }

    pub fn base_url_env_var(&self) -> &'static str {
        match self {
            ProviderId::WeatherApi => "WEATHERAPI_BASE_URL",
            ProviderId::ZipcodeStack => "ZIPCODESTACK_BASE_URL",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::WeatherApi => "https://api.weatherapi.com/v1",
            ProviderId::ZipcodeStack => "https://api.zipcodestack.com/v1",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::WeatherApi, ProviderId::ZipcodeStack]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "weatherapi" => Ok(ProviderId::WeatherApi),
            "zipcodestack" => Ok(ProviderId::ZipcodeStack),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: weatherapi, zipcodestack."
            )),
        }
    }
}

/// Location, current, forecast, astronomy and marine lookups keyed by one query string.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn location(&self, query: &str) -> Result<LocationInfo, FetchError>;
    async fn current(&self, query: &str) -> Result<WeatherSnapshot, FetchError>;
    async fn forecast(&self, query: &str) -> Result<ForecastSnapshot, FetchError>;
    async fn astronomy(&self, query: &str) -> Result<AstronomySnapshot, FetchError>;
    async fn marine(&self, query: &str) -> Result<MarineSnapshot, FetchError>;
}

/// Approximate coordinates of the caller, from their IP.
#[async_trait]
pub trait GeolocationSource: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, FetchError>;
}

/// Country name to lower-case ISO-3166 alpha-2 code.
#[async_trait]
pub trait CountrySource: Send + Sync + Debug {
    async fn country_code(&self, country_name: &str) -> Result<Option<String>, FetchError>;
}

/// Postal codes within a radius of another postal code.
#[async_trait]
pub trait NearbySource: Send + Sync + Debug {
    async fn nearby(
        &self,
        postal_code: &str,
        country_code: &str,
        radius: u32,
        unit: DistanceUnit,
    ) -> Result<Vec<NearbyLocation>, FetchError>;
}

/// Full condition-code to icon-number table.
#[async_trait]
pub trait IconTableSource: Send + Sync + Debug {
    async fn icon_table(&self) -> Result<HashMap<u32, u32>, FetchError>;
}

/// Deserializers for fields the providers send in inconsistent shapes.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(i64),
    }

    /// Numbers, numeric strings, or anything else as `0.0`.
    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        let value = Option::<NumberOrText>::deserialize(d)?;
        Ok(match value {
            Some(NumberOrText::Number(n)) => n,
            Some(NumberOrText::Text(s)) => s.trim().parse().unwrap_or(0.0),
            None => 0.0,
        })
    }

    /// `true`/`false` or `1`/`0`.
    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        let value = Option::<Flag>::deserialize(d)?;
        Ok(match value {
            Some(Flag::Bool(b)) => b,
            Some(Flag::Number(n)) => n != 0,
            None => false,
        })
    }
}
