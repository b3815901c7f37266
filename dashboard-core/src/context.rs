use std::sync::Arc;

use crate::{
    config::Config,
    error::FetchError,
    http::{FetchJson, HttpFetcher},
    icons::IconResolver,
    provider::{
        CountryClient, CountrySource, GeolocationSource, IconTableClient, IpGeolocationClient,
        NearbySource, ProviderId, WeatherApiClient, WeatherSource, ZipcodeStackClient,
    },
};

/// Every collaborator the orchestrator talks to, built once per session.
#[derive(Debug, Clone)]
pub struct DashboardContext {
    pub weather: Arc<dyn WeatherSource>,
    pub geolocation: Arc<dyn GeolocationSource>,
    pub countries: Arc<dyn CountrySource>,
    pub nearby: Arc<dyn NearbySource>,
    pub icons: IconResolver,
}

impl DashboardContext {
    /// Wire the real HTTP clients from configuration.
    ///
    /// Missing API keys are not checked here; the first call that needs one fails.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let http: Arc<dyn FetchJson> = Arc::new(HttpFetcher::new()?);
        Ok(Self::with_fetcher(config, http))
    }

    pub fn with_fetcher(config: &Config, http: Arc<dyn FetchJson>) -> Self {
        let key = |id| config.provider_api_key(id).map(str::to_owned);

        let weather = WeatherApiClient::new(
            key(ProviderId::WeatherApi),
            config.provider_base_url(ProviderId::WeatherApi),
            Arc::clone(&http),
        );
        let nearby = ZipcodeStackClient::new(
            key(ProviderId::ZipcodeStack),
            config.provider_base_url(ProviderId::ZipcodeStack),
            Arc::clone(&http),
        );
        let geolocation = IpGeolocationClient::new(&config.endpoints.geolocation_url, Arc::clone(&http));
        let countries = CountryClient::new(&config.endpoints.countries_url, Arc::clone(&http));
        let icons = IconTableClient::new(&config.endpoints.icons_url, http);

        Self {
            weather: Arc::new(weather),
            geolocation: Arc::new(geolocation),
            countries: Arc::new(countries),
            nearby: Arc::new(nearby),
            icons: IconResolver::new(Arc::new(icons)),
        }
    }
}
