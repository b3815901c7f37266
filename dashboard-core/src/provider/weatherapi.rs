use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::FetchError,
    http::{FetchJson, decode, endpoint},
    model::{
        AstronomySnapshot, Condition, CurrentConditions, DaySummary, ForecastSnapshot, HourlyPoint,
        LocationInfo, MarineSnapshot, Place, Tide, TideKind, WeatherSnapshot,
    },
    provider::{ProviderId, WeatherSource, lenient},
};

#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    api_key: Option<String>,
    base_url: String,
    http: Arc<dyn FetchJson>,
}

impl WeatherApiClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>, http: Arc<dyn FetchJson>) -> Self {
        Self { api_key, base_url: base_url.into(), http }
    }

    fn api_key(&self) -> Result<&str, FetchError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(FetchError::MissingApiKey(ProviderId::WeatherApi))
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        what: &'static str,
        path: &str,
        query: &str,
        extra: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let key = self.api_key()?;
        let mut params = vec![("key", key), ("q", query)];
        params.extend_from_slice(extra);

        let url = endpoint(&self.base_url, path, &params)?;
        let body = self.http.fetch_json(&url).await?;
        decode(what, body)
    }
}

#[async_trait]
impl WeatherSource for WeatherApiClient {
    async fn location(&self, query: &str) -> Result<LocationInfo, FetchError> {
        let parsed: WaTimezoneResponse = self.get("timezone", "timezone.json", query, &[]).await?;
        Ok(parsed.into())
    }

    async fn current(&self, query: &str) -> Result<WeatherSnapshot, FetchError> {
        let parsed: WaCurrentResponse = self.get("current weather", "current.json", query, &[]).await?;
        Ok(parsed.into())
    }

    async fn forecast(&self, query: &str) -> Result<ForecastSnapshot, FetchError> {
        let parsed: WaForecastResponse =
            self.get("forecast", "forecast.json", query, &[("days", "1")]).await?;

        ForecastSnapshot::try_from(parsed)
    }

    async fn astronomy(&self, query: &str) -> Result<AstronomySnapshot, FetchError> {
        let parsed: WaAstronomyResponse = self.get("astronomy", "astronomy.json", query, &[]).await?;
        Ok(parsed.into())
    }

    async fn marine(&self, query: &str) -> Result<MarineSnapshot, FetchError> {
        let parsed: WaMarineResponse = self.get("marine", "marine.json", query, &[]).await?;
        Ok(parsed.into())
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    country: String,
    tz_id: Option<String>,
    localtime: Option<String>,
}

impl From<&WaLocation> for Place {
    fn from(loc: &WaLocation) -> Self {
        Place { name: loc.name.clone(), region: loc.region.clone(), country: loc.country.clone() }
    }
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    #[serde(default)]
    text: String,
    #[serde(default)]
    code: u32,
}

impl WaCondition {
    fn with_day_flag(self, is_day: bool) -> Condition {
        Condition { code: self.code, text: self.text, is_day }
    }
}

#[derive(Debug, Deserialize)]
struct WaTimezoneResponse {
    location: WaLocation,
}

impl From<WaTimezoneResponse> for LocationInfo {
    fn from(res: WaTimezoneResponse) -> Self {
        LocationInfo {
            place: Place::from(&res.location),
            tz_id: res.location.tz_id,
            localtime: res.location.localtime,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    #[serde(deserialize_with = "lenient::number", default)]
    temp_c: f64,
    #[serde(deserialize_with = "lenient::number", default)]
    feelslike_c: f64,
    #[serde(deserialize_with = "lenient::number", default)]
    wind_kph: f64,
    #[serde(default)]
    wind_dir: String,
    #[serde(deserialize_with = "lenient::number", default)]
    humidity: f64,
    #[serde(deserialize_with = "lenient::number", default)]
    uv: f64,
    #[serde(deserialize_with = "lenient::number", default)]
    cloud: f64,
    #[serde(deserialize_with = "lenient::number", default)]
    pressure_mb: f64,
    #[serde(deserialize_with = "lenient::number", default)]
    precip_mm: f64,
    #[serde(deserialize_with = "lenient::number", default)]
    vis_km: f64,
    #[serde(deserialize_with = "lenient::number", default)]
    vis_miles: f64,
    #[serde(deserialize_with = "lenient::flag", default)]
    is_day: bool,
    condition: WaCondition,
    #[serde(default)]
    last_updated: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrentResponse {
    location: WaLocation,
    current: WaCurrent,
}

impl From<WaCurrentResponse> for WeatherSnapshot {
    fn from(res: WaCurrentResponse) -> Self {
        let location = Place::from(&res.location);
        let c = res.current;

        WeatherSnapshot {
            location,
            current: CurrentConditions {
                temp_c: c.temp_c,
                feelslike_c: c.feelslike_c,
                wind_kph: c.wind_kph,
                wind_dir: c.wind_dir,
                humidity: c.humidity,
                uv: c.uv,
                cloud: c.cloud,
                pressure_mb: c.pressure_mb,
                precip_mm: c.precip_mm,
                vis_km: c.vis_km,
                vis_mi: c.vis_miles,
                condition: c.condition.with_day_flag(c.is_day),
                last_updated: c.last_updated,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct WaDay {
    #[serde(deserialize_with = "lenient::number", default)]
    maxtemp_c: f64,
    #[serde(deserialize_with = "lenient::number", default)]
    mintemp_c: f64,
    #[serde(deserialize_with = "lenient::number", default)]
    avgtemp_c: f64,
    #[serde(deserialize_with = "lenient::number", default)]
    maxwind_kph: f64,
    #[serde(deserialize_with = "lenient::number", default)]
    totalprecip_mm: f64,
    #[serde(deserialize_with = "lenient::number", default)]
    avghumidity: f64,
    #[serde(deserialize_with = "lenient::number", default)]
    uv: f64,
    #[serde(deserialize_with = "lenient::number", default)]
    daily_chance_of_rain: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaForecastHour {
    time: String,
    #[serde(deserialize_with = "lenient::number", default)]
    temp_c: f64,
    #[serde(deserialize_with = "lenient::number", default)]
    wind_kph: f64,
    #[serde(deserialize_with = "lenient::number", default)]
    chance_of_rain: f64,
    #[serde(deserialize_with = "lenient::flag", default)]
    is_day: bool,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    #[serde(default)]
    date: String,
    day: WaDay,
    #[serde(default)]
    hour: Vec<WaForecastHour>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    forecast: WaForecast,
}

impl TryFrom<WaForecastResponse> for ForecastSnapshot {
    type Error = FetchError;

    fn try_from(res: WaForecastResponse) -> Result<Self, Self::Error> {
        let location = Place::from(&res.location);

        let Some(first) = res.forecast.forecastday.into_iter().next() else {
            return Err(FetchError::decode(
                "forecast",
                serde::de::Error::custom("response contained no forecastday data"),
            ));
        };

        let day = first.day;
        let hours = first
            .hour
            .into_iter()
            .map(|h| HourlyPoint {
                time: h.time,
                temp_c: h.temp_c,
                wind_kph: h.wind_kph,
                chance_of_rain: h.chance_of_rain,
                condition: h.condition.with_day_flag(h.is_day),
            })
            .collect();

        Ok(ForecastSnapshot {
            location,
            date: first.date,
            day: DaySummary {
                maxtemp_c: day.maxtemp_c,
                mintemp_c: day.mintemp_c,
                avgtemp_c: day.avgtemp_c,
                maxwind_kph: day.maxwind_kph,
                totalprecip_mm: day.totalprecip_mm,
                avghumidity: day.avghumidity,
                uv: day.uv,
                daily_chance_of_rain: day.daily_chance_of_rain,
                // Daily summaries describe the whole day.
                condition: day.condition.with_day_flag(true),
            },
            hours,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WaAstro {
    #[serde(default)]
    sunrise: String,
    #[serde(default)]
    sunset: String,
    #[serde(default)]
    moonrise: String,
    #[serde(default)]
    moonset: String,
    #[serde(default)]
    moon_phase: String,
    #[serde(deserialize_with = "lenient::number", default)]
    moon_illumination: f64,
    #[serde(deserialize_with = "lenient::flag", default)]
    is_sun_up: bool,
    #[serde(deserialize_with = "lenient::flag", default)]
    is_moon_up: bool,
}

#[derive(Debug, Deserialize)]
struct WaAstronomy {
    astro: WaAstro,
}

#[derive(Debug, Deserialize)]
struct WaAstronomyResponse {
    location: WaLocation,
    astronomy: WaAstronomy,
}

impl From<WaAstronomyResponse> for AstronomySnapshot {
    fn from(res: WaAstronomyResponse) -> Self {
        let a = res.astronomy.astro;
        AstronomySnapshot {
            location: Place::from(&res.location),
            sunrise: a.sunrise,
            sunset: a.sunset,
            moonrise: a.moonrise,
            moonset: a.moonset,
            moon_phase: a.moon_phase,
            moon_illumination: a.moon_illumination,
            is_sun_up: a.is_sun_up,
            is_moon_up: a.is_moon_up,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WaTide {
    #[serde(default)]
    tide_time: String,
    #[serde(deserialize_with = "lenient::number", default)]
    tide_height_mt: f64,
    #[serde(default)]
    tide_type: String,
}

#[derive(Debug, Deserialize)]
struct WaTideGroup {
    #[serde(default)]
    tide: Vec<WaTide>,
}

#[derive(Debug, Default, Deserialize)]
struct WaMarineDaySummary {
    #[serde(default)]
    tides: Vec<WaTideGroup>,
}

#[derive(Debug, Deserialize)]
struct WaMarineDay {
    #[serde(default)]
    day: WaMarineDaySummary,
}

#[derive(Debug, Default, Deserialize)]
struct WaMarineForecast {
    #[serde(default)]
    forecastday: Vec<WaMarineDay>,
}

#[derive(Debug, Deserialize)]
struct WaMarineResponse {
    location: WaLocation,
    #[serde(default)]
    forecast: WaMarineForecast,
}

impl From<WaMarineResponse> for MarineSnapshot {
    fn from(res: WaMarineResponse) -> Self {
        let location = Place::from(&res.location);

        // Inland locations come back without tide groups.
        let tides = res
            .forecast
            .forecastday
            .into_iter()
            .next()
            .and_then(|d| d.day.tides.into_iter().next())
            .map(|group| {
                group
                    .tide
                    .into_iter()
                    .map(|t| Tide {
                        kind: tide_kind(&t.tide_type),
                        time: t.tide_time,
                        height_m: t.tide_height_mt,
                    })
                    .collect()
            })
            .unwrap_or_default();

        MarineSnapshot { location, tides }
    }
}

fn tide_kind(raw: &str) -> TideKind {
    if raw.eq_ignore_ascii_case("high") { TideKind::High } else { TideKind::Low }
}
