//! Turns one location query into a committed set of dashboard panels.
//!
//! A search runs these stages:
//!
//! 1. clear the nearby list and any previous error,
//! 2. [`Stage::Location`] lookup,
//! 3. [`Stage::Current`], [`Stage::Forecast`], [`Stage::Astronomy`] and
//!    [`Stage::Marine`] concurrently,
//! 4. for postal-code queries only, [`Stage::CountryCode`] then
//!    [`Stage::Nearby`] (both optional),
//! 5. one atomic commit into the [`ViewState`].
//!
//! Stages 2 and 3 are required: if any of them fails nothing is committed and
//! the user sees [`COULD_NOT_FETCH_WEATHER`]. Stage 4 failures only empty the
//! nearby list.

use chrono::Utc;
use parking_lot::Mutex;
use std::{fmt, sync::Arc};

use crate::{
    context::DashboardContext,
    error::{COULD_NOT_DETECT_LOCATION, COULD_NOT_FETCH_WEATHER, SearchError},
    icons::IconResolver,
    model::{NearbyLocation, SnapshotSummary, WeatherSnapshot, is_postal_code},
    store::{SearchBundle, ViewState},
    units::{DistanceUnit, TemperatureUnit, UnitPreferences, format_temperature},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Geolocation,
    Location,
    Current,
    Forecast,
    Astronomy,
    Marine,
    CountryCode,
    Nearby,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Geolocation => "geolocation",
            Stage::Location => "location",
            Stage::Current => "current weather",
            Stage::Forecast => "forecast",
            Stage::Astronomy => "astronomy",
            Stage::Marine => "marine",
            Stage::CountryCode => "country code",
            Stage::Nearby => "nearby search",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOrigin {
    /// The automatic search at session start. Not recorded in history.
    Initial,
    /// Anything the user asked for.
    Manual,
}

#[derive(Debug)]
pub enum SearchOutcome {
    Committed,
    /// A newer search committed first; these results were dropped.
    Superseded,
    Failed(SearchError),
}

impl SearchOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, SearchOutcome::Committed)
    }
}

/// Cheap to clone; clones share the same session state.
#[derive(Debug, Clone)]
pub struct Dashboard {
    ctx: DashboardContext,
    state: Arc<Mutex<ViewState>>,
}

impl Dashboard {
    pub fn new(ctx: DashboardContext, state: ViewState) -> Self {
        Self { ctx, state: Arc::new(Mutex::new(state)) }
    }

    pub fn icons(&self) -> &IconResolver {
        &self.ctx.icons
    }

    /// Read the current state. The lock is held only for the closure.
    pub fn view<R>(&self, f: impl FnOnce(&ViewState) -> R) -> R {
        f(&*self.state.lock())
    }

    /// Apply a user action (units, panel toggles, radius).
    pub fn update<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        f(&mut *self.state.lock())
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.lock().clone()
    }

    /// Detect the caller's position and load it without recording history.
    ///
    /// If geolocation fails the user sees [`COULD_NOT_DETECT_LOCATION`] and no
    /// fallback query is attempted.
    pub async fn initial_load(&self) -> SearchOutcome {
        self.state.lock().set_loading(true);

        let outcome = match self.ctx.geolocation.locate().await {
            Ok(coords) => {
                tracing::info!(lat = coords.lat, lon = coords.lon, "detected location");
                self.search(&coords.to_query(), SearchOrigin::Initial).await
            }
            Err(source) => {
                tracing::error!(error = %source, "automatic location detection failed");
                self.state.lock().set_error(COULD_NOT_DETECT_LOCATION);
                SearchOutcome::Failed(SearchError { stage: Stage::Geolocation, source })
            }
        };

        self.state.lock().set_loading(false);
        outcome
    }

    pub async fn search(&self, query: &str, origin: SearchOrigin) -> SearchOutcome {
        let (ticket, units, radius) = {
            let mut state = self.state.lock();
            let ticket = state.begin_search();
            (ticket, state.units(), state.search_radius())
        };

        tracing::debug!(query, ?origin, "search started");

        let bundle = match self.gather(query, origin, units, radius).await {
            Ok(bundle) => bundle,
            Err(err) => {
                tracing::error!(query, stage = %err.stage, error = %err.source, "search aborted");
                self.state.lock().report_error(ticket, COULD_NOT_FETCH_WEATHER);
                return SearchOutcome::Failed(err);
            }
        };

        let nearby = bundle.nearby.len();
        if self.state.lock().commit(ticket, bundle, Utc::now()) {
            tracing::info!(query, nearby, "search committed");
            SearchOutcome::Committed
        } else {
            tracing::debug!(query, "search superseded by a newer one");
            SearchOutcome::Superseded
        }
    }

    async fn gather(
        &self,
        query: &str,
        origin: SearchOrigin,
        units: UnitPreferences,
        radius: u32,
    ) -> Result<SearchBundle, SearchError> {
        let weather = &self.ctx.weather;

        let location = weather.location(query).await.map_err(SearchError::at(Stage::Location))?;

        let (current, forecast, astronomy, marine) = tokio::try_join!(
            async { weather.current(query).await.map_err(SearchError::at(Stage::Current)) },
            async { weather.forecast(query).await.map_err(SearchError::at(Stage::Forecast)) },
            async { weather.astronomy(query).await.map_err(SearchError::at(Stage::Astronomy)) },
            async { weather.marine(query).await.map_err(SearchError::at(Stage::Marine)) },
        )?;

        let nearby = if is_postal_code(query) {
            self.nearby_for(query, &location.place.country, radius, units.distance).await
        } else {
            Vec::new()
        };

        let history = match origin {
            SearchOrigin::Manual => Some(self.summarize(&current, units.temperature)),
            SearchOrigin::Initial => None,
        };

        Ok(SearchBundle {
            query: query.to_string(),
            current,
            forecast,
            astronomy,
            marine,
            nearby,
            nearby_unit: units.distance,
            history,
        })
    }

    /// Country code, then radius search. Never fails the outer search.
    async fn nearby_for(
        &self,
        postal_code: &str,
        country_name: &str,
        radius: u32,
        unit: DistanceUnit,
    ) -> Vec<NearbyLocation> {
        let country_code = match self.ctx.countries.country_code(country_name).await {
            Ok(Some(code)) => code,
            Ok(None) => {
                tracing::warn!(country_name, "no ISO code for country; skipping nearby search");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(stage = %Stage::CountryCode, error = %e, "skipping nearby search");
                return Vec::new();
            }
        };

        match self.ctx.nearby.nearby(postal_code, &country_code, radius, unit).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(stage = %Stage::Nearby, error = %e, "nearby locations unavailable");
                Vec::new()
            }
        }
    }

    fn summarize(&self, snapshot: &WeatherSnapshot, unit: TemperatureUnit) -> SnapshotSummary {
        let condition = &snapshot.current.condition;
        SnapshotSummary {
            condition_text: condition.text.clone(),
            temp_display: format_temperature(snapshot.current.temp_c, unit),
            icon_ref: self.ctx.icons.resolve(condition.code, condition.is_day),
        }
    }
}
