//! Session view state and the rules every mutation obeys.
//!
//! Readers get immutable accessors. User actions (units, panel visibility,
//! search radius) are public; everything else is applied by the orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fmt, str::FromStr};

use crate::{
    model::{
        AstronomySnapshot, ForecastSnapshot, MarineSnapshot, NearbyLocation, SearchHistoryEntry,
        SnapshotSummary, SummaryStatistics, WeatherSnapshot,
    },
    units::{DistanceUnit, TemperatureUnit, UnitPreferences, convert_distance},
};

pub const MIN_SEARCH_RADIUS: u32 = 1;
pub const MAX_SEARCH_RADIUS: u32 = 100;
pub const DEFAULT_SEARCH_RADIUS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Current,
    Forecast,
    Astronomy,
    Marine,
    Nearby,
    History,
    Summary,
}

impl Panel {
    pub const ALL: [Panel; 7] = [
        Panel::Summary,
        Panel::Current,
        Panel::Forecast,
        Panel::Astronomy,
        Panel::Marine,
        Panel::Nearby,
        Panel::History,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Panel::Current => "current",
            Panel::Forecast => "forecast",
            Panel::Astronomy => "astronomy",
            Panel::Marine => "marine",
            Panel::Nearby => "nearby",
            Panel::History => "history",
            Panel::Summary => "summary",
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Panel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Panel::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| {
                let names: Vec<_> = Panel::ALL.iter().map(Panel::as_str).collect();
                anyhow::anyhow!("Unknown panel '{s}'. Panels: {}.", names.join(", "))
            })
    }
}

/// One independent flag per panel, all visible by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelVisibility {
    current: bool,
    forecast: bool,
    astronomy: bool,
    marine: bool,
    nearby: bool,
    history: bool,
    summary: bool,
}

impl Default for PanelVisibility {
    fn default() -> Self {
        Self {
            current: true,
            forecast: true,
            astronomy: true,
            marine: true,
            nearby: true,
            history: true,
            summary: true,
        }
    }
}

impl PanelVisibility {
    fn slot(&mut self, panel: Panel) -> &mut bool {
        match panel {
            Panel::Current => &mut self.current,
            Panel::Forecast => &mut self.forecast,
            Panel::Astronomy => &mut self.astronomy,
            Panel::Marine => &mut self.marine,
            Panel::Nearby => &mut self.nearby,
            Panel::History => &mut self.history,
            Panel::Summary => &mut self.summary,
        }
    }

    pub fn is_visible(&self, panel: Panel) -> bool {
        match panel {
            Panel::Current => self.current,
            Panel::Forecast => self.forecast,
            Panel::Astronomy => self.astronomy,
            Panel::Marine => self.marine,
            Panel::Nearby => self.nearby,
            Panel::History => self.history,
            Panel::Summary => self.summary,
        }
    }

    /// Flip one panel and return its new visibility.
    pub fn toggle(&mut self, panel: Panel) -> bool {
        let slot = self.slot(panel);
        *slot = !*slot;
        *slot
    }
}

/// Identifies one search attempt. Later tickets compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

/// Everything fetched by one successful search, applied in a single step.
#[derive(Debug, Clone)]
pub(crate) struct SearchBundle {
    pub query: String,
    pub current: WeatherSnapshot,
    pub forecast: ForecastSnapshot,
    pub astronomy: AstronomySnapshot,
    pub marine: MarineSnapshot,
    pub nearby: Vec<NearbyLocation>,
    /// Unit the radius search was issued with.
    pub nearby_unit: DistanceUnit,
    /// `None` for the automatic initial search.
    pub history: Option<SnapshotSummary>,
}

#[derive(Debug, Clone)]
pub struct ViewState {
    current: Option<WeatherSnapshot>,
    forecast: Option<ForecastSnapshot>,
    astronomy: Option<AstronomySnapshot>,
    marine: Option<MarineSnapshot>,
    nearby: Vec<NearbyLocation>,
    nearby_unit: DistanceUnit,
    history: VecDeque<SearchHistoryEntry>,
    summary: SummaryStatistics,
    units: UnitPreferences,
    panels: PanelVisibility,
    search_radius: u32,
    loading: bool,
    error: Option<String>,

    issued: u64,
    committed: u64,
    last_history_ms: i64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(UnitPreferences::default(), DEFAULT_SEARCH_RADIUS)
    }
}

impl ViewState {
    pub fn new(units: UnitPreferences, search_radius: u32) -> Self {
        Self {
            current: None,
            forecast: None,
            astronomy: None,
            marine: None,
            nearby: Vec::new(),
            nearby_unit: units.distance,
            history: VecDeque::new(),
            summary: SummaryStatistics::default(),
            units,
            panels: PanelVisibility::default(),
            search_radius: clamp_radius(search_radius),
            loading: false,
            error: None,
            issued: 0,
            committed: 0,
            last_history_ms: i64::MIN,
        }
    }

    pub fn current(&self) -> Option<&WeatherSnapshot> {
        self.current.as_ref()
    }

    pub fn forecast(&self) -> Option<&ForecastSnapshot> {
        self.forecast.as_ref()
    }

    pub fn astronomy(&self) -> Option<&AstronomySnapshot> {
        self.astronomy.as_ref()
    }

    pub fn marine(&self) -> Option<&MarineSnapshot> {
        self.marine.as_ref()
    }

    pub fn nearby(&self) -> &[NearbyLocation] {
        &self.nearby
    }

    /// Unit the current nearby distances were fetched in.
    pub fn nearby_unit(&self) -> DistanceUnit {
        self.nearby_unit
    }

    /// Distance of a nearby entry in the current distance preference.
    pub fn nearby_distance(&self, location: &NearbyLocation) -> f64 {
        convert_distance(location.distance, self.nearby_unit, self.units.distance)
    }

    /// Newest first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = &SearchHistoryEntry> {
        self.history.iter()
    }

    pub fn history_entry(&self, index: usize) -> Option<&SearchHistoryEntry> {
        self.history.get(index)
    }

    pub fn summary(&self) -> SummaryStatistics {
        self.summary
    }

    pub fn units(&self) -> UnitPreferences {
        self.units
    }

    pub fn panels(&self) -> PanelVisibility {
        self.panels
    }

    pub fn is_visible(&self, panel: Panel) -> bool {
        self.panels.is_visible(panel)
    }

    pub fn search_radius(&self) -> u32 {
        self.search_radius
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_temperature_unit(&mut self, unit: TemperatureUnit) {
        self.units.temperature = unit;
    }

    pub fn set_distance_unit(&mut self, unit: DistanceUnit) {
        self.units.distance = unit;
    }

    pub fn toggle_panel(&mut self, panel: Panel) -> bool {
        self.panels.toggle(panel)
    }

    /// Store the radius clamped to `[1, 100]` and return what was stored.
    pub fn set_search_radius(&mut self, radius: u32) -> u32 {
        self.search_radius = clamp_radius(radius);
        self.search_radius
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Start a search attempt: clears the error and the nearby list.
    pub(crate) fn begin_search(&mut self) -> SearchTicket {
        self.issued += 1;
        self.error = None;
        self.nearby.clear();
        SearchTicket(self.issued)
    }

    /// True when no search issued after `ticket` has started.
    pub(crate) fn is_latest(&self, ticket: SearchTicket) -> bool {
        ticket.0 == self.issued
    }

    /// Set the user-visible error unless a newer search has started since.
    pub(crate) fn report_error(&mut self, ticket: SearchTicket, message: &str) -> bool {
        if !self.is_latest(ticket) {
            return false;
        }
        self.error = Some(message.to_string());
        true
    }

    /// Report an error that is not tied to a search attempt.
    pub(crate) fn set_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }

    /// Apply a finished search in one step.
    ///
    /// Returns `false`, leaving the state untouched, when a search issued
    /// after `ticket` has already committed.
    pub(crate) fn commit(&mut self, ticket: SearchTicket, bundle: SearchBundle, now: DateTime<Utc>) -> bool {
        if ticket.0 <= self.committed {
            return false;
        }
        self.committed = ticket.0;

        self.summary = SummaryStatistics {
            last_temperature_c: bundle.current.current.temp_c,
            search_count: self.summary.search_count + 1,
            last_forecast_avg_c: bundle.forecast.day.avgtemp_c,
        };

        if let Some(summary) = bundle.history {
            let id = self.next_history_id(now);
            self.history.push_front(SearchHistoryEntry {
                id,
                query: bundle.query,
                summary,
                timestamp: now,
            });
        }

        // A newer search may already have cleared and be refilling the list.
        if self.is_latest(ticket) {
            self.nearby = bundle.nearby;
            self.nearby_unit = bundle.nearby_unit;
        }

        // Whatever failed before this commit no longer describes the screen.
        self.error = None;

        self.current = Some(bundle.current);
        self.forecast = Some(bundle.forecast);
        self.astronomy = Some(bundle.astronomy);
        self.marine = Some(bundle.marine);

        true
    }

    /// Millisecond timestamp, bumped when two entries land in the same millisecond.
    fn next_history_id(&mut self, now: DateTime<Utc>) -> String {
        let ms = now.timestamp_millis().max(self.last_history_ms.saturating_add(1));
        self.last_history_ms = ms;
        ms.to_string()
    }
}

fn clamp_radius(radius: u32) -> u32 {
    radius.clamp(MIN_SEARCH_RADIUS, MAX_SEARCH_RADIUS)
}
