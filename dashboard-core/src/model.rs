use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// True when the query consists solely of ASCII decimal digits.
///
/// Only postal-code-shaped queries trigger the country lookup and the
/// nearby radius search.
pub fn is_postal_code(query: &str) -> bool {
    !query.is_empty() && query.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Render as the `"<lat>,<lon>"` query form the weather provider accepts.
    pub fn to_query(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub region: String,
    pub country: String,
}

/// Result of the location/timezone lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub place: Place,
    pub tz_id: Option<String>,
    pub localtime: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub code: u32,
    pub text: String,
    pub is_day: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub feelslike_c: f64,
    pub wind_kph: f64,
    pub wind_dir: String,
    pub humidity: f64,
    pub uv: f64,
    pub cloud: f64,
    pub pressure_mb: f64,
    pub precip_mm: f64,
    pub vis_km: f64,
    pub vis_mi: f64,
    pub condition: Condition,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: Place,
    pub current: CurrentConditions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub maxtemp_c: f64,
    pub mintemp_c: f64,
    pub avgtemp_c: f64,
    pub maxwind_kph: f64,
    pub totalprecip_mm: f64,
    pub avghumidity: f64,
    pub uv: f64,
    pub daily_chance_of_rain: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub time: String,
    pub temp_c: f64,
    pub wind_kph: f64,
    pub chance_of_rain: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub location: Place,
    pub date: String,
    pub day: DaySummary,
    pub hours: Vec<HourlyPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstronomySnapshot {
    pub location: Place,
    pub sunrise: String,
    pub sunset: String,
    pub moonrise: String,
    pub moonset: String,
    pub moon_phase: String,
    pub moon_illumination: f64,
    pub is_sun_up: bool,
    pub is_moon_up: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TideKind {
    High,
    Low,
}

impl TideKind {
    pub fn label(&self) -> &'static str {
        match self {
            TideKind::High => "High",
            TideKind::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tide {
    pub kind: TideKind,
    pub time: String,
    pub height_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarineSnapshot {
    pub location: Place,
    pub tides: Vec<Tide>,
}

impl MarineSnapshot {
    pub fn next_tide(&self) -> Option<&Tide> {
        self.tides.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyLocation {
    pub code: String,
    pub city: String,
    pub state: String,
    /// Expressed in the distance unit the radius search was issued with.
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub condition_text: String,
    pub temp_display: String,
    pub icon_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    pub id: String,
    pub query: String,
    pub summary: SnapshotSummary,
    pub timestamp: DateTime<Utc>,
}

/// Summary panel figures.
///
/// Despite the "average" labels shown to the user, `last_temperature_c` and
/// `last_forecast_avg_c` hold the values of the most recent completed search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub last_temperature_c: f64,
    pub search_count: u64,
    pub last_forecast_avg_c: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postal_code_detection() {
        assert!(is_postal_code("02139"));
        assert!(is_postal_code("10001"));
        assert!(!is_postal_code("New York"));
        assert!(!is_postal_code("10,20"));
        assert!(!is_postal_code("51.5,-0.12"));
        assert!(!is_postal_code("SW1A 1AA"));
        assert!(!is_postal_code(""));
    }

    #[test]
    fn coordinates_render_as_query() {
        let c = Coordinates { lat: 42.36, lon: -71.06 };
        assert_eq!(c.to_query(), "42.36,-71.06");
    }

    #[test]
    fn next_tide_is_first_entry() {
        let marine = MarineSnapshot {
            location: Place::default(),
            tides: vec![
                Tide { kind: TideKind::Low, time: "2026-10-18 03:12".into(), height_m: 0.4 },
                Tide { kind: TideKind::High, time: "2026-10-18 09:40".into(), height_m: 3.1 },
            ],
        };
        assert_eq!(marine.next_tide().map(|t| t.kind), Some(TideKind::Low));

        let empty = MarineSnapshot { location: Place::default(), tides: vec![] };
        assert!(empty.next_tide().is_none());
    }
}
