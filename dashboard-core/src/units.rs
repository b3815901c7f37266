//! Unit conversion and display formatting.
//!
//! Every value coming from the weather provider is metric. Conversions are
//! total: a NaN or infinite input is treated as `0.0`, and the formatters
//! accept `Option<f64>` so a missing reading renders as zero instead of failing.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

const KM_PER_MILE: f64 = 1.60934;
const MM_PER_INCH: f64 = 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "C",
            TemperatureUnit::Fahrenheit => "F",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for TemperatureUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            other => Err(anyhow::anyhow!(
                "Unknown temperature unit '{other}'. Use 'c' or 'f'."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Miles,
    Kilometers,
}

impl DistanceUnit {
    /// Short suffix used in rendered distances.
    pub fn suffix(&self) -> &'static str {
        match self {
            DistanceUnit::Miles => "mi",
            DistanceUnit::Kilometers => "km",
        }
    }

    /// Value of the `unit` parameter understood by the postal-radius provider.
    pub fn api_name(&self) -> &'static str {
        match self {
            DistanceUnit::Miles => "miles",
            DistanceUnit::Kilometers => "km",
        }
    }

    pub fn speed_suffix(&self) -> &'static str {
        match self {
            DistanceUnit::Miles => "mph",
            DistanceUnit::Kilometers => "km/h",
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for DistanceUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mi" | "mile" | "miles" => Ok(DistanceUnit::Miles),
            "km" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => {
                Ok(DistanceUnit::Kilometers)
            }
            other => Err(anyhow::anyhow!(
                "Unknown distance unit '{other}'. Use 'mi' or 'km'."
            )),
        }
    }
}

/// Session-wide display preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitPreferences {
    pub temperature: TemperatureUnit,
    pub distance: DistanceUnit,
}

fn finite(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    finite(c) * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (finite(f) - 32.0) * 5.0 / 9.0
}

pub fn km_to_miles(km: f64) -> f64 {
    finite(km) / KM_PER_MILE
}

pub fn miles_to_km(mi: f64) -> f64 {
    finite(mi) * KM_PER_MILE
}

pub fn kph_to_mph(kph: f64) -> f64 {
    finite(kph) / KM_PER_MILE
}

pub fn mph_to_kph(mph: f64) -> f64 {
    finite(mph) * KM_PER_MILE
}

pub fn mm_to_inches(mm: f64) -> f64 {
    finite(mm) / MM_PER_INCH
}

pub fn inches_to_mm(inches: f64) -> f64 {
    finite(inches) * MM_PER_INCH
}

/// Re-express a distance given in `from` in `to`.
pub fn convert_distance(value: f64, from: DistanceUnit, to: DistanceUnit) -> f64 {
    match (from, to) {
        (DistanceUnit::Miles, DistanceUnit::Kilometers) => miles_to_km(value),
        (DistanceUnit::Kilometers, DistanceUnit::Miles) => km_to_miles(value),
        _ => finite(value),
    }
}

fn coerce(value: impl Into<Option<f64>>) -> f64 {
    value.into().map(finite).unwrap_or(0.0)
}

/// Render a Celsius reading in the requested unit, one decimal place.
///
/// ```
/// use dashboard_core::units::{format_temperature, TemperatureUnit};
/// assert_eq!(format_temperature(21.0, TemperatureUnit::Fahrenheit), "69.8°F");
/// assert_eq!(format_temperature(None, TemperatureUnit::Celsius), "0.0°C");
/// ```
pub fn format_temperature(value_c: impl Into<Option<f64>>, unit: TemperatureUnit) -> String {
    let c = coerce(value_c);
    let value = match unit {
        TemperatureUnit::Celsius => c,
        TemperatureUnit::Fahrenheit => celsius_to_fahrenheit(c),
    };
    format!("{value:.1}°{unit}")
}

/// Render a km/h reading as mph or km/h depending on the distance preference.
pub fn format_speed(value_kph: impl Into<Option<f64>>, unit: DistanceUnit) -> String {
    let kph = coerce(value_kph);
    let value = match unit {
        DistanceUnit::Miles => kph_to_mph(kph),
        DistanceUnit::Kilometers => kph,
    };
    format!("{value:.1} {}", unit.speed_suffix())
}

/// Render a distance that is already expressed in `unit`.
///
/// No conversion happens here: the postal-radius provider answers in whatever
/// unit it was asked for, so the caller owns that step.
pub fn format_distance(value: impl Into<Option<f64>>, unit: DistanceUnit) -> String {
    format!("{:.1} {}", coerce(value), unit.suffix())
}

/// Render a millimetre reading as inches (miles preference) or millimetres.
pub fn format_precipitation(value_mm: impl Into<Option<f64>>, unit: DistanceUnit) -> String {
    let mm = coerce(value_mm);
    match unit {
        DistanceUnit::Miles => format!("{:.2} in", mm_to_inches(mm)),
        DistanceUnit::Kilometers => format!("{mm:.1} mm"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn conversions_roundtrip_within_tolerance() {
        for x in [-40.0, -12.5, 0.0, 0.1, 21.3, 100.0, 1234.5678] {
            assert!((fahrenheit_to_celsius(celsius_to_fahrenheit(x)) - x).abs() < EPS);
            assert!((miles_to_km(km_to_miles(x)) - x).abs() < EPS);
            assert!((mph_to_kph(kph_to_mph(x)) - x).abs() < EPS);
            assert!((inches_to_mm(mm_to_inches(x)) - x).abs() < EPS);
        }
    }

    #[test]
    fn known_conversion_points() {
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
        assert!((km_to_miles(1.60934) - 1.0).abs() < EPS);
        assert!((mm_to_inches(25.4) - 1.0).abs() < EPS);
    }

    #[test]
    fn non_finite_input_is_treated_as_zero() {
        assert_eq!(celsius_to_fahrenheit(f64::NAN), 32.0);
        assert_eq!(km_to_miles(f64::INFINITY), 0.0);
        assert_eq!(format_temperature(f64::NAN, TemperatureUnit::Celsius), "0.0°C");
    }

    #[test]
    fn missing_temperature_formats_as_zero() {
        assert_eq!(format_temperature(None, TemperatureUnit::Celsius), "0.0°C");
        assert_eq!(format_temperature(None, TemperatureUnit::Fahrenheit), "32.0°F");
    }

    #[test]
    fn temperature_uses_one_decimal() {
        assert_eq!(format_temperature(18.44, TemperatureUnit::Celsius), "18.4°C");
        assert_eq!(format_temperature(0.0, TemperatureUnit::Fahrenheit), "32.0°F");
    }

    #[test]
    fn distance_conversion_between_units() {
        assert!((convert_distance(10.0, DistanceUnit::Miles, DistanceUnit::Kilometers) - 16.0934).abs() < EPS);
        assert!((convert_distance(16.0934, DistanceUnit::Kilometers, DistanceUnit::Miles) - 10.0).abs() < EPS);
        assert_eq!(convert_distance(3.5, DistanceUnit::Kilometers, DistanceUnit::Kilometers), 3.5);
    }

    #[test]
    fn speed_follows_distance_preference() {
        assert_eq!(format_speed(16.0934, DistanceUnit::Miles), "10.0 mph");
        assert_eq!(format_speed(16.0934, DistanceUnit::Kilometers), "16.1 km/h");
    }

    #[test]
    fn distance_formatter_does_not_convert() {
        // Same number, only the suffix changes.
        assert_eq!(format_distance(5.0, DistanceUnit::Miles), "5.0 mi");
        assert_eq!(format_distance(5.0, DistanceUnit::Kilometers), "5.0 km");
    }

    #[test]
    fn precipitation_switches_between_inches_and_mm() {
        assert_eq!(format_precipitation(25.4, DistanceUnit::Miles), "1.00 in");
        assert_eq!(format_precipitation(3.0, DistanceUnit::Kilometers), "3.0 mm");
    }

    #[test]
    fn units_parse_from_short_and_long_names() {
        assert_eq!("F".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Fahrenheit);
        assert_eq!("celsius".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Celsius);
        assert_eq!("km".parse::<DistanceUnit>().unwrap(), DistanceUnit::Kilometers);
        assert!("parsecs".parse::<DistanceUnit>().is_err());
    }

    #[test]
    fn default_preferences_are_celsius_and_miles() {
        let prefs = UnitPreferences::default();
        assert_eq!(prefs.temperature, TemperatureUnit::Celsius);
        assert_eq!(prefs.distance, DistanceUnit::Miles);
    }
}
