//! Plain-text panels. Each one reads a slice of the view state and nothing else.

use chrono::{Local, NaiveDateTime};
use std::fmt::Write;

use dashboard_core::{
    IconResolver, Panel, ViewState,
    model::{AstronomySnapshot, ForecastSnapshot, MarineSnapshot, NearbyLocation, SearchHistoryEntry, WeatherSnapshot},
    units::{
        DistanceUnit, UnitPreferences, convert_distance, format_distance, format_precipitation, format_speed,
        format_temperature,
    },
};

const HOURLY_STRIDE: usize = 3;

/// All visible panels, in display order.
pub fn dashboard(state: &ViewState, icons: &IconResolver) -> String {
    let mut out = String::new();

    if state.is_loading() {
        out.push_str("Detecting your location...\n\n");
    }
    if let Some(err) = state.error() {
        let _ = writeln!(out, "! {err}\n");
    }

    for panel in Panel::ALL {
        if !state.is_visible(panel) {
            continue;
        }
        out.push_str(&self::panel(panel, state, icons));
        out.push('\n');
    }

    out
}

pub fn panel(panel: Panel, state: &ViewState, icons: &IconResolver) -> String {
    let units = state.units();
    match panel {
        Panel::Summary => summary(state),
        Panel::Current => current(state.current(), units, icons),
        Panel::Forecast => forecast(state.forecast(), units, icons),
        Panel::Astronomy => astronomy(state.astronomy()),
        Panel::Marine => marine(state.marine()),
        Panel::Nearby => nearby(state.nearby(), state.nearby_unit(), units.distance),
        Panel::History => history(state.history()),
    }
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "== {title} ==");
}

fn row(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "  {label:<20} {value}");
}

pub fn summary(state: &ViewState) -> String {
    let units = state.units();
    let stats = state.summary();
    let mut out = String::new();

    heading(&mut out, "Weather Summary");
    row(&mut out, "Units", format!("°{} / {}", units.temperature, units.distance));
    row(&mut out, "Average Temperature", format_temperature(stats.last_temperature_c, units.temperature));
    row(&mut out, "Searches Made", stats.search_count);
    row(&mut out, "Average Forecast", format_temperature(stats.last_forecast_avg_c, units.temperature));
    out
}

pub fn current(data: Option<&WeatherSnapshot>, units: UnitPreferences, icons: &IconResolver) -> String {
    let mut out = String::new();

    let Some(snap) = data else {
        heading(&mut out, "Current Weather");
        out.push_str("  No weather data available\n");
        return out;
    };

    let c = &snap.current;
    heading(&mut out, &format!("Current Weather in {}", snap.location.name));
    let _ = writeln!(
        out,
        "  {}  {}  [{}]",
        format_temperature(c.temp_c, units.temperature),
        c.condition.text,
        icons.resolve(c.condition.code, c.condition.is_day),
    );
    row(&mut out, "Feels like", format_temperature(c.feelslike_c, units.temperature));
    row(&mut out, "Wind", format!("{} {}", format_speed(c.wind_kph, units.distance), c.wind_dir));
    row(&mut out, "Humidity", format!("{}%", c.humidity));
    row(&mut out, "UV Index", c.uv);
    row(&mut out, "Cloud Cover", format!("{}%", c.cloud));
    row(&mut out, "Pressure", format!("{} mb", c.pressure_mb));
    let visibility = match units.distance {
        DistanceUnit::Miles => c.vis_mi,
        DistanceUnit::Kilometers => c.vis_km,
    };
    row(&mut out, "Visibility", format_distance(visibility, units.distance));
    row(&mut out, "Last Updated", &c.last_updated);
    out
}

pub fn forecast(data: Option<&ForecastSnapshot>, units: UnitPreferences, icons: &IconResolver) -> String {
    let mut out = String::new();

    let Some(snap) = data else {
        heading(&mut out, "Today's Forecast");
        out.push_str("  No forecast data available\n");
        return out;
    };

    let d = &snap.day;
    let t = |v: f64| format_temperature(v, units.temperature);

    heading(&mut out, &format!("Today's Forecast for {}", snap.location.name));
    let _ = writeln!(
        out,
        "  {}  [{}]",
        d.condition.text,
        icons.resolve(d.condition.code, d.condition.is_day)
    );
    row(&mut out, "Maximum", t(d.maxtemp_c));
    row(&mut out, "Minimum", t(d.mintemp_c));
    row(&mut out, "Average", t(d.avgtemp_c));
    row(&mut out, "Max Wind", format_speed(d.maxwind_kph, units.distance));
    row(&mut out, "Total Precipitation", format_precipitation(d.totalprecip_mm, units.distance));
    row(&mut out, "Average Humidity", format!("{}%", d.avghumidity));
    row(&mut out, "UV Index", d.uv);
    row(&mut out, "Rain Chance", format!("{}%", d.daily_chance_of_rain));

    if !snap.hours.is_empty() {
        out.push_str("  Hourly:\n");
        for h in snap.hours.iter().step_by(HOURLY_STRIDE) {
            let _ = writeln!(out, "    {}  {:>8}  {}", clock_time(&h.time), t(h.temp_c), h.condition.text);
        }
    }
    out
}

pub fn astronomy(data: Option<&AstronomySnapshot>) -> String {
    let mut out = String::new();

    let Some(a) = data else {
        heading(&mut out, "Astronomy");
        out.push_str("  No astronomy data available\n");
        return out;
    };

    let yes_no = |b: bool| if b { "Yes" } else { "No" };

    heading(&mut out, &format!("Astronomy for {}", a.location.name));
    let _ = writeln!(
        out,
        "  {}  Sunrise {} . Sunset {}",
        if a.is_sun_up { "Daytime" } else { "Nighttime" },
        a.sunrise,
        a.sunset
    );
    row(&mut out, "Moonrise", &a.moonrise);
    row(&mut out, "Moonset", &a.moonset);
    row(&mut out, "Moon Phase", &a.moon_phase);
    row(&mut out, "Illumination", format!("{}%", a.moon_illumination));
    row(&mut out, "Is Sun Up", yes_no(a.is_sun_up));
    row(&mut out, "Is Moon Up", yes_no(a.is_moon_up));
    out
}

pub fn marine(data: Option<&MarineSnapshot>) -> String {
    let mut out = String::new();

    let Some(m) = data else {
        heading(&mut out, "Marine Conditions");
        out.push_str("  No marine data available\n");
        return out;
    };

    heading(&mut out, &format!("Marine Conditions for {}", m.location.name));

    match m.next_tide() {
        Some(next) => {
            let _ = writeln!(
                out,
                "  Next {} tide . {} . {} m",
                next.kind.label(),
                clock_time(&next.time),
                next.height_m
            );
            for tide in &m.tides {
                row(
                    &mut out,
                    &format!("{} tide", tide.kind.label()),
                    format!("{} . {} m", clock_time(&tide.time), tide.height_m),
                );
            }
        }
        None => out.push_str("  Tide data unavailable\n"),
    }
    out
}

/// `fetched_in` is the unit the radius search answered in.
pub fn nearby(locations: &[NearbyLocation], fetched_in: DistanceUnit, unit: DistanceUnit) -> String {
    let mut out = String::new();
    heading(&mut out, "Nearby Locations");

    if locations.is_empty() {
        out.push_str("  No nearby locations found\n");
        return out;
    }

    for (i, loc) in locations.iter().enumerate() {
        let _ = writeln!(
            out,
            "  [{}] {}, {} ({}) {} away",
            i + 1,
            loc.city,
            loc.state,
            loc.code,
            format_distance(convert_distance(loc.distance, fetched_in, unit), unit)
        );
    }
    out
}

pub fn history<'a>(entries: impl ExactSizeIterator<Item = &'a SearchHistoryEntry>) -> String {
    let mut out = String::new();
    heading(&mut out, "Search History");

    if entries.len() == 0 {
        out.push_str("  No search history yet\n");
        return out;
    }

    for (i, entry) in entries.enumerate() {
        let _ = writeln!(
            out,
            "  [{}] {} - {} ({})  {}  [{}]",
            i + 1,
            entry.query,
            entry.summary.condition_text,
            entry.summary.temp_display,
            entry.timestamp.with_timezone(&Local).format("%H:%M:%S"),
            entry.summary.icon_ref,
        );
    }
    out
}

/// `"2026-10-18 04:20"` → `"04:20"`; anything unparseable is shown as-is.
fn clock_time(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
