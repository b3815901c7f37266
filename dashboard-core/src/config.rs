use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

use crate::{
    provider::{
        ProviderId, conditions::DEFAULT_ICONS_URL, countries::DEFAULT_COUNTRIES_URL,
        geolocation::DEFAULT_GEOLOCATION_URL,
    },
    store::DEFAULT_SEARCH_RADIUS,
    units::{DistanceUnit, TemperatureUnit, UnitPreferences},
};

/// Configuration for a single keyed provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Overrides the provider's public base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Keyless collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub geolocation_url: String,
    pub countries_url: String,
    pub icons_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geolocation_url: DEFAULT_GEOLOCATION_URL.to_string(),
            countries_url: DEFAULT_COUNTRIES_URL.to_string(),
            icons_url: DEFAULT_ICONS_URL.to_string(),
        }
    }
}

/// Starting preferences for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub temperature_unit: TemperatureUnit,
    pub distance_unit: DistanceUnit,
    pub search_radius: u32,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            temperature_unit: TemperatureUnit::default(),
            distance_unit: DistanceUnit::default(),
            search_radius: DEFAULT_SEARCH_RADIUS,
        }
    }
}

impl DashboardSettings {
    pub fn units(&self) -> UnitPreferences {
        UnitPreferences { temperature: self.temperature_unit, distance: self.distance_unit }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [providers.weatherapi]
/// api_key = "..."
///
/// [dashboard]
/// temperature_unit = "fahrenheit"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub endpoints: Endpoints,

    #[serde(default)]
    pub dashboard: DashboardSettings,
}

impl Config {
    /// Load config from disk and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "dashboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay keys and base URLs from the environment.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for &id in ProviderId::all() {
            if let Some(key) = lookup(id.key_env_var()).filter(|v| !v.trim().is_empty()) {
                self.provider_entry(id).api_key = Some(key);
            }
            if let Some(url) = lookup(id.base_url_env_var()).filter(|v| !v.trim().is_empty()) {
                self.provider_entry(id).base_url = Some(url);
            }
        }
    }

    fn provider_entry(&mut self, id: ProviderId) -> &mut ProviderConfig {
        self.providers.entry(id.as_str().to_string()).or_default()
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Set or replace a provider API key.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.provider_entry(provider_id).api_key = Some(api_key);
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id).and_then(|cfg| cfg.api_key.as_deref())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }

    /// Configured base URL, or the provider's public one.
    pub fn provider_base_url(&self, provider_id: ProviderId) -> &str {
        self.provider_config(provider_id)
            .and_then(|cfg| cfg.base_url.as_deref())
            .unwrap_or(provider_id.default_base_url())
    }
}
