//! Core library for the weather & location dashboard.
//!
//! This crate defines:
//! - Unit conversion and display formatting
//! - Condition icon resolution with a session-long cache
//! - Clients for the weather, geolocation, country and postal-radius providers
//! - The view state store and the search orchestrator that fills it
//! - Configuration & credentials handling
//!
//! It is used by `dashboard-cli`, which only renders what the store holds.

pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod icons;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod store;
pub mod units;

pub use config::Config;
pub use context::DashboardContext;
pub use error::{COULD_NOT_DETECT_LOCATION, COULD_NOT_FETCH_WEATHER, FetchError, SearchError};
pub use icons::IconResolver;
pub use orchestrator::{Dashboard, SearchOrigin, SearchOutcome, Stage};
pub use provider::ProviderId;
pub use store::{Panel, ViewState};
pub use units::{DistanceUnit, TemperatureUnit, UnitPreferences};
