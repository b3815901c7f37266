use async_trait::async_trait;
use serde::Deserialize;
use std::{collections::HashMap, sync::Arc};

use crate::{
    error::FetchError,
    http::{FetchJson, decode, endpoint},
    provider::IconTableSource,
};

pub const DEFAULT_ICONS_URL: &str = "https://www.weatherapi.com/docs/weather_conditions.json";

/// Reads the provider's published condition list.
#[derive(Debug, Clone)]
pub struct IconTableClient {
    url: String,
    http: Arc<dyn FetchJson>,
}

impl IconTableClient {
    pub fn new(url: impl Into<String>, http: Arc<dyn FetchJson>) -> Self {
        Self { url: url.into(), http }
    }
}

#[derive(Debug, Deserialize)]
struct WaConditionDoc {
    code: u32,
    icon: u32,
}

#[async_trait]
impl IconTableSource for IconTableClient {
    async fn icon_table(&self) -> Result<HashMap<u32, u32>, FetchError> {
        let url = endpoint(&self.url, "", &[])?;
        let entries: Vec<WaConditionDoc> = decode("condition list", self.http.fetch_json(&url).await?)?;

        Ok(entries.into_iter().map(|e| (e.code, e.icon)).collect())
    }
}
