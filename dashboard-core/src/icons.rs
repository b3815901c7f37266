//! Condition code to local icon asset resolution.
//!
//! The provider publishes a condition-code to icon-number table. It is fetched
//! at most once per session; until it arrives, or if fetching fails, lookups
//! use [`FALLBACK_ICONS`]. Codes missing from both resolve to [`DEFAULT_ICON`].

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tokio::sync::OnceCell;

use crate::provider::IconTableSource;

/// Clear / sunny.
pub const DEFAULT_ICON: u32 = 113;

pub const ICON_DIR: &str = "icons";

/// Condition code → icon number, as published by weatherapi.com.
pub const FALLBACK_ICONS: &[(u32, u32)] = &[
    (1000, 113),
    (1003, 116),
    (1006, 119),
    (1009, 122),
    (1030, 143),
    (1063, 176),
    (1066, 179),
    (1069, 182),
    (1072, 185),
    (1087, 200),
    (1114, 227),
    (1117, 230),
    (1135, 248),
    (1147, 260),
    (1150, 263),
    (1153, 266),
    (1168, 281),
    (1171, 284),
    (1180, 293),
    (1183, 296),
    (1186, 299),
    (1189, 302),
    (1192, 305),
    (1195, 308),
    (1198, 311),
    (1201, 314),
    (1204, 317),
    (1207, 320),
    (1210, 323),
    (1213, 326),
    (1216, 329),
    (1219, 332),
    (1222, 335),
    (1225, 338),
    (1237, 350),
    (1240, 353),
    (1243, 356),
    (1246, 359),
    (1249, 362),
    (1252, 365),
    (1255, 368),
    (1258, 371),
    (1261, 374),
    (1264, 377),
    (1273, 386),
    (1276, 389),
    (1279, 392),
    (1282, 395),
];

fn fallback_icon(code: u32) -> Option<u32> {
    FALLBACK_ICONS
        .binary_search_by_key(&code, |&(c, _)| c)
        .ok()
        .map(|i| FALLBACK_ICONS[i].1)
}

/// `icons/<number><d|n>@2x.png`
pub fn icon_path(icon_number: u32, is_day: bool) -> String {
    let suffix = if is_day { 'd' } else { 'n' };
    format!("{ICON_DIR}/{icon_number}{suffix}@2x.png")
}

#[derive(Debug)]
struct Inner {
    source: Arc<dyn IconTableSource>,
    table: OnceCell<HashMap<u32, u32>>,
    fetch_started: AtomicBool,
}

/// Cheap to clone; clones share one cache.
#[derive(Debug, Clone)]
pub struct IconResolver {
    inner: Arc<Inner>,
}

impl IconResolver {
    pub fn new(source: Arc<dyn IconTableSource>) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                table: OnceCell::new(),
                fetch_started: AtomicBool::new(false),
            }),
        }
    }

    /// Resolve an asset path without waiting.
    ///
    /// The first call kicks off the table fetch in the background when a tokio
    /// runtime is available; this call and any made before the fetch lands use
    /// the fallback table.
    pub fn resolve(&self, condition_code: u32, is_day: bool) -> String {
        if !self.inner.table.initialized() {
            self.spawn_fetch();
        }
        icon_path(self.icon_number(condition_code), is_day)
    }

    /// Icon number for a condition code from whichever table is available now.
    pub fn icon_number(&self, condition_code: u32) -> u32 {
        self.inner
            .table
            .get()
            .and_then(|table| table.get(&condition_code).copied())
            .or_else(|| fallback_icon(condition_code))
            .unwrap_or(DEFAULT_ICON)
    }

    /// Wait for the table to be populated, fetching it if nobody has yet.
    ///
    /// Concurrent callers share a single request. A failed fetch leaves the
    /// fallback in place for the rest of the session.
    pub async fn warm(&self) {
        self.inner.fetch_started.store(true, Ordering::SeqCst);
        load(&self.inner).await;
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.table.initialized()
    }

    fn spawn_fetch(&self) {
        if self.inner.fetch_started.swap(true, Ordering::SeqCst) {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let inner = Arc::clone(&self.inner);
                handle.spawn(async move { load(&inner).await });
            }
            Err(_) => {
                tracing::debug!("no async runtime; icon table stays on fallback until warmed");
                self.inner.fetch_started.store(false, Ordering::SeqCst);
            }
        }
    }
}

async fn load(inner: &Inner) {
    inner
        .table
        .get_or_init(|| async {
            match inner.source.icon_table().await {
                Ok(table) => {
                    tracing::debug!(entries = table.len(), "icon table loaded");
                    table
                }
                Err(e) => {
                    tracing::warn!(error = %e, "icon table unavailable, using fallback");
                    FALLBACK_ICONS.iter().copied().collect()
                }
            }
        })
        .await;
}
