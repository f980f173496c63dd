//! Location resolver — orchestrates the fallback chain.
//!
//! Place flow:       Memo → India Post → World Postal → India Post → "Unknown" triple
//! Coordinate flow:  Memo → Nominatim → absent

use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use super::cache::MemoCache;
use super::providers::{
    CoordinateProvider, HttpSettings, IndiaPost, Nominatim, PlaceProvider, WorldPostal,
};
use super::types::{Coordinate, LocationError, PlaceInfo};
use crate::config::Config;
use crate::pincode::PostalCode;

/// Resolves postal codes to places and coordinates, never failing outward.
pub struct LocationResolver {
    attempts: Vec<Arc<dyn PlaceProvider>>,
    geocoder: Arc<dyn CoordinateProvider>,
    memo: Option<Mutex<MemoCache>>,
    offline: bool,
}

impl LocationResolver {
    /// Attempt order: primary, fallback, primary again.
    pub fn new(
        primary: Arc<dyn PlaceProvider>,
        fallback: Arc<dyn PlaceProvider>,
        geocoder: Arc<dyn CoordinateProvider>,
    ) -> Self {
        Self::with_attempts(vec![primary.clone(), fallback, primary], geocoder)
    }

    /// Use an explicit attempt sequence.
    pub fn with_attempts(
        attempts: Vec<Arc<dyn PlaceProvider>>,
        geocoder: Arc<dyn CoordinateProvider>,
    ) -> Self {
        Self {
            attempts,
            geocoder,
            memo: None,
            offline: false,
        }
    }

    /// Wire up the real services described by `config`.
    pub fn from_config(config: &Config) -> Self {
        let http = HttpSettings::from_config(config);
        let india_post = Arc::new(IndiaPost::new(&config.india_post_url, http.clone()));
        let world_postal = Arc::new(WorldPostal::new(
            &config.world_postal_url,
            &config.country_code,
            http.clone(),
        ));
        let nominatim = Arc::new(Nominatim::new(&config.nominatim_url, &config.country_name, http));

        let mut resolver = Self::new(india_post, world_postal, nominatim);
        resolver.set_offline(config.offline);
        if config.memoize {
            resolver = resolver.with_memo(MemoCache::new(config.memo_ttl_ms()));
        }
        resolver
    }

    /// Enable memoization of successful lookups.
    pub fn with_memo(mut self, memo: MemoCache) -> Self {
        self.memo = Some(Mutex::new(memo));
        self
    }

    /// Set offline mode — skip network calls.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Resolve a place, falling back to the "Unknown" triple.
    pub fn resolve_location(&self, code: &PostalCode) -> PlaceInfo {
        match self.try_resolve_location(code) {
            Ok(place) => place,
            Err(e) => {
                warn!(pincode = %code, error = %e, "place unresolved, using Unknown");
                PlaceInfo::unknown()
            }
        }
    }

    /// Resolve a place through the attempt chain. Err carries the last attempt's failure.
    pub fn try_resolve_location(&self, code: &PostalCode) -> Result<PlaceInfo, LocationError> {
        if code.is_empty() {
            return Err(LocationError::EmptyCode);
        }

        if let Some(place) = self.memo_place(code) {
            debug!(pincode = %code, "place from memo");
            return Ok(place);
        }

        if self.offline {
            return Err(LocationError::Offline);
        }

        let mut last_err = LocationError::NotFound(code.to_string());
        for (i, provider) in self.attempts.iter().enumerate() {
            match provider.lookup_place(code) {
                Ok(place) => {
                    debug!(pincode = %code, source = %provider.source(), attempt = i + 1, "place resolved");
                    self.remember_place(code, &place);
                    return Ok(place);
                }
                Err(e) => {
                    debug!(pincode = %code, source = %provider.source(), attempt = i + 1, error = %e, "place attempt failed");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }

    /// Resolve approximate coordinates. Single attempt, no fallback.
    pub fn resolve_coordinate(&self, code: &PostalCode) -> Option<Coordinate> {
        match self.try_resolve_coordinate(code) {
            Ok(c) => Some(c),
            Err(e) => {
                warn!(pincode = %code, error = %e, "coordinate unresolved");
                None
            }
        }
    }

    pub fn try_resolve_coordinate(&self, code: &PostalCode) -> Result<Coordinate, LocationError> {
        if code.is_empty() {
            return Err(LocationError::EmptyCode);
        }

        if let Some(c) = self.memo.as_ref().and_then(|m| lock(m).get_coordinate(code)) {
            debug!(pincode = %code, "coordinate from memo");
            return Ok(c);
        }

        if self.offline {
            return Err(LocationError::Offline);
        }

        let c = self.geocoder.lookup_coordinate(code)?;
        debug!(pincode = %code, source = %self.geocoder.source(), lat = c.lat, lon = c.lon, "coordinate resolved");
        if let Some(m) = &self.memo {
            lock(m).put_coordinate(code, c);
        }
        Ok(c)
    }

    fn memo_place(&self, code: &PostalCode) -> Option<PlaceInfo> {
        self.memo.as_ref().and_then(|m| lock(m).get_place(code))
    }

    fn remember_place(&self, code: &PostalCode, place: &PlaceInfo) {
        if let Some(m) = &self.memo {
            lock(m).put_place(code, place);
        }
    }
}

// Inserts are single calls, so a poisoned memo is still consistent.
fn lock(m: &Mutex<MemoCache>) -> std::sync::MutexGuard<'_, MemoCache> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
