//! In-memory memo of resolved places and coordinates.
//!
//! Keyed by normalized postal code. Places and coordinates live in separate
//! typed maps so a coordinate miss can never shadow a place hit or vice versa.
//! Sentinel results (Unknown places, absent coordinates) are never stored.

use super::types::{Coordinate, PlaceInfo};
use crate::pincode::PostalCode;
use std::collections::HashMap;

pub const DEFAULT_TTL_MS: i64 = 24 * 3600 * 1000; // 24 hours in ms

/// Expired entries are swept once every this many inserts.
const PURGE_EVERY: usize = 64;

#[derive(Clone)]
struct Entry<T> {
    value: T,
    timestamp: i64,
}

/// The memo cache.
pub struct MemoCache {
    ttl_ms: i64,
    places: HashMap<PostalCode, Entry<PlaceInfo>>,
    coordinates: HashMap<PostalCode, Entry<Coordinate>>,
    inserts: usize,
}

impl Default for MemoCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_MS)
    }
}

impl MemoCache {
    pub fn new(ttl_ms: i64) -> Self {
        Self {
            ttl_ms,
            places: HashMap::new(),
            coordinates: HashMap::new(),
            inserts: 0,
        }
    }

    fn fresh<T: Clone>(&self, entry: Option<&Entry<T>>) -> Option<T> {
        let entry = entry?;
        let now = chrono::Utc::now().timestamp_millis();
        if now - entry.timestamp > self.ttl_ms {
            return None; // expired
        }
        Some(entry.value.clone())
    }

    pub fn get_place(&self, code: &PostalCode) -> Option<PlaceInfo> {
        self.fresh(self.places.get(code))
    }

    pub fn put_place(&mut self, code: &PostalCode, place: &PlaceInfo) {
        if place.is_unknown() {
            return;
        }
        self.sweep();
        self.places.insert(
            code.clone(),
            Entry {
                value: place.clone(),
                timestamp: chrono::Utc::now().timestamp_millis(),
            },
        );
    }

    pub fn get_coordinate(&self, code: &PostalCode) -> Option<Coordinate> {
        self.fresh(self.coordinates.get(code))
    }

    pub fn put_coordinate(&mut self, code: &PostalCode, coordinate: Coordinate) {
        self.sweep();
        self.coordinates.insert(
            code.clone(),
            Entry {
                value: coordinate,
                timestamp: chrono::Utc::now().timestamp_millis(),
            },
        );
    }

    fn sweep(&mut self) {
        self.inserts += 1;
        if self.inserts % PURGE_EVERY == 0 {
            self.purge_expired();
        }
    }

    /// Drop expired entries from both maps.
    fn purge_expired(&mut self) {
        let now = chrono::Utc::now().timestamp_millis();
        let ttl = self.ttl_ms;
        self.places.retain(|_, e| now - e.timestamp <= ttl);
        self.coordinates.retain(|_, e| now - e.timestamp <= ttl);
    }

    /// (places, coordinates) entry counts.
    pub fn len(&self) -> (usize, usize) {
        (self.places.len(), self.coordinates.len())
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty() && self.coordinates.is_empty()
    }
}
