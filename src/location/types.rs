//! Core types for the location subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Where a place or coordinate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationSource {
    IndiaPost,
    WorldPostal,
    Nominatim,
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndiaPost => write!(f, "India Post"),
            Self::WorldPostal => write!(f, "World Postal Locations"),
            Self::Nominatim => write!(f, "Nominatim"),
        }
    }
}

/// Locality, district and state for a postal code.
///
/// Either every field is a real value or every field is [`PlaceInfo::UNKNOWN`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceInfo {
    pub name: String,
    pub district: String,
    pub state: String,
}

impl PlaceInfo {
    pub const UNKNOWN: &'static str = "Unknown";

    /// Build from raw provider fields. Trims each one; any blank field rejects the whole record.
    pub fn complete(name: &str, district: &str, state: &str) -> Result<Self, LocationError> {
        let (name, district, state) = (name.trim(), district.trim(), state.trim());
        if name.is_empty() || district.is_empty() || state.is_empty() {
            return Err(LocationError::Incomplete);
        }
        Ok(Self {
            name: name.to_string(),
            district: district.to_string(),
            state: state.to_string(),
        })
    }

    pub fn unknown() -> Self {
        Self {
            name: Self::UNKNOWN.into(),
            district: Self::UNKNOWN.into(),
            state: Self::UNKNOWN.into(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.name == Self::UNKNOWN && self.district == Self::UNKNOWN && self.state == Self::UNKNOWN
    }
}

/// Latitude/longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Parse the string pair geocoders return. Rejects non-finite and out-of-range values.
    pub fn parse(lat: &str, lon: &str) -> Result<Self, LocationError> {
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| LocationError::InvalidResponse(format!("bad latitude '{}'", lat)))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| LocationError::InvalidResponse(format!("bad longitude '{}'", lon)))?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(LocationError::InvalidResponse(format!(
                "coordinate out of range: {}, {}",
                lat, lon
            )));
        }
        Ok(Self { lat, lon })
    }
}

/// Why a single lookup attempt failed.
///
/// Never escapes the resolver's public sentinel-returning calls.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out")]
    Timeout,
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
    #[error("No results for '{0}'")]
    NotFound(String),
    #[error("Response is missing name, district or state")]
    Incomplete,
    #[error("Empty postal code")]
    EmptyCode,
    #[error("Offline mode")]
    Offline,
}
