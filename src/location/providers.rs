//! Location providers: India Post, World Postal Locations, Nominatim.
//!
//! Each provider performs one HTTP call per lookup and turns every failure
//! (transport, status, body shape, blank fields) into a [`LocationError`].

use serde::Deserialize;
use std::time::Duration;

use super::types::{Coordinate, LocationError, LocationSource, PlaceInfo};
use crate::config::Config;
use crate::pincode::PostalCode;

/// A directory service that maps a postal code to a place.
pub trait PlaceProvider: Send + Sync {
    fn source(&self) -> LocationSource;
    fn lookup_place(&self, code: &PostalCode) -> Result<PlaceInfo, LocationError>;
}

/// A geocoder that maps a postal code to coordinates.
pub trait CoordinateProvider: Send + Sync {
    fn source(&self) -> LocationSource;
    fn lookup_coordinate(&self, code: &PostalCode) -> Result<Coordinate, LocationError>;
}

/// Connection settings shared by every provider.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub user_agent: String,
}

impl HttpSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            user_agent: config.user_agent.clone(),
        }
    }
}

fn get_json<T: serde::de::DeserializeOwned>(
    url: &str,
    http: &HttpSettings,
) -> Result<T, LocationError> {
    let response = ureq::get(url)
        .set("User-Agent", &http.user_agent)
        .timeout(http.timeout)
        .call()
        .map_err(map_ureq_error)?;

    response
        .into_json()
        .map_err(|e| LocationError::InvalidResponse(e.to_string()))
}

fn map_ureq_error(err: ureq::Error) -> LocationError {
    match err {
        ureq::Error::Status(code, _) => LocationError::Status(code),
        ureq::Error::Transport(t) => {
            let timed_out = std::error::Error::source(&t)
                .and_then(|e| e.downcast_ref::<std::io::Error>())
                .map(|e| {
                    matches!(
                        e.kind(),
                        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
                    )
                })
                .unwrap_or(false);
            if timed_out {
                LocationError::Timeout
            } else {
                LocationError::Network(t.to_string())
            }
        }
    }
}

// ─── India Post (directory service A) ───────────────────────────

#[derive(Deserialize, Debug)]
pub struct IndiaPostResponse {
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "PostOffice", default)]
    pub post_office: Option<Vec<IndiaPostOffice>>,
}

#[derive(Deserialize, Debug)]
pub struct IndiaPostOffice {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "District", default)]
    pub district: Option<String>,
    #[serde(rename = "State", default)]
    pub state: Option<String>,
}

/// Extract the first post office from an India Post response body.
pub fn place_from_india_post(
    code: &PostalCode,
    body: Vec<IndiaPostResponse>,
) -> Result<PlaceInfo, LocationError> {
    let first = body
        .into_iter()
        .next()
        .ok_or_else(|| LocationError::InvalidResponse("empty response array".into()))?;

    if !first.status.eq_ignore_ascii_case("success") {
        return Err(LocationError::NotFound(code.to_string()));
    }

    let office = first
        .post_office
        .and_then(|offices| offices.into_iter().next())
        .ok_or_else(|| LocationError::NotFound(code.to_string()))?;

    PlaceInfo::complete(
        office.name.as_deref().unwrap_or(""),
        office.district.as_deref().unwrap_or(""),
        office.state.as_deref().unwrap_or(""),
    )
}

pub struct IndiaPost {
    base_url: String,
    http: HttpSettings,
}

impl IndiaPost {
    pub fn new(base_url: impl Into<String>, http: HttpSettings) -> Self {
        Self { base_url: base_url.into(), http }
    }
}

impl PlaceProvider for IndiaPost {
    fn source(&self) -> LocationSource {
        LocationSource::IndiaPost
    }

    fn lookup_place(&self, code: &PostalCode) -> Result<PlaceInfo, LocationError> {
        let url = format!(
            "{}/pincode/{}",
            self.base_url.trim_end_matches('/'),
            urlencod(code.as_str())
        );
        let body: Vec<IndiaPostResponse> = get_json(&url, &self.http)?;
        place_from_india_post(code, body)
    }
}

// ─── World Postal Locations (directory service B) ───────────────

#[derive(Deserialize, Debug)]
pub struct WorldPostalResponse {
    #[serde(default)]
    pub status: serde_json::Value,
    #[serde(default)]
    pub result: Option<Vec<WorldPostalPlace>>,
}

#[derive(Deserialize, Debug)]
pub struct WorldPostalPlace {
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl WorldPostalResponse {
    /// The service has reported success both as `"success"` and as `true`.
    fn is_success(&self) -> bool {
        match &self.status {
            serde_json::Value::String(s) => s.eq_ignore_ascii_case("success"),
            serde_json::Value::Bool(b) => *b,
            _ => false,
        }
    }
}

pub fn place_from_world_postal(
    code: &PostalCode,
    body: WorldPostalResponse,
) -> Result<PlaceInfo, LocationError> {
    if !body.is_success() {
        return Err(LocationError::NotFound(code.to_string()));
    }

    let place = body
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| LocationError::NotFound(code.to_string()))?;

    PlaceInfo::complete(
        place.place.as_deref().unwrap_or(""),
        place.district.as_deref().unwrap_or(""),
        place.state.as_deref().unwrap_or(""),
    )
}

pub struct WorldPostal {
    base_url: String,
    country_code: String,
    http: HttpSettings,
}

impl WorldPostal {
    pub fn new(base_url: impl Into<String>, country_code: impl Into<String>, http: HttpSettings) -> Self {
        Self {
            base_url: base_url.into(),
            country_code: country_code.into(),
            http,
        }
    }
}

impl PlaceProvider for WorldPostal {
    fn source(&self) -> LocationSource {
        LocationSource::WorldPostal
    }

    fn lookup_place(&self, code: &PostalCode) -> Result<PlaceInfo, LocationError> {
        let url = format!(
            "{}/pincode?postalcode={}&countrycode={}",
            self.base_url.trim_end_matches('/'),
            urlencod(code.as_str()),
            urlencod(&self.country_code),
        );
        let body: WorldPostalResponse = get_json(&url, &self.http)?;
        place_from_world_postal(code, body)
    }
}

// ─── Nominatim (geocoding service) ──────────────────────────────

#[derive(Deserialize, Debug, Clone)]
pub struct NominatimResult {
    pub lat: String,
    pub lon: String,
}

/// First candidate's coordinate.
pub fn coordinate_from_nominatim(
    code: &PostalCode,
    results: Vec<NominatimResult>,
) -> Result<Coordinate, LocationError> {
    let first = results
        .into_iter()
        .next()
        .ok_or_else(|| LocationError::NotFound(code.to_string()))?;
    Coordinate::parse(&first.lat, &first.lon)
}

pub struct Nominatim {
    base_url: String,
    country: String,
    http: HttpSettings,
}

impl Nominatim {
    pub fn new(base_url: impl Into<String>, country: impl Into<String>, http: HttpSettings) -> Self {
        Self {
            base_url: base_url.into(),
            country: country.into(),
            http,
        }
    }
}

impl CoordinateProvider for Nominatim {
    fn source(&self) -> LocationSource {
        LocationSource::Nominatim
    }

    fn lookup_coordinate(&self, code: &PostalCode) -> Result<Coordinate, LocationError> {
        let url = format!(
            "{}/search?postalcode={}&country={}&format=json",
            self.base_url.trim_end_matches('/'),
            urlencod(code.as_str()),
            urlencod(&self.country),
        );
        let results: Vec<NominatimResult> = get_json(&url, &self.http)?;
        coordinate_from_nominatim(code, results)
    }
}

// ─── URL encoding (minimal, no extra dep) ───────────────────────

fn urlencod(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}
