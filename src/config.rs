//! Runtime configuration.
//!
//! Loaded once at startup from `~/.pinzone/config.json` (or an explicit
//! path) and handed to the resolver. Missing fields fall back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory service A base URL.
    pub india_post_url: String,
    /// Directory service B base URL.
    pub world_postal_url: String,
    /// Geocoder base URL.
    pub nominatim_url: String,
    /// ISO country code sent to directory service B.
    pub country_code: String,
    /// Country name sent to the geocoder.
    pub country_name: String,
    /// Per-call network timeout.
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Memoize successful lookups by postal code.
    pub memoize: bool,
    pub memo_ttl_hours: u64,
    /// Skip every network call.
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            india_post_url: "https://api.postalpincode.in".into(),
            world_postal_url: "https://api.worldpostallocations.com".into(),
            nominatim_url: "https://nominatim.openstreetmap.org".into(),
            country_code: "IN".into(),
            country_name: "India".into(),
            timeout_secs: 10,
            user_agent: format!("Pinzone/{} (logistics-zone-lookup)", env!("CARGO_PKG_VERSION")),
            memoize: false,
            memo_ttl_hours: 24,
            offline: false,
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the default location if it exists.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load_from(p),
            None => {
                let p = Self::default_path();
                if p.exists() {
                    Self::load_from(&p)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pinzone")
            .join("config.json")
    }

    pub fn memo_ttl_ms(&self) -> i64 {
        (self.memo_ttl_hours as i64).saturating_mul(3600 * 1000)
    }
}
