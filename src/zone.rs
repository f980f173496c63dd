//! Routing zone classification.
//!
//! Rules are evaluated in a fixed order and the first match wins:
//! same code → same district → both metro → same state → special state → rest of India.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

use crate::pincode::PostalCode;

/// Routing zone for an origin/destination pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Zone {
    Local,
    Metro,
    Regional,
    Special,
    Roi,
}

impl Zone {
    pub const ALL: [Zone; 5] = [Zone::Local, Zone::Metro, Zone::Regional, Zone::Special, Zone::Roi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "LOCAL",
            Self::Metro => "METRO",
            Self::Regional => "REGIONAL",
            Self::Special => "SPECIAL",
            Self::Roi => "ROI",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Static tables ──────────────────────────────────────────────

/// A metro area's pincode interval (half-open).
#[derive(Debug, Clone, Serialize)]
pub struct MetroRange {
    pub metro: &'static str,
    pub codes: Range<u32>,
}

pub const METRO_RANGES: &[MetroRange] = &[
    MetroRange { metro: "Delhi", codes: 110001..110099 },
    MetroRange { metro: "Mumbai", codes: 400001..400105 },
    MetroRange { metro: "Kolkata", codes: 700001..700105 },
    MetroRange { metro: "Chennai", codes: 600001..600119 },
    MetroRange { metro: "Bengaluru", codes: 560001..560108 },
    MetroRange { metro: "Hyderabad", codes: 500001..500099 },
    MetroRange { metro: "Ahmedabad", codes: 380001..380062 },
    MetroRange { metro: "Pune", codes: 411001..411063 },
    MetroRange { metro: "Gurugram", codes: 122001..122019 },
];

/// States with distinct routing treatment, lower-cased.
pub const SPECIAL_STATES: &[&str] = &[
    "himachal pradesh",
    "karnataka",
    "jammu & kashmir",
    "west bengal",
    "assam",
    "manipur",
    "mizoram",
    "nagaland",
    "tripura",
    "meghalaya",
    "sikkim",
    "arunachal pradesh",
];

/// District value excluded from the same-district rule.
pub const DISTRICT_NOT_AVAILABLE: &str = "N/A";

/// The metro area a code belongs to, if any. Non-numeric codes are never metro.
pub fn metro_of(code: &PostalCode) -> Option<&'static str> {
    let n = code.as_number()?;
    METRO_RANGES
        .iter()
        .find(|r| r.codes.contains(&n))
        .map(|r| r.metro)
}

pub fn is_metro(code: &PostalCode) -> bool {
    metro_of(code).is_some()
}

pub fn is_special_state(state: &str) -> bool {
    let s = state.to_lowercase();
    SPECIAL_STATES.contains(&s.as_str())
}

/// Assign the routing zone for a pair.
pub fn classify_zone(
    from_code: &PostalCode,
    to_code: &PostalCode,
    from_district: &str,
    from_state: &str,
    to_district: &str,
    to_state: &str,
) -> Zone {
    if from_code == to_code {
        return Zone::Local;
    }
    if from_district.to_lowercase() == to_district.to_lowercase()
        && from_district != DISTRICT_NOT_AVAILABLE
    {
        return Zone::Local;
    }
    if is_metro(from_code) && is_metro(to_code) {
        return Zone::Metro;
    }
    if from_state.to_lowercase() == to_state.to_lowercase() {
        return Zone::Regional;
    }
    if is_special_state(from_state) || is_special_state(to_state) {
        return Zone::Special;
    }
    Zone::Roi
}
