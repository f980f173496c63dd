//! Great-circle distance between two points.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::location::Coordinate;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in km, rounded to 2 decimal places.
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = ((dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    round2(EARTH_RADIUS_KM * c)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Distance between a pair, or the "N/A" sentinel when either end is unresolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distance {
    Km(f64),
    NotComputable,
}

impl Distance {
    pub const NOT_AVAILABLE: &'static str = "N/A";

    pub fn between(from: Option<Coordinate>, to: Option<Coordinate>) -> Self {
        match (from, to) {
            (Some(a), Some(b)) => Self::Km(haversine(a.lat, a.lon, b.lat, b.lon)),
            _ => Self::NotComputable,
        }
    }

    pub fn km(&self) -> Option<f64> {
        match self {
            Self::Km(d) => Some(*d),
            Self::NotComputable => None,
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Whole kilometres keep one decimal, matching the JSON form.
            Self::Km(d) if d.fract() == 0.0 => write!(f, "{:.1}", d),
            Self::Km(d) => write!(f, "{}", d),
            Self::NotComputable => f.write_str(Self::NOT_AVAILABLE),
        }
    }
}

// Numbers stay numbers in JSON; the sentinel is the literal string.
impl Serialize for Distance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Km(d) => serializer.serialize_f64(*d),
            Self::NotComputable => serializer.serialize_str(Self::NOT_AVAILABLE),
        }
    }
}
