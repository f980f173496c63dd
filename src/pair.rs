//! Pair processing — the primary public API for Pinzone.
//!
//! Runs both resolvers for an origin/destination pair, computes the
//! distance and zone, and assembles the result record. Never fails:
//! unresolved data shows up as sentinels in the record.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::distance::Distance;
use crate::location::{LocationResolver, PlaceInfo};
use crate::pincode::PostalCode;
use crate::zone::{classify_zone, Zone};

/// One input row. Codes may arrive as JSON strings or numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairInput {
    #[serde(deserialize_with = "code_text")]
    pub from_pincode: String,
    #[serde(deserialize_with = "code_text")]
    pub to_pincode: String,
}

fn code_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

impl PairInput {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from_pincode: from.into(),
            to_pincode: to.into(),
        }
    }
}

/// Full result for one pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairResult {
    pub from: PostalCode,
    pub to: PostalCode,
    pub from_place: PlaceInfo,
    pub to_place: PlaceInfo,
    pub distance: Distance,
    pub zone: Zone,
}

/// Flat output record, one column per field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairRecord {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "To")]
    pub to: String,
    #[serde(rename = "From City")]
    pub from_city: String,
    #[serde(rename = "From State")]
    pub from_state: String,
    #[serde(rename = "To City")]
    pub to_city: String,
    #[serde(rename = "To State")]
    pub to_state: String,
    #[serde(rename = "Distance (KM)")]
    pub distance_km: Distance,
    #[serde(rename = "Zone")]
    pub zone: Zone,
}

impl PairRecord {
    pub const COLUMNS: [&'static str; 8] = [
        "From",
        "To",
        "From City",
        "From State",
        "To City",
        "To State",
        "Distance (KM)",
        "Zone",
    ];
}

impl PairResult {
    pub fn record(&self) -> PairRecord {
        PairRecord {
            from: self.from.to_string(),
            to: self.to.to_string(),
            from_city: self.from_place.name.clone(),
            from_state: self.from_place.state.clone(),
            to_city: self.to_place.name.clone(),
            to_state: self.to_place.state.clone(),
            distance_km: self.distance,
            zone: self.zone,
        }
    }
}

/// Zone lookup without coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneOnly {
    pub from: PostalCode,
    pub to: PostalCode,
    pub from_place: PlaceInfo,
    pub to_place: PlaceInfo,
    pub zone: Zone,
}

pub struct PairProcessor {
    resolver: LocationResolver,
}

impl PairProcessor {
    pub fn new(resolver: LocationResolver) -> Self {
        Self { resolver }
    }

    /// Resolve, measure and classify one pair.
    pub fn process_pair(&self, from: &str, to: &str) -> PairResult {
        let from = PostalCode::new(from);
        let to = PostalCode::new(to);

        let from_place = self.resolver.resolve_location(&from);
        let to_place = self.resolver.resolve_location(&to);
        let from_coord = self.resolver.resolve_coordinate(&from);
        let to_coord = self.resolver.resolve_coordinate(&to);

        let distance = Distance::between(from_coord, to_coord);
        let zone = zone_for(&from, &to, &from_place, &to_place);

        info!(from = %from, to = %to, zone = %zone, distance = %distance, "pair processed");

        PairResult {
            from,
            to,
            from_place,
            to_place,
            distance,
            zone,
        }
    }

    /// Places and zone only; no geocoding.
    pub fn zone_only(&self, from: &str, to: &str) -> ZoneOnly {
        let from = PostalCode::new(from);
        let to = PostalCode::new(to);

        let from_place = self.resolver.resolve_location(&from);
        let to_place = self.resolver.resolve_location(&to);
        let zone = zone_for(&from, &to, &from_place, &to_place);

        ZoneOnly {
            from,
            to,
            from_place,
            to_place,
            zone,
        }
    }

    /// Process pairs sequentially, preserving input order.
    pub fn process_batch(&self, pairs: &[PairInput]) -> Vec<PairResult> {
        info!(pairs = pairs.len(), "processing batch");
        pairs
            .iter()
            .map(|p| self.process_pair(&p.from_pincode, &p.to_pincode))
            .collect()
    }
}

fn zone_for(from: &PostalCode, to: &PostalCode, from_place: &PlaceInfo, to_place: &PlaceInfo) -> Zone {
    classify_zone(
        from,
        to,
        &from_place.district,
        &from_place.state,
        &to_place.district,
        &to_place.state,
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::location::resolver::tests::{StubDirectory, StubGeocoder};
    use crate::location::LocationSource;
    use std::sync::Arc;

    /// A processor backed by a small fixed directory and geocoder.
    pub fn stub_processor() -> PairProcessor {
        let primary = Arc::new(StubDirectory::new(
            LocationSource::IndiaPost,
            &[
                ("110001", "Connaught Place", "New Delhi", "Delhi"),
                ("110055", "Paharganj", "Central Delhi", "Delhi"),
                ("400001", "Fort", "Mumbai", "Maharashtra"),
                ("413001", "Solapur City", "Solapur", "Maharashtra"),
                ("302001", "Jaipur GPO", "Jaipur", "Rajasthan"),
            ],
        ));
        let fallback = Arc::new(StubDirectory::new(
            LocationSource::WorldPostal,
            &[
                ("431001", "Aurangabad", "Aurangabad", "Maharashtra"),
                ("781001", "Guwahati", "Kamrup Metro", "Assam"),
            ],
        ));
        let geocoder = Arc::new(StubGeocoder::new(&[
            ("110001", 28.6139, 77.2090),
            ("110055", 28.6448, 77.2167),
            ("400001", 19.0760, 72.8777),
            ("413001", 17.6599, 75.9064),
            ("431001", 19.8762, 75.3433),
            ("781001", 26.1445, 91.7362),
        ]));
        PairProcessor::new(LocationResolver::new(primary, fallback, geocoder))
    }

    #[test]
    fn test_same_pincode_local_zero_distance() {
        let r = stub_processor().process_pair("110001", "110001");
        assert_eq!(r.zone, Zone::Local);
        assert_eq!(r.distance, Distance::Km(0.0));
    }

    #[test]
    fn test_two_metros() {
        let r = stub_processor().process_pair("110001", "400001");
        assert_eq!(r.zone, Zone::Metro);
        let km = r.distance.km().unwrap();
        assert!((km - 1154.0).abs() < 5.0, "got {}", km);
        assert_eq!(r.from_place.state, "Delhi");
        assert_eq!(r.to_place.name, "Fort");
    }

    #[test]
    fn test_same_state_non_metro_regional() {
        let r = stub_processor().process_pair("413001", "431001");
        assert_eq!(r.zone, Zone::Regional);
        assert!(r.distance.km().is_some());
    }

    #[test]
    fn test_special_state() {
        let r = stub_processor().process_pair("302001", "781001");
        assert_eq!(r.zone, Zone::Special);
        // 302001 has no coordinate in the stub geocoder
        assert_eq!(r.distance, Distance::NotComputable);
    }

    #[test]
    fn test_missing_coordinate_gives_na() {
        let r = stub_processor().process_pair("110001", "302001");
        assert_eq!(r.distance, Distance::NotComputable);
        let json = serde_json::to_value(r.record()).unwrap();
        assert_eq!(json["Distance (KM)"], "N/A");
    }

    #[test]
    fn test_unresolvable_codes_degrade_to_sentinels() {
        let r = stub_processor().process_pair("999998", "999999");
        assert!(r.from_place.is_unknown());
        assert!(r.to_place.is_unknown());
        assert_eq!(r.distance, Distance::NotComputable);
        // Both districts are "Unknown", which rule 2 still treats as a match.
        assert_eq!(r.zone, Zone::Local);
    }

    #[test]
    fn test_one_side_unresolved_still_classified() {
        let r = stub_processor().process_pair("302001", "999999");
        assert!(r.to_place.is_unknown());
        assert!(Zone::ALL.contains(&r.zone));
        assert_eq!(r.zone, Zone::Roi);
    }

    #[test]
    fn test_malformed_input_does_not_abort() {
        let r = stub_processor().process_pair("not a pin", "");
        assert!(r.from_place.is_unknown());
        assert!(r.to_place.is_unknown());
        assert_eq!(r.distance, Distance::NotComputable);
    }

    #[test]
    fn test_input_normalized() {
        let r = stub_processor().process_pair(" 110001 ", "400001.0");
        assert_eq!(r.from.as_str(), "110001");
        assert_eq!(r.to.as_str(), "400001");
        assert_eq!(r.zone, Zone::Metro);
    }

    #[test]
    fn test_record_columns() {
        let r = stub_processor().process_pair("110001", "400001");
        let json = serde_json::to_value(r.record()).unwrap();
        let obj = json.as_object().unwrap();
        for col in PairRecord::COLUMNS {
            assert!(obj.contains_key(col), "missing {}", col);
        }
        assert_eq!(obj.len(), 8);
        assert_eq!(json["From City"], "Connaught Place");
        assert_eq!(json["To State"], "Maharashtra");
        assert_eq!(json["Zone"], "METRO");
    }

    #[test]
    fn test_zone_only() {
        let z = stub_processor().zone_only("110001", "110055");
        assert_eq!(z.zone, Zone::Metro);
        assert_eq!(z.to_place.district, "Central Delhi");
    }

    #[test]
    fn test_batch_preserves_order() {
        let pairs = vec![
            PairInput::new("413001", "431001"),
            PairInput::new("bad", "input"),
            PairInput::new("110001", "110001"),
        ];
        let out = stub_processor().process_batch(&pairs);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].zone, Zone::Regional);
        assert!(out[1].from_place.is_unknown());
        assert_eq!(out[2].zone, Zone::Local);
        assert_eq!(out[2].from.as_str(), "110001");
    }
}
