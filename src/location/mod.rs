//! Location subsystem for Pinzone.
//!
//! Resolves postal codes to place names through directory services with
//! fallback, and to approximate coordinates through a geocoder.

pub mod cache;
pub mod providers;
pub mod resolver;
pub mod types;

pub use cache::MemoCache;
pub use providers::{CoordinateProvider, PlaceProvider};
pub use resolver::LocationResolver;
pub use types::{Coordinate, LocationError, LocationSource, PlaceInfo};
