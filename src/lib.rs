//! Pinzone — pincode-to-pincode routing zone and distance lookup.
//!
//! ```no_run
//! use pinzone::config::Config;
//! use pinzone::location::LocationResolver;
//! use pinzone::pair::PairProcessor;
//!
//! let config = Config::default();
//! let processor = PairProcessor::new(LocationResolver::from_config(&config));
//! let result = processor.process_pair("110001", "400001");
//! println!("{} {}", result.zone, result.distance);
//! ```

pub mod batch;
pub mod config;
pub mod distance;
pub mod location;
pub mod pair;
pub mod pincode;
pub mod server;
pub mod zone;

pub use distance::{haversine, Distance};
pub use pair::{PairInput, PairProcessor, PairRecord, PairResult};
pub use pincode::PostalCode;
pub use zone::{classify_zone, Zone};
