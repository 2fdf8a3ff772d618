#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Netsleuth - a network forensics lookup toolkit
//!
//! Netsleuth resolves IP and MAC addresses against four public services and
//! normalizes each answer into a flat record. It can be used as both a
//! command-line application and a library.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | (none) | Lookup lenses and configuration | `ureq`, `config` |
//! | `display` | Table formatting | `tabled`, `json_to_table` |
//! | `cli` | Full CLI binary | All above + `clap`, `tracing-subscriber` |
//!
//! # Architecture
//!
//! - **[`lens`]**: one lens per service, plus the shared lookup loop
//!   - `registry`: ARIN WHOIS registration data
//!   - `reputation`: AbuseIPDB abuse reports (requires an API key)
//!   - `geolocation`: ip-api.com location data
//!   - `vendor`: maclookup.app MAC vendor data
//!   - `lookup`: input normalization, pacing, transport, and field extraction
//!
//! - **[`config`]**: Configuration management
//!
//! Lookups are strictly sequential: every request is preceded by a random pacing
//! delay to stay below the public services' rate limits.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use netsleuth::lens::reputation::ReputationLens;
//! use netsleuth::{LookupClient, NetsleuthConfig};
//!
//! let config = NetsleuthConfig::new(&None)?;
//! let lens = ReputationLens::from_config(&config, Some("my-api-key".to_string()));
//!
//! match lens.lookup(&"118.25.6.39".into())? {
//!     netsleuth::LookupResult::Single(Some(record)) => println!("{:?}", record.level_of_abuse),
//!     _ => println!("no data"),
//! }
//! ```

pub mod config;
pub mod lens;

// =============================================================================
// Configuration
// =============================================================================

pub use config::NetsleuthConfig;

// =============================================================================
// Lens Module - commonly used types
// =============================================================================

pub use lens::lookup::{
    LookupClient, LookupError, LookupInput, LookupResult, Pacer, Transport, TransportError,
};
pub use lens::utils::OutputFormat;

pub use lens::geolocation::{GeolocationLens, GeolocationRecord};
pub use lens::registry::{RegistryLens, RegistryRecord};
pub use lens::reputation::{AbuseLevel, ReputationLens, ReputationRecord};
pub use lens::vendor::{VendorLens, VendorRecord};
