//! Lens module
//!
//! This module provides high-level "lens" abstractions that combine business logic
//! with output formatting. Lenses are designed to be reusable across different
//! interfaces (CLI, library callers, tests).
//!
//! # Architecture
//!
//! Each lookup lens module exports:
//! - A **Lens struct** (e.g., `RegistryLens`, `VendorLens`) - the main entry point
//! - An **Args struct** - input arguments, derivable as clap arguments with the `cli` feature
//! - A **Record type** - one flat record per looked up identifier
//!
//! The request/pacing/extraction loop shared by all lenses lives in [`lookup`].
//! External users only interact through the lens structs.
//!
//! | Lens | Service | Identifier |
//! |------|---------|------------|
//! | `RegistryLens` | ARIN WHOIS-RWS | IPv4 / IPv6 address |
//! | `ReputationLens` | AbuseIPDB (API key) | IPv4 / IPv6 address |
//! | `GeolocationLens` | ip-api.com | IPv4 / IPv6 address |
//! | `VendorLens` | maclookup.app | MAC address |
//!
//! # Usage
//!
//! ```rust,ignore
//! use netsleuth::lens::geolocation::GeolocationLens;
//! use netsleuth::lens::lookup::LookupInput;
//!
//! let lens = GeolocationLens::default();
//! let input = LookupInput::from(vec!["8.8.8.8", "1.1.1.1"]);
//! for record in lens.lookup(&input)?.records() {
//!     println!("{} {:?}", record.ip_address, record.city_name);
//! }
//! ```

pub mod utils;

pub mod lookup;

pub mod geolocation;
pub mod registry;
pub mod reputation;
pub mod vendor;
