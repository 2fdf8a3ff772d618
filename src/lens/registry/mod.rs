//! Registry (ARIN WHOIS) lookup lens
//!
//! Queries the ARIN RESTful WHOIS service for the registration data of an IPv4 or
//! IPv6 address: the registered organization, the network range, and its CIDR.
//!
//! # Example
//!
//! ```rust,ignore
//! use netsleuth::lens::registry::RegistryLens;
//!
//! let lens = RegistryLens::default();
//! let result = lens.lookup(&"8.8.8.8".into())?;
//! for record in result.records() {
//!     println!("{:?}", record.organization);
//! }
//! ```

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::NetsleuthConfig;
use crate::lens::lookup::{
    parse_body, path_segment, FieldReader, HttpReply, LookupClient, LookupError, LookupInput, LookupResult,
    LookupSource, SourceRequest, TransportPolicy,
};

/// Default ARIN WHOIS base URL
pub const REGISTRY_API: &str = "https://whois.arin.net";

const ORGANIZATION_UNAVAILABLE: &str = "registered organization unavailable";
const NETWORK_UNAVAILABLE: &str = "netblock range unavailable";
const CIDR_UNAVAILABLE: &str = "CIDR range unavailable";

const ORG_NAME: &[&str] = &["net", "orgRef", "@name"];
const START_ADDRESS: &[&str] = &["net", "netBlocks", "netBlock", "startAddress", "$"];
const END_ADDRESS: &[&str] = &["net", "netBlocks", "netBlock", "endAddress", "$"];
const CIDR_LENGTH: &[&str] = &["net", "netBlocks", "netBlock", "cidrLength", "$"];

// =============================================================================
// Types
// =============================================================================

/// Registration data for one IP address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRecord {
    pub ip_address: String,
    /// Registered organization name
    pub organization: Option<String>,
    /// Network range as `start-end`
    pub network: Option<String>,
    /// Network as `start/prefix-length`
    pub cidr: Option<String>,
}

// =============================================================================
// Args
// =============================================================================

/// Arguments for registry lookups
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct RegistryLookupArgs {
    /// IPv4 or IPv6 address(es) to look up
    #[cfg_attr(feature = "cli", clap(value_name = "IP", required = true))]
    pub ip_addresses: Vec<String>,
}

impl RegistryLookupArgs {
    pub fn new(ip_addresses: Vec<String>) -> Self {
        Self { ip_addresses }
    }

    pub fn input(&self) -> LookupInput {
        LookupInput::from_args(self.ip_addresses.clone())
    }
}

// =============================================================================
// Lens
// =============================================================================

/// ARIN WHOIS lookup lens
pub struct RegistryLens {
    client: LookupClient,
    base_url: String,
}

impl RegistryLens {
    pub fn new(client: LookupClient) -> Self {
        Self {
            client,
            base_url: REGISTRY_API.to_string(),
        }
    }

    pub fn from_config(config: &NetsleuthConfig) -> Self {
        Self::new(LookupClient::from_config(config)).with_base_url(&config.registry_url)
    }

    /// Point the lens at a different WHOIS-RWS host
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Look up one address or a list of addresses
    pub fn lookup(&self, input: &LookupInput) -> Result<LookupResult<RegistryRecord>, LookupError> {
        self.run(input)
    }
}

impl Default for RegistryLens {
    fn default() -> Self {
        Self::new(LookupClient::default())
    }
}

impl LookupSource for RegistryLens {
    type Record = RegistryRecord;

    const SERVICE: &'static str = "registry";
    const ON_TRANSPORT_ERROR: TransportPolicy = TransportPolicy::Continue;

    fn client(&self) -> &LookupClient {
        &self.client
    }

    fn request(&self, identifier: &str) -> SourceRequest {
        SourceRequest::get(format!(
            "{}/rest/ip/{}.json",
            self.base_url,
            path_segment(identifier)
        ))
            .with_header("Accept", "application/json")
    }

    fn interpret(&self, identifier: &str, reply: HttpReply) -> Result<Option<Value>, LookupError> {
        match reply.status {
            200 => Ok(parse_body(Self::SERVICE, identifier, &reply)),
            status => {
                debug!("{}: HTTP {} for {}", Self::SERVICE, status, identifier);
                Ok(None)
            }
        }
    }

    fn extract(&self, identifier: &str, raw: &Value) -> RegistryRecord {
        let raw = first_net_block(raw);
        let reader = FieldReader::new(Self::SERVICE, identifier, &raw);

        let organization = reader.text_or(ORG_NAME, ORGANIZATION_UNAVAILABLE);
        let network = range_field(&reader, END_ADDRESS, "-", NETWORK_UNAVAILABLE);
        let cidr = range_field(&reader, CIDR_LENGTH, "/", CIDR_UNAVAILABLE);

        RegistryRecord {
            ip_address: identifier.to_string(),
            organization,
            network,
            cidr,
        }
    }
}

/// Join the start address with the value at `suffix_path`.
///
/// `sentinel` is used when either part is present but empty; a missing path gives `None`.
fn range_field(
    reader: &FieldReader<'_>,
    suffix_path: &[&str],
    separator: &str,
    sentinel: &str,
) -> Option<String> {
    let start = reader.text_or(START_ADDRESS, sentinel)?;
    if start == sentinel {
        return Some(start);
    }
    let suffix = reader.text_or(suffix_path, sentinel)?;
    if suffix == sentinel {
        return Some(suffix);
    }
    Some(format!("{}{}{}", start, separator, suffix))
}

/// ARIN returns `netBlock` as an array when a network has several blocks; keep the first.
fn first_net_block(raw: &Value) -> Cow<'_, Value> {
    match raw.pointer("/net/netBlocks/netBlock") {
        Some(Value::Array(blocks)) => {
            let mut owned = raw.clone();
            if let Some(slot) = owned.pointer_mut("/net/netBlocks/netBlock") {
                *slot = blocks.first().cloned().unwrap_or(Value::Null);
            }
            Cow::Owned(owned)
        }
        _ => Cow::Borrowed(raw),
    }
}

// =============================================================================
// Tests
// =============================================================================
