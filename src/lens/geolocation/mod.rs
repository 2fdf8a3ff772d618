//! Geolocation (ip-api.com) lookup lens
//!
//! Queries the ip-api.com JSON endpoint for the location and network owner of an
//! IP address. The service reports per-query failure in the body (`"status": "fail"`)
//! even on HTTP 200; such identifiers yield no record.
//!
//! Network failures are fatal for this source: a timeout or refused connection
//! aborts the whole lookup.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::NetsleuthConfig;
use crate::lens::lookup::{
    json_path, parse_body, path_segment, value_to_text, FieldReader, HttpReply, LookupClient, LookupError,
    LookupInput, LookupResult, LookupSource, SourceRequest, TransportPolicy,
};

/// Default ip-api.com base URL (the free tier is plain HTTP only)
pub const GEOLOCATION_API: &str = "http://ip-api.com";

// =============================================================================
// Types
// =============================================================================

/// Location and network data for one IP address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeolocationRecord {
    pub ip_address: String,
    /// Organization owning the address
    pub domain_name: Option<String>,
    /// Autonomous system, e.g. `AS15169`
    pub as_number: Option<String>,
    pub isp_name: Option<String>,
    pub country_code: Option<String>,
    pub region_name: Option<String>,
    pub city_name: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub timezone: Option<String>,
}

// =============================================================================
// Args
// =============================================================================

/// Arguments for geolocation lookups
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct GeolocationLookupArgs {
    /// IPv4 or IPv6 address(es) to look up
    #[cfg_attr(feature = "cli", clap(value_name = "IP", required = true))]
    pub ip_addresses: Vec<String>,
}

impl GeolocationLookupArgs {
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

/// ip-api.com lookup lens
pub struct GeolocationLens {
    client: LookupClient,
    base_url: String,
}

impl GeolocationLens {
    pub fn new(client: LookupClient) -> Self {
        Self {
            client,
            base_url: GEOLOCATION_API.to_string(),
        }
    }

    pub fn from_config(config: &NetsleuthConfig) -> Self {
        Self::new(LookupClient::from_config(config)).with_base_url(&config.geolocation_url)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Look up one address or a list of addresses
    pub fn lookup(
        &self,
        input: &LookupInput,
    ) -> Result<LookupResult<GeolocationRecord>, LookupError> {
        self.run(input)
    }
}

impl Default for GeolocationLens {
    fn default() -> Self {
        Self::new(LookupClient::default())
    }
}

impl LookupSource for GeolocationLens {
    type Record = GeolocationRecord;

    const SERVICE: &'static str = "geolocation";
    const ON_TRANSPORT_ERROR: TransportPolicy = TransportPolicy::Fatal;

    fn client(&self) -> &LookupClient {
        &self.client
    }

    fn request(&self, identifier: &str) -> SourceRequest {
        SourceRequest::get(format!("{}/json/{}", self.base_url, path_segment(identifier)))
    }

    fn interpret(&self, identifier: &str, reply: HttpReply) -> Result<Option<Value>, LookupError> {
        if reply.status != 200 {
            debug!("{}: HTTP {} for {}", Self::SERVICE, reply.status, identifier);
            return Ok(None);
        }

        let Some(body) = parse_body(Self::SERVICE, identifier, &reply) else {
            return Ok(None);
        };

        match body.get("status").and_then(Value::as_str) {
            Some("success") => Ok(Some(body)),
            Some("fail") => {
                let reason = json_path(&body, &["message"])
                    .value()
                    .map(value_to_text)
                    .unwrap_or_else(|| "unknown reason".to_string());
                warn!(
                    "{}: the query failed for {} ({}), please review the input",
                    Self::SERVICE,
                    identifier,
                    reason
                );
                Ok(None)
            }
            other => {
                debug!(
                    "{}: unexpected query status {:?} for {}",
                    Self::SERVICE,
                    other,
                    identifier
                );
                Ok(None)
            }
        }
    }

    fn extract(&self, identifier: &str, raw: &Value) -> GeolocationRecord {
        let reader = FieldReader::new(Self::SERVICE, identifier, raw);

        let as_number = reader.text(&["as"]).and_then(|autonomous_system| {
            autonomous_system
                .split(' ')
                .next()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        });

        GeolocationRecord {
            ip_address: reader
                .text(&["query"])
                .unwrap_or_else(|| identifier.to_string()),
            domain_name: reader.text(&["org"]),
            as_number,
            isp_name: reader.text(&["isp"]),
            country_code: reader.text(&["countryCode"]),
            region_name: reader.text(&["regionName"]),
            city_name: reader.text(&["city"]),
            latitude: reader.text(&["lat"]),
            longitude: reader.text(&["lon"]),
            timezone: reader.text(&["timezone"]),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
