//! Shared lookup machinery
//!
//! All four lenses follow the same shape: normalize the input into a list of
//! identifiers, then for each identifier pause, issue one GET request, apply the
//! source's status policy, and extract a flat record from the JSON body. This module
//! holds the pieces they share; each lens only supplies its endpoint, status policy,
//! and field extraction through [`LookupSource`].

mod error;
mod extract;
mod pacer;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{LookupError, TransportError};
pub use extract::{json_path, value_to_text, Field, FieldReader};
pub use pacer::{Pacer, DEFAULT_PACING_MAX_MS, DEFAULT_PACING_MIN_MS};
pub use transport::{
    path_segment, HttpReply, HttpTransport, SourceRequest, Transport, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_READ_TIMEOUT,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::NetsleuthConfig;

// =============================================================================
// Input and result
// =============================================================================

/// One identifier or an ordered list of identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LookupInput {
    Single(String),
    Many(Vec<String>),
}

impl LookupInput {
    /// Build from command-line style arguments: exactly one value is a scalar lookup,
    /// anything else is a sequence lookup
    pub fn from_args(mut identifiers: Vec<String>) -> Self {
        if identifiers.len() == 1 {
            if let Some(identifier) = identifiers.pop() {
                return LookupInput::Single(identifier);
            }
        }
        LookupInput::Many(identifiers)
    }

    /// The identifiers in input order
    pub fn identifiers(&self) -> &[String] {
        match self {
            LookupInput::Single(identifier) => std::slice::from_ref(identifier),
            LookupInput::Many(identifiers) => identifiers,
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, LookupInput::Single(_))
    }
}

impl From<&str> for LookupInput {
    fn from(identifier: &str) -> Self {
        LookupInput::Single(identifier.to_string())
    }
}

impl From<String> for LookupInput {
    fn from(identifier: String) -> Self {
        LookupInput::Single(identifier)
    }
}

impl From<Vec<String>> for LookupInput {
    fn from(identifiers: Vec<String>) -> Self {
        LookupInput::Many(identifiers)
    }
}

impl From<Vec<&str>> for LookupInput {
    fn from(identifiers: Vec<&str>) -> Self {
        LookupInput::Many(identifiers.into_iter().map(str::to_string).collect())
    }
}

/// Lookup output mirroring the shape of the [`LookupInput`].
///
/// A sequence result holds records in input order. Identifiers whose fetch produced
/// no data are left out, so a `Many` result can be shorter than its input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LookupResult<R> {
    Single(Option<R>),
    Many(Vec<R>),
}

impl<R> LookupResult<R> {
    fn assemble(input: &LookupInput, records: Vec<R>) -> Self {
        if input.is_single() {
            LookupResult::Single(records.into_iter().next())
        } else {
            LookupResult::Many(records)
        }
    }

    pub fn records(&self) -> &[R] {
        match self {
            LookupResult::Single(record) => record.as_slice(),
            LookupResult::Many(records) => records,
        }
    }

    pub fn into_records(self) -> Vec<R> {
        match self {
            LookupResult::Single(record) => record.into_iter().collect(),
            LookupResult::Many(records) => records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }
}

// =============================================================================
// Client
// =============================================================================

/// Transport plus pacing shared by the lenses
pub struct LookupClient {
    transport: Box<dyn Transport>,
    pacer: Pacer,
}

impl LookupClient {
    pub fn new(transport: Box<dyn Transport>, pacer: Pacer) -> Self {
        Self { transport, pacer }
    }

    /// Real HTTP client using the configured timeouts and pacing window
    pub fn from_config(config: &NetsleuthConfig) -> Self {
        Self::new(
            Box::new(HttpTransport::new(
                config.connect_timeout(),
                config.read_timeout(),
            )),
            config.pacer(),
        )
    }

    /// Pause, then issue the request
    pub fn fetch(&self, request: &SourceRequest) -> Result<HttpReply, TransportError> {
        self.pacer.pause();
        self.transport.get(request)
    }
}

impl Default for LookupClient {
    fn default() -> Self {
        Self::new(Box::<HttpTransport>::default(), Pacer::default())
    }
}

// =============================================================================
// Source
// =============================================================================

/// What a source does when the request never produced a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransportPolicy {
    /// Abort the whole lookup
    Fatal,
    /// Report and treat the identifier as having no data
    Continue,
}

/// Per-source behavior plugged into the shared lookup loop
pub(crate) trait LookupSource {
    type Record;

    /// Service name used in log messages and errors
    const SERVICE: &'static str;
    const ON_TRANSPORT_ERROR: TransportPolicy;

    fn client(&self) -> &LookupClient;

    fn request(&self, identifier: &str) -> SourceRequest;

    /// Apply the status policy to a reply. `Ok(None)` means no data for this identifier.
    fn interpret(&self, identifier: &str, reply: HttpReply) -> Result<Option<Value>, LookupError>;

    fn extract(&self, identifier: &str, raw: &Value) -> Self::Record;

    fn fetch_one(&self, identifier: &str) -> Result<Option<Value>, LookupError> {
        let request = self.request(identifier);
        debug!("{}: GET {}", Self::SERVICE, request.url);

        match self.client().fetch(&request) {
            Ok(reply) => self.interpret(identifier, reply),
            // never left the machine, so the service had no chance to answer
            Err(TransportError::InvalidRequest(reason)) => {
                warn!(
                    "{}: cannot build a request for {}: {}",
                    Self::SERVICE,
                    identifier,
                    reason
                );
                Ok(None)
            }
            Err(e) => match Self::ON_TRANSPORT_ERROR {
                TransportPolicy::Fatal => {
                    Err(LookupError::from_transport(Self::SERVICE, identifier, e))
                }
                TransportPolicy::Continue => {
                    warn!("{}: {} for {}", Self::SERVICE, e, identifier);
                    Ok(None)
                }
            },
        }
    }

    fn run(&self, input: &LookupInput) -> Result<LookupResult<Self::Record>, LookupError> {
        let mut records = Vec::with_capacity(input.identifiers().len());
        for identifier in input.identifiers() {
            match self.fetch_one(identifier)? {
                Some(raw) => records.push(self.extract(identifier, &raw)),
                None => info!("{}: no data for {}", Self::SERVICE, identifier),
            }
        }
        Ok(LookupResult::assemble(input, records))
    }
}

/// Parse a 200 body, reporting a body that is not JSON
pub(crate) fn parse_body(service: &str, identifier: &str, reply: &HttpReply) -> Option<Value> {
    match reply.json() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(
                "{}: response for {} is not valid JSON: {}",
                service, identifier, e
            );
            None
        }
    }
}

/// First `errors[].detail` of an error body, or the raw body when absent
pub(crate) fn error_detail(reply: &HttpReply) -> String {
    reply
        .json()
        .ok()
        .and_then(|body| json_path(&body, &["errors", "0", "detail"]).value().map(value_to_text))
        .unwrap_or_else(|| format!("HTTP {}", reply.status))
}
