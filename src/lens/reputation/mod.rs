//! Reputation (AbuseIPDB) lookup lens
//!
//! Queries the AbuseIPDB `check` endpoint for reports of malicious activity
//! associated with an IP address over the last 90 days, and classifies the
//! abuse confidence score into a qualitative level.
//!
//! An API key is required; it is sent in the `Key` header of every request.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::NetsleuthConfig;
use crate::lens::lookup::{
    error_detail, json_path, parse_body, value_to_text, FieldReader, HttpReply, LookupClient,
    LookupError, LookupInput, LookupResult, LookupSource, SourceRequest, TransportPolicy,
};

/// Default AbuseIPDB base URL
pub const REPUTATION_API: &str = "https://api.abuseipdb.com";

/// Lookback window for reports, in days
pub const DEFAULT_MAX_AGE_DAYS: u32 = 90;

// =============================================================================
// Types
// =============================================================================

/// Qualitative reading of an abuse confidence score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbuseLevel {
    NotMalicious,
    LikelyNotMalicious,
    LikelyMalicious,
    Malicious,
}

impl AbuseLevel {
    /// Band a confidence score.
    ///
    /// `0` is not malicious, `(0, 25]` likely not malicious, `(25, 100)` likely
    /// malicious, and `100` malicious. Scores outside `[0, 100]` have no level.
    pub fn from_score(score: f64) -> Option<Self> {
        if score == 0.0 {
            Some(AbuseLevel::NotMalicious)
        } else if score == 100.0 {
            Some(AbuseLevel::Malicious)
        } else if score > 25.0 && score < 100.0 {
            Some(AbuseLevel::LikelyMalicious)
        } else if score > 0.0 && score <= 25.0 {
            Some(AbuseLevel::LikelyNotMalicious)
        } else {
            None
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AbuseLevel::NotMalicious => "not malicious",
            AbuseLevel::LikelyNotMalicious => {
                "likely not malicious but warrants further investigation"
            }
            AbuseLevel::LikelyMalicious => "likely malicious and warrants further investigation",
            AbuseLevel::Malicious => "is malicious and warrants additional investigation",
        }
    }
}

impl std::fmt::Display for AbuseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Abuse report summary for one IP address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationRecord {
    pub ip_address: String,
    pub domain_name: Option<String>,
    /// Reverse DNS hostnames, comma separated
    pub host_name: Option<String>,
    pub usage_type: Option<String>,
    pub isp_name: Option<String>,
    pub country_code: Option<String>,
    /// Abuse confidence score, 0 to 100
    pub confidence_of_abuse: Option<String>,
    pub level_of_abuse: Option<String>,
    pub white_listed: Option<String>,
    pub tor_node: Option<String>,
    pub number_of_times_reported: Option<String>,
    pub date_last_reported: Option<String>,
}

// =============================================================================
// Args
// =============================================================================

/// Arguments for reputation lookups
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct ReputationLookupArgs {
    /// IPv4 or IPv6 address(es) to look up
    #[cfg_attr(feature = "cli", clap(value_name = "IP", required = true))]
    pub ip_addresses: Vec<String>,

    /// AbuseIPDB API key (falls back to `reputation_api_key` in the configuration)
    #[cfg_attr(feature = "cli", clap(short = 'k', long))]
    #[serde(default)]
    pub api_key: Option<String>,
}

impl ReputationLookupArgs {
    pub fn new(ip_addresses: Vec<String>) -> Self {
        Self {
            ip_addresses,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn input(&self) -> LookupInput {
        LookupInput::from_args(self.ip_addresses.clone())
    }
}

// =============================================================================
// Lens
// =============================================================================

/// AbuseIPDB lookup lens
pub struct ReputationLens {
    client: LookupClient,
    base_url: String,
    api_key: String,
    max_age_days: u32,
}

impl ReputationLens {
    pub fn new(client: LookupClient, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: REPUTATION_API.to_string(),
            api_key: api_key.into(),
            max_age_days: DEFAULT_MAX_AGE_DAYS,
        }
    }

    /// Build from configuration. An explicit `api_key` takes precedence over the
    /// configured one.
    pub fn from_config(config: &NetsleuthConfig, api_key: Option<String>) -> Self {
        let api_key = api_key
            .or_else(|| config.reputation_api_key.clone())
            .unwrap_or_default();
        Self::new(LookupClient::from_config(config), api_key)
            .with_base_url(&config.reputation_url)
            .with_max_age_days(config.reputation_max_age_days)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_age_days(mut self, max_age_days: u32) -> Self {
        self.max_age_days = max_age_days;
        self
    }

    /// Look up one address or a list of addresses
    pub fn lookup(
        &self,
        input: &LookupInput,
    ) -> Result<LookupResult<ReputationRecord>, LookupError> {
        if self.api_key.trim().is_empty() {
            return Err(LookupError::MissingCredential {
                service: Self::SERVICE,
            });
        }
        self.run(input)
    }
}

impl LookupSource for ReputationLens {
    type Record = ReputationRecord;

    const SERVICE: &'static str = "reputation";
    const ON_TRANSPORT_ERROR: TransportPolicy = TransportPolicy::Continue;

    fn client(&self) -> &LookupClient {
        &self.client
    }

    fn request(&self, identifier: &str) -> SourceRequest {
        SourceRequest::get(format!("{}/api/v2/check", self.base_url))
            .with_query("ipAddress", identifier)
            .with_query("maxAgeInDays", self.max_age_days.to_string())
            .with_header("Accept", "application/json")
            .with_header("Key", self.api_key.as_str())
    }

    fn interpret(&self, identifier: &str, reply: HttpReply) -> Result<Option<Value>, LookupError> {
        match reply.status {
            200 => Ok(parse_body(Self::SERVICE, identifier, &reply)),
            401 => Err(LookupError::Unauthorized {
                service: Self::SERVICE,
                detail: error_detail(&reply),
            }),
            422 | 429 => {
                warn!(
                    "{}: {} ({})",
                    Self::SERVICE,
                    error_detail(&reply),
                    identifier
                );
                Ok(None)
            }
            status => {
                debug!("{}: HTTP {} for {}", Self::SERVICE, status, identifier);
                Ok(None)
            }
        }
    }

    fn extract(&self, identifier: &str, raw: &Value) -> ReputationRecord {
        let reader = FieldReader::new(Self::SERVICE, identifier, raw);

        let level_of_abuse = reader
            .field(&["data", "abuseConfidenceScore"])
            .value()
            .and_then(score_of)
            .and_then(AbuseLevel::from_score)
            .map(|level| level.to_string());

        ReputationRecord {
            ip_address: reader
                .text(&["data", "ipAddress"])
                .unwrap_or_else(|| identifier.to_string()),
            domain_name: reader.text(&["data", "domain"]),
            host_name: reader.text(&["data", "hostnames"]),
            usage_type: reader.text(&["data", "usageType"]),
            isp_name: reader.text(&["data", "isp"]),
            country_code: reader.text(&["data", "countryCode"]),
            confidence_of_abuse: json_path(raw, &["data", "abuseConfidenceScore"])
                .value()
                .map(value_to_text),
            level_of_abuse,
            white_listed: reader.text(&["data", "isWhitelisted"]),
            tor_node: reader.text(&["data", "isTor"]),
            number_of_times_reported: reader.text(&["data", "totalReports"]),
            date_last_reported: reader.text(&["data", "lastReportedAt"]),
        }
    }
}

/// Confidence score as a number; AbuseIPDB sends an integer but a numeric string is accepted
fn score_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lens::lookup::testing::ScriptedTransport;
    use crate::lens::lookup::TransportError;
    use serde_json::json;

    fn check_body(ip: &str, score: i64) -> Value {
        json!({
            "data": {
                "ipAddress": ip,
                "isPublic": true,
                "ipVersion": 4,
                "isWhitelisted": false,
                "abuseConfidenceScore": score,
                "countryCode": "US",
                "usageType": "Data Center/Web Hosting/Transit",
                "isp": "Example Hosting",
                "domain": "example.com",
                "hostnames": ["host1.example.com", "host2.example.com"],
                "isTor": false,
                "totalReports": 12,
                "numDistinctUsers": 4,
                "lastReportedAt": "2024-07-20T14:30:21+00:00"
            }
        })
    }

    #[test]
    fn test_abuse_level_bands() {
        assert_eq!(AbuseLevel::from_score(0.0), Some(AbuseLevel::NotMalicious));
        assert_eq!(
            AbuseLevel::from_score(10.0),
            Some(AbuseLevel::LikelyNotMalicious)
        );
        assert_eq!(
            AbuseLevel::from_score(25.0),
            Some(AbuseLevel::LikelyNotMalicious)
        );
        assert_eq!(
            AbuseLevel::from_score(26.0),
            Some(AbuseLevel::LikelyMalicious)
        );
        assert_eq!(
            AbuseLevel::from_score(50.0),
            Some(AbuseLevel::LikelyMalicious)
        );
        assert_eq!(AbuseLevel::from_score(100.0), Some(AbuseLevel::Malicious));
        assert_eq!(AbuseLevel::from_score(-1.0), None);
        assert_eq!(AbuseLevel::from_score(101.0), None);

        assert_eq!(AbuseLevel::NotMalicious.to_string(), "not malicious");
        assert_eq!(
            AbuseLevel::LikelyNotMalicious.to_string(),
            "likely not malicious but warrants further investigation"
        );
        assert_eq!(
            AbuseLevel::LikelyMalicious.to_string(),
            "likely malicious and warrants further investigation"
        );
        assert_eq!(
            AbuseLevel::Malicious.to_string(),
            "is malicious and warrants additional investigation"
        );
    }

    #[test]
    fn test_full_record() {
        let transport = ScriptedTransport::new().json(200, check_body("118.25.6.39", 50));
        let log = transport.request_log();
        let lens = ReputationLens::new(transport.into_client(), "secret-key");

        let result = lens.lookup(&"118.25.6.39".into()).unwrap();
        assert_eq!(
            result,
            LookupResult::Single(Some(ReputationRecord {
                ip_address: "118.25.6.39".to_string(),
                domain_name: Some("example.com".to_string()),
                host_name: Some("host1.example.com, host2.example.com".to_string()),
                usage_type: Some("Data Center/Web Hosting/Transit".to_string()),
                isp_name: Some("Example Hosting".to_string()),
                country_code: Some("US".to_string()),
                confidence_of_abuse: Some("50".to_string()),
                level_of_abuse: Some(
                    "likely malicious and warrants further investigation".to_string()
                ),
                white_listed: Some("false".to_string()),
                tor_node: Some("false".to_string()),
                number_of_times_reported: Some("12".to_string()),
                date_last_reported: Some("2024-07-20T14:30:21+00:00".to_string()),
            }))
        );

        let requests = log.borrow();
        assert_eq!(requests[0].url, "https://api.abuseipdb.com/api/v2/check");
        assert_eq!(requests[0].query_param("ipAddress"), Some("118.25.6.39"));
        assert_eq!(requests[0].query_param("maxAgeInDays"), Some("90"));
        assert_eq!(requests[0].header("Key"), Some("secret-key"));
    }

    #[test]
    fn test_zero_score_and_never_reported() {
        let mut body = check_body("8.8.8.8", 0);
        body["data"]["lastReportedAt"] = Value::Null;
        body["data"]["hostnames"] = json!([]);
        let lens = ReputationLens::new(ScriptedTransport::new().json(200, body).into_client(), "k");

        let record = lens.lookup(&"8.8.8.8".into()).unwrap().into_records().remove(0);
        assert_eq!(record.confidence_of_abuse.as_deref(), Some("0"));
        assert_eq!(record.level_of_abuse.as_deref(), Some("not malicious"));
        assert_eq!(record.date_last_reported, None);
        assert_eq!(record.host_name, None);
    }

    #[test]
    fn test_missing_score() {
        let mut body = check_body("8.8.8.8", 0);
        body["data"]
            .as_object_mut()
            .unwrap()
            .remove("abuseConfidenceScore");
        let lens = ReputationLens::new(ScriptedTransport::new().json(200, body).into_client(), "k");

        let record = lens.lookup(&"8.8.8.8".into()).unwrap().into_records().remove(0);
        assert_eq!(record.confidence_of_abuse, None);
        assert_eq!(record.level_of_abuse, None);
        assert_eq!(record.isp_name.as_deref(), Some("Example Hosting"));
    }

    #[test]
    fn test_unauthorized_is_fatal() {
        let transport = ScriptedTransport::new()
            .json(
                401,
                json!({"errors": [{"detail": "Authentication failed. Your API key is either missing, incorrect, or revoked.", "status": 401}]}),
            )
            .json(200, check_body("1.1.1.1", 0));
        let log = transport.request_log();
        let lens = ReputationLens::new(transport.into_client(), "bad-key");

        let err = lens
            .lookup(&vec!["8.8.8.8", "1.1.1.1"].into())
            .unwrap_err();
        assert!(matches!(err, LookupError::Unauthorized { .. }));
        assert!(err.to_string().contains("Authentication failed"));
        // the lookup stops at the first identifier
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_validation_and_rate_limit_are_reported_only() {
        let transport = ScriptedTransport::new()
            .json(
                422,
                json!({"errors": [{"detail": "The ip address must be a valid IPv4 or IPv6 address (e.g. 8.8.8.8 or 2001:4860:4860::8888).", "status": 422}]}),
            )
            .json(
                429,
                json!({"errors": [{"detail": "Daily rate limit of 1000 requests exceeded for this endpoint.", "status": 429}]}),
            )
            .json(200, check_body("1.1.1.1", 10));
        let lens = ReputationLens::new(transport.into_client(), "k");

        let result = lens
            .lookup(&vec!["not-an-ip", "8.8.8.8", "1.1.1.1"].into())
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.records()[0].ip_address, "1.1.1.1");
        assert_eq!(
            result.records()[0].level_of_abuse.as_deref(),
            Some("likely not malicious but warrants further investigation")
        );
    }

    #[test]
    fn test_connection_error_continues() {
        let transport = ScriptedTransport::new()
            .fail(TransportError::Connection("refused".to_string()))
            .json(200, check_body("1.1.1.1", 100));
        let lens = ReputationLens::new(transport.into_client(), "k");

        let result = lens.lookup(&vec!["8.8.8.8", "1.1.1.1"].into()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(
            result.records()[0].level_of_abuse.as_deref(),
            Some("is malicious and warrants additional investigation")
        );
    }

    #[test]
    fn test_missing_api_key() {
        let transport = ScriptedTransport::new();
        let log = transport.request_log();
        let lens = ReputationLens::new(transport.into_client(), "");

        let err = lens.lookup(&"8.8.8.8".into()).unwrap_err();
        assert_eq!(
            err,
            LookupError::MissingCredential {
                service: "reputation"
            }
        );
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_score_of() {
        assert_eq!(score_of(&json!(42)), Some(42.0));
        assert_eq!(score_of(&json!("42")), Some(42.0));
        assert_eq!(score_of(&json!(true)), None);
    }
}
