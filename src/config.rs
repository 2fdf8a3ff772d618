use anyhow::{anyhow, Result};
use config::Config;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::lens::geolocation::GEOLOCATION_API;
use crate::lens::lookup::{Pacer, DEFAULT_PACING_MAX_MS, DEFAULT_PACING_MIN_MS};
use crate::lens::registry::REGISTRY_API;
use crate::lens::reputation::{DEFAULT_MAX_AGE_DAYS, REPUTATION_API};
use crate::lens::vendor::VENDOR_API;

pub struct NetsleuthConfig {
    /// Base URL of the ARIN WHOIS-RWS service
    pub registry_url: String,

    /// Base URL of the AbuseIPDB API
    pub reputation_url: String,

    /// Base URL of the ip-api.com service
    pub geolocation_url: String,

    /// Base URL of the maclookup.app API
    pub vendor_url: String,

    /// AbuseIPDB API key
    pub reputation_api_key: Option<String>,

    /// Only consider abuse reports younger than this many days (default: 90)
    pub reputation_max_age_days: u32,

    /// Pacing window before each request, in milliseconds (default: 1000-3000)
    pub pacing_min_ms: u64,
    pub pacing_max_ms: u64,

    /// Connect timeout in seconds (default: 5)
    pub connect_timeout_secs: u64,

    /// Read timeout in seconds (default: 10)
    pub read_timeout_secs: u64,
}

const EMPTY_CONFIG: &str = r#"### netsleuth configuration file

### AbuseIPDB API key, required by the `abuse` command
# reputation_api_key = ""
# reputation_max_age_days = 90

### service endpoints
# registry_url = "https://whois.arin.net"
# reputation_url = "https://api.abuseipdb.com"
# geolocation_url = "http://ip-api.com"
# vendor_url = "https://api.maclookup.app"

### random delay before each request (milliseconds)
# pacing_min_ms = 1000
# pacing_max_ms = 3000

### request timeouts (seconds)
# connect_timeout_secs = 5
# read_timeout_secs = 10
"#;

impl Default for NetsleuthConfig {
    fn default() -> Self {
        Self {
            registry_url: REGISTRY_API.to_string(),
            reputation_url: REPUTATION_API.to_string(),
            geolocation_url: GEOLOCATION_API.to_string(),
            vendor_url: VENDOR_API.to_string(),
            reputation_api_key: None,
            reputation_max_age_days: DEFAULT_MAX_AGE_DAYS,
            pacing_min_ms: DEFAULT_PACING_MIN_MS,
            pacing_max_ms: DEFAULT_PACING_MAX_MS,
            connect_timeout_secs: 5,
            read_timeout_secs: 10,
        }
    }
}

impl NetsleuthConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<NetsleuthConfig> {
        let mut builder = Config::builder();

        // Add in toml configuration file
        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                // By default use $HOME/.netsleuth/netsleuth.toml as the configuration file path
                let home_dir = dirs::home_dir()
                    .ok_or_else(|| anyhow!("Could not find home directory"))?
                    .to_str()
                    .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
                    .to_owned();
                let netsleuth_dir = format!("{}/.netsleuth", home_dir.as_str());

                std::fs::create_dir_all(netsleuth_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create netsleuth directory: {}", e))?;
                let p = format!("{}/netsleuth.toml", netsleuth_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // Add in settings from the environment (with a prefix of NETSLEUTH)
        // E.g., `NETSLEUTH_REPUTATION_API_KEY=... ./netsleuth abuse 1.2.3.4` sets the API key
        builder = builder.add_source(config::Environment::with_prefix("NETSLEUTH"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        Self::from_map(&config)
    }

    /// Build from flat key/value settings, falling back to defaults for absent keys
    fn from_map(config: &HashMap<String, String>) -> Result<NetsleuthConfig> {
        let defaults = NetsleuthConfig::default();

        let url = |key: &str, default: String| -> String {
            config
                .get(key)
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(default)
        };

        let number = |key: &str, default: u64| -> Result<u64> {
            match config.get(key) {
                Some(s) => s
                    .trim()
                    .parse()
                    .map_err(|e| anyhow!("Invalid value for {}: {} ({})", key, s, e)),
                None => Ok(default),
            }
        };

        let reputation_max_age_days = number(
            "reputation_max_age_days",
            defaults.reputation_max_age_days as u64,
        )?;
        let reputation_max_age_days = u32::try_from(reputation_max_age_days)
            .map_err(|_| anyhow!("reputation_max_age_days is out of range"))?;

        Ok(NetsleuthConfig {
            registry_url: url("registry_url", defaults.registry_url),
            reputation_url: url("reputation_url", defaults.reputation_url),
            geolocation_url: url("geolocation_url", defaults.geolocation_url),
            vendor_url: url("vendor_url", defaults.vendor_url),
            reputation_api_key: config
                .get("reputation_api_key")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            reputation_max_age_days,
            pacing_min_ms: number("pacing_min_ms", defaults.pacing_min_ms)?,
            pacing_max_ms: number("pacing_max_ms", defaults.pacing_max_ms)?,
            connect_timeout_secs: number("connect_timeout_secs", defaults.connect_timeout_secs)?,
            read_timeout_secs: number("read_timeout_secs", defaults.read_timeout_secs)?,
        })
    }

    /// Get connect timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Get read timeout as Duration
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Pacer for the configured window
    pub fn pacer(&self) -> Pacer {
        Pacer::from_millis(self.pacing_min_ms, self.pacing_max_ms)
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let api_key = match &self.reputation_api_key {
            Some(key) => mask_key(key),
            None => "(not set)".to_string(),
        };
        [
            format!("Config File:        {}", Self::config_file_path()),
            format!("Registry URL:       {}", self.registry_url),
            format!("Reputation URL:     {}", self.reputation_url),
            format!("Geolocation URL:    {}", self.geolocation_url),
            format!("Vendor URL:         {}", self.vendor_url),
            format!("AbuseIPDB API Key:  {}", api_key),
            format!("Report Max Age:     {} days", self.reputation_max_age_days),
            format!(
                "Pacing:             {}-{} ms",
                self.pacing_min_ms, self.pacing_max_ms
            ),
            format!(
                "Timeouts:           connect {} s, read {} s",
                self.connect_timeout_secs, self.read_timeout_secs
            ),
        ]
        .join("\n")
    }

    /// Get the config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.netsleuth/netsleuth.toml", home_dir)
    }
}

/// Keep the last four characters of a secret
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_map() {
        let config = NetsleuthConfig::from_map(&HashMap::new()).unwrap();
        assert_eq!(config.registry_url, "https://whois.arin.net");
        assert_eq!(config.reputation_max_age_days, 90);
        assert_eq!(config.reputation_api_key, None);
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.read_timeout(), Duration::from_secs(10));
        assert_eq!(config.pacer(), Pacer::from_millis(1000, 3000));
    }

    #[test]
    fn test_values_from_map() {
        let map: HashMap<String, String> = [
            ("vendor_url", "http://localhost:9000/"),
            ("reputation_api_key", " abcdef123456 "),
            ("pacing_min_ms", "0"),
            ("pacing_max_ms", "0"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = NetsleuthConfig::from_map(&map).unwrap();
        assert_eq!(config.vendor_url, "http://localhost:9000");
        assert_eq!(config.reputation_api_key.as_deref(), Some("abcdef123456"));
        assert!(config.pacer().is_disabled());
    }

    #[test]
    fn test_invalid_number() {
        let map: HashMap<String, String> =
            [("read_timeout_secs".to_string(), "soon".to_string())].into();
        let err = NetsleuthConfig::from_map(&map).err().unwrap();
        assert!(err.to_string().contains("read_timeout_secs"));
    }

    #[test]
    fn test_summary_masks_key() {
        let config = NetsleuthConfig {
            reputation_api_key: Some("abcdef123456".to_string()),
            ..Default::default()
        };
        let summary = config.summary();
        assert!(summary.contains("****3456"));
        assert!(!summary.contains("abcdef"));
        assert_eq!(mask_key("abc"), "****");
    }

    #[test]
    fn test_new_creates_and_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netsleuth.toml");
        let path_str = path.to_str().unwrap().to_string();

        // first run writes the commented template
        let config = NetsleuthConfig::new(&Some(path_str.clone())).unwrap();
        assert!(path.exists());
        assert_eq!(config.geolocation_url, "http://ip-api.com");

        std::fs::write(
            &path,
            "geolocation_url = \"http://127.0.0.1:8080\"\nreputation_max_age_days = 30\n",
        )
        .unwrap();
        let config = NetsleuthConfig::new(&Some(path_str)).unwrap();
        assert_eq!(config.geolocation_url, "http://127.0.0.1:8080");
        assert_eq!(config.reputation_max_age_days, 30);
    }
}
