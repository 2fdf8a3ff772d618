use anyhow::Result;
use netsleuth::{NetsleuthConfig, OutputFormat};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ConfigInfo<'a> {
    config_file: String,
    registry_url: &'a str,
    reputation_url: &'a str,
    geolocation_url: &'a str,
    vendor_url: &'a str,
    reputation_api_key_set: bool,
    reputation_max_age_days: u32,
    pacing_min_ms: u64,
    pacing_max_ms: u64,
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
}

pub fn run(config: &NetsleuthConfig, output_format: OutputFormat) -> Result<()> {
    if !output_format.is_json() {
        println!("{}", config.summary());
        return Ok(());
    }

    let info = ConfigInfo {
        config_file: NetsleuthConfig::config_file_path(),
        registry_url: &config.registry_url,
        reputation_url: &config.reputation_url,
        geolocation_url: &config.geolocation_url,
        vendor_url: &config.vendor_url,
        reputation_api_key_set: config.reputation_api_key.is_some(),
        reputation_max_age_days: config.reputation_max_age_days,
        pacing_min_ms: config.pacing_min_ms,
        pacing_max_ms: config.pacing_max_ms,
        connect_timeout_secs: config.connect_timeout_secs,
        read_timeout_secs: config.read_timeout_secs,
    };

    let json = match output_format {
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&info)?,
        _ => serde_json::to_string(&info)?,
    };
    println!("{}", json);
    Ok(())
}
