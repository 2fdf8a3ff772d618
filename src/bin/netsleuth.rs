use clap::{CommandFactory, Parser, Subcommand};
use netsleuth::lens::geolocation::GeolocationLookupArgs;
use netsleuth::lens::registry::RegistryLookupArgs;
use netsleuth::lens::reputation::ReputationLookupArgs;
use netsleuth::lens::vendor::VendorLookupArgs;
use netsleuth::{NetsleuthConfig, OutputFormat};
use tracing::Level;

mod commands;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.netsleuth/netsleuth.toml is used
    #[clap(short, long, global = true)]
    config: Option<String>,

    /// Print debug information
    #[clap(long, global = true)]
    debug: bool,

    /// Output format: table, markdown, json, json-pretty, json-line, psv
    #[clap(short, long, global = true, default_value = "json-pretty")]
    format: OutputFormat,

    /// Skip the random delay before each request
    #[clap(long, global = true)]
    no_pacing: bool,

    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// ARIN WHOIS lookup for one or more IP addresses
    Arin(RegistryLookupArgs),

    /// AbuseIPDB reputation lookup for one or more IP addresses
    Abuse(ReputationLookupArgs),

    /// IP geolocation lookup for one or more IP addresses
    Geo(GeolocationLookupArgs),

    /// Vendor lookup for one or more MAC addresses
    Mac(VendorLookupArgs),

    /// Show the effective configuration
    Config,
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        if let Err(e) = Cli::command().print_help() {
            eprintln!("{e}");
        }
        std::process::exit(1);
    };

    let mut config = match NetsleuthConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {e}");
            std::process::exit(1);
        }
    };
    if cli.no_pacing {
        config.pacing_min_ms = 0;
        config.pacing_max_ms = 0;
    }

    let output_format = cli.format;
    let outcome = match command {
        Commands::Arin(args) => commands::registry::run(&config, args, output_format),
        Commands::Abuse(args) => commands::reputation::run(&config, args, output_format),
        Commands::Geo(args) => commands::geolocation::run(&config, args, output_format),
        Commands::Mac(args) => commands::vendor::run(&config, args, output_format),
        Commands::Config => commands::config::run(&config, output_format),
    };

    if let Err(e) = outcome {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}
