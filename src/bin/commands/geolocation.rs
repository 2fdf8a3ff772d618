use anyhow::Result;
use netsleuth::lens::geolocation::{GeolocationLens, GeolocationLookupArgs};
use netsleuth::{NetsleuthConfig, OutputFormat};

use super::print_result;

pub fn run(
    config: &NetsleuthConfig,
    args: GeolocationLookupArgs,
    output_format: OutputFormat,
) -> Result<()> {
    let lens = GeolocationLens::from_config(config);
    let result = lens.lookup(&args.input())?;
    print_result(&result, output_format);
    Ok(())
}
