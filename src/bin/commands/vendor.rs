use anyhow::Result;
use netsleuth::lens::vendor::{VendorLens, VendorLookupArgs};
use netsleuth::{NetsleuthConfig, OutputFormat};

use super::print_result;

pub fn run(
    config: &NetsleuthConfig,
    args: VendorLookupArgs,
    output_format: OutputFormat,
) -> Result<()> {
    let lens = VendorLens::from_config(config);
    let result = lens.lookup(&args.input())?;
    print_result(&result, output_format);
    Ok(())
}
