use anyhow::Result;
use netsleuth::lens::registry::{RegistryLens, RegistryLookupArgs};
use netsleuth::{NetsleuthConfig, OutputFormat};

use super::print_result;

pub fn run(
    config: &NetsleuthConfig,
    args: RegistryLookupArgs,
    output_format: OutputFormat,
) -> Result<()> {
    let lens = RegistryLens::from_config(config);
    let result = lens.lookup(&args.input())?;
    print_result(&result, output_format);
    Ok(())
}
