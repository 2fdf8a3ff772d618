use anyhow::Result;
use netsleuth::lens::reputation::{ReputationLens, ReputationLookupArgs};
use netsleuth::{NetsleuthConfig, OutputFormat};

use super::print_result;

pub fn run(
    config: &NetsleuthConfig,
    args: ReputationLookupArgs,
    output_format: OutputFormat,
) -> Result<()> {
    let input = args.input();
    let lens = ReputationLens::from_config(config, args.api_key);
    let result = lens.lookup(&input)?;
    print_result(&result, output_format);
    Ok(())
}
