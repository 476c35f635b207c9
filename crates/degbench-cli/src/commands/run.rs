use std::error::Error;

use clap::Args;
use degbench_exp::{run_pipeline, ProcessRunner};
use serde_json::json;
use tracing::info;

use super::ConfigArgs;
use crate::print_json;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let config = args.config.resolve()?;
    let mut runner = ProcessRunner::from_config(&config.tool);
    info!(
        buckets = config.grid.lengths.len(),
        tool = %config.tool.program.display(),
        "starting run"
    );
    let manifest = run_pipeline(&config, &mut runner)?;
    print_json(&json!({
        "stats": manifest.stats_file.display().to_string(),
        "rows": manifest.rows,
        "config_hash": manifest.config_hash,
        "master_seed": manifest.master_seed,
    }))
}
