use std::error::Error;

use clap::Args;
use degbench_exp::{collect_stats, RunLayout};
use serde_json::json;

use super::ConfigArgs;
use crate::print_json;

#[derive(Args, Debug)]
pub struct CollectArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run(args: &CollectArgs) -> Result<(), Box<dyn Error>> {
    let config = args.config.resolve()?;
    let layout = RunLayout::new(&config.layout);
    let buckets = collect_stats(&config, &layout)?;
    let rows: usize = buckets.iter().map(|bucket| bucket.rows).sum();
    print_json(&json!({
        "stats": layout.stats_path().display().to_string(),
        "rows": rows,
        "buckets": buckets,
    }))
}
