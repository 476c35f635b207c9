use std::error::Error;

use clap::Args;
use degbench_exp::{invoke_all, ProcessRunner, RunLayout};

use super::ConfigArgs;
use crate::print_json;

#[derive(Args, Debug)]
pub struct InvokeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run(args: &InvokeArgs) -> Result<(), Box<dyn Error>> {
    let config = args.config.resolve()?;
    let layout = RunLayout::new(&config.layout);
    let mut runner = ProcessRunner::from_config(&config.tool);
    let results = invoke_all(&config, &layout, &mut runner)?;
    print_json(&results)
}
