use std::error::Error;

use clap::Args;
use degbench_exp::{generate_inputs, RunLayout};

use super::ConfigArgs;
use crate::print_json;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let config = args.config.resolve()?;
    let layout = RunLayout::new(&config.layout);
    let inputs = generate_inputs(&config, &layout)?;
    print_json(&inputs)
}
