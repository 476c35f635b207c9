use std::error::Error;

use clap::Args;
use degbench_exp::RunLayout;

use super::ConfigArgs;

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Prints the validated configuration as YAML followed by one comment line
/// per bucket, so the output still parses as YAML.
pub fn run(args: &PlanArgs) -> Result<(), Box<dyn Error>> {
    let config = args.config.resolve()?;
    let layout = RunLayout::new(&config.layout);
    print!("{}", config.to_yaml_string()?);
    for (index, length) in config.grid.buckets() {
        println!(
            "# bucket {index}: n={length} records={} input={} output={}",
            config.grid.records_per_bucket(),
            layout.input_path(index).display(),
            layout.output_path(index).display(),
        );
    }
    println!("# stats: {}", layout.stats_path().display());
    Ok(())
}
