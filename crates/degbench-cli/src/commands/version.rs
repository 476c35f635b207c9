use std::error::Error;
use std::process::Command;

use clap::Args;
use degbench_exp::to_canonical_json_bytes;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Emit JSON metadata including the git commit and the output contract.
    #[arg(long)]
    pub long: bool,
}

#[derive(Debug, Serialize)]
struct VersionInfo {
    version: String,
    git_commit: String,
    default_tool: String,
    timing_pattern: String,
    stats_header: Vec<String>,
}

pub fn run(args: &VersionArgs) -> Result<(), Box<dyn Error>> {
    if !args.long {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    let defaults = degbench_core::ToolConfig::default();
    let info = VersionInfo {
        version: env!("CARGO_PKG_VERSION").into(),
        git_commit: git_commit(),
        default_tool: defaults.program.display().to_string(),
        timing_pattern: degbench_exp::parser::TIMING_PATTERN.into(),
        stats_header: degbench_exp::STATS_HEADER.iter().map(|h| h.to_string()).collect(),
    };
    let json = to_canonical_json_bytes(&info)?;
    println!("{}", String::from_utf8(json)?);
    Ok(())
}

fn git_commit() -> String {
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
        .unwrap_or_else(|| "unknown".into())
}
