pub mod collect;
pub mod generate;
pub mod invoke;
pub mod plan;
pub mod run;
pub mod version;

use std::path::PathBuf;

use clap::Args;
use degbench_core::{Alphabet, DegError, ExperimentConfig, PairingPolicy};

/// Configuration source shared by every experiment command. Flags override
/// the YAML file, which overrides the built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// YAML experiment configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Root folder for inputs, outputs, stats and the manifest.
    #[arg(long)]
    pub root: Option<PathBuf>,
    /// Path of the analysis tool executable.
    #[arg(long)]
    pub tool: Option<PathBuf>,
    /// Master seed for corpus generation.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Per-invocation wall-clock limit in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Comma separated sequence lengths, one input file each.
    #[arg(long, value_delimiter = ',')]
    pub lengths: Vec<usize>,
    /// Comma separated degeneracy counts.
    #[arg(long, value_delimiter = ',')]
    pub degeneracies: Vec<usize>,
    /// Base sequences per length bucket.
    #[arg(long)]
    pub replicates: Option<usize>,
    /// Base alphabet, e.g. ACGT.
    #[arg(long)]
    pub alphabet: Option<String>,
    /// Block pairing policy: positional or verified.
    #[arg(long)]
    pub pairing: Option<PairingPolicy>,
}

impl ConfigArgs {
    /// Loads the configuration, applies flag overrides and validates the
    /// result.
    pub fn resolve(&self) -> Result<ExperimentConfig, DegError> {
        let mut config = match &self.config {
            Some(path) => ExperimentConfig::load(path)?,
            None => ExperimentConfig::default(),
        };
        if let Some(root) = &self.root {
            config.layout.root = root.clone();
        }
        if let Some(tool) = &self.tool {
            config.tool.program = tool.clone();
        }
        if let Some(seed) = self.seed {
            config.seed.master_seed = seed;
        }
        if let Some(secs) = self.timeout_secs {
            config.tool.timeout_secs = Some(secs);
        }
        if !self.lengths.is_empty() {
            config.grid.lengths = self.lengths.clone();
        }
        if !self.degeneracies.is_empty() {
            config.grid.degeneracies = self.degeneracies.clone();
        }
        if let Some(replicates) = self.replicates {
            config.grid.replicates = replicates;
        }
        if let Some(alphabet) = &self.alphabet {
            config.alphabet = Alphabet::new(alphabet.as_str())?;
        }
        if let Some(pairing) = self.pairing {
            config.pairing = pairing;
        }
        config.validate()?;
        Ok(config)
    }
}
