use std::fs;
use std::path::PathBuf;

use degbench_core::errors::DegError;
use degbench_core::LayoutConfig;

/// Resolved on-disk layout of a run: `root/` holds the stats table and the
/// manifest, `root/data_dir/` holds one input, output and log file per bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    config: LayoutConfig,
    data: PathBuf,
}

impl RunLayout {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            config: config.clone(),
            data: config.root.join(&config.data_dir),
        }
    }

    /// `input{index}.txt`
    pub fn input_path(&self, index: usize) -> PathBuf {
        self.data
            .join(format!("{}{}.txt", self.config.input_prefix, index))
    }

    /// `output{index}.txt`, written by the external tool.
    pub fn output_path(&self, index: usize) -> PathBuf {
        self.data
            .join(format!("{}{}.txt", self.config.output_prefix, index))
    }

    /// Captured stdout/stderr of the tool for one bucket.
    pub fn log_path(&self, index: usize) -> PathBuf {
        self.data
            .join(format!("{}{}.log", self.config.log_prefix, index))
    }

    pub fn stats_path(&self) -> PathBuf {
        self.config.root.join(&self.config.stats_file)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.config.root.join(&self.config.manifest_file)
    }

    /// Creates the root and data directories.
    pub fn ensure_dirs(&self) -> Result<(), DegError> {
        fs::create_dir_all(&self.data).map_err(|err| DegError::io("layout-mkdir", &self.data, err))
    }
}
