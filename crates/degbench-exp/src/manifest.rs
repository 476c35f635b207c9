use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use degbench_core::errors::{DegError, ErrorInfo};
use degbench_core::ExperimentConfig;
use serde::{Deserialize, Serialize};

use crate::hash::stable_hash_string;
use crate::orchestrator::{BucketStats, InputSummary};
use crate::process::InvocationResult;
use crate::serde::from_json_slice;

/// Record of a completed run: the exact configuration, seeds, every
/// invocation outcome and where the stats landed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub created_at: String,
    pub config: ExperimentConfig,
    /// SHA-256 of the canonical JSON form of `config`.
    pub config_hash: String,
    pub master_seed: u64,
    pub seed_label: Option<String>,
    pub inputs: Vec<InputSummary>,
    pub invocations: Vec<InvocationResult>,
    pub buckets: Vec<BucketStats>,
    pub stats_file: PathBuf,
    /// Total data rows in the stats table.
    pub rows: usize,
}

impl RunManifest {
    pub fn new(
        config: &ExperimentConfig,
        inputs: Vec<InputSummary>,
        invocations: Vec<InvocationResult>,
        buckets: Vec<BucketStats>,
        stats_file: PathBuf,
    ) -> Result<Self, DegError> {
        let rows = buckets.iter().map(|bucket| bucket.rows).sum();
        Ok(Self {
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            config: config.clone(),
            config_hash: stable_hash_string(config)?,
            master_seed: config.seed.master_seed,
            seed_label: config.seed.label.clone(),
            inputs,
            invocations,
            buckets,
            stats_file,
            rows,
        })
    }

    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), DegError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                DegError::Io(
                    ErrorInfo::new("manifest-mkdir", err.to_string())
                        .with_context("path", parent.display()),
                )
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            DegError::Serde(
                ErrorInfo::new("manifest-serialize", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        fs::write(path, json).map_err(|err| {
            DegError::Io(
                ErrorInfo::new("manifest-write", err.to_string())
                    .with_context("path", path.display()),
            )
        })
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, DegError> {
        let bytes = fs::read(path).map_err(|err| {
            DegError::Io(
                ErrorInfo::new("manifest-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        from_json_slice(&bytes)
    }
}
