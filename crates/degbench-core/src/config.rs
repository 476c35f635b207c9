//! Experiment configuration: the parameter grid, alphabet, filesystem layout,
//! tool contract and seeding policy.
//!
//! A configuration is built once (from YAML or defaults), validated, and then
//! passed by reference into every component. Nothing here is mutated after
//! [`ExperimentConfig::validate`] succeeds.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{DegError, ErrorInfo};

const RESERVED_SYMBOLS: &[u8] = b"{}>";

fn config_error(code: &str, message: impl Into<String>) -> DegError {
    DegError::Config(ErrorInfo::new(code, message))
}

/// Top-level experiment description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExperimentConfig {
    /// Lengths, degeneracy counts and replicate count.
    #[serde(default)]
    pub grid: ParameterGrid,
    /// Base symbols drawn for unambiguous positions.
    #[serde(default)]
    pub alphabet: Alphabet,
    /// Where corpora, tool outputs and stats are written.
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Command-line contract of the external tool.
    #[serde(default)]
    pub tool: ToolConfig,
    /// Master seed for corpus generation.
    #[serde(default)]
    pub seed: SeedPolicy,
    /// How parsed output blocks are matched to grid values.
    #[serde(default)]
    pub pairing: PairingPolicy,
}

impl ExperimentConfig {
    /// Loads and validates a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, DegError> {
        let text = fs::read_to_string(path).map_err(|err| {
            DegError::Config(
                ErrorInfo::new("config-read", err.to_string()).with_context("path", path.display()),
            )
        })?;
        let config = Self::from_yaml_str(&text).map_err(|err| match err {
            DegError::Serde(info) => {
                DegError::Serde(info.with_context("path", path.display()))
            }
            other => other,
        })?;
        Ok(config)
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, DegError> {
        let config: Self = serde_yaml::from_str(text).map_err(|err| {
            DegError::Serde(ErrorInfo::new("config-yaml-parse", err.to_string()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises the configuration back to YAML.
    pub fn to_yaml_string(&self) -> Result<String, DegError> {
        serde_yaml::to_string(self)
            .map_err(|err| DegError::Serde(ErrorInfo::new("config-yaml-write", err.to_string())))
    }

    /// Checks every cross-field constraint of the configuration.
    pub fn validate(&self) -> Result<(), DegError> {
        self.grid.validate()?;
        self.alphabet.validate()?;
        let needs_subsets = self.grid.degeneracies.iter().any(|&d| d > 0);
        if needs_subsets && self.alphabet.len() < 2 {
            return Err(DegError::Config(
                ErrorInfo::new(
                    "alphabet-too-small",
                    "degenerate symbols need an alphabet of at least two symbols",
                )
                .with_context("alphabet", self.alphabet.as_str()),
            ));
        }
        self.tool.validate()?;
        self.layout.validate()?;
        Ok(())
    }
}

/// Ordered candidate lengths and degeneracy counts plus the replicate count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterGrid {
    /// Sequence lengths, one input file per entry, in declared order.
    #[serde(default = "default_lengths")]
    pub lengths: Vec<usize>,
    /// Degeneracy counts applied to every base sequence, in declared order.
    #[serde(default = "default_degeneracies")]
    pub degeneracies: Vec<usize>,
    /// Number of base sequences generated per length bucket.
    #[serde(default = "default_replicates")]
    pub replicates: usize,
}

fn default_lengths() -> Vec<usize> {
    vec![1000, 2000, 4000, 8000, 16000, 32000, 64000]
}

fn default_degeneracies() -> Vec<usize> {
    vec![5, 10, 20, 40, 80]
}

fn default_replicates() -> usize {
    1
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self {
            lengths: default_lengths(),
            degeneracies: default_degeneracies(),
            replicates: default_replicates(),
        }
    }
}

impl ParameterGrid {
    /// Number of records (and therefore output blocks) in one bucket.
    pub fn records_per_bucket(&self) -> usize {
        self.replicates * self.degeneracies.len()
    }

    /// Iterates `(bucket index, length)` in declared order.
    pub fn buckets(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.lengths.iter().copied().enumerate()
    }

    /// The replicate x degeneracy expansion expected for one bucket, in
    /// emission order.
    pub fn expected_pairs(&self, length: usize) -> Vec<(usize, usize)> {
        let mut pairs = Vec::with_capacity(self.records_per_bucket());
        for _ in 0..self.replicates {
            for &d in &self.degeneracies {
                pairs.push((length, d));
            }
        }
        pairs
    }

    fn validate(&self) -> Result<(), DegError> {
        if self.lengths.is_empty() {
            return Err(config_error("grid-empty-lengths", "grid.lengths is empty"));
        }
        if self.degeneracies.is_empty() {
            return Err(config_error(
                "grid-empty-degeneracies",
                "grid.degeneracies is empty",
            ));
        }
        if self.replicates == 0 {
            return Err(config_error("grid-replicates", "grid.replicates must be >= 1"));
        }
        if let Some(idx) = self.lengths.iter().position(|&n| n == 0) {
            return Err(DegError::Config(
                ErrorInfo::new("grid-zero-length", "sequence lengths must be >= 1")
                    .with_context("index", idx),
            ));
        }
        let min_len = self.lengths.iter().copied().min().unwrap_or(0);
        let max_deg = self.degeneracies.iter().copied().max().unwrap_or(0);
        if max_deg > min_len {
            return Err(DegError::Config(
                ErrorInfo::new(
                    "degeneracy-exceeds-length",
                    "a degeneracy count exceeds a sequence length it is paired with",
                )
                .with_context("length", min_len)
                .with_context("degeneracy", max_deg),
            ));
        }
        Ok(())
    }
}

/// Alphabet of base symbols, written as a plain string (`"ACGT"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alphabet(String);

impl Default for Alphabet {
    fn default() -> Self {
        Self("ACGT".to_string())
    }
}

impl Alphabet {
    /// Builds and validates an alphabet.
    pub fn new(symbols: impl Into<String>) -> Result<Self, DegError> {
        let alphabet = Self(symbols.into());
        alphabet.validate()?;
        Ok(alphabet)
    }

    /// Symbols as bytes, in declared order.
    pub fn symbols(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn validate(&self) -> Result<(), DegError> {
        if self.0.is_empty() {
            return Err(config_error("alphabet-empty", "alphabet is empty"));
        }
        let mut seen = BTreeSet::new();
        for &byte in self.0.as_bytes() {
            if !byte.is_ascii_graphic() || RESERVED_SYMBOLS.contains(&byte) {
                return Err(DegError::Config(
                    ErrorInfo::new("alphabet-symbol", "alphabet symbol is not allowed")
                        .with_context("symbol", char::from(byte).escape_default())
                        .with_hint("use printable ASCII other than '{', '}' and '>'"),
                ));
            }
            if !seen.insert(byte) {
                return Err(DegError::Config(
                    ErrorInfo::new("alphabet-duplicate", "alphabet symbol repeated")
                        .with_context("symbol", char::from(byte)),
                ));
            }
        }
        Ok(())
    }
}

/// Filesystem layout of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Root folder of the run; created on demand.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Subfolder of `root` holding input, output and log files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_input_prefix")]
    pub input_prefix: String,
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
    /// Stats table filename relative to `root`.
    #[serde(default = "default_stats_file")]
    pub stats_file: PathBuf,
    /// Run manifest filename relative to `root`.
    #[serde(default = "default_manifest_file")]
    pub manifest_file: PathBuf,
}

fn default_root() -> PathBuf {
    PathBuf::from("./experiments")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_input_prefix() -> String {
    "input".to_string()
}

fn default_output_prefix() -> String {
    "output".to_string()
}

fn default_log_prefix() -> String {
    "tool".to_string()
}

fn default_stats_file() -> PathBuf {
    PathBuf::from("stats.txt")
}

fn default_manifest_file() -> PathBuf {
    PathBuf::from("run.json")
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            data_dir: default_data_dir(),
            input_prefix: default_input_prefix(),
            output_prefix: default_output_prefix(),
            log_prefix: default_log_prefix(),
            stats_file: default_stats_file(),
            manifest_file: default_manifest_file(),
        }
    }
}

impl LayoutConfig {
    fn validate(&self) -> Result<(), DegError> {
        let prefixes = [
            ("input_prefix", &self.input_prefix),
            ("output_prefix", &self.output_prefix),
            ("log_prefix", &self.log_prefix),
        ];
        for (field, value) in prefixes {
            if value.is_empty() {
                return Err(DegError::Config(
                    ErrorInfo::new("layout-prefix", "file prefix is empty")
                        .with_context("field", field),
                ));
            }
        }
        if self.input_prefix == self.output_prefix {
            return Err(DegError::Config(
                ErrorInfo::new(
                    "layout-prefix-clash",
                    "input and output prefixes must differ",
                )
                .with_context("prefix", &self.input_prefix),
            ));
        }
        Ok(())
    }
}

/// Command-line contract of the external analysis tool:
/// `<program> -a <alphabet_type> -i <input> -o <output>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_program")]
    pub program: PathBuf,
    /// Value passed to `-a`.
    #[serde(default = "default_alphabet_type")]
    pub alphabet_type: String,
    /// Wall-clock limit per invocation; unbounded when absent.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Redirect the tool's stdout/stderr into per-bucket log files.
    #[serde(default = "default_capture_logs")]
    pub capture_logs: bool,
}

fn default_program() -> PathBuf {
    PathBuf::from("./bin/degLPF")
}

fn default_alphabet_type() -> String {
    "DNA".to_string()
}

fn default_capture_logs() -> bool {
    true
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            alphabet_type: default_alphabet_type(),
            timeout_secs: None,
            capture_logs: default_capture_logs(),
        }
    }
}

impl ToolConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn validate(&self) -> Result<(), DegError> {
        if self.program.as_os_str().is_empty() {
            return Err(config_error("tool-program", "tool.program is empty"));
        }
        if self.alphabet_type.trim().is_empty() {
            return Err(config_error("tool-alphabet-type", "tool.alphabet_type is empty"));
        }
        if self.timeout_secs == Some(0) {
            return Err(DegError::Config(
                ErrorInfo::new("tool-timeout", "tool.timeout_secs must be positive")
                    .with_hint("omit the field for an unbounded wait"),
            ));
        }
        Ok(())
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed; bucket `i` uses substream `i`.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label recorded in the run manifest.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0xDE6E_4E2A_7E5E_ED00_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

/// Matching rule between parsed output blocks and expected grid values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PairingPolicy {
    /// The i-th block takes the i-th expected `(n, k)`; parsed values are not
    /// compared.
    #[default]
    Positional,
    /// As `Positional`, but the parsed size and degeneracy must equal the
    /// expected pair.
    Verified,
}

impl fmt::Display for PairingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairingPolicy::Positional => write!(f, "positional"),
            PairingPolicy::Verified => write!(f, "verified"),
        }
    }
}

impl FromStr for PairingPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "positional" => Ok(PairingPolicy::Positional),
            "verified" => Ok(PairingPolicy::Verified),
            other => Err(format!(
                "unknown pairing policy '{other}' (expected 'positional' or 'verified')"
            )),
        }
    }
}
