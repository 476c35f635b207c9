//! Three-phase experiment driver: generate every input file, invoke the tool
//! on every bucket, then parse every output into the stats table. Each phase
//! finishes for all buckets before the next one starts, and buckets are
//! processed one at a time in grid order.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use degbench_core::errors::{DegError, ErrorInfo};
use degbench_core::{ExperimentConfig, RngHandle};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::corpus::{generate_base_sequence, inject_degenerate_symbols, InputFileWriter};
use crate::layout::RunLayout;
use crate::manifest::RunManifest;
use crate::parser::parse_output_file;
use crate::process::{Invocation, InvocationResult, ToolRunner};
use crate::stats::{aggregate, StatsRow, StatsWriter};

/// One generated input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSummary {
    pub index: usize,
    pub length: usize,
    pub path: PathBuf,
    pub records: usize,
    /// Seed of the bucket's RNG substream.
    pub seed: u64,
}

/// Rows contributed by one output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketStats {
    pub index: usize,
    pub length: usize,
    pub output: PathBuf,
    pub rows: usize,
}

/// Phase 1: writes `input{i}.txt` for every length bucket.
///
/// Bucket `i` draws from RNG substream `i` of the master seed. Each replicate
/// is one fresh base sequence, annotated once per degeneracy count in grid
/// order.
pub fn generate_inputs(
    config: &ExperimentConfig,
    layout: &RunLayout,
) -> Result<Vec<InputSummary>, DegError> {
    info!(
        buckets = config.grid.lengths.len(),
        records_per_bucket = config.grid.records_per_bucket(),
        "generating input files"
    );
    layout.ensure_dirs()?;
    let mut summaries = Vec::with_capacity(config.grid.lengths.len());
    for (index, length) in config.grid.buckets() {
        let mut rng = RngHandle::for_bucket(config.seed.master_seed, index);
        let path = layout.input_path(index);
        let mut writer = InputFileWriter::create(&path)?;
        for replicate in 0..config.grid.replicates {
            let base = generate_base_sequence(&config.alphabet, length, &mut rng)?;
            for &degeneracy in &config.grid.degeneracies {
                let record =
                    inject_degenerate_symbols(&base, degeneracy, &config.alphabet, &mut rng)?;
                writer.append(&record)?;
            }
            debug!(index, length, replicate, "replicate written");
        }
        let records = writer.finish()?;
        debug!(path = %path.display(), records, "input file closed");
        summaries.push(InputSummary {
            index,
            length,
            path,
            records,
            seed: rng.seed(),
        });
    }
    info!("file generation complete");
    Ok(summaries)
}

/// Phase 2: runs the tool once per bucket, stopping at the first invocation
/// that does not succeed.
///
/// Any `output{i}.txt` left by an earlier run is removed before the tool
/// starts, so a tool that writes nothing surfaces as `missing-output`.
pub fn invoke_all<R: ToolRunner + ?Sized>(
    config: &ExperimentConfig,
    layout: &RunLayout,
    runner: &mut R,
) -> Result<Vec<InvocationResult>, DegError> {
    let mut results = Vec::with_capacity(config.grid.lengths.len());
    for (index, length) in config.grid.buckets() {
        let input = layout.input_path(index);
        if !input.exists() {
            return Err(DegError::Io(
                ErrorInfo::new("missing-input", "input file has not been generated")
                    .with_context("path", input.display())
                    .with_hint("run the generate phase first"),
            ));
        }
        let output = layout.output_path(index);
        clear_stale_output(&output)?;
        let log_path = config.tool.capture_logs.then(|| layout.log_path(index));
        let invocation = Invocation::for_bucket(&config.tool, &input, &output, log_path);
        info!(index, length, command = %invocation.command_line(), "invoking tool");
        let result = runner.run(&invocation)?;
        info!(
            index,
            duration = ?result.duration(),
            exit_code = ?result.exit_code,
            status = ?result.status,
            "tool finished"
        );
        results.push(result.ensure_success()?);
    }
    info!("file processing complete");
    Ok(results)
}

fn clear_stale_output(path: &Path) -> Result<(), DegError> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed stale output");
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(DegError::io("output-clear", path, err)),
    }
}

/// Parses one output file into stats rows for a bucket of `length`.
pub fn collect_bucket(
    config: &ExperimentConfig,
    output: &Path,
    length: usize,
) -> Result<Vec<StatsRow>, DegError> {
    let blocks = parse_output_file(output)?;
    let expected = config.grid.expected_pairs(length);
    aggregate(
        &blocks,
        &expected,
        config.pairing,
        &output.display().to_string(),
    )
}

/// Phase 3: parses every output file in grid order, then writes the stats
/// table with its header once. An existing table is only replaced after all
/// buckets parsed.
pub fn collect_stats(
    config: &ExperimentConfig,
    layout: &RunLayout,
) -> Result<Vec<BucketStats>, DegError> {
    let mut parsed = Vec::with_capacity(config.grid.lengths.len());
    for (index, length) in config.grid.buckets() {
        let output = layout.output_path(index);
        let rows = collect_bucket(config, &output, length)?;
        debug!(index, rows = rows.len(), "bucket parsed");
        parsed.push((index, length, output, rows));
    }

    let mut writer = StatsWriter::create(&layout.stats_path())?;
    let mut buckets = Vec::with_capacity(parsed.len());
    for (index, length, output, rows) in parsed {
        writer.append(&rows)?;
        buckets.push(BucketStats {
            index,
            length,
            output,
            rows: rows.len(),
        });
    }
    let path = writer.path().to_path_buf();
    let total = writer.finish()?;
    info!(rows = total, path = %path.display(), "stats written");
    Ok(buckets)
}

/// Runs all three phases and writes the run manifest.
pub fn run_pipeline<R: ToolRunner + ?Sized>(
    config: &ExperimentConfig,
    runner: &mut R,
) -> Result<RunManifest, DegError> {
    config.validate()?;
    let layout = RunLayout::new(&config.layout);
    let inputs = generate_inputs(config, &layout)?;
    let invocations = invoke_all(config, &layout, runner)?;
    let buckets = collect_stats(config, &layout)?;
    let manifest = RunManifest::new(config, inputs, invocations, buckets, layout.stats_path())?;
    manifest.write(&layout.manifest_path())?;
    info!(path = %layout.manifest_path().display(), "manifest written");
    Ok(manifest)
}
