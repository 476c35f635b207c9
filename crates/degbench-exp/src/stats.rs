use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use degbench_core::errors::{DegError, ErrorInfo};
use degbench_core::PairingPolicy;
use serde::{Deserialize, Serialize};

use crate::parser::OutputBlock;

/// Header row of the stats table.
pub const STATS_HEADER: [&str; 3] = ["n", "k", "time"];

/// One `(n, k, time)` row; values are copied verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRow {
    pub n: String,
    pub k: String,
    pub time: String,
}

/// Pairs parsed blocks with the expected `(n, k)` expansion of their bucket.
///
/// The i-th block is matched with the i-th expected pair. Under
/// [`PairingPolicy::Positional`] the row takes `n` from the block and `k` from
/// the grid; [`PairingPolicy::Verified`] additionally rejects blocks whose
/// parsed size or degeneracy differs from the expected pair.
pub fn aggregate(
    blocks: &[OutputBlock],
    expected: &[(usize, usize)],
    policy: PairingPolicy,
    source: &str,
) -> Result<Vec<StatsRow>, DegError> {
    if blocks.len() != expected.len() {
        return Err(DegError::Parse(
            ErrorInfo::new(
                "block-count-mismatch",
                "output block count differs from the number of input records",
            )
            .with_context("source", source)
            .with_context("expected", expected.len())
            .with_context("found", blocks.len()),
        ));
    }
    let mut rows = Vec::with_capacity(blocks.len());
    for (idx, (block, &(n, k))) in blocks.iter().zip(expected).enumerate() {
        if policy == PairingPolicy::Verified {
            let parsed_n = block.length.parse::<usize>().ok();
            let parsed_k = block.degeneracy.parse::<usize>().ok();
            if parsed_n != Some(n) || parsed_k != Some(k) {
                return Err(DegError::Parse(
                    ErrorInfo::new(
                        "pairing-mismatch",
                        "output block does not match the expected grid values",
                    )
                    .with_context("source", source)
                    .with_context("block", idx)
                    .with_context("expected", format!("{n} {k}"))
                    .with_context("found", format!("{} {}", block.length, block.degeneracy)),
                ));
            }
        }
        rows.push(StatsRow {
            n: block.length.clone(),
            k: k.to_string(),
            time: block.time.clone(),
        });
    }
    Ok(rows)
}

/// Append-only, tab-separated stats table. The header is written once when
/// the table is created.
pub struct StatsWriter {
    path: PathBuf,
    writer: csv::Writer<BufWriter<File>>,
    rows: usize,
}

impl StatsWriter {
    pub fn create(path: &Path) -> Result<Self, DegError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| DegError::io("stats-mkdir", parent, err))?;
        }
        let file = File::create(path).map_err(|err| DegError::io("stats-create", path, err))?;
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .has_headers(false)
            .from_writer(BufWriter::new(file));
        writer
            .write_record(STATS_HEADER)
            .map_err(|err| wrap_csv("stats-write-header", path, err))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer,
            rows: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, rows: &[StatsRow]) -> Result<(), DegError> {
        for row in rows {
            self.writer
                .write_record([&row.n, &row.k, &row.time])
                .map_err(|err| wrap_csv("stats-write-row", &self.path, err))?;
        }
        self.rows += rows.len();
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Flushes the table and returns the number of data rows written.
    pub fn finish(mut self) -> Result<usize, DegError> {
        self.writer
            .flush()
            .map_err(|err| wrap_csv("stats-flush", &self.path, err.into()))?;
        Ok(self.rows)
    }
}

/// Reads a stats table back into rows.
pub fn read_stats(path: &Path) -> Result<Vec<StatsRow>, DegError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_path(path)
        .map_err(|err| wrap_csv("stats-read", path, err))?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record.map_err(|err| wrap_csv("stats-record", path, err))?);
    }
    Ok(rows)
}

fn wrap_csv(code: &str, path: &Path, err: csv::Error) -> DegError {
    DegError::Io(
        ErrorInfo::new(code, "stats table failure")
            .with_context("path", path.display())
            .with_hint(err.to_string()),
    )
}
