//! Experiment harness for benchmarking an external degenerate-string tool:
//! corpus generation, tool orchestration and output parsing.

pub mod corpus;
mod hash;
pub mod layout;
mod manifest;
pub mod orchestrator;
pub mod parser;
pub mod process;
mod serde;
pub mod stats;

pub use corpus::{
    generate_base_sequence, inject_degenerate_symbols, sample_positions, sample_symbol_subset,
    write_input_file, DegenerateToken, InputFileWriter, SequenceRecord,
};
pub use hash::stable_hash_string;
pub use layout::RunLayout;
pub use manifest::RunManifest;
pub use orchestrator::{
    collect_bucket, collect_stats, generate_inputs, invoke_all, run_pipeline, BucketStats,
    InputSummary,
};
pub use parser::{
    parse_output, parse_output_file, LineClassifier, LineKind, Mismatch, OutputBlock, ParsedLine,
};
pub use process::{Invocation, InvocationResult, InvocationStatus, ProcessRunner, ToolRunner};
pub use stats::{aggregate, read_stats, StatsRow, StatsWriter, STATS_HEADER};

pub use self::serde::{from_json_slice, to_canonical_json_bytes};
