//! Synthetic corpus generation with controlled degenerate-symbol injection.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use degbench_core::errors::{DegError, ErrorInfo};
use degbench_core::Alphabet;
use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Opens a degenerate symbol in annotated text.
pub const DEGENERATE_OPEN: char = '{';
/// Closes a degenerate symbol in annotated text.
pub const DEGENERATE_CLOSE: char = '}';

/// A single ambiguous position: the original symbol at `position` is replaced
/// by the set `symbols`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegenerateToken {
    pub position: usize,
    pub symbols: Vec<u8>,
}

impl DegenerateToken {
    /// Bracketed rendering, e.g. `{GA}`.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.symbols.len() + 2);
        out.push(DEGENERATE_OPEN);
        out.extend(self.symbols.iter().map(|&b| char::from(b)));
        out.push(DEGENERATE_CLOSE);
        out
    }
}

/// One annotated record of an input file.
///
/// Token positions are strictly increasing and every token holds between two
/// and `|alphabet|` distinct symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub length: usize,
    pub degeneracy: usize,
    pub tokens: Vec<DegenerateToken>,
    pub text: String,
}

impl SequenceRecord {
    /// Header line in the form `>seq {length}_{degeneracy}`.
    pub fn header(&self) -> String {
        format!(">seq {}_{}", self.length, self.degeneracy)
    }

    /// Writes the header line, the annotated text line and a blank separator.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "{}", self.header())?;
        writeln!(writer, "{}", self.text)?;
        writeln!(writer)
    }
}

/// Draws `length` symbols independently and uniformly from the alphabet.
pub fn generate_base_sequence<R: Rng + ?Sized>(
    alphabet: &Alphabet,
    length: usize,
    rng: &mut R,
) -> Result<Vec<u8>, DegError> {
    let symbols = alphabet.symbols();
    if symbols.is_empty() && length > 0 {
        return Err(DegError::Generate(
            ErrorInfo::new("alphabet-empty", "cannot draw symbols from an empty alphabet")
                .with_context("length", length),
        ));
    }
    Ok((0..length)
        .map(|_| symbols[rng.gen_range(0..symbols.len())])
        .collect())
}

/// Selects `count` distinct positions of `0..length`, sorted ascending.
pub fn sample_positions<R: Rng + ?Sized>(
    length: usize,
    count: usize,
    rng: &mut R,
) -> Result<Vec<usize>, DegError> {
    if count > length {
        return Err(DegError::Generate(
            ErrorInfo::new(
                "degeneracy-exceeds-length",
                "cannot place more degenerate symbols than the sequence has positions",
            )
            .with_context("length", length)
            .with_context("degeneracy", count),
        ));
    }
    let mut positions = index::sample(rng, length, count).into_vec();
    positions.sort_unstable();
    Ok(positions)
}

/// Draws a subset of the alphabet of uniformly random size in
/// `2..=|alphabet|`, without repetition and in draw order.
pub fn sample_symbol_subset<R: Rng + ?Sized>(
    alphabet: &Alphabet,
    rng: &mut R,
) -> Result<Vec<u8>, DegError> {
    let symbols = alphabet.symbols();
    if symbols.len() < 2 {
        return Err(DegError::Generate(
            ErrorInfo::new(
                "alphabet-too-small",
                "degenerate symbols need at least two alphabet symbols",
            )
            .with_context("alphabet", alphabet.as_str()),
        ));
    }
    let size = rng.gen_range(2..=symbols.len());
    Ok(symbols.choose_multiple(rng, size).copied().collect())
}

/// Replaces `count` randomly chosen positions of `base` with degenerate
/// tokens. Every other position keeps its symbol and relative order.
///
/// `count > base.len()` is a fatal precondition failure.
pub fn inject_degenerate_symbols<R: Rng + ?Sized>(
    base: &[u8],
    count: usize,
    alphabet: &Alphabet,
    rng: &mut R,
) -> Result<SequenceRecord, DegError> {
    let positions = sample_positions(base.len(), count, rng)?;
    let mut tokens = Vec::with_capacity(count);
    for &position in &positions {
        tokens.push(DegenerateToken {
            position,
            symbols: sample_symbol_subset(alphabet, rng)?,
        });
    }

    let mut text = String::with_capacity(base.len() + count * (alphabet.len() + 2));
    let mut pending = tokens.iter().peekable();
    for (idx, &symbol) in base.iter().enumerate() {
        match pending.peek() {
            Some(token) if token.position == idx => {
                text.push_str(&token.render());
                pending.next();
            }
            _ => text.push(char::from(symbol)),
        }
    }

    Ok(SequenceRecord {
        length: base.len(),
        degeneracy: count,
        tokens,
        text,
    })
}

/// Streaming writer for one input file (one length bucket).
#[derive(Debug)]
pub struct InputFileWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    records: usize,
}

impl InputFileWriter {
    /// Creates (or truncates) the file, creating parent directories.
    pub fn create(path: &Path) -> Result<Self, DegError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| DegError::io("input-mkdir", parent, err))?;
        }
        let file = File::create(path).map_err(|err| DegError::io("input-create", path, err))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            records: 0,
        })
    }

    /// Appends one record block.
    pub fn append(&mut self, record: &SequenceRecord) -> Result<(), DegError> {
        record
            .write_to(&mut self.writer)
            .map_err(|err| DegError::io("input-write", &self.path, err))?;
        self.records += 1;
        Ok(())
    }

    /// Flushes and closes the file, returning the number of records written.
    pub fn finish(mut self) -> Result<usize, DegError> {
        self.writer
            .flush()
            .map_err(|err| DegError::io("input-flush", &self.path, err))?;
        Ok(self.records)
    }
}

/// Writes a complete input file in one call.
pub fn write_input_file(path: &Path, records: &[SequenceRecord]) -> Result<usize, DegError> {
    let mut writer = InputFileWriter::create(path)?;
    for record in records {
        writer.append(record)?;
    }
    writer.finish()
}
