//! Parser for the tool's output files.
//!
//! Each record produces a five-line block:
//!
//! ```text
//! >seq 1000_5          name
//! 0.012                timing (seconds)
//! 1000 5               size and degeneracy
//! 0 0 1 2 1 ...        per-position auxiliary array
//!                      blank separator
//! ```
//!
//! Every line is checked against the shape expected at its position in the
//! cycle, so a drifting format fails with the offending line number instead
//! of being misread. The name and auxiliary lines are validated but their
//! content is not interpreted.

use std::fs;
use std::path::Path;

use degbench_core::errors::{DegError, ErrorInfo};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// First numeral of a timing line. Integers and exponent forms are accepted
/// because the tool prints doubles with default stream formatting (`0`,
/// `1e-05`).
pub const TIMING_PATTERN: &str = r"\d+(?:\.\d+)?(?:[eE][-+]?\d+)?";

const BLOCK_LEN: usize = 5;
const EXCERPT_LEN: usize = 60;

/// Tag of a line within the five-line cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineKind {
    Name,
    Timing,
    SizeDegeneracy,
    AuxArray,
    Blank,
}

impl LineKind {
    pub const CYCLE: [LineKind; BLOCK_LEN] = [
        LineKind::Name,
        LineKind::Timing,
        LineKind::SizeDegeneracy,
        LineKind::AuxArray,
        LineKind::Blank,
    ];

    /// Kind expected at `position` lines into the cycle.
    pub fn at(position: usize) -> LineKind {
        Self::CYCLE[position % BLOCK_LEN]
    }

    pub fn label(&self) -> &'static str {
        match self {
            LineKind::Name => "name",
            LineKind::Timing => "timing",
            LineKind::SizeDegeneracy => "size/degeneracy",
            LineKind::AuxArray => "auxiliary array",
            LineKind::Blank => "blank separator",
        }
    }
}

/// A line that matched its expected kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Name(String),
    /// The first numeral of the line, verbatim.
    Timing(String),
    SizeDegeneracy {
        length: String,
        degeneracy: String,
    },
    AuxArray {
        entries: usize,
    },
    Blank,
}

/// Why a line did not match its expected kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub code: &'static str,
    pub reason: String,
}

impl Mismatch {
    fn new(code: &'static str, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

/// Fields extracted from one block. All values are kept as the tool wrote them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputBlock {
    pub name: String,
    pub time: String,
    pub length: String,
    pub degeneracy: String,
}

/// Shape checks for each [`LineKind`].
#[derive(Debug, Clone)]
pub struct LineClassifier {
    numeral: Regex,
}

impl LineClassifier {
    pub fn new() -> Result<Self, DegError> {
        let numeral = Regex::new(TIMING_PATTERN).map_err(|err| {
            DegError::Parse(ErrorInfo::new("timing-pattern", err.to_string()))
        })?;
        Ok(Self { numeral })
    }

    /// Checks `line` against `expected` and extracts its fields.
    pub fn classify(&self, expected: LineKind, line: &str) -> Result<ParsedLine, Mismatch> {
        let trimmed = line.trim();
        match expected {
            LineKind::Name => match trimmed.strip_prefix('>') {
                Some(name) => Ok(ParsedLine::Name(name.trim().to_string())),
                None => Err(Mismatch::new("expected-name", "name line must start with '>'")),
            },
            LineKind::Timing => {
                if trimmed.starts_with('>') {
                    return Err(Mismatch::new(
                        "expected-timing",
                        "found a name line where the timing line belongs",
                    ));
                }
                self.numeral
                    .find(trimmed)
                    .map(|m| ParsedLine::Timing(m.as_str().to_string()))
                    .ok_or_else(|| {
                        Mismatch::new("missing-numeral", "timing line contains no numeral")
                    })
            }
            LineKind::SizeDegeneracy => {
                let tokens: Vec<&str> = trimmed.split_whitespace().collect();
                let [length, degeneracy] = tokens.as_slice() else {
                    return Err(Mismatch::new(
                        "field-count",
                        format!("expected 2 fields, found {}", tokens.len()),
                    ));
                };
                if !is_unsigned(length) || !is_unsigned(degeneracy) {
                    return Err(Mismatch::new(
                        "size-line-shape",
                        "size and degeneracy must be unsigned integers",
                    ));
                }
                Ok(ParsedLine::SizeDegeneracy {
                    length: (*length).to_string(),
                    degeneracy: (*degeneracy).to_string(),
                })
            }
            LineKind::AuxArray => {
                let mut entries = 0usize;
                for token in trimmed.split_whitespace() {
                    if !is_unsigned(token) {
                        return Err(Mismatch::new(
                            "aux-array-shape",
                            format!("non-integer entry '{token}'"),
                        ));
                    }
                    entries += 1;
                }
                if entries == 0 {
                    return Err(Mismatch::new("aux-array-shape", "auxiliary array is empty"));
                }
                Ok(ParsedLine::AuxArray { entries })
            }
            LineKind::Blank => {
                if trimmed.is_empty() {
                    Ok(ParsedLine::Blank)
                } else {
                    Err(Mismatch::new("expected-blank", "block separator is not blank"))
                }
            }
        }
    }
}

fn is_unsigned(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

fn excerpt(line: &str) -> String {
    if line.chars().count() <= EXCERPT_LEN {
        line.to_string()
    } else {
        let head: String = line.chars().take(EXCERPT_LEN).collect();
        format!("{head}...")
    }
}

/// Parses the text of one output file. `source` names the file in
/// diagnostics.
///
/// Tolerated: CRLF endings, extra blank lines between blocks, and a missing
/// final separator. A file ending inside a block is an error.
pub fn parse_output(text: &str, source: &str) -> Result<Vec<OutputBlock>, DegError> {
    let classifier = LineClassifier::new()?;
    let mut blocks = Vec::new();
    let mut current = OutputBlock::default();
    let mut position = 0usize;
    let mut block_start = 0usize;

    for (idx, line) in text.lines().enumerate() {
        let expected = LineKind::at(position);
        if expected == LineKind::Name && line.trim().is_empty() {
            continue;
        }
        let parsed = classifier.classify(expected, line).map_err(|mismatch| {
            DegError::Parse(
                ErrorInfo::new(mismatch.code, mismatch.reason)
                    .with_context("source", source)
                    .with_context("line", idx + 1)
                    .with_context("expected", expected.label())
                    .with_context("found", excerpt(line)),
            )
        })?;
        match parsed {
            ParsedLine::Name(name) => {
                current.name = name;
                block_start = idx + 1;
            }
            ParsedLine::Timing(time) => current.time = time,
            ParsedLine::SizeDegeneracy { length, degeneracy } => {
                current.length = length;
                current.degeneracy = degeneracy;
            }
            ParsedLine::AuxArray { .. } => blocks.push(std::mem::take(&mut current)),
            ParsedLine::Blank => {}
        }
        position = (position + 1) % BLOCK_LEN;
    }

    if matches!(
        LineKind::at(position),
        LineKind::Timing | LineKind::SizeDegeneracy | LineKind::AuxArray
    ) {
        return Err(DegError::Parse(
            ErrorInfo::new("truncated-block", "output ends inside a block")
                .with_context("source", source)
                .with_context("block_start_line", block_start)
                .with_context("missing", LineKind::at(position).label()),
        ));
    }
    Ok(blocks)
}

/// Reads and parses one output file.
pub fn parse_output_file(path: &Path) -> Result<Vec<OutputBlock>, DegError> {
    if !path.exists() {
        return Err(DegError::Parse(
            ErrorInfo::new("missing-output", "tool output file does not exist")
                .with_context("path", path.display())
                .with_hint("the tool invocation for this bucket did not produce output"),
        ));
    }
    let text = fs::read_to_string(path).map_err(|err| {
        DegError::Parse(
            ErrorInfo::new("output-read", err.to_string()).with_context("path", path.display()),
        )
    })?;
    parse_output(&text, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_truncates_long_lines() {
        let long = "1 ".repeat(100);
        let short = excerpt(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), EXCERPT_LEN + 3);
        assert_eq!(excerpt("0.5"), "0.5");
    }

    #[test]
    fn unsigned_tokens() {
        assert!(is_unsigned("1000"));
        assert!(!is_unsigned("-1"));
        assert!(!is_unsigned("1.5"));
        assert!(!is_unsigned(""));
    }
}
