//! Error surface of the harness.
//!
//! Every failure carries a stable kebab-case `code` plus key/value context
//! (file paths, 1-based line numbers, grid values) so a failed batch can be
//! diagnosed from the message alone. No failure is recovered: each one
//! aborts the whole run.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records `key=value`; a repeated key keeps the last value.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Renders as `[code] message (k=v, ...); hint: ...`.
impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        let mut entries = self.context.iter();
        if let Some((key, value)) = entries.next() {
            write!(f, " ({key}={value}")?;
            for (key, value) in entries {
                write!(f, ", {key}={value}")?;
            }
            write!(f, ")")?;
        }
        match &self.hint {
            Some(hint) => write!(f, "; hint: {hint}"),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail", rename_all = "lowercase")]
pub enum DegError {
    /// Rejected grid, alphabet, layout or tool settings.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// A generator precondition did not hold.
    #[error("generate error: {0}")]
    Generate(ErrorInfo),
    /// The tool could not be spawned, exited unsuccessfully or timed out.
    #[error("process error: {0}")]
    Process(ErrorInfo),
    /// An output file is missing or does not have the five-line block shape.
    #[error("parse error: {0}")]
    Parse(ErrorInfo),
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// YAML or JSON encoding and decoding.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl DegError {
    pub fn info(&self) -> &ErrorInfo {
        match self {
            DegError::Config(info)
            | DegError::Generate(info)
            | DegError::Process(info)
            | DegError::Parse(info)
            | DegError::Io(info)
            | DegError::Serde(info) => info,
        }
    }

    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// `Io` failure on `path`, with the underlying error as the message.
    pub fn io(code: &str, path: &Path, err: impl ToString) -> Self {
        DegError::Io(ErrorInfo::new(code, err.to_string()).with_context("path", path.display()))
    }
}
