use std::path::Path;

use degbench_core::errors::{DegError, ErrorInfo};

fn output_line_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("source", "data/output0.txt")
        .with_context("line", 7)
}

#[test]
fn parse_errors_render_code_and_context() {
    let err = DegError::Parse(output_line_info("missing-numeral", "timing line contains no numeral"));
    assert_eq!(err.code(), "missing-numeral");
    assert_eq!(err.info().context.get("line").map(String::as_str), Some("7"));
    assert_eq!(
        err.to_string(),
        "parse error: [missing-numeral] timing line contains no numeral \
         (line=7, source=data/output0.txt)"
    );
}

#[test]
fn hint_is_rendered_last() {
    let err = DegError::Process(
        ErrorInfo::new("tool-timed-out", "external tool exceeded its time limit")
            .with_hint("raise timeout_secs"),
    );
    assert_eq!(
        err.to_string(),
        "process error: [tool-timed-out] external tool exceeded its time limit; hint: raise timeout_secs"
    );
}

#[test]
fn context_keys_overwrite() {
    let info = ErrorInfo::new("x", "y")
        .with_context("length", 3)
        .with_context("length", 4);
    assert_eq!(info.context.len(), 1);
    assert_eq!(info.context["length"], "4");
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = DegError::Config(ErrorInfo::new("grid-empty-lengths", "grid.lengths is empty"));
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["family"], "config");
    assert_eq!(json["detail"]["code"], "grid-empty-lengths");
    assert!(json["detail"].get("hint").is_none());
    let back: DegError = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back, err);
}

#[test]
fn io_helper_records_path() {
    let err = DegError::io("stats-create", Path::new("/tmp/x/stats.txt"), "denied");
    assert!(matches!(err, DegError::Io(_)));
    assert_eq!(err.info().message, "denied");
    assert_eq!(
        err.info().context.get("path").map(String::as_str),
        Some("/tmp/x/stats.txt")
    );
}
