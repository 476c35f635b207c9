use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn degbench(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_degbench"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run degbench")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8")
}

#[test]
fn version_prints_package_version() {
    let output = degbench(&["version"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), env!("CARGO_PKG_VERSION"));

    let long = degbench(&["version", "--long"]);
    assert!(long.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&long)).expect("json");
    assert_eq!(value["default_tool"], "./bin/degLPF");
    assert_eq!(value["stats_header"], serde_json::json!(["n", "k", "time"]));
}

#[test]
fn plan_prints_resolved_yaml() {
    let output = degbench(&[
        "plan",
        "--root",
        "/tmp/degbench-plan",
        "--lengths",
        "100,200",
        "--degeneracies",
        "1,2,3",
        "--replicates",
        "2",
    ]);
    assert!(output.status.success());
    let text = stdout(&output);
    let value: serde_yaml::Value = serde_yaml::from_str(&text).expect("yaml");
    assert_eq!(value["grid"]["replicates"].as_u64(), Some(2));
    assert_eq!(value["pairing"].as_str(), Some("positional"));
    assert!(text.contains("# bucket 0: n=100 records=6"));
    assert!(text.contains("# bucket 1: n=200 records=6"));
}

#[test]
fn invalid_grid_is_rejected() {
    let output = degbench(&["plan", "--lengths", "4", "--degeneracies", "5"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("degeneracy-exceeds-length"), "{stderr}");
}

#[test]
fn generate_then_collect_without_outputs_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().to_str().expect("utf8 path");
    let common = ["--root", root, "--lengths", "30,40", "--degeneracies", "2,4"];

    let output = degbench(&[&["generate"][..], &common[..]].concat());
    assert!(output.status.success());
    for index in 0..2 {
        let input = dir.path().join("data").join(format!("input{index}.txt"));
        let text = fs::read_to_string(input).expect("input");
        assert_eq!(text.matches(">seq ").count(), 2);
    }

    let collect = degbench(&[&["collect"][..], &common[..]].concat());
    assert!(!collect.status.success());
    assert!(String::from_utf8_lossy(&collect.stderr).contains("missing-output"));
}

#[cfg(unix)]
const FAKE_TOOL: &str = r#"in="$2"
out="$4"
: > "$out"
grep '^>seq ' "$in" | while read -r _ name; do
  n=${name%_*}
  k=${name#*_}
  printf '>seq %s\n0.125\n%s %s\n0 \n\n' "$name" "$n" "$k" >> "$out"
done
"#;

#[cfg(unix)]
fn write_config(dir: &Path) -> std::path::PathBuf {
    let script = dir.join("fake_tool.sh");
    fs::write(&script, FAKE_TOOL).expect("script");
    let config = format!(
        "grid:\n  lengths: [20, 40]\n  degeneracies: [1, 5]\n  replicates: 2\n\
         layout:\n  root: {root}\n\
         tool:\n  program: /bin/sh\n  alphabet_type: {script}\n  timeout_secs: 30\n\
         pairing: verified\n",
        root = dir.join("run").display(),
        script = script.display(),
    );
    let path = dir.join("degbench.yaml");
    fs::write(&path, config).expect("config");
    path
}

#[cfg(unix)]
#[test]
fn run_drives_the_tool_end_to_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(dir.path());
    let output = degbench(&["run", "--config", config.to_str().expect("utf8 path")]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let summary: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json");
    assert_eq!(summary["rows"], 8);

    let stats = fs::read_to_string(dir.path().join("run").join("stats.txt")).expect("stats");
    let lines: Vec<&str> = stats.lines().collect();
    assert_eq!(lines[0], "n\tk\ttime");
    assert_eq!(lines.len(), 9);
    assert_eq!(lines[1], "20\t1\t0.125");
    assert_eq!(lines[4], "20\t5\t0.125");
    assert_eq!(lines[5], "40\t1\t0.125");
    assert!(dir.path().join("run").join("run.json").exists());
    assert!(dir.path().join("run").join("data").join("tool0.log").exists());
}
