//! Integration tests for the command-line interface.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn astsed(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "--quiet", "--"])
        .args(args)
        .output()
        .unwrap()
}

fn setup_source_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("lib.rs"),
        r#"
pub fn parse(input: &str) -> u32 {
    input.parse().unwrap()
}

pub fn run() {
    let value = parse("42");
    println!("{value}");
}
"#,
    )
    .unwrap();
    dir
}

#[test]
fn search_help() {
    let output = astsed(&["search", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--preset"));
    assert!(stdout.contains("--limit"));
}

#[test]
fn search_with_inline_pattern_json_output() {
    let dir = setup_source_dir();
    let path = dir.path().to_str().unwrap();

    let output = astsed(&[
        "search",
        path,
        r#"{"kind": "call_expression"}"#,
        "--json",
    ]);
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("search --json emits valid JSON");
    assert!(json["matches"].as_array().unwrap().len() >= 3);
    assert_eq!(json["truncated"], false);
    assert_eq!(json["total_files"], 1);
}

#[test]
fn search_with_preset() {
    let dir = setup_source_dir();
    let path = dir.path().to_str().unwrap();

    let output = astsed(&["search", path, "--preset", "unwrap-call", "--json"]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["matches"].as_array().unwrap().len(), 1);
    assert_eq!(json["preset"], "unwrap-call");
}

#[test]
fn search_summary_mode_omits_captures() {
    let dir = setup_source_dir();
    let path = dir.path().to_str().unwrap();

    let output = astsed(&[
        "search",
        path,
        r#"{"kind": "call_expression", "function": {"$any": true, "$capture": "callee"}}"#,
        "--mode",
        "summary",
        "--json",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("captures"));
}

#[test]
fn search_rejects_malformed_text_regex() {
    let dir = setup_source_dir();
    let path = dir.path().to_str().unwrap();

    let output = astsed(&[
        "search",
        path,
        r#"{"kind": "identifier", "$text": "(unclosed"}"#,
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("$text"));
}

#[test]
fn presets_lists_catalog() {
    let output = astsed(&["presets"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("unwrap-call"));
    assert!(stdout.contains("todo-macro"));
}

#[test]
fn rewrite_dry_run_leaves_files_untouched() {
    let dir = setup_source_dir();
    let file = dir.path().join("lib.rs");
    let before = fs::read_to_string(&file).unwrap();

    let output = astsed(&[
        "rewrite",
        dir.path().to_str().unwrap(),
        "--preset",
        "unwrap-call",
        "--template",
        "expect(\"valid number\")",
        "--dry-run",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("DRY RUN"));
    assert!(stdout.contains("would rewrite"));
    assert_eq!(fs::read_to_string(&file).unwrap(), before);
}

#[test]
fn rewrite_applies_template() {
    let dir = setup_source_dir();
    let file = dir.path().join("lib.rs");

    let output = astsed(&[
        "rewrite",
        dir.path().to_str().unwrap(),
        r#"{"kind": "call_expression",
            "function": {"kind": "identifier", "$text": "^parse$"},
            "arguments": {"$any": true, "$capture": "args"}}"#,
        "--template",
        "parse_strict${args}",
    ]);
    assert!(output.status.success());

    let after = fs::read_to_string(&file).unwrap();
    assert!(after.contains("parse_strict(\"42\")"));
}
