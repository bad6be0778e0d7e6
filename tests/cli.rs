use assert_cmd::Command;
use std::{fs, path::PathBuf};

fn write_source(dir: &tempfile::TempDir, src: &str) -> PathBuf {
    let path = dir.path().join("input.uasm");
    fs::write(&path, src).expect("write input");
    path
}

fn uasm() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!(env!("CARGO_PKG_NAME")));
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn lists_directives() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_source(&dir, ".align 2+2 | pad\nADDC(r0, 1, r1)\n.macro foo(a, b) mov a, b\n");

    let output = uasm().arg(&input).output().expect("run uasm");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines, vec![".align 2+2", "ALIGN 4", ".macro foo(a, b) mov a, b", "MACRO foo(a, b)"]);
}

#[test]
fn missing_or_extra_arguments_print_usage() {
    let output = uasm().output().expect("run uasm");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));

    let output = uasm().arg("a.uasm").arg("b.uasm").output().expect("run uasm");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn first_error_aborts_before_listing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_source(&dir, ".align 8\n.bogus 1\n.align 4\n");

    let output = uasm().arg(&input).output().expect("run uasm");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty(), "stdout: {}", String::from_utf8_lossy(&output.stdout));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: line 2: unrecognized directive .bogus"), "stderr: {stderr}");
}

#[test]
fn keep_going_lists_good_lines_then_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_source(&dir, ".align 8\n.align 1/0\n.macro broken\n.text \"ok\"\n");

    let output = uasm().arg("--keep-going").arg(&input).output().expect("run uasm");
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ALIGN 8"), "stdout: {stdout}");
    assert!(stdout.contains("TEXT"), "stdout: {stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: line 2: malformed expression \"1/0\""), "stderr: {stderr}");
    assert!(stderr.contains("error: line 3: malformed macro"), "stderr: {stderr}");
}

#[test]
fn json_prints_one_object_per_directive() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_source(&dir, ".include \"lib.uasm\"\nnop\n.align\n");

    let output = uasm().arg("--json").arg(&input).output().expect("run uasm");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let objects: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0]["line_num"], 1);
    assert_eq!(objects[0]["directive"]["kind"], "include");
    assert_eq!(objects[1]["line_num"], 3);
    assert_eq!(objects[1]["directive"]["value"], 4);
}

#[test]
fn line_start_ignores_operand_dots() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_source(&dir, "LD(r31, .data, r1)\n");

    let output = uasm().arg(&input).output().expect("run uasm");
    assert_eq!(output.status.code(), Some(1));

    let output = uasm().arg("--line-start").arg(&input).output().expect("run uasm");
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn unreadable_file_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("missing.uasm");

    let output = uasm().arg(&missing).output().expect("run uasm");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: cannot read"), "stderr: {stderr}");
}
