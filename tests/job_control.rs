//! End-to-end scenarios from the job-control testable properties: spawn the
//! real `tsh` binary, drive it over stdin, and check its stdout protocol and
//! side effects on the filesystem.

use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

fn spawn() -> Child {
    Command::new(env!("CARGO_BIN_EXE_tsh"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn tsh")
}

fn send(child: &mut Child, line: &str) {
    let stdin = child.stdin.as_mut().expect("stdin");
    writeln!(stdin, "{line}").expect("write line");
}

fn run_to_completion(lines: &[&str]) -> std::process::Output {
    let mut child = spawn();
    for line in lines {
        send(&mut child, line);
    }
    send(&mut child, "exit");
    child.wait_with_output().expect("wait output")
}

#[test]
fn pipeline_runs_in_foreground_and_drains_the_table() {
    let output = run_to_completion(&["echo hello | wc -l"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains('1'), "stdout was: {stdout}");

    let jobs_output = run_to_completion(&["echo hello | wc -l", "jobs"]);
    let stdout = String::from_utf8_lossy(&jobs_output.stdout);
    // The foreground pipeline has already completed by the time `jobs` runs;
    // no leftover job line (starting with "[") should be printed for it.
    assert!(
        !stdout.lines().any(|line| line.trim_start().starts_with('[')),
        "stdout was: {stdout}"
    );
}

#[test]
fn unknown_program_prints_command_not_found_and_exits_one() {
    let output = run_to_completion(&["not-a-real-program-xyz"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("not-a-real-program-xyz: Command not found"),
        "stdout was: {stdout}"
    );
}

#[test]
fn background_launch_prints_bracketed_job_line() {
    let mut child = spawn();
    send(&mut child, "sleep 2 &");
    std::thread::sleep(Duration::from_millis(200));
    send(&mut child, "jobs");
    std::thread::sleep(Duration::from_millis(100));
    send(&mut child, "exit");

    let output = child.wait_with_output().expect("wait output");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(") && stdout.contains("sleep 2"), "stdout was: {stdout}");
    assert!(stdout.contains("Running"), "stdout was: {stdout}");
}

#[test]
fn fg_on_unknown_jid_reports_no_such_job() {
    let output = run_to_completion(&["fg %9"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("%9: No such job"), "stdout was: {stdout}");
}

#[test]
fn bg_on_unknown_pid_reports_no_such_process() {
    let output = run_to_completion(&["bg 999999"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(999999): No such process"), "stdout was: {stdout}");
}

#[test]
fn redirection_round_trip_through_a_pipeline() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input_path = dir.path().join("in.txt");
    let output_path = dir.path().join("out.txt");
    std::fs::write(&input_path, "hello world\n").expect("write input");

    let line = format!(
        "cat < {} | tr a-z A-Z > {}",
        input_path.display(),
        output_path.display()
    );
    let output = run_to_completion(&[&line]);
    assert!(output.status.success() || output.status.code() == Some(0));

    let mut contents = String::new();
    std::fs::File::open(&output_path)
        .expect("open output")
        .read_to_string(&mut contents)
        .expect("read output");
    assert_eq!(contents, "HELLO WORLD\n");
}

#[test]
fn appending_redirection_accumulates_across_commands() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output_path = dir.path().join("log.txt");

    let line_a = format!("echo first >> {}", output_path.display());
    let line_b = format!("echo second >> {}", output_path.display());
    run_to_completion(&[&line_a, &line_b]);

    let contents = std::fs::read_to_string(&output_path).expect("read output");
    assert_eq!(contents, "first\nsecond\n");
}

#[test]
fn eof_terminates_cleanly_with_status_zero() {
    let child = spawn();
    drop(child.stdin.as_ref());
    let output = child.wait_with_output().expect("wait output");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn too_many_pipeline_stages_is_a_diagnostic_not_a_crash() {
    let many_stages = (0..20).map(|_| "cat").collect::<Vec<_>>().join(" | ");
    let output = run_to_completion(&[&many_stages]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("too many pipeline stages"), "stdout was: {stdout}");
}
