//! End-to-end tests driving the built binary against captured solver output.

use rstest::rstest;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run_with(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_solver-schedule"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("SOLVER_SCHEDULE_INPUT")
        .env_remove("SOLVER_SCHEDULE_SOLVER")
        .output()
        .expect("run solver-schedule")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn text_mode_prints_the_schedule() {
    let input = fixture("three_actors.txt");
    let out = run_with(&["--text", "--input", input.to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let lines: Vec<String> = stdout(&out).lines().map(str::to_string).collect();
    assert_eq!(
        lines,
        [
            "Scene     SceneA  SceneB  Cost",
            "Actor1    1       2       3",
            "Actor2    1       2       4",
            "Actor3    1       2       3",
            "Duration  4       5       10",
        ]
    );
    assert!(stderr(&out).contains("Solver: Chuffed"));
}

#[test]
fn json_mode_reports_time_shared() {
    let input = fixture("time_shared.txt");
    let out = run_with(&[
        "--json",
        "--solver",
        "Gecode",
        "--input",
        input.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let report: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(report["solver"], "Gecode");
    assert_eq!(report["process_ok"], true);
    assert_eq!(report["schedule"]["time_shared"], 17);
    assert_eq!(report["schedule"]["cost"], 120);
    assert_eq!(
        report["schedule"]["headers"],
        serde_json::json!(["Scene", "Opening", "Chase", "Heist", "Finale", "Cost"])
    );
    assert_eq!(
        report["schedule"]["rows"][4],
        serde_json::json!(["Actor5", "1", "1", "1", "1", "30"])
    );
    assert_eq!(
        report["schedule"]["rows"][5],
        serde_json::json!(["Duration", "2", "3", "1", "4", "120"])
    );
}

#[rstest]
#[case("bad_scalar.txt", "NonNumericScalar")]
#[case("short_assignments.txt", "LengthMismatch")]
fn parse_failures_produce_no_table(#[case] name: &str, #[case] kind: &str) {
    let input = fixture(name);
    let out = run_with(&["--json", "--input", input.to_str().unwrap()]);
    assert!(!out.status.success());

    let report: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert!(report["schedule"].is_null());
    assert_eq!(report["parse_error"]["kind"], kind);
    assert_eq!(report["process_ok"], true);
}

#[test]
fn missing_input_is_a_process_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("absent.txt");
    let out = run_with(&["--text", "--input", input.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(stdout(&out).is_empty());
    assert!(stderr(&out).contains("solver output unavailable"));
}

#[test]
fn reads_stdin_and_exports_csv() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("schedule.csv");

    let mut child = Command::new(env!("CARGO_BIN_EXE_solver-schedule"))
        .args(["--text", "--export-csv", csv.to_str().unwrap()])
        .env_remove("SOLVER_SCHEDULE_INPUT")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn solver-schedule");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(&std::fs::read(fixture("three_actors.txt")).unwrap())
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let written = std::fs::read_to_string(&csv).unwrap();
    assert_eq!(
        written,
        "Scene,SceneA,SceneB,Cost\nActor1,1,2,3\nActor2,1,2,4\nActor3,1,2,3\nDuration,4,5,10\n"
    );
}

#[test]
fn json_and_text_together_are_rejected() {
    let out = run_with(&["--json", "--text"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("mutually exclusive"));
}
