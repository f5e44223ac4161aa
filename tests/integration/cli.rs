//! Exit codes and messages for bad invocations.

use crate::common::run_to_completion;

#[test]
fn test_missing_targets_exits_with_one() {
    let output = run_to_completion(&[]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "unexpected stderr: {stderr}");
}

#[test]
fn test_bad_target_exits_with_one_and_names_it() {
    let output = run_to_completion(&["10.0.0.1", "not-an-ip/33"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not-an-ip/33"), "unexpected stderr: {stderr}");
}

#[test]
fn test_reversed_range_exits_with_one() {
    let output = run_to_completion(&["10.0.0.9-3"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("10.0.0.9-3"), "unexpected stderr: {stderr}");
}

#[test]
fn test_help_exits_with_zero() {
    let output = run_to_completion(&["--help"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--web"), "unexpected stdout: {stdout}");
}
