use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "safestart-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_safestart-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(&output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("perfect-run"));
    let _ = std::fs::remove_file(output_path);
}

#[test]
fn cli_runs_all_scenarios_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_safestart-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args(["--scenarios", "all", "--report", "json", "--output"])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SafeStart Automated Tester"));

    let report = std::fs::read_to_string(&output_path).expect("read report");
    let parsed: serde_json::Value = serde_json::from_str(&report).expect("json report");
    let results = parsed.as_array().expect("array of results");
    assert_eq!(results.len(), 7);
    assert!(results.iter().all(|r| r["passed"] == true));
    let _ = std::fs::remove_file(output_path);
}

#[test]
fn cli_unknown_scenario_is_skipped() {
    let exe = env!("CARGO_BIN_EXE_safestart-tester");
    let output = Command::new(exe)
        .args(["--scenarios", "does-not-exist", "--report", "markdown"])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown scenario"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("_No scenarios executed._"));
}

#[test]
fn cli_scores_a_store_file() {
    let exe = env!("CARGO_BIN_EXE_safestart-tester");
    let store_path = temp_path("store");
    std::fs::write(
        &store_path,
        r#"{
            "stf_hazard_state": "{\"found\":[\"h1\",\"h2\"],\"completed\":false}",
            "stf_quiz_state": "{\"answers\":{\"q1\":\"b\"},\"currentQuestion\":1,\"completed\":false}"
        }"#,
    )
    .expect("write store");

    let output = Command::new(exe)
        .args(["--score-only", "--report", "json", "--store"])
        .arg(&store_path)
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let score: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("score json on stdout");
    assert_eq!(score["earnedPoints"], 30);
    assert_eq!(score["maxPoints"], 197);
    assert_eq!(score["sections"]["hazard"]["earned"], 20);
    assert_eq!(score["rankTitle"], "Beginner");
    let _ = std::fs::remove_file(store_path);
}

#[test]
fn cli_score_only_requires_store() {
    let exe = env!("CARGO_BIN_EXE_safestart-tester");
    let output = Command::new(exe)
        .arg("--score-only")
        .output()
        .expect("run cli");
    assert!(!output.status.success());
}

#[test]
fn cli_custom_rank_table_is_used() {
    let exe = env!("CARGO_BIN_EXE_safestart-tester");
    let store_path = temp_path("empty-store");
    let ranks_path = temp_path("ranks");
    std::fs::write(&store_path, "{}").expect("write store");
    std::fs::write(&ranks_path, r#"[{ "minPercent": 0, "title": "Newcomer" }]"#)
        .expect("write ranks");

    let output = Command::new(exe)
        .args(["--score-only", "--report", "json", "--store"])
        .arg(&store_path)
        .arg("--ranks")
        .arg(&ranks_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let score: serde_json::Value = serde_json::from_slice(&output.stdout).expect("score json");
    assert_eq!(score["rankTitle"], "Newcomer");
    let _ = std::fs::remove_file(store_path);
    let _ = std::fs::remove_file(ranks_path);
}
