use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn fixture_path(rel: &str) -> PathBuf {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    base.join(rel)
}

fn sample_params() -> serde_json::Value {
    let text = std::fs::read_to_string(fixture_path("fixtures/sba/sample.json"))
        .expect("read sample.json");
    serde_json::from_str(&text).expect("parse sample.json")
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradecalcd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradecalcd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn read_response(reader: &mut BufReader<ChildStdout>) -> serde_json::Value {
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response");
    serde_json::from_str(line.trim()).expect("parse response json")
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let value = read_response(reader);
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> Option<&str> {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
}

#[test]
fn sidecar_computes_sample_reports() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health.get("version").and_then(|v| v.as_str()).is_some());

    let mut params = sample_params();
    params["asOf"] = json!("2024-06-01");
    let res = request_ok(&mut stdin, &mut reader, "2", "grades.compute", params.clone());
    assert_eq!(res.get("asOf").and_then(|v| v.as_str()), Some("2024-06-01"));

    let reports = res
        .get("reports")
        .and_then(|v| v.as_array())
        .expect("reports array");
    assert_eq!(reports.len(), 2);
    let r125 = &reports[0];
    assert_eq!(r125.get("id").and_then(|v| v.as_u64()), Some(125));
    let avg = r125.get("avg").and_then(|v| v.as_f64()).expect("avg");
    assert!((avg - 0.985).abs() < 1e-9);
    assert!(r125.get("3").is_none());

    let explained = request_ok(&mut stdin, &mut reader, "3", "grades.explain", params);
    let skipped = explained
        .get("skipped")
        .and_then(|v| v.as_array())
        .expect("skipped array");
    assert_eq!(skipped.len(), 1);
    assert_eq!(
        skipped[0].get("reason").and_then(|v| v.as_str()),
        Some("not_yet_due")
    );
    let late = explained
        .get("graded")
        .and_then(|v| v.as_array())
        .expect("graded array")
        .iter()
        .find(|g| g.get("learnerId").and_then(|v| v.as_u64()) == Some(132)
            && g.get("assignmentId").and_then(|v| v.as_u64()) == Some(2))
        .cloned()
        .expect("late entry");
    assert_eq!(late.get("late").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(late.get("daysLate").and_then(|v| v.as_i64()), Some(8));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn sidecar_reports_course_mismatch_as_error() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let mut params = sample_params();
    params["assignmentGroup"]["course_id"] = json!(999);
    params["asOf"] = json!("2024-06-01");
    let res = request(&mut stdin, &mut reader, "1", "grades.compute", params);

    assert_eq!(res.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(error_code(&res), Some("course_mismatch"));
    assert!(res.get("result").is_none());
    assert_eq!(
        res.pointer("/error/details/groupCourseId")
            .and_then(|v| v.as_u64()),
        Some(999)
    );

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn sidecar_due_and_validate_methods() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let sample = sample_params();

    let due = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "assignments.due",
        json!({
            "assignmentGroup": sample["assignmentGroup"],
            "asOf": "2023-02-01",
        }),
    );
    let ids: Vec<u64> = due
        .get("assignments")
        .and_then(|v| v.as_array())
        .expect("assignments")
        .iter()
        .filter_map(|a| a.get("id").and_then(|v| v.as_u64()))
        .collect();
    assert_eq!(ids, vec![1]);

    let mut params = sample.clone();
    params["asOf"] = json!("2024-06-01");
    params["courseStart"] = json!("2023-01-25");
    let validated = request_ok(&mut stdin, &mut reader, "2", "submissions.validate", params);
    let codes: Vec<&str> = validated
        .get("issues")
        .and_then(|v| v.as_array())
        .expect("issues")
        .iter()
        .filter_map(|i| i.get("code").and_then(|v| v.as_str()))
        .collect();
    // Learner 132 submitted assignment 1 on 2023-01-24.
    assert_eq!(codes, vec!["submitted_before_course_start"]);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn sidecar_rejects_bad_input_without_exiting() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    writeln!(stdin, "{{not json").expect("write garbage");
    stdin.flush().expect("flush");
    let bad = read_response(&mut reader);
    assert_eq!(error_code(&bad), Some("bad_json"));

    let unknown = request(&mut stdin, &mut reader, "1", "grades.nope", json!({}));
    assert_eq!(error_code(&unknown), Some("not_implemented"));

    let missing = request(
        &mut stdin,
        &mut reader,
        "2",
        "grades.compute",
        json!({ "course": { "id": 1, "name": "x" } }),
    );
    assert_eq!(error_code(&missing), Some("bad_params"));

    let _ = request_ok(&mut stdin, &mut reader, "3", "health", json!({}));

    drop(stdin);
    let _ = child.wait();
}
