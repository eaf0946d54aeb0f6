//! End-to-end evaluator scenarios against a mocked inference endpoint.
//!
//! Uses wiremock for HTTP mocking. Covers match, mismatch, non-2xx status,
//! undecodable bodies, per-call timeouts and repeatability.

use std::sync::Arc;
use std::time::Duration;

use inferprobe_core::{
    parse_test_cases, EvalReport, EvalSettings, Evaluator, HttpInferenceClient, InputShape,
    TestCase, TransportErrorKind,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn single_case() -> Vec<TestCase> {
    parse_test_cases(
        r#"[{"payload": {"x": 1}, "ground_truth": "A"}]"#,
        &InputShape::default(),
    )
    .expect("valid input")
}

fn evaluator(server: &MockServer, timeout: Duration) -> Evaluator {
    let client = HttpInferenceClient::new(
        format!("{}/predict", server.uri()),
        "test-token",
        Duration::from_secs(10),
    )
    .expect("failed to create client");
    Evaluator::new(
        Arc::new(client),
        "riesgo",
        EvalSettings::default().with_timeout(timeout),
    )
    .expect("valid evaluator")
}

async fn run(server: &MockServer, cases: &[TestCase]) -> EvalReport {
    evaluator(server, Duration::from_secs(5))
        .evaluate(cases, None)
        .await
}

fn rows(report: &EvalReport) -> Vec<Value> {
    report
        .failures
        .iter()
        .map(|f| Value::Object(f.to_row()))
        .collect()
}

#[tokio::test]
async fn test_matching_label_yields_no_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"x": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"riesgo": "A"})))
        .expect(1)
        .mount(&server)
        .await;

    let report = run(&server, &single_case()).await;

    assert_eq!(report.results.len(), 1);
    assert!(report.failures.is_empty());
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_mismatched_label_is_recorded_with_prediction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"riesgo": "B"})))
        .mount(&server)
        .await;

    let report = run(&server, &single_case()).await;

    assert_eq!(rows(&report), vec![json!({"x": 1, "ground_truth": "A", "pred": "B"})]);
}

#[tokio::test]
async fn test_server_error_is_recorded_with_null_prediction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&server)
        .await;

    let report = run(&server, &single_case()).await;

    assert_eq!(report.remote_errors(), 1);
    assert!(report.transport_failures.is_empty());
    assert_eq!(rows(&report), vec![json!({"x": 1, "ground_truth": "A", "pred": null})]);
}

#[tokio::test]
async fn test_missing_comparison_field_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"segment": "A"})))
        .mount(&server)
        .await;

    let report = run(&server, &single_case()).await;

    assert_eq!(report.mismatched(), 1);
    assert_eq!(rows(&report), vec![json!({"x": 1, "ground_truth": "A", "pred": null})]);
}

#[tokio::test]
async fn test_undecodable_body_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let report = run(&server, &single_case()).await;

    assert!(report.results.is_empty());
    assert!(report.failures.is_empty());
    assert_eq!(report.transport_failures.len(), 1);
    assert_eq!(report.transport_failures[0].kind, TransportErrorKind::Decode);
    assert_eq!(report.total(), 1);
}

#[tokio::test]
async fn test_slow_endpoint_times_out_without_blocking_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({"x": 1})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"riesgo": "A"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_json(json!({"x": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"riesgo": "A"})))
        .mount(&server)
        .await;

    let cases = parse_test_cases(
        r#"[{"payload": {"x": 1}, "ground_truth": "A"}, {"payload": {"x": 2}, "ground_truth": "A"}]"#,
        &InputShape::default(),
    )
    .unwrap();
    let report = evaluator(&server, Duration::from_millis(200))
        .evaluate(&cases, None)
        .await;

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].index, 1);
    assert_eq!(report.transport_failures.len(), 1);
    assert_eq!(report.transport_failures[0].index, 0);
    assert_eq!(report.transport_failures[0].kind, TransportErrorKind::Timeout);
}

#[tokio::test]
async fn test_flat_input_sends_payload_without_label() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({"marca": "KIA", "anio": 2019})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"riesgo": "BAJO"})))
        .expect(1)
        .mount(&server)
        .await;

    let cases = parse_test_cases(
        r#"[{"marca": "KIA", "anio": 2019, "riesgo": "ALTO"}]"#,
        &InputShape::flat("riesgo"),
    )
    .unwrap();
    let report = run(&server, &cases).await;

    assert_eq!(
        rows(&report),
        vec![json!({"marca": "KIA", "anio": 2019, "ground_truth": "ALTO", "pred": "BAJO"})]
    );
}

#[tokio::test]
async fn test_repeated_runs_produce_identical_failures() {
    let server = MockServer::start().await;
    for (x, label) in [(1, "A"), (2, "B"), (3, "C"), (4, "A")] {
        Mock::given(method("POST"))
            .and(body_json(json!({"x": x})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"riesgo": label})))
            .mount(&server)
            .await;
    }

    let input: Vec<Value> = (1..=4)
        .map(|x| json!({"payload": {"x": x}, "ground_truth": "A"}))
        .collect();
    let cases =
        parse_test_cases(&Value::Array(input).to_string(), &InputShape::default()).unwrap();

    let first = rows(&run(&server, &cases).await);
    let second = rows(&run(&server, &cases).await);

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}
