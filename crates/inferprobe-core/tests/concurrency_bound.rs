//! Concurrency bound: a call-counting client records the peak number of
//! outstanding calls while answering with randomized latency.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use inferprobe_core::{
    EndpointResponse, EvalSettings, Evaluator, InferenceClient, Payload, TestCase,
    TransportError,
};
use rand::Rng;
use serde_json::json;

#[derive(Default)]
struct CountingClient {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl InferenceClient for CountingClient {
    async fn predict(&self, payload: &Payload) -> Result<EndpointResponse, TransportError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay_ms = rand::thread_rng().gen_range(5..40);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(EndpointResponse::ok(json!({"riesgo": payload.get("label").cloned()})))
    }

    fn endpoint(&self) -> &str {
        "counting://"
    }
}

fn cases(n: usize) -> Vec<TestCase> {
    (0..n)
        .map(|i| {
            let mut payload = Payload::new();
            let label = if i % 3 == 0 { "B" } else { "A" };
            payload.insert("label".into(), json!(label));
            payload.insert("i".into(), json!(i));
            TestCase {
                index: i,
                payload,
                expected_label: json!("A"),
            }
        })
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn twenty_five_cases_never_exceed_ten_in_flight() {
    let client = Arc::new(CountingClient::default());
    let evaluator = Evaluator::new(
        client.clone(),
        "riesgo",
        EvalSettings::default().with_concurrency(10),
    )
    .unwrap();

    let cases = cases(25);
    let report = evaluator.evaluate(&cases, None).await;

    assert_eq!(report.results.len(), 25);
    assert!(report.transport_failures.is_empty());
    assert_eq!(client.calls.load(Ordering::SeqCst), 25);
    let peak = client.peak.load(Ordering::SeqCst);
    assert!(peak <= 10, "observed {peak} concurrent calls");
    assert_eq!(client.in_flight.load(Ordering::SeqCst), 0);

    // i % 3 == 0 answers "B": 0, 3, ..., 24
    let failed: Vec<usize> = report.failures.iter().map(|f| f.index).collect();
    assert_eq!(failed, (0..25).step_by(3).collect::<Vec<_>>());
    let indices: Vec<usize> = report.results.iter().map(|r| r.index).collect();
    assert_eq!(indices, (0..25).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrency_of_one_serializes_calls() {
    let client = Arc::new(CountingClient::default());
    let evaluator = Evaluator::new(
        client.clone(),
        "riesgo",
        EvalSettings::default().with_concurrency(1),
    )
    .unwrap();

    let report = evaluator.evaluate(&cases(6), None).await;

    assert_eq!(report.total(), 6);
    assert_eq!(client.peak.load(Ordering::SeqCst), 1);
}
