use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::compare::read_prediction;
use super::{EvalReport, Evaluator};
use crate::client::InferenceClient;
use crate::error::TransportError;
use crate::model::{InferenceResult, TestCase, TransportFailure};
use crate::report::progress::{ProgressEvent, ProgressSink};

type CaseOutcome = Result<InferenceResult, TransportFailure>;

pub(crate) async fn evaluate_impl(
    evaluator: &Evaluator,
    cases: &[TestCase],
    progress: Option<ProgressSink>,
) -> EvalReport {
    let started = Instant::now();
    let total = cases.len();
    let settings = evaluator.settings;

    info!(
        total,
        concurrency = settings.concurrency,
        endpoint = %evaluator.client.endpoint(),
        "dispatching test cases"
    );

    let sem = Arc::new(Semaphore::new(settings.concurrency));
    let mut join_set: JoinSet<CaseOutcome> = JoinSet::new();
    let mut task_cases: HashMap<Id, usize> = HashMap::with_capacity(total);
    let mut transport_failures = Vec::new();

    for (pos, case) in cases.iter().enumerate() {
        let permit = match sem.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                let err = TransportError::Aborted {
                    message: format!("concurrency permit unavailable: {}", e),
                };
                transport_failures.push(transport_failure(case, &err));
                continue;
            }
        };
        let client = evaluator.client.clone();
        let field = evaluator.comparison_field.clone();
        let case = case.clone();
        let handle = join_set.spawn(async move {
            let _permit = permit;
            run_case(client.as_ref(), &field, settings.timeout, &case).await
        });
        task_cases.insert(handle.id(), pos);
    }

    let mut results = Vec::with_capacity(total);
    let mut done = transport_failures.len();

    while let Some(joined) = join_set.join_next_with_id().await {
        let (id, joined) = match joined {
            Ok((id, outcome)) => (id, Ok(outcome)),
            Err(join_err) => (join_err.id(), Err(join_err)),
        };
        let Some(pos) = task_cases.remove(&id) else {
            error!(task = %id, "finished task is not mapped to a test case");
            continue;
        };
        let case = &cases[pos];

        let outcome = joined.unwrap_or_else(|join_err| {
            let err = TransportError::Aborted {
                message: join_err.to_string(),
            };
            Err(transport_failure(case, &err))
        });

        done += 1;
        match outcome {
            Ok(result) => {
                debug!(
                    index = result.index,
                    matched = result.is_match(),
                    duration_ms = result.duration_ms,
                    done,
                    total,
                    "case completed"
                );
                results.push(result);
            }
            Err(failure) => transport_failures.push(failure),
        }

        if let Some(sink) = &progress {
            sink(ProgressEvent {
                done,
                total,
                index: case.index,
            });
        }
    }

    results.sort_by_key(|r| r.index);
    transport_failures.sort_by_key(|f| f.index);
    let failures: Vec<_> = results.iter().filter_map(|r| r.failure_record()).collect();

    let report = EvalReport {
        results,
        failures,
        transport_failures,
        elapsed_ms: started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64,
    };

    info!(
        completed = report.results.len(),
        failures = report.failures.len(),
        transport_failures = report.transport_failures.len(),
        elapsed_ms = report.elapsed_ms,
        "evaluation finished"
    );

    report
}

async fn run_case(
    client: &dyn InferenceClient,
    comparison_field: &str,
    deadline: Duration,
    case: &TestCase,
) -> CaseOutcome {
    let started = Instant::now();

    let response = match timeout(deadline, client.predict(&case.payload)).await {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => return Err(transport_failure(case, &err)),
        Err(_) => return Err(transport_failure(case, &TransportError::Timeout(deadline))),
    };

    let (status, predicted_label) = read_prediction(&response, comparison_field);
    if !status.is_success() {
        debug!(
            index = case.index,
            http_status = response.status,
            "endpoint returned error status"
        );
    } else if predicted_label.is_none() {
        debug!(
            index = case.index,
            field = comparison_field,
            "response has no comparison field"
        );
    }

    Ok(InferenceResult {
        index: case.index,
        payload: case.payload.clone(),
        expected_label: case.expected_label.clone(),
        status,
        predicted_label,
        duration_ms: started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64,
    })
}

fn transport_failure(case: &TestCase, err: &TransportError) -> TransportFailure {
    let payload = Value::Object(case.payload.clone());
    warn!(
        index = case.index,
        kind = err.kind().as_str(),
        error = %err,
        payload = %payload,
        "transport failure, case excluded from results"
    );
    TransportFailure::new(case, err)
}
