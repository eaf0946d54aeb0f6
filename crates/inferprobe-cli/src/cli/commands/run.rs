use std::sync::Arc;

use inferprobe_core::report::console::{default_progress_sink, print_summary};
use inferprobe_core::report::csv::write_failures_csv;
use inferprobe_core::report::json::write_failures_json;
use inferprobe_core::report::summary::{write_summary, RunSummary};
use inferprobe_core::{
    load_test_cases, EvalReport, Evaluator, HttpInferenceClient, ProbeConfig, ProbeError,
    ProbeResult,
};

use super::super::args::RunArgs;
use super::base_config;
use crate::exit_codes::{self, EXIT_OUTPUT_ERROR};

pub(crate) async fn run(args: RunArgs) -> anyhow::Result<i32> {
    let mut cfg = match base_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => return Ok(report_fatal(&e)),
    };
    args.apply(&mut cfg);
    tracing::debug!(config = ?cfg, "resolved configuration");

    let target = match cfg.validate() {
        Ok(t) => t,
        Err(e) => return Ok(report_fatal(&e)),
    };

    // Input errors abort before anything is sent.
    let cases = match load_test_cases(&args.input, &cfg.input_shape()) {
        Ok(c) => c,
        Err(e) => return Ok(report_fatal(&e)),
    };

    let settings = cfg.eval_settings();
    let evaluator = match HttpInferenceClient::new(&target.endpoint, &target.token, settings.timeout)
        .and_then(|client| Evaluator::new(Arc::new(client), &target.comparison_field, settings))
    {
        Ok(ev) => ev,
        Err(e) => return Ok(report_fatal(&e)),
    };

    eprintln!(
        "Evaluating {} test cases against {} (concurrency {})...",
        cases.len(),
        target.endpoint,
        settings.concurrency
    );
    let progress = default_progress_sink(cases.len());
    let report = evaluator.evaluate(&cases, progress).await;
    print_summary(&report);

    let code = exit_codes::for_report(&report);
    if let Err(e) = write_outputs(&cfg, &report, &evaluator, code) {
        eprintln!("output error: {}", e);
        return Ok(EXIT_OUTPUT_ERROR);
    }
    Ok(code)
}

fn write_outputs(
    cfg: &ProbeConfig,
    report: &EvalReport,
    evaluator: &Evaluator,
    exit_code: i32,
) -> ProbeResult<()> {
    write_failures_csv(&report.failures, &cfg.output)?;
    eprintln!(
        "Wrote {} failed predictions to {}",
        report.failures.len(),
        cfg.output.display()
    );

    if let Some(path) = &cfg.json_output {
        write_failures_json(&report.failures, path)?;
    }

    if let Some(path) = &cfg.summary {
        let summary = RunSummary::from_report(
            report,
            evaluator.endpoint(),
            evaluator.comparison_field(),
            exit_code,
        );
        write_summary(&summary, path)?;
    }

    for dropped in &report.transport_failures {
        eprintln!(
            "dropped case #{} ({}): {}",
            dropped.index + 1,
            dropped.kind.as_str(),
            dropped.message
        );
    }
    Ok(())
}

fn report_fatal(e: &ProbeError) -> i32 {
    eprintln!("{}", e);
    e.exit_code()
}
