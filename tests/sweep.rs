mod common;

use common::{Page, ScriptedRenderer};
use std::fs;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use visitor_tracker::{
    BatchCollector, Error, Locator, LogWriter, MetricExtractor, MetricValue, MetricsCollector,
    ReadinessPoller, SweepState, Target,
};

const A: &str = "https://parks.example/a";
const B: &str = "https://parks.example/b";
const C: &str = "https://parks.example/c";

fn collector(deadline_ms: u64) -> (BatchCollector, Arc<MetricsCollector>) {
    let metrics = Arc::new(MetricsCollector::new());
    let poller = ReadinessPoller::new(
        Duration::from_millis(deadline_ms),
        Duration::from_millis(100),
    );
    let extractor = MetricExtractor::new(Locator::default(), "LOADING...", poller, metrics.clone());
    (BatchCollector::new(extractor, metrics.clone()), metrics)
}

fn targets(urls: &[&str]) -> Vec<Target> {
    urls.iter()
        .enumerate()
        .map(|(i, u)| Target::new(*u, format!("park{}", i + 1)))
        .collect()
}

#[tokio::test]
async fn ready_and_missing_targets_yield_value_and_marker() {
    let renderer = ScriptedRenderer::new(&[
        (A, Page::Ready { after: Duration::from_millis(300), value: "42" }),
        (B, Page::Missing),
    ]);
    let (collector, _) = collector(1_000);
    let targets = targets(&[A, B]);

    let record = collector.run_sweep(&renderer, &targets).await.unwrap();
    assert_eq!(
        record.values,
        vec![MetricValue::Observed("42".into()), MetricValue::Unavailable]
    );

    let dir = tempdir().unwrap();
    let writer = LogWriter::new(dir.path().join("visitors.csv"), &targets, "unavailable");
    writer.append(&record).unwrap();

    let content = fs::read_to_string(writer.path()).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "timestamp,park1,park2");
    assert!(lines[1].ends_with(",42,unavailable"), "row was {}", lines[1]);
}

#[tokio::test]
async fn stuck_target_does_not_affect_others() {
    let renderer = ScriptedRenderer::new(&[
        (A, Page::Ready { after: Duration::ZERO, value: "17" }),
        (B, Page::Stuck),
        (C, Page::Ready { after: Duration::from_millis(150), value: "23" }),
    ]);
    let (collector, metrics) = collector(500);

    let record = collector.run_sweep(&renderer, &targets(&[A, B, C])).await.unwrap();

    assert_eq!(
        record.values,
        vec![
            MetricValue::Observed("17".into()),
            MetricValue::Unavailable,
            MetricValue::Observed("23".into()),
        ]
    );
    let snap = metrics.snapshot();
    assert_eq!(snap.readiness_timeouts, 1);
    assert_eq!(snap.targets_succeeded, 2);
}

#[tokio::test]
async fn record_has_one_value_per_target_even_when_all_fail() {
    let renderer = ScriptedRenderer::new(&[(A, Page::Unreachable), (B, Page::Missing)]);
    let (collector, metrics) = collector(300);
    let targets = targets(&[A, B, C]);

    let record = collector.run_sweep(&renderer, &targets).await.unwrap();

    assert_eq!(record.values.len(), targets.len());
    assert!(record.values.iter().all(|v| *v == MetricValue::Unavailable));
    assert_eq!(metrics.snapshot().navigation_failures, 2);
    assert_eq!(metrics.snapshot().not_found_failures, 1);
}

#[tokio::test]
async fn targets_visited_in_order_on_one_session() {
    let renderer = ScriptedRenderer::new(&[
        (A, Page::Ready { after: Duration::ZERO, value: "1" }),
        (B, Page::Unreachable),
        (C, Page::Ready { after: Duration::ZERO, value: "3" }),
    ]);
    let (collector, _) = collector(300);
    assert_eq!(collector.state(), SweepState::Idle);

    collector.run_sweep(&renderer, &targets(&[C, B, A])).await.unwrap();

    assert_eq!(*renderer.calls.loads.lock().unwrap(), vec![C, B, A]);
    assert_eq!(renderer.calls.opens.load(Ordering::SeqCst), 1);
    assert_eq!(renderer.calls.closes.load(Ordering::SeqCst), 1);
    assert_eq!(collector.state(), SweepState::Finished);
}

#[tokio::test]
async fn session_failure_aborts_sweep_without_writing() {
    let renderer = ScriptedRenderer::unavailable();
    let (collector, metrics) = collector(300);
    let targets = targets(&[A, B]);
    let dir = tempdir().unwrap();
    let path = dir.path().join("visitors.csv");

    let result = collector.run_sweep(&renderer, &targets).await;
    if let Ok(record) = &result {
        LogWriter::new(&path, &targets, "unavailable").append(record).unwrap();
    }

    assert!(matches!(result, Err(Error::Session(_))));
    assert!(!path.exists());
    assert_eq!(renderer.calls.closes.load(Ordering::SeqCst), 0);
    assert_eq!(metrics.snapshot().targets_processed, 0);
    assert_eq!(collector.state(), SweepState::Failed);
}

#[tokio::test]
async fn repeated_sweeps_append_in_order() {
    let renderer = ScriptedRenderer::new(&[
        (A, Page::Ready { after: Duration::ZERO, value: "5" }),
        (B, Page::Stuck),
    ]);
    let targets = targets(&[A, B]);
    let dir = tempdir().unwrap();
    let writer = LogWriter::new(dir.path().join("visitors.csv"), &targets, "unavailable");

    let mut stamps = Vec::new();
    for _ in 0..3 {
        let (collector, _) = collector(200);
        let record = collector.run_sweep(&renderer, &targets).await.unwrap();
        stamps.push(record.formatted_timestamp());
        writer.append(&record).unwrap();
    }

    let content = fs::read_to_string(writer.path()).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "timestamp,park1,park2");
    for (line, stamp) in lines[1..].iter().zip(&stamps) {
        assert_eq!(*line, format!("{},5,unavailable", stamp));
    }
    assert_eq!(renderer.calls.opens.load(Ordering::SeqCst), 3);
    assert_eq!(renderer.calls.closes.load(Ordering::SeqCst), 3);
}
