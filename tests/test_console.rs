//! End-to-end console command lifecycle through the event bus.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde_json::json;
use tracekit::collectors::ConsoleCollector;
use tracekit::test::{RecordingSink, SinkCall};
use tracekit::{
    CollectorRegistry, EventBus, ExecutionDetails, ExecutionEnd, MemoryStats, SpanStatus,
    TelemetrySink, REDACTED,
};

fn params(value: serde_json::Value) -> tracekit::protocol::Map<String, tracekit::protocol::Value> {
    value.as_object().unwrap().clone()
}

#[test]
fn full_lifecycle_produces_one_renamed_transaction() {
    let sink = RecordingSink::new();
    let mut registry = CollectorRegistry::new();
    registry.register(ConsoleCollector::new(
        Arc::clone(&sink) as Arc<dyn TelemetrySink>
    ));

    let mut bus = EventBus::new();
    assert_eq!(registry.install_with_sink(&mut bus, &*sink), 1);
    assert_eq!(sink.tags()["type"], json!("console"));

    let start = SystemTime::now();
    bus.emit_execution_start(start);
    bus.emit_details_resolved(&ExecutionDetails {
        route: "migrate/up".into(),
        params: params(json!({ "interactive": false, "password": "hunter2" })),
    });
    bus.emit_execution_end(&ExecutionEnd {
        time: start + Duration::from_millis(1500),
        memory: MemoryStats {
            peak_bytes: 1536,
            current_bytes: 512,
        },
    });

    let calls = sink.calls();
    let start_call = calls
        .iter()
        .find(|call| matches!(call, SinkCall::StartTransaction { .. }))
        .expect("a transaction started");
    let SinkCall::StartTransaction { id, name, op, .. } = start_call else {
        unreachable!()
    };
    assert_eq!(name, "console");
    assert_eq!(op, "console.command");

    // Renamed once details resolved.
    assert!(calls.iter().any(|call| matches!(
        call,
        SinkCall::SetTransactionName { id: renamed, name } if renamed == id && name == "migrate/up"
    )));

    // Sanitization happened before the sink boundary.
    let data = sink.transaction_data();
    assert_eq!(
        data["params"],
        json!({ "interactive": false, "password": REDACTED })
    );
    assert_eq!(data["duration_ms"], json!(1500.0));
    assert_eq!(data["memory_peak"], json!("1.5 KB"));

    // Finished exactly once, successfully.
    assert_eq!(sink.finished(), vec![(*id, SpanStatus::Ok)]);

    // Breadcrumbs for the resolved route and the completion.
    let crumbs = sink.breadcrumbs();
    assert_eq!(crumbs.len(), 2);
    assert_eq!(crumbs[0].message.as_deref(), Some("Starting: migrate/up"));
    assert_eq!(crumbs[1].message.as_deref(), Some("Finished: migrate/up"));
}

#[test]
fn crashed_bootstrap_still_finishes_the_generic_transaction() {
    let sink = RecordingSink::new();
    let collector = ConsoleCollector::new(Arc::clone(&sink) as Arc<dyn TelemetrySink>);
    let mut bus = EventBus::new();
    assert!(tracekit::Collector::attach(&collector, &mut bus));

    let start = SystemTime::now();
    bus.emit_execution_start(start);
    // Details never resolve: the command crashed during bootstrap.
    collector.mark_failed();
    bus.emit_execution_end(&ExecutionEnd {
        time: start + Duration::from_millis(20),
        memory: MemoryStats::default(),
    });

    let finished = sink.finished();
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].1, SpanStatus::InternalError);
    // The generic name was never replaced.
    assert!(!sink
        .calls()
        .iter()
        .any(|call| matches!(call, SinkCall::SetTransactionName { .. })));
}

#[test]
fn repeated_end_events_issue_a_single_finish() {
    let sink = RecordingSink::new();
    let collector = ConsoleCollector::new(Arc::clone(&sink) as Arc<dyn TelemetrySink>);
    let mut bus = EventBus::new();
    assert!(tracekit::Collector::attach(&collector, &mut bus));

    let start = SystemTime::now();
    bus.emit_execution_start(start);
    let end = ExecutionEnd {
        time: start,
        memory: MemoryStats::default(),
    };
    bus.emit_execution_end(&end);
    bus.emit_execution_end(&end);

    assert_eq!(sink.finished().len(), 1);
}

#[test]
fn failing_sink_never_disturbs_the_host() {
    let sink = RecordingSink::new();
    sink.fail_all(true);
    let collector = ConsoleCollector::new(Arc::clone(&sink) as Arc<dyn TelemetrySink>);
    let mut bus = EventBus::new();
    assert!(tracekit::Collector::attach(&collector, &mut bus));

    // Every phase hits a refusing sink; nothing may panic or propagate.
    let start = SystemTime::now();
    bus.emit_execution_start(start);
    bus.emit_details_resolved(&ExecutionDetails {
        route: "cache/flush".into(),
        params: Default::default(),
    });
    bus.emit_execution_end(&ExecutionEnd {
        time: start,
        memory: MemoryStats::default(),
    });

    assert!(sink.calls().is_empty());
}
