//! Correlates a two-phase execution lifecycle with a single transaction.
//!
//! Command execution is observed in three phases: the start is known
//! early, the route and parameters only resolve once the host has
//! dispatched the command, and completion comes last. The correlator
//! opens a transaction eagerly under a generic name so that any work
//! happening before details resolve (early storage access during
//! bootstrap, for instance) is still attributed to a transaction rather
//! than orphaned, then renames it once the route is known.
//!
//! Every phase degrades to a logged no-op when its preconditions are
//! missing: a command that crashes before its details resolve still
//! finishes its transaction under the generic name.

use std::sync::Arc;
use std::time::SystemTime;

use crate::protocol::{Breadcrumb, Map, SpanStatus, Value};
use crate::sanitize::sanitize_params;
use crate::sink::{best_effort, TelemetrySink, TransactionId};
use crate::units::{duration_to_millis, format_bytes};

/// Transaction name used until the real route is known.
const GENERIC_NAME: &str = "console";
/// Operation tag for command transactions.
const OPERATION: &str = "console.command";

/// Memory readings supplied by the host at execution end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// Peak memory used over the execution, in bytes.
    pub peak_bytes: u64,
    /// Memory in use at execution end, in bytes.
    pub current_bytes: u64,
}

/// One unit of tracked work, from invocation to completion.
///
/// Created at invocation start, mutated as fields become known, and
/// dropped once its data has been forwarded to the sink.
#[derive(Clone, Debug)]
pub struct CommandExecution {
    /// Command route, once resolved.
    pub route: Option<String>,
    /// Wall-clock start of the execution.
    pub start_time: SystemTime,
    /// Sanitized invocation parameters.
    pub params: Map<String, Value>,
    /// Total duration in milliseconds, set at completion.
    pub duration_ms: Option<f64>,
    /// Peak memory in bytes, set at completion.
    pub memory_peak_bytes: Option<u64>,
}

/// Tracks exactly one open transaction over one execution lifecycle.
pub struct LifecycleCorrelator {
    sink: Arc<dyn TelemetrySink>,
    handle: Option<TransactionId>,
    execution: Option<CommandExecution>,
    status: SpanStatus,
}

impl LifecycleCorrelator {
    /// Creates a correlator forwarding to the given sink.
    pub fn new(sink: Arc<dyn TelemetrySink>) -> LifecycleCorrelator {
        LifecycleCorrelator {
            sink,
            handle: None,
            execution: None,
            status: SpanStatus::Ok,
        }
    }

    /// Opens the transaction under the generic name.
    ///
    /// Succeeds even if no further detail ever arrives. If the sink
    /// refuses, the correlator carries no handle and every later phase
    /// no-ops.
    pub fn execution_started(&mut self, now: SystemTime) {
        if self.handle.is_some() {
            log::warn!("transaction already open, ignoring duplicate execution start");
            return;
        }
        match self.sink.start_transaction(GENERIC_NAME, OPERATION, now) {
            Ok(id) => {
                self.handle = Some(id);
                self.execution = Some(CommandExecution {
                    route: None,
                    start_time: now,
                    params: Map::new(),
                    duration_ms: None,
                    memory_peak_bytes: None,
                });
            }
            Err(err) => log::warn!("failed to start transaction: {err}"),
        }
    }

    /// Renames the transaction to the resolved route and attaches
    /// sanitized parameters.
    pub fn details_resolved(&mut self, route: &str, params: &Map<String, Value>) {
        let Some(handle) = self.handle else {
            log::warn!("no open transaction, dropping execution details");
            return;
        };
        if route.is_empty() {
            log::warn!("execution details arrived without a route, keeping generic name");
            return;
        }

        let params = sanitize_params(params);
        best_effort("transaction rename", self.sink.set_transaction_name(handle, route));

        let mut data = Map::new();
        data.insert("params".into(), Value::Object(params.clone()));
        best_effort("transaction data", self.sink.set_transaction_data(handle, data));

        let mut crumb = Map::new();
        crumb.insert("route".into(), route.into());
        best_effort(
            "breadcrumb",
            self.sink.add_breadcrumb(Breadcrumb {
                category: Some("console".into()),
                message: Some(format!("Starting: {route}")),
                data: crumb,
                ..Default::default()
            }),
        );

        if let Some(execution) = self.execution.as_mut() {
            execution.route = Some(route.to_owned());
            execution.params = params;
        }
    }

    /// Overrides the status the transaction will be finished with.
    ///
    /// The default is [`SpanStatus::Ok`]; an error handler typically
    /// calls this before completion. Last write wins.
    pub fn set_status(&mut self, status: SpanStatus) {
        self.status = status;
    }

    /// The resolved route, if details have arrived.
    pub fn route(&self) -> Option<&str> {
        self.execution.as_ref()?.route.as_deref()
    }

    /// Attaches performance data and finishes the transaction.
    ///
    /// The handle is consumed here, so the sink sees exactly one finish
    /// per transaction; calling this again is a logged no-op.
    pub fn execution_finished(&mut self, now: SystemTime, memory: MemoryStats) {
        let Some(handle) = self.handle.take() else {
            log::warn!("no open transaction, nothing to finish");
            return;
        };
        let mut execution = match self.execution.take() {
            Some(execution) => execution,
            None => CommandExecution {
                route: None,
                start_time: now,
                params: Map::new(),
                duration_ms: None,
                memory_peak_bytes: None,
            },
        };

        let elapsed = now.duration_since(execution.start_time).unwrap_or_default();
        let duration_ms = duration_to_millis(elapsed);
        execution.duration_ms = Some(duration_ms);
        execution.memory_peak_bytes = Some(memory.peak_bytes);

        let mut data = Map::new();
        data.insert("duration_ms".into(), duration_ms.into());
        data.insert("memory_peak_bytes".into(), memory.peak_bytes.into());
        data.insert("memory_current_bytes".into(), memory.current_bytes.into());
        data.insert(
            "memory_peak".into(),
            format_bytes(memory.peak_bytes.min(i64::MAX as u64) as i64, 2).into(),
        );
        data.insert(
            "memory_current".into(),
            format_bytes(memory.current_bytes.min(i64::MAX as u64) as i64, 2).into(),
        );
        best_effort("performance data", self.sink.set_transaction_data(handle, data));

        let message = match execution.route.as_deref() {
            Some(route) => format!("Finished: {route}"),
            None => "Finished".into(),
        };
        let mut crumb = Map::new();
        crumb.insert("duration_ms".into(), duration_ms.into());
        best_effort(
            "breadcrumb",
            self.sink.add_breadcrumb(Breadcrumb {
                category: Some("console".into()),
                message: Some(message),
                data: crumb,
                ..Default::default()
            }),
        );

        best_effort(
            "transaction finish",
            self.sink.finish_transaction(handle, self.status, now),
        );
    }
}
