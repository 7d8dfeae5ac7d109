//! Explicit event registration replacing framework-level hooks.
//!
//! The host owns an [`EventBus`], collectors register callbacks on it
//! during [`attach`](crate::Collector::attach), and the host emits
//! events at the matching points of its own lifecycle. Dispatch is
//! synchronous and single-threaded: callbacks run in registration
//! order, on the emitting thread.

use std::fmt;
use std::time::{Duration, SystemTime};

use crate::correlator::MemoryStats;
use crate::protocol::{Map, Value};

/// Resolved details of the current execution.
#[derive(Clone, Debug)]
pub struct ExecutionDetails {
    /// Command or action identifier, e.g. `migrate/up`.
    pub route: String,
    /// Raw invocation parameters; sanitized by collectors before they
    /// cross the sink boundary.
    pub params: Map<String, Value>,
}

/// Completion of the current execution.
#[derive(Clone, Copy, Debug)]
pub struct ExecutionEnd {
    /// Wall-clock completion time.
    pub time: SystemTime,
    /// Memory readings at completion.
    pub memory: MemoryStats,
}

/// One executed database query.
#[derive(Clone, Debug)]
pub struct QueryEvent {
    /// The statement as sent to the database.
    pub statement: String,
    /// Time the query took.
    pub duration: Duration,
    /// Affected or returned row count, when the driver reports one.
    pub rows: Option<u64>,
}

/// One outgoing HTTP request.
#[derive(Clone, Debug)]
pub struct HttpRequestEvent {
    /// Request method.
    pub method: String,
    /// Request URL.
    pub url: String,
    /// Response status code, absent when the request never completed.
    pub status: Option<u16>,
    /// Time until the response arrived (or the request failed).
    pub duration: Duration,
}

type Callback<T> = Box<dyn FnMut(&T)>;

/// Synchronous callback dispatcher for host lifecycle events.
#[derive(Default)]
pub struct EventBus {
    execution_start: Vec<Box<dyn FnMut(SystemTime)>>,
    details_resolved: Vec<Callback<ExecutionDetails>>,
    execution_end: Vec<Callback<ExecutionEnd>>,
    query: Vec<Callback<QueryEvent>>,
    http_request: Vec<Callback<HttpRequestEvent>>,
}

impl EventBus {
    /// Creates a bus with no registered callbacks.
    pub fn new() -> EventBus {
        Default::default()
    }

    /// Registers a callback for execution start.
    pub fn on_execution_start<F: FnMut(SystemTime) + 'static>(&mut self, callback: F) {
        self.execution_start.push(Box::new(callback));
    }

    /// Registers a callback for resolved execution details.
    pub fn on_details_resolved<F: FnMut(&ExecutionDetails) + 'static>(&mut self, callback: F) {
        self.details_resolved.push(Box::new(callback));
    }

    /// Registers a callback for execution completion.
    pub fn on_execution_end<F: FnMut(&ExecutionEnd) + 'static>(&mut self, callback: F) {
        self.execution_end.push(Box::new(callback));
    }

    /// Registers a callback for executed database queries.
    pub fn on_query<F: FnMut(&QueryEvent) + 'static>(&mut self, callback: F) {
        self.query.push(Box::new(callback));
    }

    /// Registers a callback for outgoing HTTP requests.
    pub fn on_http_request<F: FnMut(&HttpRequestEvent) + 'static>(&mut self, callback: F) {
        self.http_request.push(Box::new(callback));
    }

    /// Announces that execution is about to start.
    pub fn emit_execution_start(&mut self, now: SystemTime) {
        for callback in &mut self.execution_start {
            callback(now);
        }
    }

    /// Announces resolved execution details.
    pub fn emit_details_resolved(&mut self, details: &ExecutionDetails) {
        for callback in &mut self.details_resolved {
            callback(details);
        }
    }

    /// Announces that execution has completed.
    pub fn emit_execution_end(&mut self, end: &ExecutionEnd) {
        for callback in &mut self.execution_end {
            callback(end);
        }
    }

    /// Announces an executed database query.
    pub fn emit_query(&mut self, query: &QueryEvent) {
        for callback in &mut self.query {
            callback(query);
        }
    }

    /// Announces an outgoing HTTP request.
    pub fn emit_http_request(&mut self, request: &HttpRequestEvent) {
        for callback in &mut self.http_request {
            callback(request);
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("execution_start", &self.execution_start.len())
            .field("details_resolved", &self.details_resolved.len())
            .field("execution_end", &self.execution_end.len())
            .field("query", &self.query.len())
            .field("http_request", &self.http_request.len())
            .finish()
    }
}
