//! Framework-agnostic lifecycle telemetry collectors.
//!
//! This crate bridges an application's lifecycle events (command
//! execution, requests, database queries, outgoing HTTP calls, log
//! records) into monitoring primitives: transactions, breadcrumbs and
//! scope tags, forwarded to a pluggable [`TelemetrySink`].
//!
//! # Core Concepts
//!
//! The host owns an [`EventBus`] and emits events at the matching
//! points of its own lifecycle. A [`Collector`] registers callbacks on
//! the bus and forwards extracted data to the sink; a
//! [`CollectorRegistry`] composes a set of collectors and attaches each
//! at startup. The most substantial collector,
//! [`ConsoleCollector`](collectors::ConsoleCollector), correlates a
//! command's two-phase lifecycle with a single transaction: opened
//! eagerly under a generic name, renamed once the command route
//! resolves, finished exactly once.
//!
//! All telemetry is best-effort. Sink failures are logged and
//! swallowed; the host's primary execution never fails because
//! telemetry failed.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::SystemTime;
//!
//! use tracekit::collectors::ConsoleCollector;
//! use tracekit::{
//!     CollectorRegistry, EventBus, ExecutionDetails, ExecutionEnd, MemoryStats, NoopSink,
//! };
//!
//! let sink = Arc::new(NoopSink);
//! let mut registry = CollectorRegistry::new();
//! registry.register(ConsoleCollector::new(sink.clone()));
//!
//! let mut bus = EventBus::new();
//! let attached = registry.install_with_sink(&mut bus, &*sink);
//! assert_eq!(attached, 1);
//!
//! // The host drives the rest:
//! bus.emit_execution_start(SystemTime::now());
//! bus.emit_details_resolved(&ExecutionDetails {
//!     route: "migrate/up".into(),
//!     params: Default::default(),
//! });
//! bus.emit_execution_end(&ExecutionEnd {
//!     time: SystemTime::now(),
//!     memory: MemoryStats::default(),
//! });
//! ```

#![warn(missing_docs)]

mod collector;
mod correlator;
mod events;
mod sanitize;
mod scope;
mod sink;
mod units;

pub mod collectors;
pub mod protocol;
pub mod test;

pub use crate::collector::{Collector, CollectorRegistry};
pub use crate::correlator::{CommandExecution, LifecycleCorrelator, MemoryStats};
pub use crate::events::{EventBus, ExecutionDetails, ExecutionEnd, HttpRequestEvent, QueryEvent};
pub use crate::protocol::{Breadcrumb, Level, SpanStatus};
pub use crate::sanitize::{is_sensitive_key, sanitize_params, REDACTED};
pub use crate::scope::Scope;
pub use crate::sink::{NoopSink, SinkError, TelemetrySink, TransactionId};
pub use crate::units::format_bytes;
