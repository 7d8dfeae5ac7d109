//! The boundary between collectors and the monitoring backend.
//!
//! Everything a collector produces crosses this boundary through the
//! [`TelemetrySink`] trait. Collectors never depend on sink internals:
//! a sink may buffer, batch, or drop data as it sees fit. Dropped
//! telemetry is never retried.

use std::fmt;
use std::time::SystemTime;

use thiserror::Error;
use uuid::Uuid;

use crate::protocol::{Breadcrumb, Map, SpanStatus, Value};

/// An opaque handle identifying an open transaction inside a sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Creates a fresh transaction id.
    pub fn new() -> TransactionId {
        TransactionId(Uuid::new_v4())
    }
}

impl Default for TransactionId {
    fn default() -> TransactionId {
        TransactionId::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An error raised by a [`TelemetrySink`].
///
/// Sink errors are always non-fatal: callers log them and move on. The
/// host application's primary execution must never fail because
/// telemetry failed.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink cannot accept data right now.
    #[error("telemetry sink unavailable: {0}")]
    Unavailable(String),
    /// The referenced transaction is not open in this sink.
    #[error("unknown transaction {0}")]
    UnknownTransaction(TransactionId),
    /// The sink rejected the submitted data.
    #[error("telemetry rejected: {0}")]
    Rejected(String),
}

/// Receives transactions, breadcrumbs and tags from collectors.
///
/// The trait is the exact surface collectors are allowed to touch.
/// Implementations own breadcrumb ordering (emission order) and the
/// lifetime of open transactions.
pub trait TelemetrySink: Send + Sync {
    /// Opens a transaction and returns its handle.
    fn start_transaction(
        &self,
        name: &str,
        op: &str,
        start_time: SystemTime,
    ) -> Result<TransactionId, SinkError>;

    /// Renames an open transaction.
    fn set_transaction_name(&self, id: TransactionId, name: &str) -> Result<(), SinkError>;

    /// Attaches structured data to an open transaction.
    ///
    /// Data merges into anything attached earlier; keys collide
    /// last-write-wins.
    fn set_transaction_data(
        &self,
        id: TransactionId,
        data: Map<String, Value>,
    ) -> Result<(), SinkError>;

    /// Finishes an open transaction with the given status.
    ///
    /// A handle must be finished at most once; the sink may reject a
    /// second finish with [`SinkError::UnknownTransaction`].
    fn finish_transaction(
        &self,
        id: TransactionId,
        status: SpanStatus,
        end_time: SystemTime,
    ) -> Result<(), SinkError>;

    /// Appends a breadcrumb to the trail.
    fn add_breadcrumb(&self, breadcrumb: Breadcrumb) -> Result<(), SinkError>;

    /// Sets a scope-level tag, last-write-wins per key.
    fn set_tag(&self, key: &str, value: &str) -> Result<(), SinkError>;
}

/// A sink that accepts everything and records nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn start_transaction(
        &self,
        _name: &str,
        _op: &str,
        _start_time: SystemTime,
    ) -> Result<TransactionId, SinkError> {
        Ok(TransactionId::new())
    }

    fn set_transaction_name(&self, _id: TransactionId, _name: &str) -> Result<(), SinkError> {
        Ok(())
    }

    fn set_transaction_data(
        &self,
        _id: TransactionId,
        _data: Map<String, Value>,
    ) -> Result<(), SinkError> {
        Ok(())
    }

    fn finish_transaction(
        &self,
        _id: TransactionId,
        _status: SpanStatus,
        _end_time: SystemTime,
    ) -> Result<(), SinkError> {
        Ok(())
    }

    fn add_breadcrumb(&self, _breadcrumb: Breadcrumb) -> Result<(), SinkError> {
        Ok(())
    }

    fn set_tag(&self, _key: &str, _value: &str) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Logs a dropped sink operation as a non-fatal warning.
pub(crate) fn best_effort(what: &str, result: Result<(), SinkError>) {
    if let Err(err) = result {
        log::warn!("telemetry dropped ({what}): {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_accepts_everything() {
        let sink = NoopSink;
        let id = sink
            .start_transaction("console", "console.command", SystemTime::now())
            .unwrap();
        sink.set_transaction_name(id, "migrate/up").unwrap();
        sink.finish_transaction(id, SpanStatus::Ok, SystemTime::now())
            .unwrap();
        sink.set_tag("type", "console").unwrap();
    }

    #[test]
    fn transaction_ids_are_unique() {
        assert_ne!(TransactionId::new(), TransactionId::new());
    }
}
