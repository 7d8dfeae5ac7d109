//! Test support for inspecting emitted telemetry.
//!
//! [`RecordingSink`] captures every sink operation instead of sending
//! it anywhere, so tests can assert on exactly what a collector
//! produced:
//!
//! ```
//! use std::sync::Arc;
//! use std::time::SystemTime;
//!
//! use tracekit::test::RecordingSink;
//! use tracekit::{SpanStatus, TelemetrySink};
//!
//! let sink = RecordingSink::new();
//! let id = sink
//!     .start_transaction("console", "console.command", SystemTime::now())
//!     .unwrap();
//! sink.finish_transaction(id, SpanStatus::Ok, SystemTime::now())
//!     .unwrap();
//!
//! assert_eq!(sink.finished(), vec![(id, SpanStatus::Ok)]);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use crate::protocol::{Breadcrumb, Map, SpanStatus, Value};
use crate::sink::{SinkError, TelemetrySink, TransactionId};

/// One recorded sink operation.
#[derive(Clone, Debug)]
pub enum SinkCall {
    /// A transaction was opened.
    StartTransaction {
        /// Handle the sink returned.
        id: TransactionId,
        /// Initial transaction name.
        name: String,
        /// Operation tag.
        op: String,
        /// Start timestamp.
        start_time: SystemTime,
    },
    /// A transaction was renamed.
    SetTransactionName {
        /// Transaction being renamed.
        id: TransactionId,
        /// The new name.
        name: String,
    },
    /// Data was attached to a transaction.
    SetTransactionData {
        /// Transaction receiving the data.
        id: TransactionId,
        /// The attached data.
        data: Map<String, Value>,
    },
    /// A transaction was finished.
    FinishTransaction {
        /// Transaction being finished.
        id: TransactionId,
        /// Final status.
        status: SpanStatus,
        /// End timestamp.
        end_time: SystemTime,
    },
    /// A breadcrumb was appended.
    AddBreadcrumb(Breadcrumb),
    /// A scope tag was set.
    SetTag {
        /// Tag key.
        key: String,
        /// Tag value.
        value: String,
    },
}

/// Captures sink operations instead of sending them.
#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    fail_all: AtomicBool,
}

impl RecordingSink {
    /// Creates a new recording sink.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> Arc<RecordingSink> {
        Arc::new(Default::default())
    }

    /// Makes every subsequent operation fail with
    /// [`SinkError::Unavailable`], for exercising best-effort paths.
    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Returns a copy of all recorded calls, in emission order.
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns all recorded breadcrumbs, in emission order.
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SinkCall::AddBreadcrumb(crumb) => Some(crumb),
                _ => None,
            })
            .collect()
    }

    /// Returns every finished transaction with its final status.
    pub fn finished(&self) -> Vec<(TransactionId, SpanStatus)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SinkCall::FinishTransaction { id, status, .. } => Some((id, status)),
                _ => None,
            })
            .collect()
    }

    /// Returns all attached transaction data merged in emission order.
    pub fn transaction_data(&self) -> Map<String, Value> {
        let mut merged = Map::new();
        for call in self.calls() {
            if let SinkCall::SetTransactionData { data, .. } = call {
                merged.extend(data);
            }
        }
        merged
    }

    /// Returns all recorded tags, last write per key.
    pub fn tags(&self) -> Map<String, Value> {
        let mut tags = Map::new();
        for call in self.calls() {
            if let SinkCall::SetTag { key, value } = call {
                tags.insert(key, value.into());
            }
        }
        tags
    }

    fn record(&self, call: SinkCall) -> Result<(), SinkError> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(SinkError::Unavailable("recording sink set to fail".into()));
        }
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        Ok(())
    }
}

impl TelemetrySink for RecordingSink {
    fn start_transaction(
        &self,
        name: &str,
        op: &str,
        start_time: SystemTime,
    ) -> Result<TransactionId, SinkError> {
        let id = TransactionId::new();
        self.record(SinkCall::StartTransaction {
            id,
            name: name.into(),
            op: op.into(),
            start_time,
        })?;
        Ok(id)
    }

    fn set_transaction_name(&self, id: TransactionId, name: &str) -> Result<(), SinkError> {
        self.record(SinkCall::SetTransactionName {
            id,
            name: name.into(),
        })
    }

    fn set_transaction_data(
        &self,
        id: TransactionId,
        data: Map<String, Value>,
    ) -> Result<(), SinkError> {
        self.record(SinkCall::SetTransactionData { id, data })
    }

    fn finish_transaction(
        &self,
        id: TransactionId,
        status: SpanStatus,
        end_time: SystemTime,
    ) -> Result<(), SinkError> {
        self.record(SinkCall::FinishTransaction {
            id,
            status,
            end_time,
        })
    }

    fn add_breadcrumb(&self, breadcrumb: Breadcrumb) -> Result<(), SinkError> {
        self.record(SinkCall::AddBreadcrumb(breadcrumb))
    }

    fn set_tag(&self, key: &str, value: &str) -> Result<(), SinkError> {
        self.record(SinkCall::SetTag {
            key: key.into(),
            value: value.into(),
        })
    }
}
