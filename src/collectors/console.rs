//! Correlates a console command's lifecycle with a monitoring
//! transaction.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::collector::Collector;
use crate::correlator::LifecycleCorrelator;
use crate::events::EventBus;
use crate::protocol::SpanStatus;
use crate::scope::Scope;
use crate::sink::TelemetrySink;

/// Tracks one console command per process invocation.
///
/// Wires the three lifecycle hooks (start, details resolved, end) to a
/// shared [`LifecycleCorrelator`]: the transaction opens eagerly under
/// a generic name at start and is renamed once the command route is
/// known, so a command that crashes during bootstrap still produces a
/// finished transaction.
pub struct ConsoleCollector {
    correlator: Arc<Mutex<LifecycleCorrelator>>,
}

impl ConsoleCollector {
    /// Creates a console collector forwarding to the given sink.
    pub fn new(sink: Arc<dyn TelemetrySink>) -> ConsoleCollector {
        ConsoleCollector {
            correlator: Arc::new(Mutex::new(LifecycleCorrelator::new(sink))),
        }
    }

    /// Marks the tracked command as failed.
    ///
    /// The transaction finishes with an error status instead of the
    /// default success; typically called from the host's error handler.
    pub fn mark_failed(&self) {
        lock(&self.correlator).set_status(SpanStatus::InternalError);
    }
}

fn lock(correlator: &Mutex<LifecycleCorrelator>) -> MutexGuard<'_, LifecycleCorrelator> {
    correlator.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Collector for ConsoleCollector {
    fn name(&self) -> &'static str {
        "console"
    }

    fn attach(&self, bus: &mut EventBus) -> bool {
        let correlator = Arc::clone(&self.correlator);
        bus.on_execution_start(move |now| lock(&correlator).execution_started(now));

        let correlator = Arc::clone(&self.correlator);
        bus.on_details_resolved(move |details| {
            lock(&correlator).details_resolved(&details.route, &details.params)
        });

        let correlator = Arc::clone(&self.correlator);
        bus.on_execution_end(move |end| lock(&correlator).execution_finished(end.time, end.memory));

        true
    }

    fn set_tags(&self, scope: &mut Scope) {
        scope.set_tag("type", "console");
        if let Some(route) = lock(&self.correlator).route() {
            let mut parts = route.splitn(2, '/');
            if let Some(command) = parts.next().filter(|part| !part.is_empty()) {
                scope.set_tag("command", command);
            }
            if let Some(action) = parts.next().filter(|part| !part.is_empty()) {
                scope.set_tag("action", action);
            }
        }
    }
}
