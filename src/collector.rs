//! The collector contract and the startup registry that wires
//! collectors to a host.

use std::fmt;

use crate::events::EventBus;
use crate::scope::Scope;
use crate::sink::TelemetrySink;

/// Observes one host lifecycle source and forwards structured data to
/// the telemetry sink.
pub trait Collector {
    /// Uniquely identifies this collector.
    fn name(&self) -> &'static str;

    /// Registers the collector's hooks on the host bus.
    ///
    /// Returns `false` when the collector could not attach; the
    /// registry logs and skips it.
    fn attach(&self, bus: &mut EventBus) -> bool;

    /// Contributes scope-level tags.
    ///
    /// A collector must never emit a tag for a field it does not have.
    fn set_tags(&self, scope: &mut Scope) {
        let _ = scope;
    }
}

/// Composes a set of collectors and attaches each at startup.
#[derive(Default)]
pub struct CollectorRegistry {
    collectors: Vec<Box<dyn Collector>>,
}

impl CollectorRegistry {
    /// Creates an empty registry.
    pub fn new() -> CollectorRegistry {
        Default::default()
    }

    /// Adds a collector to the registry.
    pub fn register<C: Collector + 'static>(&mut self, collector: C) {
        self.collectors.push(Box::new(collector));
    }

    /// Attaches every collector to the bus and gathers their tags into
    /// the scope. Returns how many collectors attached.
    pub fn install(&self, bus: &mut EventBus, scope: &mut Scope) -> usize {
        let mut attached = 0;
        for collector in &self.collectors {
            if collector.attach(bus) {
                collector.set_tags(scope);
                attached += 1;
            } else {
                log::warn!("collector {} failed to attach", collector.name());
            }
        }
        attached
    }

    /// Convenience over [`install`](Self::install) that also forwards
    /// the gathered scope tags through the sink.
    pub fn install_with_sink(&self, bus: &mut EventBus, sink: &dyn TelemetrySink) -> usize {
        let mut scope = Scope::new();
        let attached = self.install(bus, &mut scope);
        scope.apply(sink);
        attached
    }
}

impl fmt::Debug for CollectorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.collectors.iter().map(|c| c.name()).collect();
        f.debug_struct("CollectorRegistry")
            .field("collectors", &names)
            .finish()
    }
}
