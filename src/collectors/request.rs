//! Records the surrounding request lifecycle as breadcrumbs.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use crate::collector::Collector;
use crate::events::EventBus;
use crate::protocol::{Breadcrumb, Map};
use crate::scope::Scope;
use crate::sink::{best_effort, TelemetrySink};
use crate::units::duration_to_millis;

/// Emits a breadcrumb at request start and completion.
///
/// The completion breadcrumb carries the elapsed time between the two
/// lifecycle hooks.
pub struct RequestCollector {
    sink: Arc<dyn TelemetrySink>,
    url: Option<String>,
    started: Arc<Mutex<Option<SystemTime>>>,
}

impl RequestCollector {
    /// Creates a request collector forwarding to the given sink.
    pub fn new(sink: Arc<dyn TelemetrySink>) -> RequestCollector {
        RequestCollector {
            sink,
            url: None,
            started: Arc::new(Mutex::new(None)),
        }
    }

    /// Sets the request URL contributed as a scope tag.
    pub fn with_url(mut self, url: impl Into<String>) -> RequestCollector {
        self.url = Some(url.into());
        self
    }
}

impl Collector for RequestCollector {
    fn name(&self) -> &'static str {
        "request"
    }

    fn attach(&self, bus: &mut EventBus) -> bool {
        let sink = Arc::clone(&self.sink);
        let started = Arc::clone(&self.started);
        bus.on_execution_start(move |now| {
            *started.lock().unwrap_or_else(PoisonError::into_inner) = Some(now);
            best_effort(
                "request breadcrumb",
                sink.add_breadcrumb(Breadcrumb {
                    category: Some("request".into()),
                    message: Some("Request started".into()),
                    ..Default::default()
                }),
            );
        });

        let sink = Arc::clone(&self.sink);
        let started = Arc::clone(&self.started);
        bus.on_execution_end(move |end| {
            let mut data = Map::new();
            let begun = started.lock().unwrap_or_else(PoisonError::into_inner).take();
            if let Some(begun) = begun {
                let elapsed = end.time.duration_since(begun).unwrap_or_default();
                data.insert("duration_ms".into(), duration_to_millis(elapsed).into());
            }
            best_effort(
                "request breadcrumb",
                sink.add_breadcrumb(Breadcrumb {
                    category: Some("request".into()),
                    message: Some("Request finished".into()),
                    data,
                    ..Default::default()
                }),
            );
        });

        true
    }

    fn set_tags(&self, scope: &mut Scope) {
        scope.set_tag("type", "request");
        if let Some(url) = &self.url {
            scope.set_tag("url", url);
        }
    }
}
