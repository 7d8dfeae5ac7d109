//! Records outgoing HTTP calls as breadcrumbs.

use std::sync::Arc;

use crate::collector::Collector;
use crate::events::EventBus;
use crate::protocol::{Breadcrumb, Level, Map};
use crate::sink::{best_effort, TelemetrySink};
use crate::units::duration_to_millis;

/// Forwards outgoing HTTP request events to the sink.
pub struct HttpClientCollector {
    sink: Arc<dyn TelemetrySink>,
}

impl HttpClientCollector {
    /// Creates an HTTP client collector forwarding to the given sink.
    pub fn new(sink: Arc<dyn TelemetrySink>) -> HttpClientCollector {
        HttpClientCollector { sink }
    }
}

impl Collector for HttpClientCollector {
    fn name(&self) -> &'static str {
        "http"
    }

    fn attach(&self, bus: &mut EventBus) -> bool {
        let sink = Arc::clone(&self.sink);
        bus.on_http_request(move |request| {
            let mut data = Map::new();
            data.insert("method".into(), request.method.clone().into());
            data.insert("url".into(), request.url.clone().into());
            data.insert(
                "duration_ms".into(),
                duration_to_millis(request.duration).into(),
            );
            if let Some(status) = request.status {
                data.insert("status_code".into(), status.into());
            }
            let level = match request.status {
                Some(status) if status >= 400 => Level::Warning,
                Some(_) => Level::Info,
                // The request never completed.
                None => Level::Warning,
            };
            best_effort(
                "http breadcrumb",
                sink.add_breadcrumb(Breadcrumb {
                    ty: "http".into(),
                    category: Some("http".into()),
                    message: Some(format!("{} {}", request.method, request.url)),
                    level,
                    data,
                    ..Default::default()
                }),
            );
        });
        true
    }
}
