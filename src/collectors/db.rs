//! Records executed database queries as breadcrumbs.

use std::sync::Arc;

use crate::collector::Collector;
use crate::events::EventBus;
use crate::protocol::{Breadcrumb, Map};
use crate::sink::{best_effort, TelemetrySink};
use crate::units::duration_to_millis;

/// Forwards query events to the sink, one breadcrumb per query.
pub struct DbCollector {
    sink: Arc<dyn TelemetrySink>,
}

impl DbCollector {
    /// Creates a db collector forwarding to the given sink.
    pub fn new(sink: Arc<dyn TelemetrySink>) -> DbCollector {
        DbCollector { sink }
    }
}

impl Collector for DbCollector {
    fn name(&self) -> &'static str {
        "db"
    }

    fn attach(&self, bus: &mut EventBus) -> bool {
        let sink = Arc::clone(&self.sink);
        bus.on_query(move |query| {
            let mut data = Map::new();
            data.insert("statement".into(), query.statement.clone().into());
            data.insert("duration_ms".into(), duration_to_millis(query.duration).into());
            if let Some(rows) = query.rows {
                data.insert("rows".into(), rows.into());
            }
            best_effort(
                "db breadcrumb",
                sink.add_breadcrumb(Breadcrumb {
                    ty: "query".into(),
                    category: Some("db".into()),
                    message: Some(query.statement.clone()),
                    data,
                    ..Default::default()
                }),
            );
        });
        true
    }
}
