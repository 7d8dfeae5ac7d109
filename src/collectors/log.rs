//! Bridges the `log` crate into the breadcrumb trail.
//!
//! Records at or above the configured level become breadcrumbs. The
//! bridge installs itself as the process-wide logger, which can happen
//! at most once; a second attach, or one racing another global logger,
//! reports failure instead of panicking.

use std::sync::{Arc, Once};

use crate::collector::Collector;
use crate::events::EventBus;
use crate::protocol::{Breadcrumb, Level};
use crate::sink::TelemetrySink;

/// Converts a [`log::Level`] to a breadcrumb [`Level`].
pub fn convert_log_level(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warning,
        log::Level::Info => Level::Info,
        log::Level::Debug | log::Level::Trace => Level::Debug,
    }
}

/// Creates a [`Breadcrumb`] from a given [`log::Record`].
pub fn breadcrumb_from_record(record: &log::Record<'_>) -> Breadcrumb {
    Breadcrumb {
        ty: "log".into(),
        level: convert_log_level(record.level()),
        category: Some(record.target().into()),
        message: Some(format!("{}", record.args())),
        ..Default::default()
    }
}

/// Captures log records at or above a level as breadcrumbs.
pub struct LogCollector {
    sink: Arc<dyn TelemetrySink>,
    filter: log::LevelFilter,
}

impl LogCollector {
    /// Creates a log collector recording `Info` and above.
    pub fn new(sink: Arc<dyn TelemetrySink>) -> LogCollector {
        LogCollector {
            sink,
            filter: log::LevelFilter::Info,
        }
    }

    /// Sets the level filter for recorded breadcrumbs.
    pub fn filter(mut self, filter: log::LevelFilter) -> LogCollector {
        self.filter = filter;
        self
    }
}

struct BreadcrumbLogger {
    sink: Arc<dyn TelemetrySink>,
    filter: log::LevelFilter,
}

impl log::Log for BreadcrumbLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // Our own boundary warnings must not feed back into the trail.
        if record.target().starts_with("tracekit") {
            return;
        }
        // A warning here would recurse into this logger; drop silently.
        let _ = self.sink.add_breadcrumb(breadcrumb_from_record(record));
    }

    fn flush(&self) {}
}

static INIT: Once = Once::new();

impl Collector for LogCollector {
    fn name(&self) -> &'static str {
        "log"
    }

    fn attach(&self, _bus: &mut EventBus) -> bool {
        let mut installed = false;
        INIT.call_once(|| {
            if log::max_level() < self.filter {
                log::set_max_level(self.filter);
            }
            installed = log::set_boxed_logger(Box::new(BreadcrumbLogger {
                sink: Arc::clone(&self.sink),
                filter: self.filter,
            }))
            .is_ok();
        });
        installed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels_map_onto_breadcrumb_levels() {
        assert_eq!(convert_log_level(log::Level::Error), Level::Error);
        assert_eq!(convert_log_level(log::Level::Warn), Level::Warning);
        assert_eq!(convert_log_level(log::Level::Trace), Level::Debug);
    }

    #[test]
    fn records_become_log_breadcrumbs() {
        // Built in one expression: `format_args!` borrows temporaries.
        let crumb = breadcrumb_from_record(
            &log::Record::builder()
                .args(format_args!("worker finished"))
                .level(log::Level::Info)
                .target("app::worker")
                .build(),
        );
        assert_eq!(crumb.ty, "log");
        assert_eq!(crumb.category.as_deref(), Some("app::worker"));
        assert_eq!(crumb.message.as_deref(), Some("worker finished"));
        assert_eq!(crumb.level, Level::Info);
    }

    #[test]
    fn own_diagnostics_are_not_recorded() {
        use crate::test::RecordingSink;
        use log::Log;

        let sink = RecordingSink::new();
        let logger = BreadcrumbLogger {
            sink: Arc::clone(&sink) as Arc<dyn TelemetrySink>,
            filter: log::LevelFilter::Info,
        };
        logger.log(
            &log::Record::builder()
                .args(format_args!("telemetry dropped"))
                .level(log::Level::Warn)
                .target("tracekit::sink")
                .build(),
        );
        assert!(sink.breadcrumbs().is_empty());
    }
}
