//! Concrete collectors, one per host lifecycle source.
//!
//! All of them follow the same shape: [`attach`](crate::Collector::attach)
//! registers hooks, the hooks extract a handful of fields and forward
//! them to the sink, and nothing ever propagates a sink failure to the
//! host.

pub mod console;
pub mod db;
pub mod http;
pub mod log;
pub mod request;

pub use self::console::ConsoleCollector;
pub use self::db::DbCollector;
pub use self::http::HttpClientCollector;
pub use self::log::LogCollector;
pub use self::request::RequestCollector;
