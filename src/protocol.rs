//! The telemetry primitives forwarded to a sink.
//!
//! These types mirror the vocabulary of common monitoring SDKs: a
//! [`Breadcrumb`] is an immutable timestamped note on a shared trail, a
//! [`Level`] classifies its severity, and a [`SpanStatus`] is the final
//! outcome of a transaction.

use std::fmt;
use std::str;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

pub use serde_json::{Map, Value};

/// Severity level of a breadcrumb or log record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Noisy diagnostic detail, rarely worth surfacing.
    Debug,
    /// Routine informational notes.
    #[default]
    Info,
    /// Something unexpected that did not stop execution.
    Warning,
    /// A failure within the observed execution.
    Error,
    /// A failure severe enough to take the process down.
    Fatal,
}

/// An error parsing a [`Level`] from a string.
#[derive(Clone, Copy, Debug, thiserror::Error)]
#[error("invalid level")]
pub struct ParseLevelError;

impl str::FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Level, ParseLevelError> {
        Ok(match s {
            "debug" => Level::Debug,
            "info" | "log" => Level::Info,
            "warning" => Level::Warning,
            "error" => Level::Error,
            "fatal" => Level::Fatal,
            _ => return Err(ParseLevelError),
        })
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Debug => f.write_str("debug"),
            Level::Info => f.write_str("info"),
            Level::Warning => f.write_str("warning"),
            Level::Error => f.write_str("error"),
            Level::Fatal => f.write_str("fatal"),
        }
    }
}

impl Level {
    /// Returns `true` if the level is `Info`, the default.
    pub fn is_info(&self) -> bool {
        matches!(self, Level::Info)
    }
}

/// The final outcome of a finished transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanStatus {
    /// The operation completed successfully.
    #[default]
    Ok,
    /// The operation was cancelled, typically by the caller.
    Cancelled,
    /// The operation failed with an internal error.
    InternalError,
    /// The operation failed for an unknown reason.
    UnknownError,
}

impl fmt::Display for SpanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanStatus::Ok => f.write_str("ok"),
            SpanStatus::Cancelled => f.write_str("cancelled"),
            SpanStatus::InternalError => f.write_str("internal_error"),
            SpanStatus::UnknownError => f.write_str("unknown_error"),
        }
    }
}

mod breadcrumb {
    use super::Level;

    pub fn default_type() -> String {
        "default".into()
    }

    pub fn is_default_type(ty: &str) -> bool {
        ty == "default"
    }

    pub fn default_level() -> Level {
        Level::Info
    }
}

/// A timestamped note appended to the telemetry trail.
///
/// Breadcrumbs are never mutated after creation; their ordering on the
/// trail is their emission order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// The timestamp of the breadcrumb.
    #[serde(default = "SystemTime::now")]
    pub timestamp: SystemTime,
    /// The type of the breadcrumb.
    #[serde(
        rename = "type",
        default = "breadcrumb::default_type",
        skip_serializing_if = "breadcrumb::is_default_type"
    )]
    pub ty: String,
    /// The optional category of the breadcrumb.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// The severity of the breadcrumb, defaulting to info.
    #[serde(default = "breadcrumb::default_level", skip_serializing_if = "Level::is_info")]
    pub level: Level,
    /// An optional human readable message for the breadcrumb.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Arbitrary structured data sent along with the breadcrumb.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
}

impl Default for Breadcrumb {
    fn default() -> Breadcrumb {
        Breadcrumb {
            timestamp: SystemTime::now(),
            ty: breadcrumb::default_type(),
            category: Default::default(),
            level: breadcrumb::default_level(),
            message: Default::default(),
            data: Default::default(),
        }
    }
}
