//! Ambient tag store applied to active telemetry.

use std::collections::BTreeMap;

use crate::sink::{best_effort, TelemetrySink};

/// Holds scope-level tags for the current execution.
///
/// Tags are arbitrary string values used for categorization; writes to
/// the same key are last-write-wins. Collectors contribute tags through
/// [`Collector::set_tags`](crate::Collector::set_tags), and the
/// assembled scope is forwarded to the sink with [`Scope::apply`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scope {
    tags: BTreeMap<String, String>,
}

impl Scope {
    /// Creates a new empty scope.
    pub fn new() -> Scope {
        Default::default()
    }

    /// Sets a tag to a specific value.
    pub fn set_tag<V: ToString>(&mut self, key: &str, value: V) {
        self.tags.insert(key.to_string(), value.to_string());
    }

    /// Removes a tag.
    pub fn remove_tag(&mut self, key: &str) {
        self.tags.remove(key);
    }

    /// Looks up a tag value.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Iterates over all tags in key order.
    pub fn tags(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns `true` when no tags are set.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Forwards every tag through the sink, best-effort.
    pub fn apply(&self, sink: &dyn TelemetrySink) {
        for (key, value) in &self.tags {
            best_effort("scope tag", sink.set_tag(key, value));
        }
    }
}
