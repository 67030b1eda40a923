//! Process-wide cache of time series known to exist downstream.

use fieldline_types::sync::DashSet;

/// Remembers which external ids have already been confirmed or
/// created, so warm invocations skip the existence lookup.
///
/// Entries are only ever added. A stale positive would mean the
/// resource was deleted downstream mid-flight, which the platform
/// surfaces as a failed insert on the next call.
#[derive(Debug, Default)]
pub struct ExistenceCache {
    ids: DashSet<String>,
}

impl ExistenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, external_id: &str) -> bool {
        self.ids.contains(external_id)
    }

    pub fn record(&self, external_id: impl Into<String>) {
        self.ids.insert(external_id.into());
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
