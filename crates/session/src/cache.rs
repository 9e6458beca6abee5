//! Session-lifetime cache of canonical dimensions, keyed by label.
//!
//! Entries are never invalidated: object-class dimensions do not change
//! within a session. Only successful lookups are stored.

use std::collections::HashMap;

use semadepth_core::dimensions::CanonicalDimensions;
use semadepth_inference::{DimensionsSource, ServiceError};

#[derive(Debug, Default)]
pub struct DimensionsCache {
    entries: HashMap<String, CanonicalDimensions>,
}

impl DimensionsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the cached record, fetching it from `source` on first use.
    pub async fn get_or_fetch(
        &mut self,
        label: &str,
        source: &dyn DimensionsSource,
    ) -> Result<CanonicalDimensions, ServiceError> {
        if let Some(dims) = self.entries.get(label) {
            tracing::trace!(label, "Dimensions cache hit");
            return Ok(*dims);
        }

        let dims = source.dimensions(label).await?;
        tracing::debug!(label, ?dims, "Cached canonical dimensions");
        self.entries.insert(label.to_string(), dims);
        Ok(dims)
    }
}
