use std::collections::HashMap;

/// Per-session record cache keyed by element id.
///
/// Entries are built once and never invalidated; a changed model needs a
/// new cache.
#[derive(Debug)]
pub struct ElementCache<R> {
    records: HashMap<u64, R>,
}

impl<R> ElementCache<R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, id: u64) -> Option<&R> {
        self.records.get(&id)
    }

    /// Returns the cached record, building it on first request.
    pub fn get_or_insert_with(&mut self, id: u64, build: impl FnOnce() -> R) -> &R {
        self.records.entry(id).or_insert_with(build)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R> Default for ElementCache<R> {
    fn default() -> Self {
        Self::new()
    }
}
