// Read-through cache for the base tables.

use std::collections::HashMap;

use log::debug;

/// A read-through cache keyed by source identity (file path or URL).
///
/// Both base tables are loaded at most once per pass and treated as
/// immutable afterwards; `invalidate` is the explicit replacement for
/// process-lifetime memoization when a source is known to have
/// changed.
#[derive(Default)]
pub struct SourceCache<T> {
    entries: HashMap<String, T>,
}

impl<T> SourceCache<T> {
    pub fn new() -> SourceCache<T> {
        SourceCache {
            entries: HashMap::new(),
        }
    }

    /// Returns the cached value for `source_id`, loading it with
    /// `load` on the first call. A failed load caches nothing.
    pub fn get_or_load<E>(
        &mut self,
        source_id: &str,
        load: impl FnOnce() -> Result<T, E>,
    ) -> Result<&T, E> {
        if !self.entries.contains_key(source_id) {
            debug!("SourceCache: loading {:?}", source_id);
            let value = load()?;
            self.entries.insert(source_id.to_string(), value);
        } else {
            debug!("SourceCache: hit for {:?}", source_id);
        }
        Ok(self.entries.get(source_id).unwrap())
    }

    /// Drops the cached value for a source. Returns whether a value
    /// was present.
    pub fn invalidate(&mut self, source_id: &str) -> bool {
        self.entries.remove(source_id).is_some()
    }
}
