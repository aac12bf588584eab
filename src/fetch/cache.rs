//! Success-URL memoization.
//!
//! Remembers, per paper id, the candidate that most recently produced a
//! valid PDF. The entry is a hint: the engine always re-validates it and
//! falls back to the full candidate list when it stops working.

use dashmap::DashMap;

use super::mirror::MirrorKind;

/// The candidate that last served a paper successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedSource {
    /// URL that returned the PDF.
    pub url: String,
    /// Mirror name as stored on the candidate.
    pub mirror: String,
    /// Classified mirror family, used to pick request headers.
    pub kind: MirrorKind,
}

/// Concurrency-safe map from paper id to its last working source.
///
/// Entries are only ever inserted or overwritten, never evicted; the key
/// space is bounded by the catalog.
#[derive(Debug, Default)]
pub struct SuccessCache {
    entries: DashMap<u32, CachedSource>,
}

impl SuccessCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the cached source for `paper_id`.
    #[must_use]
    pub fn get(&self, paper_id: u32) -> Option<CachedSource> {
        self.entries.get(&paper_id).map(|entry| entry.value().clone())
    }

    /// Records a verified successful source, replacing any previous entry.
    pub fn record(&self, paper_id: u32, source: CachedSource) {
        self.entries.insert(paper_id, source);
    }

    /// Number of papers with a remembered source.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn source(url: &str, mirror: &str) -> CachedSource {
        CachedSource {
            url: url.to_string(),
            mirror: mirror.to_string(),
            kind: MirrorKind::classify(mirror),
        }
    }

    #[test]
    fn test_cache_starts_empty() {
        let cache = SuccessCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.get(1), None);
    }

    #[test]
    fn test_cache_record_then_get() {
        let cache = SuccessCache::new();
        cache.record(7, source("https://a.test/x.pdf", "supercop"));
        let hit = cache.get(7).unwrap();
        assert_eq!(hit.url, "https://a.test/x.pdf");
        assert_eq!(hit.kind, MirrorKind::Supercop);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_record_overwrites_previous_entry() {
        let cache = SuccessCache::new();
        cache.record(7, source("https://a.test/old.pdf", "supercop"));
        cache.record(7, source("https://b.test/new.pdf", "selfstudy"));
        let hit = cache.get(7).unwrap();
        assert_eq!(hit.url, "https://b.test/new.pdf");
        assert_eq!(hit.mirror, "selfstudy");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_concurrent_writers() {
        use std::thread;

        let cache = Arc::new(SuccessCache::new());
        let mut handles = Vec::new();
        for id in 0..10u32 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    cache.record(id, source("https://a.test/x.pdf", "aglasem"));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 10);
    }
}
