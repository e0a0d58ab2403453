use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Internal counters of the answer cache.
#[derive(Default, Debug)]
pub struct CacheMetrics {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub insertions: AtomicU64,
    pub replacements: AtomicU64,
    pub removals: AtomicU64,
    pub lazy_deletions: AtomicU64,
    pub compactions: AtomicU64,
    pub rejected_writes: AtomicU64,
}

/// Point-in-time copy of [`CacheMetrics`] plus the current size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheMetricsSnapshot {
    pub total_entries: usize,
    pub total_names: usize,
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub replacements: u64,
    pub removals: u64,
    pub lazy_deletions: u64,
    pub compactions: u64,
    pub rejected_writes: u64,
    pub hit_rate: f64,
}

impl CacheMetrics {
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(AtomicOrdering::Relaxed) as f64;
        let total = hits + self.misses.load(AtomicOrdering::Relaxed) as f64;

        if total > 0.0 {
            (hits / total) * 100.0
        } else {
            0.0
        }
    }

    pub fn snapshot(&self, total_entries: usize, total_names: usize) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            total_entries,
            total_names,
            hits: self.hits.load(AtomicOrdering::Relaxed),
            misses: self.misses.load(AtomicOrdering::Relaxed),
            insertions: self.insertions.load(AtomicOrdering::Relaxed),
            replacements: self.replacements.load(AtomicOrdering::Relaxed),
            removals: self.removals.load(AtomicOrdering::Relaxed),
            lazy_deletions: self.lazy_deletions.load(AtomicOrdering::Relaxed),
            compactions: self.compactions.load(AtomicOrdering::Relaxed),
            rejected_writes: self.rejected_writes.load(AtomicOrdering::Relaxed),
            hit_rate: self.hit_rate(),
        }
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64, by: usize) {
        counter.fetch_add(by as u64, AtomicOrdering::Relaxed);
    }
}
