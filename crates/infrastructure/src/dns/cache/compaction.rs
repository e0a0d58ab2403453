use super::storage::{AnswerCache, GaugeChanges};
use super::CacheMetrics;
use std::time::Instant;
use tracing::debug;

/// Extension methods for AnswerCache compaction
impl AnswerCache {
    /// Physically remove every expired entry.
    ///
    /// Lazy expiry on read is what guarantees no stale answer is served;
    /// this sweep only reclaims memory for names nobody asks about.
    ///
    /// Returns the number of entries removed
    pub fn compact(&self) -> usize {
        self.compact_at(Instant::now())
    }

    pub fn compact_at(&self, now: Instant) -> usize {
        let mut changes = GaugeChanges::default();
        let mut removed = 0;

        {
            let mut entries = self.write();
            entries.retain(|_name, types| {
                types.retain(|record_type, set| {
                    if set.is_expired_at(now) {
                        changes.removed(*record_type);
                        removed += 1;
                        false
                    } else {
                        true
                    }
                });
                !types.is_empty()
            });
        }

        CacheMetrics::bump(&self.metrics.compactions, 1);
        if removed > 0 {
            CacheMetrics::bump(&self.metrics.removals, removed);
            self.publish(changes);
            debug!(removed, cache_size = self.len(), "Cache compaction completed");
        }

        removed
    }
}
