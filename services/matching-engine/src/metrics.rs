//! Per-block counters
//!
//! Reset at the start of every block and logged once when end-block finishes.

use tracing::info;

/// Work done by the module during one block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockMetrics {
    pub orders_placed: u64,
    pub orders_cancelled: u64,
    pub orders_expired: u64,
    pub products_matched: u64,
    pub deals: u64,
    pub records_pruned: u64,
}

impl BlockMetrics {
    pub fn record_placed(&mut self) {
        self.orders_placed += 1;
    }

    pub fn record_cancelled(&mut self) {
        self.orders_cancelled += 1;
    }

    pub fn record_expired(&mut self) {
        self.orders_expired += 1;
    }

    /// One product cleared with `deals` individual fills
    pub fn record_match(&mut self, deals: usize) {
        self.products_matched += 1;
        self.deals += deals as u64;
    }

    pub fn record_pruned(&mut self, records: u64) {
        self.records_pruned += records;
    }

    pub fn log_summary(&self, height: u64) {
        info!(
            height,
            placed = self.orders_placed,
            cancelled = self.orders_cancelled,
            expired = self.orders_expired,
            matched = self.products_matched,
            deals = self.deals,
            pruned = self.records_pruned,
            "order module block summary"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let mut metrics = BlockMetrics::default();
        metrics.record_placed();
        metrics.record_placed();
        metrics.record_match(3);
        metrics.record_match(2);
        metrics.record_pruned(4);

        assert_eq!(metrics.orders_placed, 2);
        assert_eq!(metrics.products_matched, 2);
        assert_eq!(metrics.deals, 5);
        assert_eq!(metrics.records_pruned, 4);
    }
}
