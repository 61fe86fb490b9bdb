//! Block execution context
//!
//! Borrowed views of everything the module touches while processing one
//! block: the module store, the token ledger, pair metadata and the header.

use ledger::{TokenKeeper, TokenPairSource};
use store::KvStore;

use crate::events::OrderEvent;
use crate::metrics::BlockMetrics;

/// Height and time of the block being executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub height: u64,
    /// Unix seconds
    pub time: i64,
}

impl BlockHeader {
    pub fn new(height: u64, time: i64) -> Self {
        Self { height, time }
    }
}

pub struct Context<'a> {
    pub header: BlockHeader,
    pub store: &'a mut dyn KvStore,
    pub tokens: &'a mut dyn TokenKeeper,
    pub pairs: &'a dyn TokenPairSource,
    pub metrics: BlockMetrics,
    events: Vec<OrderEvent>,
}

impl<'a> Context<'a> {
    pub fn new(
        header: BlockHeader,
        store: &'a mut dyn KvStore,
        tokens: &'a mut dyn TokenKeeper,
        pairs: &'a dyn TokenPairSource,
    ) -> Self {
        Self {
            header,
            store,
            tokens,
            pairs,
            metrics: BlockMetrics::default(),
            events: Vec::new(),
        }
    }

    pub fn height(&self) -> u64 {
        self.header.height
    }

    pub fn time(&self) -> i64 {
        self.header.time
    }

    pub fn emit(&mut self, event: OrderEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[OrderEvent] {
        &self.events
    }

    /// Hand the collected events to the caller, leaving the buffer empty.
    pub fn take_events(&mut self) -> Vec<OrderEvent> {
        std::mem::take(&mut self.events)
    }
}
