//! FIFO order-id queues per (product, price, side)
//!
//! Queues live in an arena addressed by slot; a `BTreeMap` maps each
//! structured key to its slot. A queue is hydrated from the store the first
//! time it is touched in a block and written back once by the keeper.
//! Time priority inside a level is queue order.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use types::ids::{OrderId, Product};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};

/// Identifies one queue
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderIdsKey {
    pub product: Product,
    pub price: Price,
    pub side: Side,
}

impl OrderIdsKey {
    pub fn new(product: Product, price: Price, side: Side) -> Self {
        Self {
            product,
            price,
            side,
        }
    }

    /// Queue an order rests in
    pub fn for_order(order: &Order) -> Self {
        Self::new(order.product.clone(), order.price, order.side)
    }
}

impl fmt::Display for OrderIdsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.product, self.price.key_string(), self.side)
    }
}

#[derive(Debug)]
struct IdQueue {
    key: OrderIdsKey,
    ids: VecDeque<OrderId>,
    dirty: bool,
}

/// Per-block cache of order-id queues
#[derive(Debug, Default)]
pub struct OrderIdsMap {
    slots: BTreeMap<OrderIdsKey, usize>,
    queues: Vec<IdQueue>,
}

impl OrderIdsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot of `key`, calling `load` to fetch the stored queue on first touch.
    pub fn hydrate<F>(&mut self, key: &OrderIdsKey, load: F) -> usize
    where
        F: FnOnce() -> Vec<OrderId>,
    {
        if let Some(&slot) = self.slots.get(key) {
            return slot;
        }
        let slot = self.queues.len();
        self.queues.push(IdQueue {
            key: key.clone(),
            ids: load().into(),
            dirty: false,
        });
        self.slots.insert(key.clone(), slot);
        slot
    }

    /// Queued ids, front first
    pub fn ids(&self, slot: usize) -> impl Iterator<Item = &OrderId> {
        self.queues[slot].ids.iter()
    }

    pub fn front(&self, slot: usize) -> Option<OrderId> {
        self.queues[slot].ids.front().copied()
    }

    pub fn queue_len(&self, slot: usize) -> usize {
        self.queues[slot].ids.len()
    }

    /// Append at the back (lowest time priority).
    pub fn insert(&mut self, slot: usize, order_id: OrderId) {
        let queue = &mut self.queues[slot];
        queue.ids.push_back(order_id);
        queue.dirty = true;
    }

    /// Splice an id out of its queue.
    ///
    /// # Panics
    /// Panics if the id is not queued.
    pub fn remove(&mut self, slot: usize, order_id: &OrderId) {
        let queue = &mut self.queues[slot];
        let pos = queue
            .ids
            .iter()
            .position(|id| id == order_id)
            .unwrap_or_else(|| panic!("order {} missing from queue {}", order_id, queue.key));
        queue.ids.remove(pos);
        queue.dirty = true;
    }

    /// Fill `need` from the queue front to back.
    ///
    /// `fill_one(id, left)` fills the order with up to `left` and returns the
    /// amount filled and whether the order is now exhausted. Exhausted ids
    /// are popped; the walk stops once `need` is met.
    ///
    /// # Panics
    /// Panics if the queue runs out before `need` is met or if an order that
    /// is not exhausted leaves part of `need` unfilled.
    pub fn fill<F>(&mut self, slot: usize, need: Quantity, mut fill_one: F)
    where
        F: FnMut(OrderId, Quantity) -> (Quantity, bool),
    {
        let queue = &mut self.queues[slot];
        let mut left = need;
        while !left.is_zero() {
            let order_id = *queue.ids.front().unwrap_or_else(|| {
                panic!("queue {} exhausted with {} left to fill", queue.key, left)
            });
            let (filled, exhausted) = fill_one(order_id, left);
            left = left - filled;
            if exhausted {
                queue.ids.pop_front();
                queue.dirty = true;
            } else {
                assert!(
                    left.is_zero(),
                    "order {} in queue {} partially filled with {} still needed",
                    order_id,
                    queue.key,
                    left
                );
            }
        }
    }

    /// Take every modified queue for writing, leaving the map empty.
    ///
    /// Drained in key order; emptied queues are returned too.
    pub fn drain_dirty(&mut self) -> Vec<(OrderIdsKey, Vec<OrderId>)> {
        let slots = std::mem::take(&mut self.slots);
        let mut queues: Vec<Option<IdQueue>> =
            std::mem::take(&mut self.queues).into_iter().map(Some).collect();

        slots
            .into_values()
            .filter_map(|slot| queues[slot].take())
            .filter(|queue| queue.dirty)
            .map(|queue| (queue.key, queue.ids.into_iter().collect()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.queues.clear();
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}
