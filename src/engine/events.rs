// src/engine/events.rs

use std::collections::VecDeque;

use crate::engine::order::{Order, OrderKind, Side};

/// One elementary match, priced at the maker's level.
///
/// `buy_order_id`/`sell_order_id` name both participants explicitly; for an
/// incoming BUY the maker is the ask being consumed, for an incoming SELL
/// the maker is the bid. `parent_id` is the taker's parent linkage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade {
    pub trade_id: u64,
    pub price: f64,
    pub size: u64,
    pub buy_order_id: u64,
    pub sell_order_id: u64,
    pub parent_id: Option<u64>,
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A LIMIT order's residual quantity was added to the book.
    NewOrder {
        order_id: u64,
        side: Side,
        size: u64,
        price: Option<f64>,
        kind: OrderKind,
        parent_id: Option<u64>,
        timestamp: f64,
    },
    /// A resting order was removed by id. Timestamp is the simulated clock.
    Cancel { order_id: u64, timestamp: f64 },
    Trade(Trade),
}

impl Event {
    pub fn new_order(order: &Order, price: Option<f64>) -> Self {
        Event::NewOrder {
            order_id: order.id,
            side: order.side,
            size: order.size,
            price,
            kind: order.kind,
            parent_id: order.parent_id,
            timestamp: order.timestamp,
        }
    }

    pub fn as_trade(&self) -> Option<&Trade> {
        match self {
            Event::Trade(trade) => Some(trade),
            _ => None,
        }
    }

    pub fn timestamp(&self) -> f64 {
        match self {
            Event::NewOrder { timestamp, .. } => *timestamp,
            Event::Cancel { timestamp, .. } => *timestamp,
            Event::Trade(trade) => trade.timestamp,
        }
    }
}

/// FIFO bus the book publishes into. The simulator drains it whole at each
/// sampling boundary; consumers get their own copies of the batch.
#[derive(Debug, Default)]
pub struct EventQueue {
    queue: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Returns all queued events in emission order and clears the queue.
    pub fn drain(&mut self) -> Vec<Event> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
