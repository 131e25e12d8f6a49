// src/engine/order.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    Limit,
    Market,
    Cancel,
}

/// An intent to trade, routed through `LimitOrderBook::process`.
///
/// `price` is required for LIMIT orders and absent for MARKET and CANCEL.
/// `parent_id` links child orders produced by an execution schedule back to
/// the user-facing parent; it flows into every trade the order produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: u64,
    pub parent_id: Option<u64>,
    pub side: Side,
    pub kind: OrderKind,
    pub size: u64,
    pub price: Option<f64>,
    /// Simulated-clock creation time.
    pub timestamp: f64,
}

impl Order {
    pub fn limit(id: u64, side: Side, price: f64, size: u64, timestamp: f64) -> Self {
        Self {
            id,
            parent_id: None,
            side,
            kind: OrderKind::Limit,
            size,
            price: Some(price),
            timestamp,
        }
    }

    pub fn market(id: u64, side: Side, size: u64, timestamp: f64) -> Self {
        Self {
            id,
            parent_id: None,
            side,
            kind: OrderKind::Market,
            size,
            price: None,
            timestamp,
        }
    }

    /// Cancel-by-id request. Side carries no meaning for a cancel.
    pub fn cancel(id: u64, timestamp: f64) -> Self {
        Self {
            id,
            parent_id: None,
            side: Side::Buy,
            kind: OrderKind::Cancel,
            size: 0,
            price: None,
            timestamp,
        }
    }

    pub fn with_parent(mut self, parent_id: u64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Owner tag for exogenous flow, including initial book seeding.
pub const FLOW_OWNER: u32 = 0;
/// First owner tag available to strategy agents.
pub const FIRST_AGENT_OWNER: u32 = 1;

/// Allocates order ids with the owner tag in the high 32 bits, so ownership
/// checks on fills are plain integer comparisons instead of the string
/// prefix matching this replaces.
#[derive(Debug, Clone)]
pub struct OrderIdGen {
    owner: u32,
    next: u64,
}

impl OrderIdGen {
    pub fn new(owner: u32) -> Self {
        Self { owner, next: 0 }
    }

    pub fn owner(&self) -> u32 {
        self.owner
    }

    pub fn next_id(&mut self) -> u64 {
        let id = ((self.owner as u64) << 32) | (self.next & 0xFFFF_FFFF);
        self.next += 1;
        id
    }

    /// True when `id` was allocated by this generator's owner.
    pub fn owns(&self, id: u64) -> bool {
        (id >> 32) as u32 == self.owner
    }
}
