// src/engine/book.rs

//! Price-time-priority limit order book.
//!
//! Each side is a price-keyed map of FIFO queues, with prices held as
//! integer tick counts so rounding happens exactly once at the boundary.
//! An auxiliary id index makes cancel-by-id a lookup plus a scan of a
//! single level. The book owns resting orders outright; callers only ever
//! see copies through the query interface.

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::engine::events::{Event, EventQueue, Trade};
use crate::engine::order::{Order, OrderKind, Side};

/// Resting order as the book stores it.
#[derive(Debug, Clone)]
struct RestingOrder {
    id: u64,
    size: u64,
    timestamp: f64,
}

/// Read-only view of a side's priority leader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub order_id: u64,
    pub price: f64,
    pub size: u64,
}

/// One row of a depth snapshot: a resting order in priority order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRow {
    pub side: Side,
    pub price: f64,
    pub size: u64,
}

#[derive(Debug)]
pub struct LimitOrderBook {
    tick_size: f64,
    bids: BTreeMap<i64, VecDeque<RestingOrder>>,
    asks: BTreeMap<i64, VecDeque<RestingOrder>>,
    /// id -> (side, price level) of every resting order.
    index: HashMap<u64, (Side, i64)>,
    events: EventQueue,
    next_trade_id: u64,
}

impl LimitOrderBook {
    pub fn new(tick_size: f64) -> Self {
        Self {
            tick_size,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: HashMap::new(),
            events: EventQueue::new(),
            next_trade_id: 0,
        }
    }

    pub fn tick_size(&self) -> f64 {
        self.tick_size
    }

    fn to_ticks(&self, price: f64) -> i64 {
        (price / self.tick_size).round() as i64
    }

    fn to_price(&self, ticks: i64) -> f64 {
        ticks as f64 * self.tick_size
    }

    // ------------------------------------------------------------------
    //  Queries
    // ------------------------------------------------------------------

    pub fn best_bid(&self) -> Option<Quote> {
        self.bids.iter().next_back().and_then(|(&ticks, queue)| {
            queue.front().map(|order| Quote {
                order_id: order.id,
                price: self.to_price(ticks),
                size: order.size,
            })
        })
    }

    pub fn best_ask(&self) -> Option<Quote> {
        self.asks.iter().next().and_then(|(&ticks, queue)| {
            queue.front().map(|order| Quote {
                order_id: order.id,
                price: self.to_price(ticks),
                size: order.size,
            })
        })
    }

    /// Midpoint of the touch; falls back to the one populated side, and to
    /// 0 when the book is empty.
    pub fn mid(&self) -> f64 {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => (bid.price + ask.price) / 2.0,
            (Some(bid), None) => bid.price,
            (None, Some(ask)) => ask.price,
            (None, None) => 0.0,
        }
    }

    /// Best ask minus best bid; 0 when both sides are empty, infinite when
    /// exactly one side is.
    pub fn spread(&self) -> f64 {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => ask.price - bid.price,
            (None, None) => 0.0,
            _ => f64::INFINITY,
        }
    }

    /// Total resting size across the top `levels` bid price levels
    /// (all levels when `None`).
    pub fn bid_size(&self, levels: Option<usize>) -> u64 {
        let take = levels.unwrap_or(usize::MAX);
        self.bids
            .values()
            .rev()
            .take(take)
            .map(|queue| queue.iter().map(|o| o.size).sum::<u64>())
            .sum()
    }

    pub fn ask_size(&self, levels: Option<usize>) -> u64 {
        let take = levels.unwrap_or(usize::MAX);
        self.asks
            .values()
            .take(take)
            .map(|queue| queue.iter().map(|o| o.size).sum::<u64>())
            .sum()
    }

    /// Number of resting bid orders.
    pub fn bid_depth(&self) -> usize {
        self.bids.values().map(VecDeque::len).sum()
    }

    pub fn ask_depth(&self) -> usize {
        self.asks.values().map(VecDeque::len).sum()
    }

    /// Every resting id, asks in priority order then bids in priority
    /// order. The enumeration order is stable so a seeded run stays
    /// reproducible when a cancel target is drawn from it.
    pub fn all_order_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .asks
            .values()
            .flat_map(|queue| queue.iter().map(|o| o.id))
            .collect();
        ids.extend(
            self.bids
                .values()
                .rev()
                .flat_map(|queue| queue.iter().map(|o| o.id)),
        );
        ids
    }

    /// Top `depth` resting orders per side, asks first, without mutating
    /// the book.
    pub fn depth_snapshot(&self, depth: usize) -> Vec<DepthRow> {
        let mut rows = Vec::new();
        rows.extend(
            self.asks
                .iter()
                .flat_map(|(&ticks, queue)| queue.iter().map(move |o| (ticks, o.size)))
                .take(depth)
                .map(|(ticks, size)| DepthRow {
                    side: Side::Sell,
                    price: self.to_price(ticks),
                    size,
                }),
        );
        rows.extend(
            self.bids
                .iter()
                .rev()
                .flat_map(|(&ticks, queue)| queue.iter().map(move |o| (ticks, o.size)))
                .take(depth)
                .map(|(ticks, size)| DepthRow {
                    side: Side::Buy,
                    price: self.to_price(ticks),
                    size,
                }),
        );
        rows
    }

    /// Returns the queued events in emission order and clears the bus.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    // ------------------------------------------------------------------
    //  Order processing
    // ------------------------------------------------------------------

    /// Dispatch on order kind. Malformed inputs yield an empty event list
    /// and leave the book untouched; no error ever crosses this boundary.
    pub fn process(&mut self, order: Order) -> Vec<Event> {
        match order.kind {
            OrderKind::Cancel => self.cancel_by_id(order.id, order.timestamp),
            OrderKind::Market => self.match_market(order),
            OrderKind::Limit => self.match_limit(order),
        }
    }

    fn match_market(&mut self, mut order: Order) -> Vec<Event> {
        let mut produced = Vec::new();
        while order.size > 0 {
            match self.execute_match(&order, None) {
                Some(trade) => {
                    order.size -= trade.size;
                    produced.push(Event::Trade(trade));
                }
                None => break, // opposite side exhausted; residual discarded
            }
        }
        produced
    }

    fn match_limit(&mut self, mut order: Order) -> Vec<Event> {
        let Some(price) = order.price else {
            return Vec::new();
        };
        let limit_ticks = self.to_ticks(price);
        if limit_ticks <= 0 || order.size == 0 {
            return Vec::new();
        }

        let mut produced = Vec::new();
        while order.size > 0 {
            match self.execute_match(&order, Some(limit_ticks)) {
                Some(trade) => {
                    order.size -= trade.size;
                    produced.push(Event::Trade(trade));
                }
                None => break,
            }
        }

        if order.size > 0 {
            produced.push(self.rest_order(order, limit_ticks));
        }
        produced
    }

    /// One elementary match against the opposite side's priority leader,
    /// at the maker's price. `limit_ticks` bounds how far a limit taker
    /// may cross; `None` lets a market taker walk the whole side.
    fn execute_match(&mut self, taker: &Order, limit_ticks: Option<i64>) -> Option<Trade> {
        let (level_ticks, maker_id, trade_size, maker_done, level_empty) = {
            let (&level_ticks, queue) = match taker.side {
                Side::Buy => self.asks.iter_mut().next()?,
                Side::Sell => self.bids.iter_mut().next_back()?,
            };
            if let Some(limit) = limit_ticks {
                let crosses = match taker.side {
                    Side::Buy => level_ticks <= limit,
                    Side::Sell => level_ticks >= limit,
                };
                if !crosses {
                    return None;
                }
            }
            let maker = queue.front_mut()?;
            let trade_size = maker.size.min(taker.size);
            maker.size -= trade_size;
            let maker_id = maker.id;
            let maker_done = maker.size == 0;
            if maker_done {
                queue.pop_front();
            }
            (level_ticks, maker_id, trade_size, maker_done, queue.is_empty())
        };

        if maker_done {
            self.index.remove(&maker_id);
        }
        if level_empty {
            match taker.side {
                Side::Buy => self.asks.remove(&level_ticks),
                Side::Sell => self.bids.remove(&level_ticks),
            };
        }

        let (buy_order_id, sell_order_id) = match taker.side {
            Side::Buy => (taker.id, maker_id),
            Side::Sell => (maker_id, taker.id),
        };
        let trade = Trade {
            trade_id: self.alloc_trade_id(),
            price: self.to_price(level_ticks),
            size: trade_size,
            buy_order_id,
            sell_order_id,
            parent_id: taker.parent_id,
            timestamp: taker.timestamp,
        };
        self.events.publish(Event::Trade(trade));
        Some(trade)
    }

    /// Add a limit residual to its own side and emit the NewOrder event.
    fn rest_order(&mut self, order: Order, ticks: i64) -> Event {
        let resting = RestingOrder {
            id: order.id,
            size: order.size,
            timestamp: order.timestamp,
        };
        let side_map = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        side_map.entry(ticks).or_default().push_back(resting);
        self.index.insert(order.id, (order.side, ticks));

        let event = Event::new_order(&order, Some(self.to_price(ticks)));
        self.events.publish(event.clone());
        event
    }

    /// Remove a resting order by id. Unknown ids fail silently: no event,
    /// no state change.
    fn cancel_by_id(&mut self, order_id: u64, timestamp: f64) -> Vec<Event> {
        let Some((side, ticks)) = self.index.remove(&order_id) else {
            return Vec::new();
        };
        let side_map = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(queue) = side_map.get_mut(&ticks) {
            if let Some(pos) = queue.iter().position(|o| o.id == order_id) {
                queue.remove(pos);
            }
            if queue.is_empty() {
                side_map.remove(&ticks);
            }
        }

        let event = Event::Cancel {
            order_id,
            timestamp,
        };
        self.events.publish(event.clone());
        vec![event]
    }

    fn alloc_trade_id(&mut self) -> u64 {
        let id = self.next_trade_id;
        self.next_trade_id += 1;
        id
    }

    /// Resting timestamp lookup, used by tests and diagnostics.
    #[cfg(test)]
    fn resting_timestamp(&self, order_id: u64) -> Option<f64> {
        let (side, ticks) = self.index.get(&order_id)?;
        let side_map = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        side_map
            .get(ticks)?
            .iter()
            .find(|o| o.id == order_id)
            .map(|o| o.timestamp)
    }
}
