// src/strategies/base.rs

//! Bookkeeping shared by every concrete strategy: cash and inventory,
//! the child-order schedule, parent reference prices, slippage, and the
//! per-agent metrics series. Concrete strategies embed a [`StrategyBase`]
//! and delegate the common parts of the `Strategy` contract to it.

use std::collections::HashMap;

use tracing::warn;

use crate::engine::book::LimitOrderBook;
use crate::engine::events::{Event, Trade};
use crate::engine::order::{Order, OrderIdGen, Side};
use crate::strategies::execution::{Execution, Slice};
use crate::strategies::strategy_metrics::{StrategyMetrics, StrategySample};
use crate::utils::rng::SimRng;

#[derive(Debug)]
pub struct StrategyBase {
    pub name: String,
    ids: OrderIdGen,
    pub initial_cash: f64,
    pub cash: f64,
    pub initial_inventory: i64,
    pub inventory: i64,
    /// Pending child slices, kept sorted by execution time.
    schedule: Vec<Slice>,
    /// Benchmark price captured at each parent's first execution.
    parent_refs: HashMap<u64, f64>,
    /// `(signed price delta, filled size)` per fill with a known benchmark.
    slippage: Vec<(f64, u64)>,
    /// `(time, trade)` log of every fill involving this agent.
    trades: Vec<(f64, Trade)>,
    pub metrics: StrategyMetrics,
}

impl StrategyBase {
    /// `owner` tags this agent's order ids; it must be unique per agent
    /// and at least `FIRST_AGENT_OWNER`.
    pub fn new(name: impl Into<String>, owner: u32, initial_cash: f64, initial_inventory: i64) -> Self {
        Self {
            name: name.into(),
            ids: OrderIdGen::new(owner),
            initial_cash,
            cash: initial_cash,
            initial_inventory,
            inventory: initial_inventory,
            schedule: Vec::new(),
            parent_refs: HashMap::new(),
            slippage: Vec::new(),
            trades: Vec::new(),
            metrics: StrategyMetrics::new(),
        }
    }

    pub fn next_order_id(&mut self) -> u64 {
        self.ids.next_id()
    }

    /// True when this agent submitted the order behind `id`.
    pub fn owns(&self, id: u64) -> bool {
        self.ids.owns(id)
    }

    // ------------------------------------------------------------------
    //  Scheduling
    // ------------------------------------------------------------------

    /// Split a parent order through `execution` and merge the children
    /// into the schedule. Returns the parent id.
    pub fn schedule_order(
        &mut self,
        execution: &dyn Execution,
        start: f64,
        total_size: u64,
        side: Side,
        rng: &mut SimRng,
    ) -> u64 {
        let parent_id = self.ids.next_id();
        let children = execution.schedule(start, total_size, side, parent_id, rng);
        self.schedule.extend(children);
        self.schedule
            .sort_by(|a, b| a.execute_at.total_cmp(&b.execute_at));
        parent_id
    }

    /// Remove and return every slice due at or before `now`.
    pub fn due_slices(&mut self, now: f64) -> Vec<Slice> {
        let split = self
            .schedule
            .iter()
            .position(|s| s.execute_at > now)
            .unwrap_or(self.schedule.len());
        self.schedule.drain(..split).collect()
    }

    pub fn pending_slices(&self) -> usize {
        self.schedule.len()
    }

    /// Capture the benchmark for a parent on its first child: the
    /// opposite-side best at submission time. With no opposite side the
    /// parent stays unbenchmarked and its fills carry no slippage.
    pub fn capture_parent_ref(&mut self, parent_id: u64, side: Side, book: &LimitOrderBook) {
        if self.parent_refs.contains_key(&parent_id) {
            return;
        }
        let benchmark = match side {
            Side::Buy => book.best_ask().map(|q| q.price),
            Side::Sell => book.best_bid().map(|q| q.price),
        };
        if let Some(price) = benchmark {
            self.parent_refs.insert(parent_id, price);
        }
    }

    pub fn parent_ref(&self, parent_id: u64) -> Option<f64> {
        self.parent_refs.get(&parent_id).copied()
    }

    // ------------------------------------------------------------------
    //  Order validation
    // ------------------------------------------------------------------

    /// Withhold BUY orders whose projected cost exceeds available cash.
    /// The cost basis is the limit price, or the current best ask for a
    /// market order.
    pub fn validate_order(&self, order: &Order, book: &LimitOrderBook) -> bool {
        if order.side != Side::Buy {
            return true;
        }
        let unit_cost = order
            .price
            .or_else(|| book.best_ask().map(|q| q.price))
            .unwrap_or(0.0);
        let projected = unit_cost * order.size as f64;
        if projected > self.cash {
            warn!(
                agent = %self.name,
                order_id = order.id,
                projected,
                cash = self.cash,
                "order withheld: insufficient cash"
            );
            return false;
        }
        true
    }

    // ------------------------------------------------------------------
    //  Fill processing
    // ------------------------------------------------------------------

    /// Fold a batch of events into cash, inventory, slippage, and the
    /// trade log. Ownership compares the owner tag embedded in each order
    /// id, so events for other participants pass through untouched.
    pub fn apply_events(&mut self, now: f64, events: &[Event]) {
        for event in events {
            let Some(trade) = event.as_trade() else {
                continue;
            };
            let bought = self.owns(trade.buy_order_id);
            let sold = self.owns(trade.sell_order_id);
            if !bought && !sold {
                continue;
            }

            let sign = if bought {
                self.inventory += trade.size as i64;
                self.cash -= trade.size as f64 * trade.price;
                1.0
            } else {
                self.inventory -= trade.size as i64;
                self.cash += trade.size as f64 * trade.price;
                -1.0
            };

            if let Some(reference) = trade.parent_id.and_then(|p| self.parent_ref(p)) {
                let delta = (reference - trade.price) * sign;
                self.slippage.push((delta, trade.size));
            }
            self.trades.push((now, *trade));
        }
    }

    pub fn trades(&self) -> &[(f64, Trade)] {
        &self.trades
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    // ------------------------------------------------------------------
    //  Performance
    // ------------------------------------------------------------------

    pub fn realized_pnl(&self) -> f64 {
        self.cash - self.initial_cash
    }

    pub fn unrealized_pnl(&self, mid: f64) -> f64 {
        self.inventory as f64 * mid
    }

    pub fn total_pnl(&self, mid: f64) -> f64 {
        self.realized_pnl() + self.unrealized_pnl(mid)
    }

    pub fn equity(&self, mid: f64) -> f64 {
        self.cash + self.unrealized_pnl(mid)
    }

    /// Size-weighted average slippage per share; 0 with no benchmarked
    /// fills.
    pub fn average_slippage(&self) -> f64 {
        let total_size: u64 = self.slippage.iter().map(|(_, s)| s).sum();
        if total_size == 0 {
            return 0.0;
        }
        self.total_slippage() / total_size as f64
    }

    /// Cumulative signed slippage in price units times shares.
    pub fn total_slippage(&self) -> f64 {
        self.slippage
            .iter()
            .map(|(delta, size)| delta * *size as f64)
            .sum()
    }

    /// Record one sampling boundary into the metrics series.
    pub fn record(&mut self, now: f64, book: &LimitOrderBook) {
        let mid = book.mid();
        let sample = StrategySample {
            cash: self.cash,
            inventory: self.inventory,
            realized_pnl: self.realized_pnl(),
            unrealized_pnl: self.unrealized_pnl(mid),
            total_pnl: self.total_pnl(mid),
            equity: self.equity(mid),
            avg_slippage: self.average_slippage(),
            total_slippage: self.total_slippage(),
            n_trades: self.trade_count(),
        };
        self.metrics.push(now, sample);
    }

    /// Restore pristine state. Keeps the id generator's owner but does not
    /// rewind it, so ids never repeat across runs.
    pub fn reset(&mut self, initial_cash: Option<f64>, initial_inventory: i64) {
        if let Some(cash) = initial_cash {
            self.initial_cash = cash;
        }
        self.cash = self.initial_cash;
        self.initial_inventory = initial_inventory;
        self.inventory = initial_inventory;
        self.schedule.clear();
        self.parent_refs.clear();
        self.slippage.clear();
        self.trades.clear();
        self.metrics.reset();
    }
}
