// src/strategies/strategy_trait.rs

use crate::engine::book::LimitOrderBook;
use crate::engine::book_metrics::BookMetrics;
use crate::engine::events::Event;
use crate::engine::order::Order;
use crate::strategies::strategy_metrics::StrategyMetrics;
use crate::utils::rng::SimRng;

/// Contract every agent satisfies. The simulator drives the lifecycle:
/// `step` every tick, `update` after each of the agent's own submissions
/// is processed, `record` at each sampling boundary, `reset` between runs.
///
/// Agents only ever see the book behind a shared reference; resting orders
/// stay owned by the book.
pub trait Strategy {
    /// Display name for logs and summaries.
    fn name(&self) -> &str;

    /// Decide this tick's actions. Returns cancels first, then new orders;
    /// the simulator submits them in that order.
    fn step(
        &mut self,
        now: f64,
        book: &LimitOrderBook,
        history: &BookMetrics,
        rng: &mut SimRng,
    ) -> (Vec<Order>, Vec<Order>);

    /// Observe the events produced by a just-processed submission (plus
    /// the tick's concurrent exogenous events), so fills on the agent's
    /// own orders land in its bookkeeping.
    fn update(&mut self, now: f64, events: &[Event]);

    /// Record performance at a sampling boundary.
    fn record(&mut self, now: f64, book: &LimitOrderBook);

    /// Restore the agent to a pristine state. `None` keeps the original
    /// initial cash.
    fn reset(&mut self, initial_cash: Option<f64>, initial_inventory: i64);

    fn metrics(&self) -> &StrategyMetrics;
}
