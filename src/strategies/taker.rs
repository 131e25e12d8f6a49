// src/strategies/taker.rs

//! Liquidity-taking strategies. A taker turns scheduled parent orders
//! into market child orders via its execution style; the signal-driven
//! variant schedules parents itself from a smoothed signal.

use tracing::debug;

use crate::engine::book::LimitOrderBook;
use crate::engine::book_metrics::BookMetrics;
use crate::engine::events::Event;
use crate::engine::order::{Order, Side};
use crate::strategies::base::StrategyBase;
use crate::strategies::execution::Execution;
use crate::strategies::signal::{ImbalanceSignal, MomentumSignal, Signal};
use crate::strategies::strategy_metrics::StrategyMetrics;
use crate::strategies::strategy_trait::Strategy;
use crate::utils::rng::SimRng;

/// Taker whose parents are scheduled externally before the run.
pub struct ManualTaker {
    base: StrategyBase,
    execution: Box<dyn Execution>,
}

impl ManualTaker {
    pub fn new(
        name: impl Into<String>,
        owner: u32,
        initial_cash: f64,
        initial_inventory: i64,
        execution: Box<dyn Execution>,
    ) -> Self {
        Self {
            base: StrategyBase::new(name, owner, initial_cash, initial_inventory),
            execution,
        }
    }

    /// Schedule a parent order for execution from `start` onward.
    /// Returns the parent id shared by all children.
    pub fn schedule_order(
        &mut self,
        start: f64,
        total_size: u64,
        side: Side,
        rng: &mut SimRng,
    ) -> u64 {
        self.base
            .schedule_order(self.execution.as_ref(), start, total_size, side, rng)
    }

    pub fn base(&self) -> &StrategyBase {
        &self.base
    }

    /// Turn due slices into market orders, benchmarking each parent on
    /// its first child.
    fn submit_due(&mut self, now: f64, book: &LimitOrderBook) -> Vec<Order> {
        let mut orders = Vec::new();
        for slice in self.base.due_slices(now) {
            self.base.capture_parent_ref(slice.parent_id, slice.side, book);
            let id = self.base.next_order_id();
            let order = Order::market(id, slice.side, slice.size, now).with_parent(slice.parent_id);
            if self.base.validate_order(&order, book) {
                orders.push(order);
            }
        }
        orders
    }
}

impl Strategy for ManualTaker {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn step(
        &mut self,
        now: f64,
        book: &LimitOrderBook,
        _history: &BookMetrics,
        _rng: &mut SimRng,
    ) -> (Vec<Order>, Vec<Order>) {
        (Vec::new(), self.submit_due(now, book))
    }

    fn update(&mut self, now: f64, events: &[Event]) {
        self.base.apply_events(now, events);
    }

    fn record(&mut self, now: f64, book: &LimitOrderBook) {
        self.base.record(now, book);
    }

    fn reset(&mut self, initial_cash: Option<f64>, initial_inventory: i64) {
        self.base.reset(initial_cash, initial_inventory);
    }

    fn metrics(&self) -> &StrategyMetrics {
        &self.base.metrics
    }
}

/// Tuning for a [`SignalTaker`].
#[derive(Debug, Clone, Copy)]
pub struct SignalTakerParams {
    /// Fire when the smoothed state leaves `[-sensitivity, sensitivity]`.
    pub sensitivity: f64,
    /// EMA factor applied to the raw signal each tick.
    pub smoothing: f64,
    /// Seconds between firings.
    pub cooldown: f64,
    /// Fraction of cash never committed to a single buy.
    pub cash_buffer: f64,
}

impl Default for SignalTakerParams {
    fn default() -> Self {
        Self {
            sensitivity: 0.5,
            smoothing: 0.2,
            cooldown: 60.0,
            cash_buffer: 0.1,
        }
    }
}

/// Taker that schedules its own parents when a smoothed signal crosses
/// its sensitivity band. Buys are sized from available cash, sells from
/// held inventory; it never shorts.
pub struct SignalTaker {
    base: StrategyBase,
    execution: Box<dyn Execution>,
    signal: Box<dyn Signal>,
    params: SignalTakerParams,
    state: f64,
    last_fire: f64,
}

impl SignalTaker {
    pub fn new(
        name: impl Into<String>,
        owner: u32,
        initial_cash: f64,
        initial_inventory: i64,
        signal: Box<dyn Signal>,
        execution: Box<dyn Execution>,
        params: SignalTakerParams,
    ) -> Self {
        Self {
            base: StrategyBase::new(name, owner, initial_cash, initial_inventory),
            execution,
            signal,
            params,
            state: 0.0,
            last_fire: f64::NEG_INFINITY,
        }
    }

    /// Momentum taker with the EMA factor tied to the look-back window.
    pub fn momentum(
        name: impl Into<String>,
        owner: u32,
        initial_cash: f64,
        execution: Box<dyn Execution>,
        look_back: usize,
        alpha: f64,
        sensitivity: f64,
    ) -> Self {
        let params = SignalTakerParams {
            sensitivity,
            smoothing: 2.0 / (look_back as f64 + 1.0),
            ..Default::default()
        };
        Self::new(
            name,
            owner,
            initial_cash,
            0,
            Box::new(MomentumSignal::new(look_back, alpha)),
            execution,
            params,
        )
    }

    pub fn imbalance(
        name: impl Into<String>,
        owner: u32,
        initial_cash: f64,
        execution: Box<dyn Execution>,
        levels: usize,
        sensitivity: f64,
    ) -> Self {
        let params = SignalTakerParams {
            sensitivity,
            ..Default::default()
        };
        Self::new(
            name,
            owner,
            initial_cash,
            0,
            Box::new(ImbalanceSignal::new(levels)),
            execution,
            params,
        )
    }

    pub fn state(&self) -> f64 {
        self.state
    }

    pub fn base(&self) -> &StrategyBase {
        &self.base
    }

    /// Schedule a parent when the smoothed state breaches the band.
    fn maybe_fire(&mut self, now: f64, book: &LimitOrderBook, rng: &mut SimRng) {
        if now - self.last_fire < self.params.cooldown {
            return;
        }

        if self.state > self.params.sensitivity {
            let Some(ask) = book.best_ask() else {
                return;
            };
            let budget = self.base.cash * (1.0 - self.params.cash_buffer) * self.state;
            let size = (budget / ask.price).floor() as u64;
            if size >= 1 {
                let parent = self.base.schedule_order(
                    self.execution.as_ref(),
                    now,
                    size,
                    Side::Buy,
                    rng,
                );
                debug!(agent = %self.base.name, parent, size, state = self.state, "signal buy");
                self.last_fire = now;
            }
        } else if self.state < -self.params.sensitivity && self.base.inventory > 0 {
            let size = (self.state.abs() * self.base.inventory as f64).floor() as u64;
            if size >= 1 {
                let parent = self.base.schedule_order(
                    self.execution.as_ref(),
                    now,
                    size,
                    Side::Sell,
                    rng,
                );
                debug!(agent = %self.base.name, parent, size, state = self.state, "signal sell");
                self.last_fire = now;
            }
        }
    }
}

impl Strategy for SignalTaker {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn step(
        &mut self,
        now: f64,
        book: &LimitOrderBook,
        history: &BookMetrics,
        rng: &mut SimRng,
    ) -> (Vec<Order>, Vec<Order>) {
        // Submit whatever is due before re-evaluating the signal.
        let mut orders = Vec::new();
        for slice in self.base.due_slices(now) {
            self.base.capture_parent_ref(slice.parent_id, slice.side, book);
            let id = self.base.next_order_id();
            let order = Order::market(id, slice.side, slice.size, now).with_parent(slice.parent_id);
            if self.base.validate_order(&order, book) {
                orders.push(order);
            }
        }

        let raw = self.signal.compute(book, history);
        self.state = self.params.smoothing * raw + (1.0 - self.params.smoothing) * self.state;
        self.maybe_fire(now, book, rng);

        (Vec::new(), orders)
    }

    fn update(&mut self, now: f64, events: &[Event]) {
        self.base.apply_events(now, events);
    }

    fn record(&mut self, now: f64, book: &LimitOrderBook) {
        self.base.record(now, book);
    }

    fn reset(&mut self, initial_cash: Option<f64>, initial_inventory: i64) {
        self.base.reset(initial_cash, initial_inventory);
        self.state = 0.0;
        self.last_fire = f64::NEG_INFINITY;
    }

    fn metrics(&self) -> &StrategyMetrics {
        &self.base.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::order::{FIRST_AGENT_OWNER, OrderKind};
    use crate::strategies::execution::{BlockExecution, TwapExecution};

    fn book_with_touch(bid: f64, ask: f64) -> LimitOrderBook {
        let mut book = LimitOrderBook::new(0.01);
        book.process(Order::limit(1, Side::Buy, bid, 1000, 0.0));
        book.process(Order::limit(2, Side::Sell, ask, 1000, 0.0));
        book
    }

    #[test]
    fn manual_taker_submits_due_market_children() {
        let mut rng = SimRng::from_seed(42);
        let mut taker = ManualTaker::new(
            "taker",
            FIRST_AGENT_OWNER,
            1_000_000.0,
            0,
            Box::new(BlockExecution),
        );
        let parent = taker.schedule_order(100.0, 50, Side::Buy, &mut rng);
        let book = book_with_touch(99.0, 101.0);
        let history = BookMetrics::new();

        // Not due yet.
        let (_, early) = taker.step(50.0, &book, &history, &mut rng);
        assert!(early.is_empty());

        let (cancels, orders) = taker.step(100.0, &book, &history, &mut rng);
        assert!(cancels.is_empty());
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].kind, OrderKind::Market);
        assert_eq!(orders[0].size, 50);
        assert_eq!(orders[0].parent_id, Some(parent));
        // Benchmark captured from the opposite side at first execution.
        assert_eq!(taker.base().parent_ref(parent), Some(101.0));
    }

    #[test]
    fn manual_taker_withholds_unaffordable_buys() {
        let mut rng = SimRng::from_seed(42);
        let mut taker =
            ManualTaker::new("poor", FIRST_AGENT_OWNER, 100.0, 0, Box::new(BlockExecution));
        taker.schedule_order(0.0, 50, Side::Buy, &mut rng);
        let book = book_with_touch(99.0, 101.0);

        let (_, orders) = taker.step(0.0, &book, &BookMetrics::new(), &mut rng);
        assert!(orders.is_empty());
    }

    #[test]
    fn twap_taker_spreads_children_over_time() {
        let mut rng = SimRng::from_seed(42);
        let twap = TwapExecution::new(6, 1200.0).unwrap();
        let mut taker = ManualTaker::new(
            "twap",
            FIRST_AGENT_OWNER,
            10_000_000.0,
            0,
            Box::new(twap),
        );
        taker.schedule_order(100.0, 600, Side::Buy, &mut rng);
        let book = book_with_touch(99.0, 101.0);
        let history = BookMetrics::new();

        let mut submitted = Vec::new();
        let mut t = 0.0;
        while t <= 1400.0 {
            let (_, orders) = taker.step(t, &book, &history, &mut rng);
            submitted.extend(orders);
            t += 0.5;
        }
        assert_eq!(submitted.len(), 6);
        assert_eq!(submitted.iter().map(|o| o.size).sum::<u64>(), 600);
        // All children share one parent.
        let parent = submitted[0].parent_id;
        assert!(submitted.iter().all(|o| o.parent_id == parent));
    }

    #[test]
    fn fills_land_in_the_base_bookkeeping() {
        let mut rng = SimRng::from_seed(42);
        let mut taker = ManualTaker::new(
            "taker",
            FIRST_AGENT_OWNER,
            1_000_000.0,
            0,
            Box::new(BlockExecution),
        );
        taker.schedule_order(0.0, 10, Side::Buy, &mut rng);
        let mut book = book_with_touch(99.0, 101.0);

        let (_, orders) = taker.step(0.0, &book, &BookMetrics::new(), &mut rng);
        let events = book.process(orders[0].clone());
        taker.update(0.0, &events);

        assert_eq!(taker.base().inventory, 10);
        assert!((taker.base().cash - (1_000_000.0 - 1010.0)).abs() < 1e-9);
        // Filled at the benchmark: zero slippage.
        assert_eq!(taker.base().total_slippage(), 0.0);
    }

    #[test]
    fn signal_state_is_ema_smoothed() {
        let mut rng = SimRng::from_seed(42);
        let params = SignalTakerParams {
            sensitivity: 2.0, // never fires
            smoothing: 0.5,
            ..Default::default()
        };
        let mut taker = SignalTaker::new(
            "sig",
            FIRST_AGENT_OWNER,
            10_000.0,
            0,
            Box::new(ImbalanceSignal::new(10)),
            Box::new(BlockExecution),
            params,
        );

        // One-sided bid book: raw imbalance = 1.0.
        let mut book = LimitOrderBook::new(0.01);
        book.process(Order::limit(1, Side::Buy, 100.0, 10, 0.0));
        let history = BookMetrics::new();

        taker.step(0.0, &book, &history, &mut rng);
        assert!((taker.state() - 0.5).abs() < 1e-12);
        taker.step(0.5, &book, &history, &mut rng);
        assert!((taker.state() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn signal_taker_fires_and_respects_cooldown() {
        let mut rng = SimRng::from_seed(42);
        let params = SignalTakerParams {
            sensitivity: 0.3,
            smoothing: 1.0, // state == raw signal
            cooldown: 100.0,
            cash_buffer: 0.1,
        };
        let mut taker = SignalTaker::new(
            "sig",
            FIRST_AGENT_OWNER,
            10_000.0,
            0,
            Box::new(ImbalanceSignal::new(10)),
            Box::new(BlockExecution),
            params,
        );

        // Heavy bid side pushes imbalance above sensitivity.
        let mut book = book_with_touch(99.0, 101.0);
        book.process(Order::limit(3, Side::Buy, 98.0, 5000, 0.0));
        let history = BookMetrics::new();

        taker.step(0.0, &book, &history, &mut rng);
        assert_eq!(taker.base().pending_slices(), 1);

        // The child comes due, but the cooldown blocks a second parent
        // even though the signal still holds.
        let (_, orders) = taker.step(50.0, &book, &history, &mut rng);
        assert_eq!(orders.len(), 1);
        assert_eq!(taker.base().pending_slices(), 0);

        // Past the cooldown it fires again.
        taker.step(150.0, &book, &history, &mut rng);
        assert_eq!(taker.base().pending_slices(), 1);
    }

    #[test]
    fn signal_taker_never_shorts() {
        let mut rng = SimRng::from_seed(42);
        let params = SignalTakerParams {
            sensitivity: 0.3,
            smoothing: 1.0,
            cooldown: 0.0,
            cash_buffer: 0.1,
        };
        let mut taker = SignalTaker::new(
            "sig",
            FIRST_AGENT_OWNER,
            10_000.0,
            0, // no inventory to sell
            Box::new(ImbalanceSignal::new(10)),
            Box::new(BlockExecution),
            params,
        );

        // Heavy ask side: sell bias.
        let mut book = book_with_touch(99.0, 101.0);
        book.process(Order::limit(3, Side::Sell, 102.0, 5000, 0.0));

        taker.step(0.0, &book, &BookMetrics::new(), &mut rng);
        assert_eq!(taker.base().pending_slices(), 0);
    }

    #[test]
    fn reset_clears_signal_state() {
        let mut rng = SimRng::from_seed(42);
        let mut taker = SignalTaker::momentum(
            "mom",
            FIRST_AGENT_OWNER,
            10_000.0,
            Box::new(BlockExecution),
            10,
            80.0,
            0.5,
        );
        let mut book = LimitOrderBook::new(0.01);
        book.process(Order::limit(1, Side::Buy, 100.0, 10, 0.0));
        taker.step(0.0, &book, &BookMetrics::new(), &mut rng);

        taker.reset(None, 0);
        assert_eq!(taker.state(), 0.0);
        assert!(taker.metrics().is_empty());
    }
}
