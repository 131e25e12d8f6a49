// src/strategies/market_maker.rs

//! Passive quoting strategies. On a fixed cadence a maker pulls its
//! outstanding quotes and reposts around the current mid, subject to an
//! inventory band. Stale cancel targets are silent no-ops in the book, so
//! quotes filled since the last refresh need no special bookkeeping.

use tracing::debug;

use crate::config::{MarketMakerParams, SimParams};
use crate::engine::book::LimitOrderBook;
use crate::engine::book_metrics::BookMetrics;
use crate::engine::events::Event;
use crate::engine::order::{Order, Side};
use crate::orderflow::generator::round_to_tick;
use crate::strategies::base::StrategyBase;
use crate::strategies::strategy_metrics::StrategyMetrics;
use crate::strategies::strategy_trait::Strategy;
use crate::utils::rng::SimRng;

/// Quotes symmetrically at the current touch: bid at `mid - spread/2`,
/// ask at `mid + spread/2`, both of fixed size.
pub struct SymmetricMaker {
    base: StrategyBase,
    quote_size: u64,
    max_inventory: i64,
    /// Refresh cadence in seconds (config value is in multiples of dt).
    quote_interval: f64,
    tick_size: f64,
    next_quote_time: f64,
    live_quotes: Vec<u64>,
}

impl SymmetricMaker {
    pub fn new(
        name: impl Into<String>,
        owner: u32,
        initial_cash: f64,
        initial_inventory: i64,
        maker: &MarketMakerParams,
        sim: &SimParams,
    ) -> Self {
        Self {
            base: StrategyBase::new(name, owner, initial_cash, initial_inventory),
            quote_size: maker.quote_size,
            max_inventory: maker.inventory_limit,
            quote_interval: maker.quote_update_interval * sim.dt,
            tick_size: sim.tick_size,
            next_quote_time: 0.0,
            live_quotes: Vec::new(),
        }
    }

    pub fn base(&self) -> &StrategyBase {
        &self.base
    }

    pub fn live_quotes(&self) -> &[u64] {
        &self.live_quotes
    }

    fn pull_quotes(&mut self, now: f64) -> Vec<Order> {
        self.live_quotes
            .drain(..)
            .map(|id| Order::cancel(id, now))
            .collect()
    }

    fn post_quote(
        &mut self,
        side: Side,
        price: f64,
        now: f64,
        book: &LimitOrderBook,
        orders: &mut Vec<Order>,
    ) {
        let within_band = match side {
            Side::Buy => self.base.inventory + self.quote_size as i64 <= self.max_inventory,
            Side::Sell => self.base.inventory - self.quote_size as i64 >= -self.max_inventory,
        };
        if !within_band || price <= 0.0 {
            return;
        }
        let id = self.base.next_order_id();
        // A quote is its own parent; maker fills have no benchmark.
        let order = Order::limit(id, side, price, self.quote_size, now).with_parent(id);
        if self.base.validate_order(&order, book) {
            self.live_quotes.push(id);
            orders.push(order);
        }
    }
}

impl Strategy for SymmetricMaker {
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
        if now < self.next_quote_time {
            return (Vec::new(), Vec::new());
        }
        self.next_quote_time = now + self.quote_interval;

        let cancels = self.pull_quotes(now);

        let mid = book.mid();
        let spread = book.spread();
        if !spread.is_finite() || mid == 0.0 {
            return (cancels, Vec::new());
        }

        let bid_price = round_to_tick(mid - spread / 2.0, self.tick_size);
        let ask_price = round_to_tick(mid + spread / 2.0, self.tick_size);

        let mut orders = Vec::new();
        self.post_quote(Side::Buy, bid_price, now, book, &mut orders);
        self.post_quote(Side::Sell, ask_price, now, book, &mut orders);
        debug!(
            agent = %self.base.name,
            bid = bid_price,
            ask = ask_price,
            quotes = orders.len(),
            "quote refresh"
        );
        (cancels, orders)
    }

    fn update(&mut self, now: f64, events: &[Event]) {
        self.base.apply_events(now, events);
    }

    fn record(&mut self, now: f64, book: &LimitOrderBook) {
        self.base.record(now, book);
    }

    fn reset(&mut self, initial_cash: Option<f64>, initial_inventory: i64) {
        self.base.reset(initial_cash, initial_inventory);
        self.next_quote_time = 0.0;
        self.live_quotes.clear();
    }

    fn metrics(&self) -> &StrategyMetrics {
        &self.base.metrics
    }
}

/// Maker that skews its quote center against held inventory.
///
/// The reservation price is `mid - q * gamma * sigma^2 * (T - t)` with the
/// variance estimated from recent recorded mids, and the quoted half
/// spread is floored at `base_spread / 2`. Long inventory shades quotes
/// down, short inventory up.
pub struct InventoryMaker {
    base: StrategyBase,
    quote_size: u64,
    max_inventory: i64,
    quote_interval: f64,
    tick_size: f64,
    base_spread: f64,
    gamma: f64,
    look_back: usize,
    horizon: f64,
    next_quote_time: f64,
    live_quotes: Vec<u64>,
}

impl InventoryMaker {
    pub fn new(
        name: impl Into<String>,
        owner: u32,
        initial_cash: f64,
        initial_inventory: i64,
        look_back: usize,
        maker: &MarketMakerParams,
        sim: &SimParams,
    ) -> Self {
        Self {
            base: StrategyBase::new(name, owner, initial_cash, initial_inventory),
            quote_size: maker.quote_size,
            max_inventory: maker.inventory_limit,
            quote_interval: maker.quote_update_interval * sim.dt,
            tick_size: sim.tick_size,
            base_spread: maker.base_spread,
            gamma: maker.gamma,
            look_back,
            horizon: sim.horizon,
            next_quote_time: 0.0,
            live_quotes: Vec::new(),
        }
    }

    pub fn base(&self) -> &StrategyBase {
        &self.base
    }

    /// Per-second variance of log mid returns over the look-back window.
    fn recent_variance(&self, history: &BookMetrics) -> f64 {
        let mids = history.mid_history();
        if mids.len() < self.look_back + 1 {
            return 0.0;
        }
        let window = &mids[mids.len() - (self.look_back + 1)..];
        if window.iter().any(|m| m.is_none() || m == &Some(0.0)) {
            return 0.0;
        }
        let returns: Vec<f64> = window
            .windows(2)
            .filter_map(|w| match (w[0], w[1]) {
                (Some(prev), Some(next)) => Some((next / prev).ln()),
                _ => None,
            })
            .collect();
        if returns.len() < 2 {
            return 0.0;
        }
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>()
            / (returns.len() - 1) as f64;
        variance / history.record_interval()
    }

    /// Mid shaded against inventory: long positions quote lower to shed,
    /// short positions quote higher to cover.
    fn reservation_price(&self, mid: f64, sigma2: f64, now: f64) -> f64 {
        let remaining = (self.horizon - now).max(0.0);
        mid - self.base.inventory as f64 * self.gamma * sigma2 * remaining
    }

    fn post_quote(
        &mut self,
        side: Side,
        price: f64,
        now: f64,
        book: &LimitOrderBook,
        orders: &mut Vec<Order>,
    ) {
        let within_band = match side {
            Side::Buy => self.base.inventory + self.quote_size as i64 <= self.max_inventory,
            Side::Sell => self.base.inventory - self.quote_size as i64 >= -self.max_inventory,
        };
        if !within_band || price <= 0.0 {
            return;
        }
        let id = self.base.next_order_id();
        let order = Order::limit(id, side, price, self.quote_size, now).with_parent(id);
        if self.base.validate_order(&order, book) {
            self.live_quotes.push(id);
            orders.push(order);
        }
    }
}

impl Strategy for InventoryMaker {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn step(
        &mut self,
        now: f64,
        book: &LimitOrderBook,
        history: &BookMetrics,
        _rng: &mut SimRng,
    ) -> (Vec<Order>, Vec<Order>) {
        if now < self.next_quote_time {
            return (Vec::new(), Vec::new());
        }
        self.next_quote_time = now + self.quote_interval;

        let cancels: Vec<Order> = self
            .live_quotes
            .drain(..)
            .map(|id| Order::cancel(id, now))
            .collect();

        let mid = book.mid();
        let spread = book.spread();
        if !spread.is_finite() || mid == 0.0 {
            return (cancels, Vec::new());
        }

        let sigma2 = self.recent_variance(history);
        let reservation = self.reservation_price(mid, sigma2, now);
        let half_spread = spread.max(self.base_spread) / 2.0;

        let bid_price = round_to_tick(reservation - half_spread, self.tick_size);
        let ask_price = round_to_tick(reservation + half_spread, self.tick_size);
        if bid_price >= ask_price {
            return (cancels, Vec::new());
        }

        let mut orders = Vec::new();
        self.post_quote(Side::Buy, bid_price, now, book, &mut orders);
        self.post_quote(Side::Sell, ask_price, now, book, &mut orders);
        (cancels, orders)
    }

    fn update(&mut self, now: f64, events: &[Event]) {
        self.base.apply_events(now, events);
    }

    fn record(&mut self, now: f64, book: &LimitOrderBook) {
        self.base.record(now, book);
    }

    fn reset(&mut self, initial_cash: Option<f64>, initial_inventory: i64) {
        self.base.reset(initial_cash, initial_inventory);
        self.next_quote_time = 0.0;
        self.live_quotes.clear();
    }

    fn metrics(&self) -> &StrategyMetrics {
        &self.base.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::engine::order::{FIRST_AGENT_OWNER, OrderKind};

    fn maker_config() -> Config {
        let mut config = Config::default();
        config.strategy.market_maker.quote_size = 10;
        config.strategy.market_maker.inventory_limit = 100;
        config.strategy.market_maker.quote_update_interval = 10.0; // 5s at dt=0.5
        config
    }

    fn maker(config: &Config) -> SymmetricMaker {
        SymmetricMaker::new(
            "maker",
            FIRST_AGENT_OWNER,
            1_000_000.0,
            0,
            &config.strategy.market_maker,
            &config.sim,
        )
    }

    fn book_with_touch(bid: f64, ask: f64) -> LimitOrderBook {
        let mut book = LimitOrderBook::new(0.01);
        book.process(Order::limit(1, Side::Buy, bid, 100, 0.0));
        book.process(Order::limit(2, Side::Sell, ask, 100, 0.0));
        book
    }

    #[test]
    fn quotes_posted_at_the_touch() {
        let config = maker_config();
        let mut maker = maker(&config);
        let book = book_with_touch(99.0, 101.0);
        let mut rng = SimRng::from_seed(42);

        let (cancels, orders) = maker.step(0.0, &book, &BookMetrics::new(), &mut rng);
        assert!(cancels.is_empty());
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].side, Side::Buy);
        assert_eq!(orders[0].price, Some(99.0)); // mid 100 - spread/2
        assert_eq!(orders[1].side, Side::Sell);
        assert_eq!(orders[1].price, Some(101.0));
        assert!(orders.iter().all(|o| o.kind == OrderKind::Limit));
        assert!(orders.iter().all(|o| o.size == 10));
        assert_eq!(maker.live_quotes().len(), 2);
    }

    #[test]
    fn cadence_gates_requoting() {
        let config = maker_config();
        let mut maker = maker(&config);
        let book = book_with_touch(99.0, 101.0);
        let mut rng = SimRng::from_seed(42);

        let (_, first) = maker.step(0.0, &book, &BookMetrics::new(), &mut rng);
        assert_eq!(first.len(), 2);

        // Inside the 5s refresh window: nothing happens.
        let (cancels, orders) = maker.step(2.0, &book, &BookMetrics::new(), &mut rng);
        assert!(cancels.is_empty() && orders.is_empty());

        // At the refresh: old quotes cancelled, new ones posted.
        let (cancels, orders) = maker.step(5.0, &book, &BookMetrics::new(), &mut rng);
        assert_eq!(cancels.len(), 2);
        assert!(cancels.iter().all(|c| c.kind == OrderKind::Cancel));
        assert_eq!(orders.len(), 2);
    }

    #[test]
    fn degenerate_book_yields_cancels_only() {
        let config = maker_config();
        let mut maker = maker(&config);
        let mut rng = SimRng::from_seed(42);

        let full = book_with_touch(99.0, 101.0);
        maker.step(0.0, &full, &BookMetrics::new(), &mut rng);

        // One-sided book: infinite spread, pull quotes and stand down.
        let mut one_sided = LimitOrderBook::new(0.01);
        one_sided.process(Order::limit(1, Side::Buy, 99.0, 100, 0.0));
        let (cancels, orders) = maker.step(5.0, &one_sided, &BookMetrics::new(), &mut rng);
        assert_eq!(cancels.len(), 2);
        assert!(orders.is_empty());
        assert!(maker.live_quotes().is_empty());
    }

    #[test]
    fn inventory_band_suppresses_one_side() {
        let config = maker_config();
        let mut maker = maker(&config);
        // Inventory near the cap: 95 + 10 > 100 suppresses the bid.
        maker.base.inventory = 95;
        let book = book_with_touch(99.0, 101.0);
        let mut rng = SimRng::from_seed(42);

        let (_, orders) = maker.step(0.0, &book, &BookMetrics::new(), &mut rng);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].side, Side::Sell);
    }

    #[test]
    fn maker_fill_flows_into_inventory() {
        let config = maker_config();
        let mut maker = maker(&config);
        let mut book = book_with_touch(99.0, 101.0);
        let mut rng = SimRng::from_seed(42);

        let (_, orders) = maker.step(0.0, &book, &BookMetrics::new(), &mut rng);
        for order in orders {
            book.process(order);
        }
        // An aggressive seller sweeps the earlier 99.00 bid (size 100) and
        // then hits the maker's quote behind it in the queue.
        let events = book.process(Order::market(900, Side::Sell, 104, 1.0));
        maker.update(1.0, &events);

        assert_eq!(maker.base().inventory, 4);
        assert!((maker.base().cash - (1_000_000.0 - 4.0 * 99.0)).abs() < 1e-9);
        assert_eq!(maker.base().trade_count(), 1);
    }

    #[test]
    fn inventory_maker_shades_quotes_down_when_long() {
        let config = maker_config();
        let mut maker = InventoryMaker::new(
            "inv",
            FIRST_AGENT_OWNER,
            1_000_000.0,
            50, // long book
            3,
            &config.strategy.market_maker,
            &config.sim,
        );
        let book = book_with_touch(99.0, 101.0);
        let mut rng = SimRng::from_seed(42);

        // History with visible variance so sigma^2 > 0.
        let mut history = BookMetrics::new();
        for (i, mid) in [100.0, 100.4, 99.8, 100.6].iter().enumerate() {
            let mut b = LimitOrderBook::new(0.01);
            b.process(Order::limit(
                2 * i as u64 + 1,
                Side::Buy,
                mid - 1.0,
                10,
                0.0,
            ));
            b.process(Order::limit(
                2 * i as u64 + 2,
                Side::Sell,
                mid + 1.0,
                10,
                0.0,
            ));
            history.record(i as f64 * 30.0, &b, &[]);
        }

        let (_, orders) = maker.step(0.0, &book, &history, &mut rng);
        assert_eq!(orders.len(), 2);
        let bid = orders[0].price.unwrap();
        let ask = orders[1].price.unwrap();
        // Long inventory pushes the whole quote pair below the plain touch.
        assert!(bid < 99.0);
        assert!(ask < 101.0);
        assert!(bid < ask);
    }

    #[test]
    fn inventory_maker_floors_the_spread() {
        let mut config = maker_config();
        config.strategy.market_maker.base_spread = 1.0;
        let mut maker = InventoryMaker::new(
            "inv",
            FIRST_AGENT_OWNER,
            1_000_000.0,
            0,
            3,
            &config.strategy.market_maker,
            &config.sim,
        );
        // Tight book: spread 0.02 < base_spread 1.0.
        let book = book_with_touch(99.99, 100.01);
        let mut rng = SimRng::from_seed(42);

        let (_, orders) = maker.step(0.0, &book, &BookMetrics::new(), &mut rng);
        assert_eq!(orders.len(), 2);
        let quoted = orders[1].price.unwrap() - orders[0].price.unwrap();
        assert!((quoted - 1.0).abs() < 1e-9);
    }
}
