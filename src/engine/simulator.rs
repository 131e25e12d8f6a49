// src/engine/simulator.rs

//! The simulation loop. Each tick interleaves exogenous orderflow, agent
//! decisions, and (at sampling boundaries) a drain of the event bus into
//! the metric recorders. Ordering is fixed: orderflow strictly before
//! agents, agents in registration order, and the simulator is the only
//! writer of the clock.

use std::path::Path;

use tracing::{info, warn};

use crate::config::Config;
use crate::engine::book::LimitOrderBook;
use crate::engine::book_metrics::BookMetrics;
use crate::engine::events::Event;
use crate::engine::order::{OrderKind, Side};
use crate::error::{ConfigError, SimError};
use crate::orderflow::generator::Generator;
use crate::strategies::strategy_trait::Strategy;
use crate::utils::rng::SimRng;

pub struct Simulator {
    config: Config,
    book: LimitOrderBook,
    generator: Generator,
    agents: Vec<Box<dyn Strategy>>,
    rng: SimRng,
    metrics: BookMetrics,
    current_time: f64,
    next_record_time: f64,
}

impl Simulator {
    /// Validates the configuration and binds the agent set. The RNG is
    /// shared by every stochastic component for the whole run.
    pub fn new(
        config: Config,
        rng: SimRng,
        agents: Vec<Box<dyn Strategy>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let generator = Generator::new(&config)?;
        let book = LimitOrderBook::new(config.sim.tick_size);
        Ok(Self {
            config,
            book,
            generator,
            agents,
            rng,
            metrics: BookMetrics::new(),
            current_time: 0.0,
            next_record_time: 0.0,
        })
    }

    pub fn book(&self) -> &LimitOrderBook {
        &self.book
    }

    pub fn metrics(&self) -> &BookMetrics {
        &self.metrics
    }

    pub fn agents(&self) -> &[Box<dyn Strategy>] {
        &self.agents
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Seed a symmetric ladder of resting liquidity around the initial
    /// price, with sizes drawn from the orderflow size model.
    pub fn populate_initial_book(&mut self, n_levels: usize, orders_per_level: usize) {
        let initial_price = self.config.sim.initial_price;
        let tick_size = self.config.sim.tick_size;

        for level in 1..=n_levels {
            let deviation = level as f64 * tick_size;
            for _ in 0..orders_per_level {
                let bid_size = self.generator.gen_size(&mut self.rng);
                let ask_size = self.generator.gen_size(&mut self.rng);

                let bid = self.generator.seed_order(
                    Side::Buy,
                    initial_price - deviation,
                    bid_size,
                    self.current_time,
                );
                self.book.process(bid);

                let ask = self.generator.seed_order(
                    Side::Sell,
                    initial_price + deviation,
                    ask_size,
                    self.current_time,
                );
                self.book.process(ask);
            }
        }
        info!(
            levels = n_levels,
            per_level = orders_per_level,
            "populated initial book"
        );
    }

    /// One exogenous order per tick. Cancels pick a uniform victim from
    /// the resting ids and are skipped outright on an empty book.
    fn order_flow_step(&mut self) -> Vec<Event> {
        let best_ask = self.book.best_ask().map(|q| q.price);
        let best_bid = self.book.best_bid().map(|q| q.price);

        let mut order =
            self.generator
                .gen_order(best_ask, best_bid, self.current_time, &mut self.rng);

        if order.kind == OrderKind::Cancel {
            let ids = self.book.all_order_ids();
            let Some(&victim) = self.rng.choose(&ids) else {
                return Vec::new();
            };
            order.id = victim;
            let events = self.book.process(order);
            if events.is_empty() {
                warn!(victim, "failed to cancel resting order");
            }
            crate::utils::logging::log_events(&events);
            return events;
        }

        let events = self.book.process(order);
        crate::utils::logging::log_events(&events);
        events
    }

    /// Let each agent act, submitting its cancels before its new orders.
    /// After every new order the agent sees the resulting events plus the
    /// tick's exogenous batch, so it can match fills on its own ids.
    fn strategy_step(&mut self, orderflow_events: &[Event]) {
        let now = self.current_time;
        for agent in self.agents.iter_mut() {
            let (cancels, orders) = agent.step(now, &self.book, &self.metrics, &mut self.rng);

            for cancel in cancels {
                let events = self.book.process(cancel);
                crate::utils::logging::log_events(&events);
            }

            for order in orders {
                let mut events = self.book.process(order);
                crate::utils::logging::log_events(&events);
                events.extend_from_slice(orderflow_events);
                agent.update(now, &events);
            }
        }
    }

    /// Advance one tick: orderflow, then agents, then sampling.
    pub fn step(&mut self) {
        let orderflow_events = self.order_flow_step();
        self.strategy_step(&orderflow_events);

        if self.current_time >= self.next_record_time {
            let drained = self.book.drain_events();
            self.metrics.record(self.current_time, &self.book, &drained);
            for agent in self.agents.iter_mut() {
                agent.record(self.current_time, &self.book);
            }
            self.next_record_time += self.config.sim.record_interval;
        }

        self.current_time += self.config.sim.dt;
    }

    /// Run to the configured horizon.
    pub fn run(&mut self) {
        info!(
            horizon = self.config.sim.horizon,
            dt = self.config.sim.dt,
            seed = ?self.rng.seed(),
            "starting simulation"
        );
        while self.current_time < self.config.sim.horizon {
            self.step();
        }
        info!(
            trades = self.metrics.total_trades(),
            volume = self.metrics.total_volume(),
            "simulation completed"
        );
    }

    /// Discard the book, restart the clock, clear metrics, and rebind the
    /// agent set. The RNG stream continues where it left off; reseed it
    /// explicitly for an identical rerun.
    pub fn reset(&mut self, agents: Vec<Box<dyn Strategy>>) {
        self.book = LimitOrderBook::new(self.config.sim.tick_size);
        self.current_time = 0.0;
        self.next_record_time = 0.0;
        self.metrics.reset();
        self.agents = agents;
    }

    /// Book metric series, one CSV row per sampling boundary.
    pub fn save_metrics(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let file = std::fs::File::create(path.as_ref())?;
        self.metrics.write_csv(file)?;
        info!(path = %path.as_ref().display(), "metrics saved");
        Ok(())
    }

    /// Full order book dump: one row per resting order, asks then bids,
    /// each side in priority order.
    pub fn save_order_book(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let depth = self.book.bid_depth().max(self.book.ask_depth());
        let rows = self.book.depth_snapshot(depth);

        let file = std::fs::File::create(path.as_ref())?;
        let mut csv = csv::Writer::from_writer(file);
        csv.write_record(["side", "price", "size"])?;
        for row in rows {
            csv.write_record([
                row.side.label().to_string(),
                row.price.to_string(),
                row.size.to_string(),
            ])?;
        }
        csv.flush()?;
        info!(path = %path.as_ref().display(), "order book snapshot saved");
        Ok(())
    }
}
