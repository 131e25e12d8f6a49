// src/orderflow/generator.rs

//! Synthetic background order flow.
//!
//! One exogenous action is drawn per tick from the configured mixture.
//! Limit prices are placed relative to the same-side best: with
//! probability `r_pointmass` the tick displacement comes from a zero-
//! inclusive geometric (dense queue near the touch), otherwise from a
//! truncated Zipf (long tail of deep orders).

use crate::config::Config;
use crate::engine::order::{FLOW_OWNER, Order, OrderIdGen, Side};
use crate::error::ConfigError;
use crate::utils::distributions::{Categorical, DiscreteZipfDist, GeometricDist, LogNormalDist};
use crate::utils::rng::SimRng;

/// Round a price to the nearest multiple of the tick size.
pub fn round_to_tick(price: f64, tick_size: f64) -> f64 {
    (price / tick_size).round() * tick_size
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowAction {
    LimitBuy,
    LimitSell,
    MarketBuy,
    MarketSell,
    Cancel,
}

/// Action order must match `OrderMix::weights`.
const ACTIONS: [FlowAction; 5] = [
    FlowAction::LimitBuy,
    FlowAction::LimitSell,
    FlowAction::MarketBuy,
    FlowAction::MarketSell,
    FlowAction::Cancel,
];

#[derive(Debug)]
pub struct Generator {
    action_mix: Categorical,
    size_dist: LogNormalDist,
    min_size: u64,
    max_size: u64,
    geometric: GeometricDist,
    zipf: DiscreteZipfDist,
    r_pointmass: f64,
    max_distance: u64,
    tick_size: f64,
    initial_price: f64,
    ids: OrderIdGen,
}

impl Generator {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let flow = &config.orderflow;
        Ok(Self {
            action_mix: Categorical::new(&flow.order_bernoulli.weights())?,
            size_dist: LogNormalDist::new(
                flow.size_distribution.mu,
                flow.size_distribution.sigma,
            )?,
            min_size: flow.size_distribution.min_size,
            max_size: flow.size_distribution.max_size,
            geometric: GeometricDist::new(flow.placement_distribution.p_geom)?,
            zipf: DiscreteZipfDist::new(
                flow.placement_distribution.alpha_zipf,
                flow.placement_distribution.max_distance,
            )?,
            r_pointmass: flow.placement_distribution.r_pointmass,
            max_distance: flow.placement_distribution.max_distance,
            tick_size: config.sim.tick_size,
            initial_price: config.sim.initial_price,
            ids: OrderIdGen::new(FLOW_OWNER),
        })
    }

    /// Build the next exogenous order.
    ///
    /// Draw order per call is fixed: action, then (for sized orders) size,
    /// then (for limits) sign, mixture branch, displacement. Cancels carry
    /// a placeholder id; the simulator picks the victim.
    pub fn gen_order(
        &mut self,
        best_ask: Option<f64>,
        best_bid: Option<f64>,
        now: f64,
        rng: &mut SimRng,
    ) -> Order {
        let action = ACTIONS[self.action_mix.sample(rng)];

        if action == FlowAction::Cancel {
            return Order::cancel(0, now);
        }

        let size = self.gen_size(rng);
        let id = self.ids.next_id();

        match action {
            FlowAction::MarketBuy => Order::market(id, Side::Buy, size, now),
            FlowAction::MarketSell => Order::market(id, Side::Sell, size, now),
            FlowAction::LimitBuy => {
                let reference = best_bid.or(best_ask).unwrap_or(self.initial_price);
                let price = self.gen_price(reference, rng);
                Order::limit(id, Side::Buy, price, size, now)
            }
            FlowAction::LimitSell => {
                let reference = best_ask.or(best_bid).unwrap_or(self.initial_price);
                let price = self.gen_price(reference, rng);
                Order::limit(id, Side::Sell, price, size, now)
            }
            FlowAction::Cancel => unreachable!("handled above"),
        }
    }

    /// Lognormal size draw, truncated to the configured bounds.
    pub fn gen_size(&self, rng: &mut SimRng) -> u64 {
        let raw = self.size_dist.sample(rng) as u64;
        raw.clamp(self.min_size, self.max_size)
    }

    /// Seed order used to populate an initial book outside the mixture.
    pub fn seed_order(&mut self, side: Side, price: f64, size: u64, now: f64) -> Order {
        Order::limit(self.ids.next_id(), side, price, size, now)
    }

    fn gen_price(&self, reference: f64, rng: &mut SimRng) -> f64 {
        let direction = rng.sign();
        let displacement = if rng.bernoulli(self.r_pointmass) {
            self.geometric.sample(rng)
        } else {
            self.zipf.sample(rng)
        };
        let displacement = displacement.min(self.max_distance);

        let price = reference + direction * displacement as f64 * self.tick_size;
        round_to_tick(price, self.tick_size).max(0.0)
    }
}
