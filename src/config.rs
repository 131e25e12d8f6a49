// src/config.rs

//! Typed simulation configuration. Defaults reproduce the reference
//! parameter set; `Config::validate` rejects anything outside the
//! recognized ranges before a run starts.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SimError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Simulated time to run for, in seconds.
    pub horizon: f64,
    /// Step length in seconds of simulated time.
    pub dt: f64,
    /// Minimum price increment.
    pub tick_size: f64,
    /// Reference price used before the book has any liquidity.
    pub initial_price: f64,
    /// Interval between metric recordings, in seconds.
    pub record_interval: f64,
    /// Seed for the run; `None` seeds from entropy (non-reproducible).
    pub random_seed: Option<u64>,
    /// Mirror log output to a file.
    pub log_file: bool,
    /// File to log to when `log_file` is set; defaults to `sim.log`.
    pub log_filename: Option<String>,
    /// Minimum level recorded to the file sink.
    pub log_level: String,
    /// Minimum level printed to the console.
    pub console_log_level: String,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            horizon: 24.0 * 60.0 * 60.0,
            dt: 0.5,
            tick_size: 0.01,
            initial_price: 100.0,
            record_interval: 30.0,
            random_seed: Some(42),
            log_file: false,
            log_filename: None,
            log_level: "debug".to_string(),
            console_log_level: "info".to_string(),
        }
    }
}

/// Probability of each exogenous action per tick. Must sum to 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderMix {
    pub limit_buy: f64,
    pub limit_sell: f64,
    pub market_buy: f64,
    pub market_sell: f64,
    pub cancel: f64,
}

impl Default for OrderMix {
    fn default() -> Self {
        Self {
            limit_buy: 0.3,
            limit_sell: 0.3,
            market_buy: 0.175,
            market_sell: 0.175,
            cancel: 0.05,
        }
    }
}

impl OrderMix {
    /// Weights in the fixed action order used by the generator:
    /// limit_buy, limit_sell, market_buy, market_sell, cancel.
    pub fn weights(&self) -> [f64; 5] {
        [
            self.limit_buy,
            self.limit_sell,
            self.market_buy,
            self.market_sell,
            self.cancel,
        ]
    }

    pub fn sum(&self) -> f64 {
        self.weights().iter().sum()
    }
}

/// Log-normal order size model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeParams {
    pub mu: f64,
    pub sigma: f64,
    pub min_size: u64,
    pub max_size: u64,
}

impl Default for SizeParams {
    fn default() -> Self {
        Self {
            mu: 1.0,
            sigma: 0.5,
            min_size: 1,
            max_size: 100,
        }
    }
}

/// Limit price displacement model: a geometric point mass near the touch
/// mixed with a heavy-tailed Zipf for deep orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementParams {
    pub p_geom: f64,
    pub max_distance: u64,
    pub r_pointmass: f64,
    pub alpha_zipf: f64,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            p_geom: 0.45,
            max_distance: 200,
            r_pointmass: 0.90,
            alpha_zipf: 1.45,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderflowParams {
    pub order_bernoulli: OrderMix,
    pub size_distribution: SizeParams,
    pub placement_distribution: PlacementParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketMakerParams {
    /// Minimum quoted spread in price units.
    pub base_spread: f64,
    /// Absolute inventory bound for quoting.
    pub inventory_limit: i64,
    /// Risk-aversion coefficient for inventory-skewed quoting.
    pub gamma: f64,
    pub quote_size: u64,
    /// Quote refresh cadence, in multiples of dt.
    pub quote_update_interval: f64,
}

impl Default for MarketMakerParams {
    fn default() -> Self {
        Self {
            base_spread: 0.05,
            inventory_limit: 100,
            gamma: 0.1,
            quote_size: 10,
            quote_update_interval: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwapParams {
    /// Number of child orders a parent is split into.
    pub intervals: u32,
    /// Span over which the children execute, in seconds.
    pub duration: f64,
}

impl Default for TwapParams {
    fn default() -> Self {
        Self {
            intervals: 6,
            duration: 20.0 * 60.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TakerParams {
    pub twap: TwapParams,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    pub market_maker: MarketMakerParams,
    pub taker: TakerParams,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sim: SimParams,
    pub orderflow: OrderflowParams,
    pub strategy: StrategyParams,
}

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

impl Config {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let raw = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.sim;
        Self::require_positive("horizon", sim.horizon)?;
        Self::require_positive("dt", sim.dt)?;
        Self::require_positive("tick_size", sim.tick_size)?;
        Self::require_positive("initial_price", sim.initial_price)?;
        if sim.record_interval < sim.dt {
            return Err(ConfigError::RecordIntervalTooSmall {
                record_interval: sim.record_interval,
                dt: sim.dt,
            });
        }

        let mix = &self.orderflow.order_bernoulli;
        if mix.weights().iter().any(|w| *w < 0.0)
            || (mix.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE
        {
            return Err(ConfigError::WeightSum { sum: mix.sum() });
        }

        let sizes = &self.orderflow.size_distribution;
        if sizes.min_size < 1 {
            return Err(ConfigError::ZeroMinSize);
        }
        if sizes.max_size < sizes.min_size {
            return Err(ConfigError::SizeBounds {
                min_size: sizes.min_size,
                max_size: sizes.max_size,
            });
        }

        let placement = &self.orderflow.placement_distribution;
        if placement.p_geom <= 0.0 || placement.p_geom > 1.0 {
            return Err(ConfigError::GeometricP(placement.p_geom));
        }
        if placement.max_distance < 1 {
            return Err(ConfigError::ZeroMaxDistance);
        }
        if !(0.0..=1.0).contains(&placement.r_pointmass) {
            return Err(ConfigError::PointMass(placement.r_pointmass));
        }
        if placement.alpha_zipf <= 1.0 {
            return Err(ConfigError::ZipfExponent(placement.alpha_zipf));
        }

        let twap = &self.strategy.taker.twap;
        if twap.intervals < 1 {
            return Err(ConfigError::ZeroIntervals);
        }
        Self::require_positive("twap duration", twap.duration)?;

        let maker = &self.strategy.market_maker;
        Self::require_positive("quote_update_interval", maker.quote_update_interval)?;

        Ok(())
    }

    fn require_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
        if value <= 0.0 {
            return Err(ConfigError::NonPositive { name, value });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn default_weights_sum_to_one() {
        let mix = OrderMix::default();
        assert!((mix.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn missummed_weights_rejected() {
        let mut config = Config::default();
        config.orderflow.order_bernoulli.cancel = 0.10;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WeightSum { .. })
        ));
    }

    #[test]
    fn record_interval_below_dt_rejected() {
        let mut config = Config::default();
        config.sim.record_interval = 0.1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RecordIntervalTooSmall { .. })
        ));
    }

    #[test]
    fn zipf_exponent_must_exceed_one() {
        let mut config = Config::default();
        config.orderflow.placement_distribution.alpha_zipf = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZipfExponent(_))
        ));
    }

    #[test]
    fn size_bounds_checked() {
        let mut config = Config::default();
        config.orderflow.size_distribution.max_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"sim": {"horizon": 100.0}}"#).unwrap();
        assert_eq!(config.sim.horizon, 100.0);
        assert_eq!(config.sim.dt, 0.5);
        assert_eq!(config.orderflow.size_distribution.max_size, 100);
    }
}
