// src/strategies/execution.rs

//! Execution styles: how a parent order is split into book-visible child
//! slices. All children of one parent share its `parent_id`, which is how
//! slippage is attributed back to the user-facing intent.

use crate::engine::order::Side;
use crate::error::ConfigError;
use crate::config::TwapParams;
use crate::utils::rng::SimRng;

/// One scheduled child order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slice {
    pub execute_at: f64,
    pub size: u64,
    pub side: Side,
    pub parent_id: u64,
}

pub trait Execution {
    /// Split `total_size` into child slices starting at `start`.
    fn schedule(
        &self,
        start: f64,
        total_size: u64,
        side: Side,
        parent_id: u64,
        rng: &mut SimRng,
    ) -> Vec<Slice>;
}

/// The whole parent executes as a single child at the scheduled time.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockExecution;

impl Execution for BlockExecution {
    fn schedule(
        &self,
        start: f64,
        total_size: u64,
        side: Side,
        parent_id: u64,
        _rng: &mut SimRng,
    ) -> Vec<Slice> {
        if total_size == 0 {
            return Vec::new();
        }
        vec![Slice {
            execute_at: start,
            size: total_size,
            side,
            parent_id,
        }]
    }
}

/// Time-weighted execution: `intervals` equal children spread over
/// `duration`, each jittered uniformly within its own interval.
#[derive(Debug, Clone, Copy)]
pub struct TwapExecution {
    intervals: u32,
    duration: f64,
}

impl TwapExecution {
    pub fn new(intervals: u32, duration: f64) -> Result<Self, ConfigError> {
        if intervals < 1 {
            return Err(ConfigError::ZeroIntervals);
        }
        if duration <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "twap duration",
                value: duration,
            });
        }
        Ok(Self {
            intervals,
            duration,
        })
    }

    pub fn from_params(params: &TwapParams) -> Result<Self, ConfigError> {
        Self::new(params.intervals, params.duration)
    }
}

impl Execution for TwapExecution {
    fn schedule(
        &self,
        start: f64,
        total_size: u64,
        side: Side,
        parent_id: u64,
        rng: &mut SimRng,
    ) -> Vec<Slice> {
        let child_size = total_size / self.intervals as u64;
        if child_size == 0 {
            return Vec::new();
        }
        let interval = self.duration / self.intervals as f64;

        (0..self.intervals)
            .map(|i| Slice {
                execute_at: start + i as f64 * interval + rng.uniform(0.0, interval),
                size: child_size,
                side,
                parent_id,
            })
            .collect()
    }
}
