// src/strategies/strategy_metrics.rs

//! Per-agent performance series, recorded at the same sampling boundaries
//! as the book metrics. Annualization reuses the shared return-series
//! statistics so book and agent figures are directly comparable.

use std::io::Write;

use crate::error::SimError;
use crate::utils::stats;

/// Values pushed by the agent base at one sampling boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategySample {
    pub cash: f64,
    pub inventory: i64,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    pub total_pnl: f64,
    pub equity: f64,
    pub avg_slippage: f64,
    pub total_slippage: f64,
    pub n_trades: usize,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct StrategyMetrics {
    time: Vec<f64>,
    cash: Vec<f64>,
    inventory: Vec<i64>,
    realized_pnl: Vec<f64>,
    unrealized_pnl: Vec<f64>,
    total_pnl: Vec<f64>,
    equity: Vec<f64>,
    avg_slippage: Vec<f64>,
    total_slippage: Vec<f64>,
    n_trades: Vec<usize>,
}

impl StrategyMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, t: f64, sample: StrategySample) {
        self.time.push(t);
        self.cash.push(sample.cash);
        self.inventory.push(sample.inventory);
        self.realized_pnl.push(sample.realized_pnl);
        self.unrealized_pnl.push(sample.unrealized_pnl);
        self.total_pnl.push(sample.total_pnl);
        self.equity.push(sample.equity);
        self.avg_slippage.push(sample.avg_slippage);
        self.total_slippage.push(sample.total_slippage);
        self.n_trades.push(sample.n_trades);
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn equity(&self) -> &[f64] {
        &self.equity
    }

    pub fn last_total_pnl(&self) -> Option<f64> {
        self.total_pnl.last().copied()
    }

    fn record_interval(&self) -> f64 {
        if self.time.len() > 1 {
            self.time[1] - self.time[0]
        } else {
            1.0
        }
    }

    fn total_span(&self) -> f64 {
        if self.time.len() > 1 {
            self.time[self.time.len() - 1] - self.time[0]
        } else {
            1.0
        }
    }

    /// Simple returns of the equity curve.
    pub fn returns(&self) -> Vec<f64> {
        let series: Vec<Option<f64>> = self.equity.iter().map(|&e| Some(e)).collect();
        stats::simple_returns(&series)
    }

    pub fn annualized_volatility(&self) -> f64 {
        stats::annualized_volatility(&self.returns(), self.record_interval())
    }

    pub fn annualized_return(&self) -> f64 {
        stats::annualized_return(&self.returns(), self.total_span())
    }

    pub fn max_drawdown(&self) -> f64 {
        stats::max_drawdown(&self.equity)
    }

    pub fn annualized_sharpe(&self, risk_free_rate: f64) -> f64 {
        stats::sharpe_ratio(
            self.annualized_return(),
            self.annualized_volatility(),
            risk_free_rate,
        )
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), SimError> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record([
            "time",
            "cash",
            "inventory",
            "realized_pnl",
            "unrealized_pnl",
            "total_pnl",
            "equity",
            "avg_slippage",
            "total_slippage",
            "n_trades",
        ])?;
        for i in 0..self.len() {
            csv.write_record([
                self.time[i].to_string(),
                self.cash[i].to_string(),
                self.inventory[i].to_string(),
                self.realized_pnl[i].to_string(),
                self.unrealized_pnl[i].to_string(),
                self.total_pnl[i].to_string(),
                self.equity[i].to_string(),
                self.avg_slippage[i].to_string(),
                self.total_slippage[i].to_string(),
                self.n_trades[i].to_string(),
            ])?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn summary(&self) -> Vec<(&'static str, String)> {
        let last = |v: &Vec<f64>| v.last().map(|x| format!("{x:.2}")).unwrap_or("-".into());
        vec![
            ("Final Cash", last(&self.cash)),
            (
                "Final Inventory",
                self.inventory
                    .last()
                    .map(|i| format!("{i} shares"))
                    .unwrap_or("-".into()),
            ),
            ("Realized PnL", last(&self.realized_pnl)),
            ("Unrealized PnL", last(&self.unrealized_pnl)),
            ("Total PnL", last(&self.total_pnl)),
            (
                "Annualized Return",
                format!("{:.5} %", 100.0 * self.annualized_return()),
            ),
            (
                "Annualized Volatility",
                format!("{:.2} %", 100.0 * self.annualized_volatility()),
            ),
            (
                "Sharpe Ratio",
                format!("{:.2}", self.annualized_sharpe(0.0)),
            ),
            (
                "Max Drawdown",
                format!("{:.2} %", 100.0 * self.max_drawdown()),
            ),
            (
                "Average Slippage",
                self.avg_slippage
                    .last()
                    .map(|s| format!("{s:.4}"))
                    .unwrap_or("-".into()),
            ),
            ("Total Slippage", last(&self.total_slippage)),
            (
                "Number of Trades",
                self.n_trades
                    .last()
                    .map(|n| n.to_string())
                    .unwrap_or("0".into()),
            ),
        ]
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
