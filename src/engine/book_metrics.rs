// src/engine/book_metrics.rs

//! Time-aligned book state series, recorded once per sampling boundary
//! from a depth snapshot plus the batch of events drained since the
//! previous boundary.

use std::io::Write;

use crate::engine::book::LimitOrderBook;
use crate::engine::events::Event;
use crate::error::SimError;
use crate::utils::stats;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct BookMetrics {
    time: Vec<f64>,
    best_bid: Vec<Option<f64>>,
    best_ask: Vec<Option<f64>>,
    mid_price: Vec<Option<f64>>,
    spread: Vec<Option<f64>>,
    total_bid_size: Vec<u64>,
    total_ask_size: Vec<u64>,
    depth_bid: Vec<usize>,
    depth_ask: Vec<usize>,
    volume: Vec<u64>,
    n_trades: Vec<usize>,
}

impl BookMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the book at simulation time `t`. Mid and spread are
    /// recorded only when both sides are populated; degenerate states stay
    /// missing rather than propagating sentinel values into the series.
    pub fn record(&mut self, t: f64, book: &LimitOrderBook, events: &[Event]) {
        let best_bid = book.best_bid().map(|q| q.price);
        let best_ask = book.best_ask().map(|q| q.price);
        let both = best_bid.is_some() && best_ask.is_some();

        self.time.push(t);
        self.best_bid.push(best_bid);
        self.best_ask.push(best_ask);
        self.mid_price.push(both.then(|| book.mid()));
        self.spread.push(both.then(|| book.spread()));
        self.total_bid_size.push(book.bid_size(None));
        self.total_ask_size.push(book.ask_size(None));
        self.depth_bid.push(book.bid_depth());
        self.depth_ask.push(book.ask_depth());

        let trades: Vec<_> = events.iter().filter_map(Event::as_trade).collect();
        self.volume.push(trades.iter().map(|t| t.size).sum());
        self.n_trades.push(trades.len());
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Mid-price history, used by signals and by the derived statistics.
    pub fn mid_history(&self) -> &[Option<f64>] {
        &self.mid_price
    }

    pub fn last_mid(&self) -> Option<f64> {
        self.mid_price.last().copied().flatten()
    }

    /// Spacing between the first two recorded samples; 1.0 until there
    /// are two.
    pub fn record_interval(&self) -> f64 {
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

    // ------------------------------------------------------------------
    //  Derived statistics on the mid series
    // ------------------------------------------------------------------

    pub fn returns(&self) -> Vec<f64> {
        stats::simple_returns(&self.mid_price)
    }

    pub fn log_returns(&self) -> Vec<f64> {
        stats::log_returns(&self.mid_price)
    }

    pub fn annualized_volatility(&self) -> f64 {
        stats::annualized_volatility(&self.returns(), self.record_interval())
    }

    pub fn annualized_return(&self) -> f64 {
        stats::annualized_return(&self.returns(), self.total_span())
    }

    pub fn max_drawdown(&self) -> f64 {
        let mids: Vec<f64> = self.mid_price.iter().copied().flatten().collect();
        stats::max_drawdown(&mids)
    }

    pub fn annualized_sharpe(&self, risk_free_rate: f64) -> f64 {
        stats::sharpe_ratio(
            self.annualized_return(),
            self.annualized_volatility(),
            risk_free_rate,
        )
    }

    pub fn total_volume(&self) -> u64 {
        self.volume.iter().sum()
    }

    pub fn total_trades(&self) -> usize {
        self.n_trades.iter().sum()
    }

    // ------------------------------------------------------------------
    //  Persistence
    // ------------------------------------------------------------------

    /// One CSV row per sampling boundary; missing fields stay empty.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), SimError> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record([
            "time",
            "best_bid",
            "best_ask",
            "mid_price",
            "spread",
            "total_bid_size",
            "total_ask_size",
            "depth_bid",
            "depth_ask",
            "volume",
            "n_trades",
        ])?;

        let opt = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
        for i in 0..self.len() {
            csv.write_record([
                self.time[i].to_string(),
                opt(self.best_bid[i]),
                opt(self.best_ask[i]),
                opt(self.mid_price[i]),
                opt(self.spread[i]),
                self.total_bid_size[i].to_string(),
                self.total_ask_size[i].to_string(),
                self.depth_bid[i].to_string(),
                self.depth_ask[i].to_string(),
                self.volume[i].to_string(),
                self.n_trades[i].to_string(),
            ])?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Key figures for the end-of-run console table.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "Annualized Return",
                format!("{:.3} %", 100.0 * self.annualized_return()),
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
            ("Total Volume", format!("{} shares", self.total_volume())),
            ("Number of Trades", self.total_trades().to_string()),
        ]
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
