// src/strategies/signal.rs

//! Trading signals for signal-driven takers. A signal maps current book
//! state plus recorded history to a signed score: positive is a buy bias,
//! negative a sell bias, zero neutral.

use crate::engine::book::LimitOrderBook;
use crate::engine::book_metrics::BookMetrics;

pub trait Signal {
    fn compute(&self, book: &LimitOrderBook, history: &BookMetrics) -> f64;
}

/// Look-back momentum on the recorded mid series, squashed through tanh
/// so the score stays in (-1, 1).
#[derive(Debug, Clone, Copy)]
pub struct MomentumSignal {
    pub look_back: usize,
    pub alpha: f64,
}

impl MomentumSignal {
    pub fn new(look_back: usize, alpha: f64) -> Self {
        Self { look_back, alpha }
    }
}

impl Signal for MomentumSignal {
    fn compute(&self, _book: &LimitOrderBook, history: &BookMetrics) -> f64 {
        let mids = history.mid_history();
        if mids.len() < self.look_back + 1 {
            return 0.0;
        }
        let window = &mids[mids.len() - (self.look_back + 1)..];
        let (Some(first), Some(last)) = (window[0], window[window.len() - 1]) else {
            return 0.0;
        };
        if first == 0.0 {
            return 0.0;
        }
        let momentum = last - first;
        (self.alpha * momentum / first).tanh()
    }
}

/// Resting-size imbalance across the top price levels of each side.
#[derive(Debug, Clone, Copy)]
pub struct ImbalanceSignal {
    pub levels: usize,
}

impl ImbalanceSignal {
    pub fn new(levels: usize) -> Self {
        Self { levels }
    }
}

impl Signal for ImbalanceSignal {
    fn compute(&self, book: &LimitOrderBook, _history: &BookMetrics) -> f64 {
        let bid_size = book.bid_size(Some(self.levels)) as f64;
        let ask_size = book.ask_size(Some(self.levels)) as f64;
        let total = bid_size + ask_size;
        if total == 0.0 {
            return 0.0;
        }
        (bid_size - ask_size) / total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::order::{Order, Side};

    fn history_with_mids(mids: &[Option<f64>]) -> BookMetrics {
        let mut metrics = BookMetrics::new();
        for (i, mid) in mids.iter().enumerate() {
            let mut book = LimitOrderBook::new(0.01);
            if let Some(m) = mid {
                book.process(Order::limit(2 * i as u64 + 1, Side::Buy, m - 0.5, 1, 0.0));
                book.process(Order::limit(2 * i as u64 + 2, Side::Sell, m + 0.5, 1, 0.0));
            }
            metrics.record(i as f64, &book, &[]);
        }
        metrics
    }

    #[test]
    fn momentum_needs_enough_history() {
        let signal = MomentumSignal::new(10, 20.0);
        let history = history_with_mids(&[Some(100.0); 5]);
        let book = LimitOrderBook::new(0.01);
        assert_eq!(signal.compute(&book, &history), 0.0);
    }

    #[test]
    fn momentum_sign_follows_the_trend() {
        let book = LimitOrderBook::new(0.01);
        let signal = MomentumSignal::new(3, 20.0);

        let up = history_with_mids(&[Some(100.0), Some(100.5), Some(101.0), Some(102.0)]);
        assert!(signal.compute(&book, &up) > 0.0);

        let down = history_with_mids(&[Some(102.0), Some(101.0), Some(100.5), Some(100.0)]);
        assert!(signal.compute(&book, &down) < 0.0);
    }

    #[test]
    fn momentum_guards_missing_mids() {
        let book = LimitOrderBook::new(0.01);
        let signal = MomentumSignal::new(2, 20.0);
        let gappy = history_with_mids(&[None, Some(100.0), Some(101.0)]);
        assert_eq!(signal.compute(&book, &gappy), 0.0);
    }

    #[test]
    fn momentum_stays_bounded() {
        let book = LimitOrderBook::new(0.01);
        let signal = MomentumSignal::new(1, 1000.0);
        let jump = history_with_mids(&[Some(100.0), Some(200.0)]);
        let score = signal.compute(&book, &jump);
        assert!(score > 0.99 && score <= 1.0);
    }

    #[test]
    fn imbalance_reads_top_levels() {
        let mut book = LimitOrderBook::new(0.01);
        book.process(Order::limit(1, Side::Buy, 100.0, 30, 0.0));
        book.process(Order::limit(2, Side::Sell, 101.0, 10, 0.0));

        let history = BookMetrics::new();
        let signal = ImbalanceSignal::new(10);
        let score = signal.compute(&book, &history);
        assert!((score - 0.5).abs() < 1e-12); // (30-10)/40
    }

    #[test]
    fn imbalance_is_zero_on_empty_book() {
        let book = LimitOrderBook::new(0.01);
        let signal = ImbalanceSignal::new(10);
        assert_eq!(signal.compute(&book, &BookMetrics::new()), 0.0);
    }
}
