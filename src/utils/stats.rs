// src/utils/stats.rs

//! Return-series statistics shared by the book and strategy metrics.
//! Annualization assumes 252 trading days of 6.5 hours.

use statrs::statistics::Statistics;

pub const ANNUAL_TIME_SECONDS: f64 = 252.0 * 6.5 * 60.0 * 60.0;

/// Simple returns between consecutive observed values. Gaps (missing or
/// zero observations) produce no return, mirroring a `pct_change().dropna()`
/// over a nullable series.
pub fn simple_returns(series: &[Option<f64>]) -> Vec<f64> {
    series
        .windows(2)
        .filter_map(|w| match (w[0], w[1]) {
            (Some(prev), Some(next)) if prev != 0.0 => Some(next / prev - 1.0),
            _ => None,
        })
        .collect()
}

/// Log returns between consecutive observed values.
pub fn log_returns(series: &[Option<f64>]) -> Vec<f64> {
    series
        .windows(2)
        .filter_map(|w| match (w[0], w[1]) {
            (Some(prev), Some(next)) if prev > 0.0 && next > 0.0 => Some((next / prev).ln()),
            _ => None,
        })
        .collect()
}

/// Sample standard deviation of per-interval returns scaled to one year.
pub fn annualized_volatility(returns: &[f64], interval: f64) -> f64 {
    if returns.len() < 2 || interval <= 0.0 {
        return 0.0;
    }
    let std = Statistics::std_dev(returns.iter());
    std * (ANNUAL_TIME_SECONDS / interval).sqrt()
}

/// Compound the return series and annualize over the observed span.
pub fn annualized_return(returns: &[f64], total_time: f64) -> f64 {
    if returns.is_empty() || total_time <= 0.0 {
        return 0.0;
    }
    let cum: f64 = returns.iter().map(|r| 1.0 + r).product();
    cum.powf(ANNUAL_TIME_SECONDS / total_time) - 1.0
}

/// Peak-to-trough maximum drawdown of a value series, as a positive
/// fraction of the peak. 0 when the series never declines.
pub fn max_drawdown(series: &[f64]) -> f64 {
    let mut first = None;
    for &v in series {
        if v != 0.0 {
            first = Some(v);
            break;
        }
    }
    let Some(first) = first else { return 0.0 };

    let mut peak = f64::MIN;
    let mut worst = 0.0f64;
    for &v in series {
        let curve = v / first;
        peak = peak.max(curve);
        if peak > 0.0 {
            worst = worst.max((peak - curve) / peak);
        }
    }
    worst
}

pub fn sharpe_ratio(ann_return: f64, ann_volatility: f64, risk_free_rate: f64) -> f64 {
    if ann_volatility == 0.0 {
        return 0.0;
    }
    (ann_return - risk_free_rate) / ann_volatility
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_returns_skip_gaps() {
        let series = vec![Some(100.0), Some(110.0), None, Some(121.0), Some(133.1)];
        let returns = simple_returns(&series);
        // 100->110 and 121->133.1; the gap around None yields nothing.
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.10).abs() < 1e-12);
        assert!((returns[1] - 0.10).abs() < 1e-12);
    }

    #[test]
    fn log_returns_match_simple_for_small_moves() {
        let series = vec![Some(100.0), Some(100.01)];
        let simple = simple_returns(&series)[0];
        let log = log_returns(&series)[0];
        assert!((simple - log).abs() < 1e-6);
    }

    #[test]
    fn constant_series_has_zero_volatility() {
        let returns = vec![0.0; 50];
        assert_eq!(annualized_volatility(&returns, 30.0), 0.0);
    }

    #[test]
    fn annualized_return_compounds() {
        // One interval covering exactly one "year" of simulated time.
        let returns = vec![0.05];
        let r = annualized_return(&returns, ANNUAL_TIME_SECONDS);
        assert!((r - 0.05).abs() < 1e-12);
    }

    #[test]
    fn drawdown_picks_worst_trough() {
        let series = vec![100.0, 120.0, 90.0, 110.0, 80.0];
        // Peak 120, trough 80 -> 1/3 drawdown.
        let dd = max_drawdown(&series);
        assert!((dd - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn drawdown_of_monotonic_series_is_zero() {
        let series = vec![1.0, 2.0, 3.0];
        assert_eq!(max_drawdown(&series), 0.0);
    }

    #[test]
    fn sharpe_guards_zero_volatility() {
        assert_eq!(sharpe_ratio(0.1, 0.0, 0.0), 0.0);
        assert!((sharpe_ratio(0.1, 0.2, 0.0) - 0.5).abs() < 1e-12);
    }
}
