//! Backtest summary statistics.
//!
//! Computed from the broker state after the bar feed is exhausted: cumulative
//! return, annualized Sharpe ratio, and per-trade outcome statistics.

use super::broker::EquityPoint;
use super::position::ClosedTrade;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Trade-outcome statistics. The averages and extremes are `None` when no
/// round trip completed — a flat ticker, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeStats {
    pub count: usize,
    pub net_pnl: f64,
    pub avg_pnl: Option<f64>,
    pub max_profit: Option<f64>,
    pub max_loss: Option<f64>,
}

impl TradeStats {
    pub fn compute(trades: &[ClosedTrade]) -> Self {
        if trades.is_empty() {
            return TradeStats {
                count: 0,
                net_pnl: 0.0,
                avg_pnl: None,
                max_profit: None,
                max_loss: None,
            };
        }

        let net_pnl: f64 = trades.iter().map(|t| t.pnl).sum();
        let max_profit = trades.iter().map(|t| t.pnl).fold(f64::NEG_INFINITY, f64::max);
        // The least profitable trade; positive when every trade won.
        let max_loss = trades.iter().map(|t| t.pnl).fold(f64::INFINITY, f64::min);

        TradeStats {
            count: trades.len(),
            net_pnl,
            avg_pnl: Some(net_pnl / trades.len() as f64),
            max_profit: Some(max_profit),
            max_loss: Some(max_loss),
        }
    }
}

/// Final cumulative return relative to the first recorded equity point.
pub fn cumulative_return(equity_curve: &[EquityPoint]) -> f64 {
    let (Some(first), Some(last)) = (equity_curve.first(), equity_curve.last()) else {
        return 0.0;
    };
    if first.equity > 0.0 {
        (last.equity - first.equity) / first.equity
    } else {
        0.0
    }
}

/// Annualized Sharpe ratio over daily equity-curve returns, risk-free rate 0.
pub fn sharpe_ratio(equity_curve: &[EquityPoint]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity;
            if prev > 0.0 {
                (w[1].equity - prev) / prev
            } else {
                0.0
            }
        })
        .collect();

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        (mean / stddev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}
