//! The moving-average long-only trading rule.
//!
//! Two states, FLAT and LONG. Enter long when price closes above its SMA,
//! exit when price closes below the SMA or at/under the stop-loss placed at
//! entry. The stop is fixed at entry time and never trailed.

use crate::domain::bar::DailyBar;
use crate::domain::broker::{Broker, BuyResult};
use crate::domain::sma::Sma;

/// Which quantity the risk budget is a percentage of. Two historical variants
/// of the stop-loss computation exist; the choice is an explicit parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBasis {
    /// `stop = close - risk_percent * close / 100` — risk a fraction of the
    /// share price itself.
    Price,
    /// `stop = close - (risk_percent * equity_use / 100) / shares` — spread a
    /// fraction of the allocated equity across the bought shares.
    Equity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    pub sma_period: usize,
    /// Fraction of current cash allocated per entry, in (0, 1].
    pub budget_use: f64,
    /// Risk budget as a percentage of the configured basis.
    pub risk_percent: f64,
    pub risk_basis: RiskBasis,
    pub verbose: bool,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            sma_period: 9,
            budget_use: 0.5,
            risk_percent: 2.0,
            risk_basis: RiskBasis::Price,
            verbose: false,
        }
    }
}

/// A confirmed fill the engine produced on this bar.
#[derive(Debug, Clone, PartialEq)]
pub enum TradeEvent {
    Entered { price: f64, shares: i64, stop_loss: f64 },
    Exited { price: f64, shares: i64 },
}

#[derive(Debug, Clone)]
pub struct SmaStrategy {
    ticker: String,
    params: StrategyParams,
    sma: Sma,
}

impl SmaStrategy {
    pub fn new(ticker: &str, params: StrategyParams) -> Self {
        let sma = Sma::new(params.sma_period);
        SmaStrategy {
            ticker: ticker.to_string(),
            params,
            sma,
        }
    }

    pub fn sma(&self) -> &Sma {
        &self.sma
    }

    /// Evaluate the transition rule for one new bar, acting through `broker`.
    /// Returns the fill event, if any. The SMA is fed on every bar, including
    /// bars where the engine holds and does nothing.
    pub fn on_bar(&mut self, bar: &DailyBar, broker: &mut Broker) -> Option<TradeEvent> {
        let close = bar.price();
        let ma = self.sma.update(close)?;

        match broker.position() {
            None => {
                if ma < close {
                    self.try_enter(bar, ma, broker)
                } else {
                    None
                }
            }
            Some(position) => {
                if ma > close || position.stop_hit(close) {
                    let fill = broker.market_sell(close, bar.date)?;
                    if self.params.verbose {
                        eprintln!("{}: sell {} at ${:.2}", self.ticker, fill.quantity, fill.price);
                    }
                    Some(TradeEvent::Exited {
                        price: fill.price,
                        shares: fill.quantity,
                    })
                } else {
                    None
                }
            }
        }
    }

    fn try_enter(&self, bar: &DailyBar, _ma: f64, broker: &mut Broker) -> Option<TradeEvent> {
        let close = bar.price();
        let equity_use = broker.cash() * self.params.budget_use;
        let shares = (equity_use / close).floor() as i64;
        if shares == 0 {
            // Insufficient capital for a single share. Not an error.
            return None;
        }

        let stop_loss = match self.params.risk_basis {
            RiskBasis::Price => close - self.params.risk_percent * close * 0.01,
            RiskBasis::Equity => {
                let max_risk = self.params.risk_percent * equity_use * 0.01;
                close - max_risk / shares as f64
            }
        };

        match broker.market_buy(&self.ticker, shares, close, bar.date, stop_loss) {
            BuyResult::Filled(fill) => {
                if self.params.verbose {
                    eprintln!(
                        "{}: buy {} at ${:.2}, stop ${:.2}",
                        self.ticker, fill.quantity, fill.price, stop_loss
                    );
                }
                Some(TradeEvent::Entered {
                    price: fill.price,
                    shares: fill.quantity,
                    stop_loss,
                })
            }
            BuyResult::InsufficientCash => None,
        }
    }
}
