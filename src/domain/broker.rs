//! Broker simulator for a single instrument.
//!
//! Executes market orders against bar closes, tracks cash and equity, and
//! applies a fixed per-trade commission on each fill. At most one position is
//! open at a time; the type system enforces it with `Option<Position>`.

use chrono::NaiveDate;

use super::position::{ClosedTrade, Position};

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub quantity: i64,
    pub price: f64,
    pub commission: f64,
}

/// Result of a buy attempt. Insufficient cash is not an error, just a no-fill.
#[derive(Debug, Clone, PartialEq)]
pub enum BuyResult {
    Filled(Fill),
    InsufficientCash,
}

#[derive(Debug, Clone)]
pub struct Broker {
    cash: f64,
    initial_cash: f64,
    commission_per_trade: f64,
    position: Option<Position>,
    entry_commission: f64,
    closed_trades: Vec<ClosedTrade>,
    equity_curve: Vec<EquityPoint>,
}

impl Broker {
    pub fn new(initial_cash: f64, commission_per_trade: f64) -> Self {
        Broker {
            cash: initial_cash,
            initial_cash,
            commission_per_trade,
            position: None,
            entry_commission: 0.0,
            closed_trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn closed_trades(&self) -> &[ClosedTrade] {
        &self.closed_trades
    }

    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    /// Cash plus mark-to-market value of the open position at `price`.
    pub fn equity(&self, price: f64) -> f64 {
        let position_value = self
            .position
            .as_ref()
            .map(|pos| pos.market_value(price))
            .unwrap_or(0.0);
        self.cash + position_value
    }

    pub fn record_equity(&mut self, date: NaiveDate, price: f64) {
        let equity = self.equity(price);
        self.equity_curve.push(EquityPoint { date, equity });
    }

    /// Fill a market buy at `price`. Requires no open position.
    ///
    /// Returns [`BuyResult::InsufficientCash`] when the cost plus commission
    /// exceeds available cash; the caller sized the order, so this only fires
    /// when the commission tips it over.
    pub fn market_buy(
        &mut self,
        ticker: &str,
        quantity: i64,
        price: f64,
        date: NaiveDate,
        stop_loss: f64,
    ) -> BuyResult {
        debug_assert!(self.position.is_none(), "buy with a position already open");
        debug_assert!(quantity > 0);

        let cost = quantity as f64 * price;
        let total = cost + self.commission_per_trade;
        if total > self.cash {
            return BuyResult::InsufficientCash;
        }

        self.cash -= total;
        self.entry_commission = self.commission_per_trade;
        self.position = Some(Position {
            ticker: ticker.to_string(),
            quantity,
            entry_price: price,
            entry_date: date,
            stop_loss,
        });

        BuyResult::Filled(Fill {
            quantity,
            price,
            commission: self.commission_per_trade,
        })
    }

    /// Fill a market sell of the entire open position at `price`.
    /// Returns `None` when flat.
    pub fn market_sell(&mut self, price: f64, date: NaiveDate) -> Option<Fill> {
        let position = self.position.take()?;

        let proceeds = position.quantity as f64 * price;
        self.cash += proceeds - self.commission_per_trade;

        let price_pnl = position.quantity as f64 * (price - position.entry_price);
        let pnl = price_pnl - self.entry_commission - self.commission_per_trade;

        self.closed_trades.push(ClosedTrade {
            ticker: position.ticker,
            quantity: position.quantity,
            entry_price: position.entry_price,
            exit_price: price,
            entry_date: position.entry_date,
            exit_date: date,
            pnl,
        });
        self.entry_commission = 0.0;

        Some(Fill {
            quantity: position.quantity,
            price,
            commission: self.commission_per_trade,
        })
    }
}
