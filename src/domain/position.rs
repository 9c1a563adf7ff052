//! Open position and closed trade records.

use chrono::NaiveDate;

/// One open long position. The strategy never shorts, so quantity is
/// always positive while the position exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub ticker: String,
    pub quantity: i64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    /// Fixed at entry, never trailed.
    pub stop_loss: f64,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.quantity as f64 * (price - self.entry_price)
    }

    /// A close at or below the stop forces an exit.
    pub fn stop_hit(&self, price: f64) -> bool {
        price <= self.stop_loss
    }
}

/// One completed round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub ticker: String,
    pub quantity: i64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub pnl: f64,
}
