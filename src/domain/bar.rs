//! Daily OHLCV bar representation.

use chrono::NaiveDate;

/// One daily price record for a single ticker. Bars are always handled in
/// strictly increasing date order, one per trading session.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: i64,
}

impl DailyBar {
    /// The price the strategy and broker trade at.
    pub fn price(&self) -> f64 {
        self.close
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> DailyBar {
        DailyBar {
            ticker: "AMD".into(),
            date: NaiveDate::from_ymd_opt(2020, 6, 15).unwrap(),
            open: 52.0,
            high: 54.5,
            low: 51.0,
            close: 53.8,
            adj_close: 53.8,
            volume: 42_000_000,
        }
    }

    #[test]
    fn price_is_close() {
        let bar = sample_bar();
        assert!((bar.price() - 53.8).abs() < f64::EPSILON);
    }
}
