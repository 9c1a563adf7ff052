//! Remote quote source port trait.

use chrono::NaiveDate;

use crate::domain::bar::DailyBar;
use crate::domain::error::SmacrossError;

/// Source of daily OHLCV history for a ticker, typically a remote API.
pub trait QuoteSource {
    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, SmacrossError>;
}
