//! Bar storage port trait.

use chrono::NaiveDate;

use crate::domain::bar::DailyBar;
use crate::domain::error::SmacrossError;

/// Persistent store of daily price history, one series per ticker.
pub trait BarStore {
    /// Load the full stored series, oldest bar first.
    fn load_bars(&self, ticker: &str) -> Result<Vec<DailyBar>, SmacrossError>;

    /// Date of the newest stored bar, or `None` when nothing is stored.
    fn last_bar_date(&self, ticker: &str) -> Result<Option<NaiveDate>, SmacrossError>;

    /// Replace the stored series for `ticker`.
    fn write_bars(&self, ticker: &str, bars: &[DailyBar]) -> Result<(), SmacrossError>;

    /// Append bars strictly newer than the stored series; duplicate dates are
    /// dropped. Returns the number of bars actually appended.
    fn append_bars(&self, ticker: &str, bars: &[DailyBar]) -> Result<usize, SmacrossError>;

    /// Delete the stored series, if any.
    fn remove_bars(&self, ticker: &str) -> Result<(), SmacrossError>;
}
