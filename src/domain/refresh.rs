//! Incremental-update planning for stored price history.
//!
//! Given the date of the last stored bar, decide how much history to request
//! so the store catches up without re-downloading the whole series.

use chrono::NaiveDate;

use super::error::SmacrossError;

/// Yahoo-style range keyword for an incremental fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchWindow {
    OneDay,
    OneMonth,
    ThreeMonths,
}

impl FetchWindow {
    pub fn as_range(&self) -> &'static str {
        match self {
            FetchWindow::OneDay => "1d",
            FetchWindow::OneMonth => "1mo",
            FetchWindow::ThreeMonths => "3mo",
        }
    }
}

/// What to do for one ticker's stored history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePlan {
    /// Last bar is today; nothing to fetch.
    Current,
    /// Fetch this window and append the bars newer than what is stored.
    Fetch(FetchWindow),
    /// Gap exceeds three months; a full re-download is cheaper than patching.
    RefreshRecommended,
}

/// Plan the update for a series whose newest bar is `last_bar`.
pub fn plan_update(last_bar: NaiveDate, today: NaiveDate) -> UpdatePlan {
    let stale_days = (today - last_bar).num_days();
    match stale_days {
        i64::MIN..=0 => UpdatePlan::Current,
        1 => UpdatePlan::Fetch(FetchWindow::OneDay),
        2..=31 => UpdatePlan::Fetch(FetchWindow::OneMonth),
        32..=93 => UpdatePlan::Fetch(FetchWindow::ThreeMonths),
        _ => UpdatePlan::RefreshRecommended,
    }
}

/// Translate a download period keyword into the start date of the request.
pub fn period_start(period: &str, today: NaiveDate) -> Result<NaiveDate, SmacrossError> {
    let start = match period {
        "1d" => today - chrono::Duration::days(1),
        "5d" => today - chrono::Duration::days(5),
        "1mo" => today - chrono::Duration::days(31),
        "3mo" => today - chrono::Duration::days(93),
        "6mo" => today - chrono::Duration::days(186),
        "1y" => today - chrono::Duration::days(365),
        "2y" => today - chrono::Duration::days(730),
        "5y" => today - chrono::Duration::days(1826),
        "10y" => today - chrono::Duration::days(3652),
        "ytd" => NaiveDate::from_ymd_opt(chrono::Datelike::year(&today), 1, 1)
            .unwrap_or(today),
        "max" => NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(today),
        other => {
            return Err(SmacrossError::ConfigInvalid {
                section: "download".into(),
                key: "period".into(),
                reason: format!(
                    "unknown period '{other}' (expected 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd or max)"
                ),
            });
        }
    };
    Ok(start)
}
