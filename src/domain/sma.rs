//! Simple moving average over closing prices.
//!
//! The rolling form is O(1) per bar: a fixed-size window plus a running sum.
//! The value is `None` until `period` closes have been seen — the warm-up
//! sentinel the strategy relies on, never a numeric error.

use std::collections::VecDeque;

use crate::domain::bar::DailyBar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
}

impl Sma {
    /// `period` must be at least 1; a period of 1 degenerates to the close itself.
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be at least 1");
        Sma {
            period,
            window: VecDeque::with_capacity(period),
            sum: 0.0,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Feed the next close and return the mean of the trailing `period` closes,
    /// or `None` while fewer than `period` values have been seen.
    pub fn update(&mut self, close: f64) -> Option<f64> {
        self.window.push_back(close);
        self.sum += close;
        if self.window.len() > self.period {
            if let Some(old) = self.window.pop_front() {
                self.sum -= old;
            }
        }
        self.latest()
    }

    /// The value at the latest bar seen so far.
    pub fn latest(&self) -> Option<f64> {
        if self.window.len() < self.period {
            None
        } else {
            Some(self.sum / self.period as f64)
        }
    }
}

/// Full series aligned index-for-index with `bars`, for plot overlays.
/// Entry `i` is the mean of closes `i-period+1 ..= i`, `None` during warm-up.
pub fn sma_series(bars: &[DailyBar], period: usize) -> Vec<Option<f64>> {
    let mut sma = Sma::new(period);
    bars.iter().map(|bar| sma.update(bar.close)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn make_bar(day: u32, close: f64) -> DailyBar {
        DailyBar {
            ticker: "TEST".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            adj_close: close,
            volume: 1000,
        }
    }

    #[test]
    fn warm_up_returns_none() {
        let mut sma = Sma::new(3);
        assert_eq!(sma.update(10.0), None);
        assert_eq!(sma.update(11.0), None);
        assert!(sma.latest().is_none());
    }

    #[test]
    fn first_value_after_period_bars() {
        let mut sma = Sma::new(3);
        sma.update(10.0);
        sma.update(11.0);
        let value = sma.update(12.0).unwrap();
        assert!((value - 11.0).abs() < 1e-12);
    }

    #[test]
    fn window_slides() {
        let mut sma = Sma::new(2);
        sma.update(1.0);
        assert!((sma.update(3.0).unwrap() - 2.0).abs() < 1e-12);
        assert!((sma.update(5.0).unwrap() - 4.0).abs() < 1e-12);
        assert!((sma.latest().unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn period_one_is_the_close() {
        let mut sma = Sma::new(1);
        assert!((sma.update(42.5).unwrap() - 42.5).abs() < 1e-12);
        assert!((sma.update(7.0).unwrap() - 7.0).abs() < 1e-12);
    }

    #[test]
    fn series_aligned_with_bars() {
        let bars: Vec<DailyBar> = [10.0, 20.0, 30.0, 40.0]
            .iter()
            .enumerate()
            .map(|(i, &c)| make_bar(i as u32 + 1, c))
            .collect();

        let series = sma_series(&bars, 3);
        assert_eq!(series.len(), 4);
        assert_eq!(series[0], None);
        assert_eq!(series[1], None);
        assert!((series[2].unwrap() - 20.0).abs() < 1e-12);
        assert!((series[3].unwrap() - 30.0).abs() < 1e-12);
    }

    #[test]
    fn series_shorter_than_period_all_none() {
        let bars: Vec<DailyBar> = (1..=4).map(|d| make_bar(d, 100.0)).collect();
        let series = sma_series(&bars, 9);
        assert!(series.iter().all(|v| v.is_none()));
    }

    proptest! {
        // Rolling sum must agree with a direct windowed mean, and the value at
        // index i must not depend on later closes.
        #[test]
        fn rolling_matches_windowed_mean(
            closes in proptest::collection::vec(1.0f64..10_000.0, 1..200),
            period in 1usize..30,
        ) {
            let mut sma = Sma::new(period);
            for (i, &close) in closes.iter().enumerate() {
                let rolled = sma.update(close);
                if i + 1 < period {
                    prop_assert!(rolled.is_none());
                } else {
                    let window = &closes[i + 1 - period..=i];
                    let mean = window.iter().sum::<f64>() / period as f64;
                    prop_assert!((rolled.unwrap() - mean).abs() < 1e-6);
                }
            }
        }
    }
}
