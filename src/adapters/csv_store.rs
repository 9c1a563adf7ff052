//! CSV file bar store.
//!
//! One file per ticker at `<base>/<TICKER>.csv` with the header
//! `Date Time,Open,High,Low,Close,Adj Close,Volume`. The `Date Time` column
//! holds UNIX epoch seconds at midnight UTC of the trading day.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate};

use crate::domain::bar::DailyBar;
use crate::domain::error::SmacrossError;
use crate::ports::data_port::BarStore;

const HEADER: [&str; 7] = ["Date Time", "Open", "High", "Low", "Close", "Adj Close", "Volume"];

pub struct CsvBarStore {
    base_path: PathBuf,
}

impl CsvBarStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker.to_uppercase()))
    }

    fn parse_record(
        &self,
        ticker: &str,
        record: &csv::StringRecord,
    ) -> Result<DailyBar, SmacrossError> {
        let field = |idx: usize| -> Result<&str, SmacrossError> {
            record.get(idx).ok_or_else(|| SmacrossError::Data {
                reason: format!("{ticker}: missing {} column", HEADER[idx]),
            })
        };
        let float = |idx: usize| -> Result<f64, SmacrossError> {
            field(idx)?.trim().parse().map_err(|e| SmacrossError::Data {
                reason: format!("{ticker}: invalid {} value: {e}", HEADER[idx]),
            })
        };

        let epoch: i64 = field(0)?.trim().parse().map_err(|e| SmacrossError::Data {
            reason: format!("{ticker}: invalid Date Time value: {e}"),
        })?;
        let date = DateTime::from_timestamp(epoch, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| SmacrossError::Data {
                reason: format!("{ticker}: epoch {epoch} out of range"),
            })?;

        let volume: i64 = field(6)?.trim().parse().map_err(|e| SmacrossError::Data {
            reason: format!("{ticker}: invalid Volume value: {e}"),
        })?;

        Ok(DailyBar {
            ticker: ticker.to_string(),
            date,
            open: float(1)?,
            high: float(2)?,
            low: float(3)?,
            close: float(4)?,
            adj_close: float(5)?,
            volume,
        })
    }

    fn epoch_seconds(date: NaiveDate) -> i64 {
        date.and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0)
    }

    fn write_record<W: std::io::Write>(
        writer: &mut csv::Writer<W>,
        bar: &DailyBar,
    ) -> Result<(), SmacrossError> {
        writer
            .write_record([
                Self::epoch_seconds(bar.date).to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.adj_close.to_string(),
                bar.volume.to_string(),
            ])
            .map_err(|e| SmacrossError::Data {
                reason: format!("writing {}: {e}", bar.ticker),
            })
    }
}

impl BarStore for CsvBarStore {
    fn load_bars(&self, ticker: &str) -> Result<Vec<DailyBar>, SmacrossError> {
        let path = self.csv_path(ticker);
        if !path.exists() {
            return Err(SmacrossError::NoData {
                ticker: ticker.to_string(),
            });
        }

        let content = fs::read_to_string(&path)?;
        let mut reader = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in reader.records() {
            let record = result.map_err(|e| SmacrossError::Data {
                reason: format!("{ticker}: CSV parse error: {e}"),
            })?;
            bars.push(self.parse_record(ticker, &record)?);
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn last_bar_date(&self, ticker: &str) -> Result<Option<NaiveDate>, SmacrossError> {
        if !self.csv_path(ticker).exists() {
            return Ok(None);
        }
        Ok(self.load_bars(ticker)?.last().map(|b| b.date))
    }

    fn write_bars(&self, ticker: &str, bars: &[DailyBar]) -> Result<(), SmacrossError> {
        fs::create_dir_all(&self.base_path)?;

        let file = fs::File::create(self.csv_path(ticker))?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(HEADER).map_err(|e| SmacrossError::Data {
            reason: format!("writing {ticker} header: {e}"),
        })?;
        for bar in bars {
            Self::write_record(&mut writer, bar)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn append_bars(&self, ticker: &str, bars: &[DailyBar]) -> Result<usize, SmacrossError> {
        let path = self.csv_path(ticker);
        if !path.exists() {
            self.write_bars(ticker, bars)?;
            return Ok(bars.len());
        }

        let last = self.load_bars(ticker)?.last().map(|b| b.date);
        let fresh: Vec<&DailyBar> = bars
            .iter()
            .filter(|b| last.is_none_or(|d| b.date > d))
            .collect();
        if fresh.is_empty() {
            return Ok(0);
        }

        let file = fs::OpenOptions::new().append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        for bar in &fresh {
            Self::write_record(&mut writer, bar)?;
        }
        writer.flush()?;
        Ok(fresh.len())
    }

    fn remove_bars(&self, ticker: &str) -> Result<(), SmacrossError> {
        let path = self.csv_path(ticker);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bar(ticker: &str, date: NaiveDate, close: f64) -> DailyBar {
        DailyBar {
            ticker: ticker.to_string(),
            date,
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            adj_close: close,
            volume: 1_000,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn round_trip_preserves_bars() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvBarStore::new(dir.path().to_path_buf());
        let bars = vec![
            make_bar("CBA.AX", d(2024, 1, 2), 110.0),
            make_bar("CBA.AX", d(2024, 1, 3), 111.5),
        ];

        store.write_bars("CBA.AX", &bars).unwrap();
        let loaded = store.load_bars("CBA.AX").unwrap();
        assert_eq!(loaded, bars);
    }

    #[test]
    fn load_sorts_by_date() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvBarStore::new(dir.path().to_path_buf());
        let bars = vec![
            make_bar("T", d(2024, 1, 5), 102.0),
            make_bar("T", d(2024, 1, 2), 100.0),
        ];

        store.write_bars("T", &bars).unwrap();
        let loaded = store.load_bars("T").unwrap();
        assert_eq!(loaded[0].date, d(2024, 1, 2));
        assert_eq!(loaded[1].date, d(2024, 1, 5));
    }

    #[test]
    fn missing_file_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvBarStore::new(dir.path().to_path_buf());
        let err = store.load_bars("GHOST").unwrap_err();
        assert!(matches!(err, SmacrossError::NoData { .. }));
        assert_eq!(store.last_bar_date("GHOST").unwrap(), None);
    }

    #[test]
    fn append_drops_duplicate_dates() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvBarStore::new(dir.path().to_path_buf());
        store
            .write_bars("T", &[make_bar("T", d(2024, 1, 2), 100.0)])
            .unwrap();

        let appended = store
            .append_bars(
                "T",
                &[
                    make_bar("T", d(2024, 1, 2), 100.0),
                    make_bar("T", d(2024, 1, 3), 101.0),
                ],
            )
            .unwrap();

        assert_eq!(appended, 1);
        let loaded = store.load_bars("T").unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(store.last_bar_date("T").unwrap(), Some(d(2024, 1, 3)));
    }

    #[test]
    fn append_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvBarStore::new(dir.path().to_path_buf());
        let appended = store
            .append_bars("NEW", &[make_bar("NEW", d(2024, 1, 2), 50.0)])
            .unwrap();
        assert_eq!(appended, 1);
        assert_eq!(store.load_bars("NEW").unwrap().len(), 1);
    }

    #[test]
    fn path_uppercases_ticker() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvBarStore::new(dir.path().to_path_buf());
        assert!(store.csv_path("cba.ax").ends_with("CBA.AX.csv"));
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvBarStore::new(dir.path().to_path_buf());
        store
            .write_bars("T", &[make_bar("T", d(2024, 1, 2), 100.0)])
            .unwrap();

        store.remove_bars("T").unwrap();
        store.remove_bars("T").unwrap();
        assert!(!store.csv_path("T").exists());
    }

    #[test]
    fn malformed_row_is_a_data_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvBarStore::new(dir.path().to_path_buf());
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(
            store.csv_path("BAD"),
            "Date Time,Open,High,Low,Close,Adj Close,Volume\nnot-a-number,1,2,3,4,5,6\n",
        )
        .unwrap();

        let err = store.load_bars("BAD").unwrap_err();
        assert!(matches!(err, SmacrossError::Data { .. }));
    }
}
