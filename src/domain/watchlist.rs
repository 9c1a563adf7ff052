//! Watchlist persistence.
//!
//! A watchlist is a single-column CSV file with a `Ticker` header, one symbol
//! per row. Tickers are stored uppercase and kept unique in file order.

use std::fs::File;
use std::path::Path;

use super::error::SmacrossError;

/// Load the watchlist, preserving file order. Missing file is an error so the
/// batch runner can fail fast instead of silently backtesting nothing.
pub fn load(path: &Path) -> Result<Vec<String>, SmacrossError> {
    if !path.exists() {
        return Err(SmacrossError::WatchlistMissing {
            path: path.display().to_string(),
        });
    }

    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut tickers = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| SmacrossError::Data {
            reason: format!("reading watchlist {}: {e}", path.display()),
        })?;
        if let Some(field) = record.get(0) {
            let ticker = field.trim().to_uppercase();
            if !ticker.is_empty() && !tickers.contains(&ticker) {
                tickers.push(ticker);
            }
        }
    }

    Ok(tickers)
}

pub fn save(path: &Path, tickers: &[String]) -> Result<(), SmacrossError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(["Ticker"]).map_err(|e| SmacrossError::Data {
        reason: format!("writing watchlist {}: {e}", path.display()),
    })?;
    for ticker in tickers {
        writer.write_record([ticker]).map_err(|e| SmacrossError::Data {
            reason: format!("writing watchlist {}: {e}", path.display()),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Add a ticker, creating the file if needed. Returns true if it was new.
pub fn add(path: &Path, ticker: &str) -> Result<bool, SmacrossError> {
    let ticker = ticker.trim().to_uppercase();
    let mut tickers = if path.exists() { load(path)? } else { Vec::new() };

    if tickers.contains(&ticker) {
        return Ok(false);
    }
    tickers.push(ticker);
    save(path, &tickers)?;
    Ok(true)
}

/// Remove a ticker. Returns true if it was present.
pub fn remove(path: &Path, ticker: &str) -> Result<bool, SmacrossError> {
    let ticker = ticker.trim().to_uppercase();
    let mut tickers = load(path)?;
    let before = tickers.len();
    tickers.retain(|t| t != &ticker);

    if tickers.len() == before {
        return Ok(false);
    }
    save(path, &tickers)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.csv");
        let err = load(&path).unwrap_err();
        assert!(matches!(err, SmacrossError::WatchlistMissing { .. }));
    }

    #[test]
    fn round_trip_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.csv");
        let tickers = vec!["CBA.AX".to_string(), "BHP.AX".to_string(), "WOW.AX".to_string()];
        save(&path, &tickers).unwrap();
        assert_eq!(load(&path).unwrap(), tickers);
    }

    #[test]
    fn add_uppercases_and_dedupes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.csv");

        assert!(add(&path, "cba.ax").unwrap());
        assert!(!add(&path, "CBA.AX").unwrap());
        assert_eq!(load(&path).unwrap(), vec!["CBA.AX".to_string()]);
    }

    #[test]
    fn remove_reports_presence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.csv");
        save(&path, &["CBA.AX".to_string(), "BHP.AX".to_string()]).unwrap();

        assert!(remove(&path, "bhp.ax").unwrap());
        assert!(!remove(&path, "BHP.AX").unwrap());
        assert_eq!(load(&path).unwrap(), vec!["CBA.AX".to_string()]);
    }

    #[test]
    fn load_skips_blank_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.csv");
        std::fs::write(&path, "Ticker\nCBA.AX\n\nBHP.AX\n").unwrap();
        assert_eq!(
            load(&path).unwrap(),
            vec!["CBA.AX".to_string(), "BHP.AX".to_string()]
        );
    }
}
