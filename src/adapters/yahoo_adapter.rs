//! Yahoo Finance quote adapter.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API. Yahoo has no official
//! API; the response shape can change without notice, so parse failures are
//! surfaced as fetch errors rather than panics.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::bar::DailyBar;
use crate::domain::error::SmacrossError;
use crate::ports::quote_port::QuoteSource;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<i64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
}

impl YahooAdapter {
    pub fn new() -> Result<Self, SmacrossError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| SmacrossError::Fetch {
                ticker: String::new(),
                reason: format!("building HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    fn chart_url(ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0);
        let end_ts = end
            .and_hms_opt(23, 59, 59)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0);
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{ticker}\
             ?period1={start_ts}&period2={end_ts}&interval=1d\
             &includeAdjustedClose=true"
        )
    }

    fn parse_response(ticker: &str, resp: ChartResponse) -> Result<Vec<DailyBar>, SmacrossError> {
        let fetch_err = |reason: String| SmacrossError::Fetch {
            ticker: ticker.to_string(),
            reason,
        };

        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) => fetch_err(format!("{}: {}", err.code, err.description)),
            None => fetch_err("empty result with no error".to_string()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| fetch_err("result array is empty".to_string()))?;

        let timestamps = data
            .timestamp
            .ok_or_else(|| fetch_err("no timestamps".to_string()))?;

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| fetch_err("no quote data".to_string()))?;

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| fetch_err(format!("invalid timestamp: {ts}")))?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();
            let adj_close = adj_closes.as_ref().and_then(|v| v.get(i).copied().flatten());

            // Null rows are holidays and halted sessions.
            let (Some(open), Some(high), Some(low), Some(close)) = (open, high, low, close) else {
                continue;
            };

            bars.push(DailyBar {
                ticker: ticker.to_string(),
                date,
                open,
                high,
                low,
                close,
                adj_close: adj_close.unwrap_or(close),
                volume: volume.unwrap_or(0),
            });
        }

        if bars.is_empty() {
            return Err(fetch_err("no usable bars in response".to_string()));
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl QuoteSource for YahooAdapter {
    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, SmacrossError> {
        let url = Self::chart_url(ticker, start, end);

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| SmacrossError::Fetch {
                ticker: ticker.to_string(),
                reason: format!("request failed: {e}"),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SmacrossError::Fetch {
                ticker: ticker.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        let parsed: ChartResponse = resp.json().map_err(|e| SmacrossError::Fetch {
            ticker: ticker.to_string(),
            reason: format!("decoding response: {e}"),
        })?;

        Self::parse_response(ticker, parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response(body: &str) -> ChartResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn chart_url_encodes_range() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let url = YahooAdapter::chart_url("CBA.AX", start, end);

        assert!(url.contains("/v8/finance/chart/CBA.AX"));
        assert!(url.contains("period1=1704067200"));
        assert!(url.contains("interval=1d"));
    }

    #[test]
    fn parse_skips_null_rows() {
        let resp = sample_response(
            r#"{"chart":{"result":[{"timestamp":[1704153600,1704240000],
                "indicators":{"quote":[{"open":[100.0,null],"high":[101.0,null],
                "low":[99.0,null],"close":[100.5,null],"volume":[5000,null]}],
                "adjclose":[{"adjclose":[100.2,null]}]}}],"error":null}}"#,
        );
        let bars = YahooAdapter::parse_response("CBA.AX", resp).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert!((bars[0].close - 100.5).abs() < 1e-9);
        assert!((bars[0].adj_close - 100.2).abs() < 1e-9);
    }

    #[test]
    fn parse_falls_back_to_close_without_adjclose() {
        let resp = sample_response(
            r#"{"chart":{"result":[{"timestamp":[1704153600],
                "indicators":{"quote":[{"open":[100.0],"high":[101.0],
                "low":[99.0],"close":[100.5],"volume":[5000]}]}}],"error":null}}"#,
        );
        let bars = YahooAdapter::parse_response("CBA.AX", resp).unwrap();
        assert!((bars[0].adj_close - 100.5).abs() < 1e-9);
    }

    #[test]
    fn parse_surfaces_api_error() {
        let resp = sample_response(
            r#"{"chart":{"result":null,"error":{"code":"Not Found",
                "description":"No data found, symbol may be delisted"}}}"#,
        );
        let err = YahooAdapter::parse_response("GHOST.AX", resp).unwrap_err();
        assert!(matches!(err, SmacrossError::Fetch { ticker, .. } if ticker == "GHOST.AX"));
    }

    #[test]
    fn parse_rejects_all_null_series() {
        let resp = sample_response(
            r#"{"chart":{"result":[{"timestamp":[1704153600],
                "indicators":{"quote":[{"open":[null],"high":[null],
                "low":[null],"close":[null],"volume":[null]}]}}],"error":null}}"#,
        );
        assert!(YahooAdapter::parse_response("T", resp).is_err());
    }
}
