//! SVG price chart rendering.
//!
//! Draws one chart per ticker: the close series, the SMA overlay once it has
//! warmed up, and a marker at every fill. Written as plain SVG text, no
//! plotting library needed.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::batch::TickerRun;
use crate::domain::error::SmacrossError;
use crate::domain::strategy::TradeEvent;

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 40.0;

/// Render the chart for one ticker's run.
pub fn render_price_chart(run: &TickerRun) -> String {
    let closes: Vec<f64> = run.bars.iter().map(|b| b.close).collect();
    if closes.is_empty() {
        return String::new();
    }

    let sma_values = run.sma.iter().copied().flatten();
    let min_price = closes
        .iter()
        .copied()
        .chain(sma_values.clone())
        .fold(f64::INFINITY, f64::min);
    let max_price = closes
        .iter()
        .copied()
        .chain(sma_values)
        .fold(f64::NEG_INFINITY, f64::max);
    let range = (max_price - min_price).max(1e-9);

    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let x_scale = |i: usize| -> f64 {
        MARGIN_LEFT + (i as f64 / (closes.len() - 1).max(1) as f64) * plot_width
    };
    let y_scale =
        |v: f64| -> f64 { MARGIN_TOP + plot_height - ((v - min_price) / range) * plot_height };

    let mut close_path = String::new();
    for (i, &close) in closes.iter().enumerate() {
        let cmd = if close_path.is_empty() { "M" } else { " L" };
        close_path.push_str(&format!("{cmd} {:.1} {:.1}", x_scale(i), y_scale(close)));
    }

    // SMA joins the chart where the warm-up ends.
    let mut sma_path = String::new();
    for (i, value) in run.sma.iter().enumerate() {
        if let Some(v) = value {
            let cmd = if sma_path.is_empty() { "M" } else { " L" };
            sma_path.push_str(&format!("{cmd} {:.1} {:.1}", x_scale(i), y_scale(*v)));
        }
    }

    let mut svg = String::new();
    svg.push_str(&format!(
        r##"<svg width="{CHART_WIDTH}" height="{CHART_HEIGHT}" viewBox="0 0 {CHART_WIDTH} {CHART_HEIGHT}" xmlns="http://www.w3.org/2000/svg">"##
    ));
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{MARGIN_LEFT}\" y=\"20\" font-size=\"14\" fill=\"#333\">{}</text>\n",
        run.row.ticker
    ));
    svg.push_str(&format!(
        "  <line x1=\"{MARGIN_LEFT}\" y1=\"{MARGIN_TOP}\" x2=\"{MARGIN_LEFT}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        CHART_HEIGHT - MARGIN_BOTTOM
    ));
    svg.push_str(&format!(
        "  <line x1=\"{MARGIN_LEFT}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        CHART_HEIGHT - MARGIN_BOTTOM,
        CHART_WIDTH - MARGIN_RIGHT,
        CHART_HEIGHT - MARGIN_BOTTOM
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"end\" font-size=\"10\" fill=\"#666\">{max_price:.2}</text>\n",
        MARGIN_LEFT - 5.0,
        MARGIN_TOP + 5.0
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"end\" font-size=\"10\" fill=\"#666\">{min_price:.2}</text>\n",
        MARGIN_LEFT - 5.0,
        CHART_HEIGHT - MARGIN_BOTTOM - 5.0
    ));
    if let (Some(first), Some(last)) = (run.bars.first(), run.bars.last()) {
        svg.push_str(&format!(
            "  <text x=\"{MARGIN_LEFT}\" y=\"{CHART_HEIGHT}\" text-anchor=\"middle\" font-size=\"10\" fill=\"#666\">{}</text>\n",
            first.date
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{CHART_HEIGHT}\" text-anchor=\"middle\" font-size=\"10\" fill=\"#666\">{}</text>\n",
            CHART_WIDTH - MARGIN_RIGHT,
            last.date
        ));
    }
    svg.push_str(&format!(
        "  <path d=\"{close_path}\" fill=\"none\" stroke=\"#2563eb\" stroke-width=\"1.5\"/>\n"
    ));
    if !sma_path.is_empty() {
        svg.push_str(&format!(
            "  <path d=\"{sma_path}\" fill=\"none\" stroke=\"#f59e0b\" stroke-width=\"1.5\"/>\n"
        ));
    }

    for marker in &run.markers {
        let Some(i) = run.bars.iter().position(|b| b.date == marker.date) else {
            continue;
        };
        let (price, color) = match &marker.event {
            TradeEvent::Entered { price, .. } => (*price, "#16a34a"),
            TradeEvent::Exited { price, .. } => (*price, "#dc2626"),
        };
        svg.push_str(&format!(
            "  <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"4\" fill=\"{color}\"/>\n",
            x_scale(i),
            y_scale(price)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Write the chart to `<directory>/<TICKER>.svg`.
pub fn save_plot(directory: &Path, run: &TickerRun) -> Result<PathBuf, SmacrossError> {
    fs::create_dir_all(directory)?;
    let path = directory.join(format!("{}.svg", run.row.ticker));
    fs::write(&path, render_price_chart(run))?;
    Ok(path)
}
