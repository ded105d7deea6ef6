//! Artifact export: JSON report, chart CSV, transactions CSV.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pricelab_core::analysis::{Direction, Transaction};
use pricelab_core::composer::{AnalysisReport, EnrichedDay, TradeMarker};
use pricelab_core::validation::ValidationReport;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `AnalysisReport` to pretty JSON.
pub fn export_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize AnalysisReport to JSON")
}

pub fn import_json(json: &str) -> Result<AnalysisReport> {
    serde_json::from_str(json).context("failed to deserialize AnalysisReport from JSON")
}

pub fn export_validation_json(report: &ValidationReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize ValidationReport to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

fn opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:.precision$}"))
        .unwrap_or_default()
}

/// One row per day. Absent values are empty cells.
///
/// Columns: index, date, open, high, low, close, volume, sma, daily_return,
/// price_change, run_direction, run_position, run_length, trade
pub fn export_chart_csv(days: &[EnrichedDay]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "index",
        "date",
        "open",
        "high",
        "low",
        "close",
        "volume",
        "sma",
        "daily_return",
        "price_change",
        "run_direction",
        "run_position",
        "run_length",
        "trade",
    ])?;

    for d in days {
        let direction = match d.run.direction {
            Some(Direction::Up) => "up",
            Some(Direction::Down) => "down",
            None => "",
        };
        let trade = match d.trade {
            Some(TradeMarker::Buy) => "buy",
            Some(TradeMarker::Sell) => "sell",
            None => "",
        };
        wtr.write_record([
            &d.index.to_string(),
            &d.date.to_string(),
            &format!("{:.4}", d.open),
            &format!("{:.4}", d.high),
            &format!("{:.4}", d.low),
            &format!("{:.4}", d.close),
            &d.volume.to_string(),
            &opt(d.sma, 4),
            &opt(d.daily_return, 8),
            &opt(d.price_change, 4),
            &direction.to_string(),
            &d.run.position.map(|p| p.to_string()).unwrap_or_default(),
            &d.run.length.map(|l| l.to_string()).unwrap_or_default(),
            &trade.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Columns: buy_day_index, buy_date, buy_price, sell_day_index, sell_date,
/// sell_price, profit, holding_days
pub fn export_transactions_csv(transactions: &[Transaction]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "buy_day_index",
        "buy_date",
        "buy_price",
        "sell_day_index",
        "sell_date",
        "sell_price",
        "profit",
        "holding_days",
    ])?;
    for t in transactions {
        wtr.write_record([
            &t.buy_day_index.to_string(),
            &t.buy_date.to_string(),
            &format!("{:.4}", t.buy_price),
            &t.sell_day_index.to_string(),
            &t.sell_date.to_string(),
            &format!("{:.4}", t.sell_price),
            &format!("{:.4}", t.profit),
            &t.holding_days().to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one analysis.
///
/// Creates `{fingerprint}_{timestamp}/` under `output_dir` containing
/// `report.json`, `chart.csv` and `transactions.csv`. Returns the directory.
pub fn save_artifacts(report: &AnalysisReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        report.dataset.short(),
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("report.json"), export_json(report)?)?;
    std::fs::write(run_dir.join("chart.csv"), export_chart_csv(&report.chart_data)?)?;
    std::fs::write(
        run_dir.join("transactions.csv"),
        export_transactions_csv(&report.max_profit.transactions)?,
    )?;

    tracing::info!(dir = %run_dir.display(), "artifacts saved");
    Ok(run_dir)
}
