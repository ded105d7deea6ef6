//! Per-day enriched records for interactive charting.
//!
//! Each [`EnrichedDay`] joins one price point with its SMA value, daily
//! return, run membership and trade marker, so a client can render tooltips
//! and highlights without re-deriving anything.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::{Direction, MaxProfit, ReturnsResult, RunsAnalysis, SmaResult};
use crate::domain::Series;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeMarker {
    Buy,
    Sell,
}

/// Where a day sits inside the run that contains it, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunMembership {
    pub in_run: bool,
    pub direction: Option<Direction>,
    /// Position of the run in `RunsAnalysis::runs`.
    pub run_index: Option<usize>,
    pub length: Option<usize>,
    /// 1-based position of this day within its run.
    pub position: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedDay {
    pub index: usize,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub sma: Option<f64>,
    pub daily_return: Option<f64>,
    /// True when the return is undefined because the prior close was zero.
    pub return_undefined: bool,
    /// `close[i] - close[i-1]`; absent on day 0.
    pub price_change: Option<f64>,
    /// Daily return expressed in percent.
    pub price_change_pct: Option<f64>,
    pub run: RunMembership,
    pub trade: Option<TradeMarker>,
}

pub fn enrich(
    series: &Series,
    sma: &SmaResult,
    returns: &ReturnsResult,
    runs: &RunsAnalysis,
    profit: &MaxProfit,
) -> Vec<EnrichedDay> {
    let n = series.len();

    let mut membership = vec![RunMembership::default(); n];
    for (run_index, run) in runs.runs.iter().enumerate() {
        for day in run.start_index..=run.end_index {
            membership[day] = RunMembership {
                in_run: true,
                direction: Some(run.direction),
                run_index: Some(run_index),
                length: Some(run.length),
                position: Some(day - run.start_index + 1),
            };
        }
    }

    let mut trades: Vec<Option<TradeMarker>> = vec![None; n];
    for t in &profit.transactions {
        trades[t.buy_day_index] = Some(TradeMarker::Buy);
        trades[t.sell_day_index] = Some(TradeMarker::Sell);
    }

    let points = series.points();
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let ret = returns.points.get(i);
            let daily_return = ret.and_then(|r| r.value);
            EnrichedDay {
                index: i,
                date: p.date,
                open: p.open,
                high: p.high,
                low: p.low,
                close: p.close,
                volume: p.volume,
                sma: sma.get(i),
                daily_return,
                return_undefined: ret.is_some_and(|r| r.flag.is_some()),
                price_change: (i > 0).then(|| p.close - points[i - 1].close),
                price_change_pct: daily_return.map(|r| r * 100.0),
                run: membership[i],
                trade: trades[i],
            }
        })
        .collect()
}

/// Totals re-derived from the enriched days alone.
///
/// Must agree with the Runs Analyzer and Max-Profit results they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartTotals {
    pub upward_runs: usize,
    pub downward_runs: usize,
    pub upward_days: usize,
    pub downward_days: usize,
    pub longest_upward_streak: usize,
    pub longest_downward_streak: usize,
    pub transactions: usize,
    pub total_profit: f64,
}

impl ChartTotals {
    pub fn from_chart(days: &[EnrichedDay]) -> Self {
        let mut totals = Self {
            upward_runs: 0,
            downward_runs: 0,
            upward_days: 0,
            downward_days: 0,
            longest_upward_streak: 0,
            longest_downward_streak: 0,
            transactions: 0,
            total_profit: 0.0,
        };

        for day in days {
            if let (Some(dir), Some(len), Some(pos)) =
                (day.run.direction, day.run.length, day.run.position)
            {
                let starts_run = pos == 1;
                match dir {
                    Direction::Up => {
                        totals.upward_days += 1;
                        totals.upward_runs += usize::from(starts_run);
                        totals.longest_upward_streak = totals.longest_upward_streak.max(len);
                    }
                    Direction::Down => {
                        totals.downward_days += 1;
                        totals.downward_runs += usize::from(starts_run);
                        totals.longest_downward_streak = totals.longest_downward_streak.max(len);
                    }
                }
            }
            if day.trade == Some(TradeMarker::Sell) {
                totals.transactions += 1;
            }
            if let Some(change) = day.price_change.filter(|c| *c > 0.0) {
                totals.total_profit += change;
            }
        }
        totals
    }
}
