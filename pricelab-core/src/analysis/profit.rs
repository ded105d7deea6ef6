//! Maximum achievable profit with unlimited non-overlapping trades.
//!
//! Holding at most one unit, buying and selling at the close, the optimum is
//! the sum of every positive day-over-day close delta. Each maximal strictly
//! increasing stretch is reported as one transaction: buy at the close before
//! the stretch, sell at its last close. A flat day ends a stretch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Analysis, AnalysisError};
use crate::domain::Series;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub buy_day_index: usize,
    pub sell_day_index: usize,
    pub buy_date: NaiveDate,
    pub sell_date: NaiveDate,
    pub buy_price: f64,
    pub sell_price: f64,
    pub profit: f64,
}

impl Transaction {
    /// Days between buy and sell, counted in series positions.
    pub fn holding_days(&self) -> usize {
        self.sell_day_index - self.buy_day_index
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxProfit {
    pub total_profit: f64,
    pub transactions: Vec<Transaction>,
}

impl MaxProfit {
    pub fn trade_count(&self) -> usize {
        self.transactions.len()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MaxProfitEngine;

impl Analysis for MaxProfitEngine {
    type Output = MaxProfit;

    fn name(&self) -> &str {
        "max_profit"
    }

    fn analyze(&self, series: &Series) -> Result<MaxProfit, AnalysisError> {
        Ok(compute_max_profit(series))
    }
}

pub fn compute_max_profit(series: &Series) -> MaxProfit {
    let points = series.points();
    let mut transactions = Vec::new();
    let mut total_profit = 0.0;
    let mut buy: Option<usize> = None;

    for i in 1..points.len() {
        let delta = points[i].close - points[i - 1].close;
        if delta > 0.0 {
            total_profit += delta;
            buy.get_or_insert(i - 1);
        } else if let Some(start) = buy.take() {
            transactions.push(transaction(series, start, i - 1));
        }
    }
    if let Some(start) = buy {
        transactions.push(transaction(series, start, points.len() - 1));
    }

    tracing::debug!(total_profit, trades = transactions.len(), "computed max profit");
    MaxProfit {
        total_profit,
        transactions,
    }
}

fn transaction(series: &Series, buy: usize, sell: usize) -> Transaction {
    let points = series.points();
    let (b, s) = (&points[buy], &points[sell]);
    Transaction {
        buy_day_index: buy,
        sell_day_index: sell,
        buy_date: b.date,
        sell_date: s.date,
        buy_price: b.close,
        sell_price: s.close,
        profit: s.close - b.close,
    }
}
