//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. SMA values are the mean of their trailing window
//! 2. Returns are finite, with index 0 always absent
//! 3. Runs partition the non-flat days and never overlap
//! 4. Max profit equals the sum of positive deltas and of transaction profits
//! 5. Chart totals reproduce the runs and profit totals
//! 6. Every engine is idempotent

use chrono::NaiveDate;
use proptest::prelude::*;
use pricelab_core::analysis::{
    analyze_runs, compute_daily_returns, compute_max_profit, compute_sma, Direction,
};
use pricelab_core::composer::{compose, ChartTotals};
use pricelab_core::domain::Series;

// ── Strategies (proptest) ────────────────────────────────────────────

/// Closes on a coarse grid so flat days show up regularly.
fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((1u32..40).prop_map(|c| c as f64 * 0.5), 1..80)
}

fn series_from(closes: &[f64]) -> Series {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    Series::from_closes(start, closes).unwrap()
}

// ── 1. SMA ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn sma_is_trailing_mean(closes in arb_closes(), w in 1usize..10) {
        let series = series_from(&closes);
        let window = w.min(closes.len());
        let sma = compute_sma(&series, window).unwrap();

        prop_assert_eq!(sma.points.len(), closes.len());
        prop_assert_eq!(sma.defined_count(), closes.len() - window + 1);
        for i in 0..closes.len() {
            match sma.get(i) {
                None => prop_assert!(i + 1 < window),
                Some(v) => {
                    let mean = closes[i + 1 - window..=i].iter().sum::<f64>() / window as f64;
                    prop_assert!((v - mean).abs() < 1e-9, "index {}: {} vs {}", i, v, mean);
                }
            }
        }
    }

    #[test]
    fn sma_rejects_window_beyond_length(closes in arb_closes(), extra in 1usize..5) {
        let series = series_from(&closes);
        prop_assert!(compute_sma(&series, closes.len() + extra).is_err());
    }
}

// ── 2. Returns ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn returns_are_finite_and_aligned(closes in arb_closes()) {
        let returns = compute_daily_returns(&series_from(&closes));
        prop_assert_eq!(returns.points.len(), closes.len());
        prop_assert!(returns.points[0].value.is_none());
        for v in returns.defined_values() {
            prop_assert!(v.is_finite());
        }
        prop_assert_eq!(returns.defined_values().len(), closes.len() - 1);
    }
}

// ── 3. Runs ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn runs_cover_exactly_the_moving_days(closes in arb_closes()) {
        let stats = analyze_runs(&series_from(&closes));

        let mut covered = vec![false; closes.len()];
        for run in &stats.runs {
            prop_assert!(run.start_index >= 1);
            prop_assert!(run.end_index < closes.len());
            prop_assert_eq!(run.length, run.end_index - run.start_index + 1);
            for day in run.start_index..=run.end_index {
                prop_assert!(!covered[day], "day {} in two runs", day);
                covered[day] = true;
                let delta = closes[day] - closes[day - 1];
                match run.direction {
                    Direction::Up => prop_assert!(delta > 0.0),
                    Direction::Down => prop_assert!(delta < 0.0),
                }
            }
        }
        for day in 1..closes.len() {
            let moved = closes[day] != closes[day - 1];
            prop_assert_eq!(covered[day], moved, "day {}", day);
        }

        let moving_days = stats.total_upward_days + stats.total_downward_days;
        prop_assert_eq!(moving_days, covered.iter().filter(|c| **c).count());
    }

    #[test]
    fn adjacent_runs_of_same_direction_are_separated_by_flat_day(closes in arb_closes()) {
        let stats = analyze_runs(&series_from(&closes));
        for pair in stats.runs.windows(2) {
            if pair[0].direction == pair[1].direction {
                prop_assert!(pair[1].start_index > pair[0].end_index + 1);
            }
        }
    }
}

// ── 4. Max profit ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn profit_is_sum_of_gains(closes in arb_closes()) {
        let result = compute_max_profit(&series_from(&closes));
        let gains: f64 = closes.windows(2).map(|w| (w[1] - w[0]).max(0.0)).sum();
        let from_trades: f64 = result.transactions.iter().map(|t| t.profit).sum();

        prop_assert!((result.total_profit - gains).abs() < 1e-9);
        prop_assert!((from_trades - gains).abs() < 1e-9);
        prop_assert!(result.total_profit >= 0.0);
        for pair in result.transactions.windows(2) {
            prop_assert!(pair[0].sell_day_index < pair[1].buy_day_index);
        }
    }

    #[test]
    fn one_transaction_per_up_run(closes in arb_closes()) {
        let series = series_from(&closes);
        let runs = analyze_runs(&series);
        let profit = compute_max_profit(&series);

        let ups: Vec<_> = runs.runs.iter().filter(|r| r.direction == Direction::Up).collect();
        prop_assert_eq!(ups.len(), profit.transactions.len());
        for (run, t) in ups.iter().zip(&profit.transactions) {
            prop_assert_eq!(t.buy_day_index, run.start_index - 1);
            prop_assert_eq!(t.sell_day_index, run.end_index);
        }
    }
}

// ── 5/6. Composition ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn chart_totals_round_trip(closes in arb_closes()) {
        let series = series_from(&closes);
        let report = compose(
            &series,
            compute_sma(&series, 1).unwrap(),
            compute_daily_returns(&series),
            analyze_runs(&series),
            compute_max_profit(&series),
        );
        let totals = ChartTotals::from_chart(&report.chart_data);

        prop_assert_eq!(totals.upward_runs, report.runs_analysis.total_upward_runs);
        prop_assert_eq!(totals.downward_runs, report.runs_analysis.total_downward_runs);
        prop_assert_eq!(totals.upward_days, report.runs_analysis.total_upward_days);
        prop_assert_eq!(totals.downward_days, report.runs_analysis.total_downward_days);
        prop_assert_eq!(totals.longest_upward_streak, report.runs_analysis.longest_upward_streak);
        prop_assert_eq!(totals.longest_downward_streak, report.runs_analysis.longest_downward_streak);
        prop_assert_eq!(totals.transactions, report.max_profit.transactions.len());
        prop_assert!((totals.total_profit - report.max_profit.total_profit).abs() < 1e-9);
    }

    #[test]
    fn engines_are_idempotent(closes in arb_closes()) {
        let series = series_from(&closes);
        prop_assert_eq!(compute_daily_returns(&series), compute_daily_returns(&series));
        prop_assert_eq!(analyze_runs(&series), analyze_runs(&series));
        prop_assert_eq!(compute_max_profit(&series), compute_max_profit(&series));
        prop_assert_eq!(compute_sma(&series, 1), compute_sma(&series, 1));
    }
}
