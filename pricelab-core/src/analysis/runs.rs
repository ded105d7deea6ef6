//! Runs: maximal stretches of same-direction day-over-day close changes.
//!
//! Day i (i >= 1) moves up if `close[i] > close[i-1]`, down if lower, and is
//! flat otherwise. A flat day ends the current run and belongs to no run.
//! Run indices are day indices, so every run lies within `[1, N-1]`.

use serde::{Deserialize, Serialize};

use super::{Analysis, AnalysisError};
use crate::domain::Series;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    fn of_delta(delta: f64) -> Option<Self> {
        if delta > 0.0 {
            Some(Self::Up)
        } else if delta < 0.0 {
            Some(Self::Down)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub direction: Direction,
    pub start_index: usize,
    pub end_index: usize,
    pub length: usize,
}

impl Run {
    fn new(direction: Direction, start_index: usize, end_index: usize) -> Self {
        Self {
            direction,
            start_index,
            end_index,
            length: end_index - start_index + 1,
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start_index..=self.end_index).contains(&index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunsAnalysis {
    pub runs: Vec<Run>,
    pub total_upward_runs: usize,
    pub total_downward_runs: usize,
    pub longest_upward_streak: usize,
    pub longest_downward_streak: usize,
    pub total_upward_days: usize,
    pub total_downward_days: usize,
}

impl RunsAnalysis {
    pub fn from_runs(runs: Vec<Run>) -> Self {
        let mut stats = Self {
            runs: Vec::new(),
            total_upward_runs: 0,
            total_downward_runs: 0,
            longest_upward_streak: 0,
            longest_downward_streak: 0,
            total_upward_days: 0,
            total_downward_days: 0,
        };
        for run in &runs {
            match run.direction {
                Direction::Up => {
                    stats.total_upward_runs += 1;
                    stats.total_upward_days += run.length;
                    stats.longest_upward_streak = stats.longest_upward_streak.max(run.length);
                }
                Direction::Down => {
                    stats.total_downward_runs += 1;
                    stats.total_downward_days += run.length;
                    stats.longest_downward_streak = stats.longest_downward_streak.max(run.length);
                }
            }
        }
        stats.runs = runs;
        stats
    }

    /// Runs of one direction, in date order.
    pub fn runs_in(&self, direction: Direction) -> impl Iterator<Item = &Run> {
        self.runs.iter().filter(move |r| r.direction == direction)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunsAnalyzer;

impl Analysis for RunsAnalyzer {
    type Output = RunsAnalysis;

    fn name(&self) -> &str {
        "runs"
    }

    fn analyze(&self, series: &Series) -> Result<RunsAnalysis, AnalysisError> {
        Ok(analyze_runs(series))
    }
}

pub fn analyze_runs(series: &Series) -> RunsAnalysis {
    let stats = RunsAnalysis::from_runs(segment_runs(&series.closes()));
    tracing::debug!(
        up = stats.total_upward_runs,
        down = stats.total_downward_runs,
        "segmented runs"
    );
    stats
}

/// Single left-to-right pass splitting closes into maximal runs.
pub fn segment_runs(closes: &[f64]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut current: Option<(Direction, usize)> = None;

    for i in 1..closes.len() {
        let dir = Direction::of_delta(closes[i] - closes[i - 1]);
        match (current, dir) {
            (Some((open, _)), Some(next)) if open == next => {}
            _ => {
                if let Some((open, start)) = current.take() {
                    runs.push(Run::new(open, start, i - 1));
                }
                current = dir.map(|d| (d, i));
            }
        }
    }

    if let Some((open, start)) = current {
        runs.push(Run::new(open, start, closes.len() - 1));
    }
    runs
}
