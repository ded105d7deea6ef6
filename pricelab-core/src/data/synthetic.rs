//! Synthetic price series for demos and tests.
//!
//! Closes follow a seeded random walk with normally distributed daily
//! returns (Box-Muller over a `StdRng`), so a given (kind, days, seed)
//! always produces the same series. Dates are consecutive weekdays starting
//! Monday 2023-01-02. Every generated point passes `PricePoint::is_sane`.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::{PricePoint, Series, SeriesError};

/// Default seed, matching the reference data set.
pub const DEFAULT_SEED: u64 = 42;

/// Market regime to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntheticKind {
    /// Driftless random walk, 2% daily volatility.
    Normal,
    /// Upward drift of 0.1% per day.
    Bull,
    /// Downward drift of 0.08% per day.
    Bear,
    /// Driftless random walk, 5% daily volatility.
    Volatile,
    /// Short driftless walk for quick checks.
    Small,
}

impl SyntheticKind {
    pub fn default_days(self) -> usize {
        match self {
            Self::Normal | Self::Bull | Self::Bear => 252,
            Self::Volatile => 100,
            Self::Small => 20,
        }
    }

    fn drift(self) -> f64 {
        match self {
            Self::Bull => 0.001,
            Self::Bear => -0.0008,
            _ => 0.0,
        }
    }

    fn volatility(self) -> f64 {
        match self {
            Self::Volatile => 0.05,
            _ => 0.02,
        }
    }

    fn is_trending(self) -> bool {
        matches!(self, Self::Bull | Self::Bear)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Bull => "bull",
            Self::Bear => "bear",
            Self::Volatile => "volatile",
            Self::Small => "small",
        }
    }
}

impl std::str::FromStr for SyntheticKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "bull" => Ok(Self::Bull),
            "bear" => Ok(Self::Bear),
            "volatile" => Ok(Self::Volatile),
            "small" => Ok(Self::Small),
            other => Err(format!(
                "unknown synthetic kind '{other}'. Valid: normal, bull, bear, volatile, small"
            )),
        }
    }
}

/// Generation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticParams {
    pub days: usize,
    pub start_price: f64,
    pub seed: u64,
}

impl SyntheticParams {
    pub fn for_kind(kind: SyntheticKind) -> Self {
        Self {
            days: kind.default_days(),
            start_price: 100.0,
            seed: DEFAULT_SEED,
        }
    }
}

/// Generate a synthetic daily series. `days == 0` yields `SeriesError::Empty`.
pub fn generate(kind: SyntheticKind, params: &SyntheticParams) -> Result<Series, SeriesError> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let dates = weekdays_from(start_date(), params.days);
    let vol = kind.volatility();

    let mut returns = Vec::with_capacity(params.days);
    let mut closes = Vec::with_capacity(params.days);
    let mut price = params.start_price;
    for i in 0..params.days {
        let r = kind.drift() + normal(&mut rng, 0.0, vol);
        if i > 0 {
            price = (price * (1.0 + r)).max(0.01);
        }
        returns.push(r);
        closes.push(price);
    }

    let points = dates
        .into_iter()
        .zip(closes.iter().zip(&returns))
        .enumerate()
        .map(|(i, (date, (&close, &ret)))| {
            let daily_vol = if kind.is_trending() {
                0.01
            } else {
                normal(&mut rng, 0.0, vol * 0.5).abs()
            };
            let open = if i == 0 {
                close
            } else {
                (close * (1.0 + normal(&mut rng, 0.0, daily_vol * 0.3))).max(0.01)
            };
            let body_high = open.max(close);
            let body_low = open.min(close);
            let high = body_high * (1.0 + normal(&mut rng, 0.0, daily_vol).abs());
            let low = (body_low * (1.0 - normal(&mut rng, 0.0, daily_vol).abs()))
                .clamp(0.01_f64.min(body_low), body_low);
            let volume = if kind.is_trending() {
                1_000_000.0 * (1.0 + normal(&mut rng, 0.0, 0.3).abs())
            } else {
                1_000_000.0 * (1.0 + ret.abs() * 5.0) * rng.gen_range(0.5..1.5)
            };
            PricePoint {
                date,
                open: cents(open),
                high: cents(high),
                low: cents(low),
                close: cents(close),
                volume: volume as u64,
            }
        })
        .collect();

    Series::new(points)
}

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap_or_default()
}

fn weekdays_from(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut current = start;
    while dates.len() < count {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(current);
        }
        current += chrono::Duration::days(1);
    }
    dates
}

/// Box-Muller transform for a normal draw.
fn normal(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    // 1 - gen() lies in (0, 1], keeping ln() finite.
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

fn cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
