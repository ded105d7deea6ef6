//! Series: the ordered, non-empty price sequence every engine consumes.

use super::ids::DatasetHash;
use super::price_point::PricePoint;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Construction errors for [`Series`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("price series is empty")]
    Empty,

    #[error("price series is not sorted by date: index {index} ({date}) precedes its predecessor")]
    OutOfOrder { index: usize, date: NaiveDate },
}

/// Ordered sequence of price points, length >= 1, dates non-decreasing.
///
/// Immutable once built. Duplicate dates are allowed and keep the order they
/// were supplied in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series {
    points: Vec<PricePoint>,
}

#[allow(clippy::len_without_is_empty)]
impl Series {
    /// Build a series from points that are already sorted by date.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        if points.is_empty() {
            return Err(SeriesError::Empty);
        }
        if let Some(i) = points.windows(2).position(|w| w[1].date < w[0].date) {
            return Err(SeriesError::OutOfOrder {
                index: i + 1,
                date: points[i + 1].date,
            });
        }
        Ok(Self { points })
    }

    /// Build a series from points in any order, stable-sorting by date.
    pub fn from_unsorted(mut points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        points.sort_by_key(|p| p.date);
        Self::new(points)
    }

    /// Build a series of consecutive calendar days from close prices alone.
    ///
    /// Open is the previous close (or the close itself on day 0), high/low
    /// bracket open and close by 1%, volume is 1000. Used for fixtures.
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Result<Self, SeriesError> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let open = if i == 0 { close } else { closes[i - 1] };
                PricePoint {
                    date: start + chrono::Duration::days(i as i64),
                    open,
                    high: open.max(close) * 1.01,
                    low: open.min(close) * 0.99,
                    close,
                    volume: 1000,
                }
            })
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn get(&self, index: usize) -> Option<&PricePoint> {
        self.points.get(index)
    }

    pub fn first(&self) -> &PricePoint {
        &self.points[0]
    }

    pub fn last(&self) -> &PricePoint {
        &self.points[self.points.len() - 1]
    }

    /// Closing prices in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Inclusive (first, last) date.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        (self.first().date, self.last().date)
    }

    /// Deterministic BLAKE3 hash over every field of every point.
    pub fn fingerprint(&self) -> DatasetHash {
        let mut hasher = blake3::Hasher::new();
        for point in &self.points {
            hasher.update(point.date.to_string().as_bytes());
            hasher.update(&point.open.to_le_bytes());
            hasher.update(&point.high.to_le_bytes());
            hasher.update(&point.low.to_le_bytes());
            hasher.update(&point.close.to_le_bytes());
            hasher.update(&point.volume.to_le_bytes());
        }
        DatasetHash(hasher.finalize().to_hex().to_string())
    }
}
