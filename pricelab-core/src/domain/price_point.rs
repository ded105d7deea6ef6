//! PricePoint: one trading day of OHLCV data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// OHLCV record for a single day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PricePoint {
    /// Returns true if any price field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }

    /// Describe the first OHLC relationship this point violates, if any.
    pub fn sanity_issue(&self) -> Option<&'static str> {
        if self.is_void() {
            Some("non-finite price")
        } else if self.high < self.low {
            Some("high below low")
        } else if self.high < self.open || self.high < self.close {
            Some("high below open/close")
        } else if self.low > self.open || self.low > self.close {
            Some("low above open/close")
        } else if self.open <= 0.0 || self.close <= 0.0 {
            Some("non-positive open/close")
        } else {
            None
        }
    }
}
