//! Market data abstractions and core types

use crate::core::error::PlanError;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily close for the tracked currency pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// An immutable ascending series of daily closes.
///
/// Construction validates the invariants the planning core relies on:
/// strictly ascending dates (no duplicates) and strictly positive closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSeries {
    points: Vec<RatePoint>,
}

impl RateSeries {
    pub fn new(points: Vec<RatePoint>) -> Result<Self, PlanError> {
        if points.is_empty() {
            return Err(PlanError::InvalidInput("empty rate series".to_string()));
        }
        for point in &points {
            if point.close <= 0.0 || !point.close.is_finite() {
                return Err(PlanError::InvalidInput(format!(
                    "non-positive close {} on {}",
                    point.close, point.date
                )));
            }
        }
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(PlanError::InvalidInput(format!(
                    "series not strictly ascending at {}",
                    pair[1].date
                )));
            }
        }
        Ok(RateSeries { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The most recent close. The series is non-empty by construction.
    pub fn latest(&self) -> &RatePoint {
        self.points.last().expect("rate series is non-empty")
    }

    pub fn points(&self) -> &[RatePoint] {
        &self.points
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.close)
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches daily closes for `symbol` over `range` (e.g. "6mo").
    ///
    /// Providers must surface failures (network error, empty series) as
    /// errors; the core never treats a missing rate as zero.
    async fn fetch_history(&self, symbol: &str, range: &str) -> Result<RateSeries>;
}
