//! Derived per-subgraph aggregates and the dashboard view.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ReportSummary;

/// Direction of a subgraph's score between its two most recent reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    /// Compare the latest score against the one before it.
    ///
    /// A missing previous report, equal scores, or incomparable values
    /// (`NaN`) all yield [`Trend::Stable`].
    ///
    /// # Examples
    /// ```
    /// use backend::domain::Trend;
    ///
    /// assert_eq!(Trend::from_scores(85.0, Some(70.0)), Trend::Up);
    /// assert_eq!(Trend::from_scores(70.0, None), Trend::Stable);
    /// ```
    pub fn from_scores(latest: f64, previous: Option<f64>) -> Self {
        match previous.and_then(|previous| latest.partial_cmp(&previous)) {
            Some(std::cmp::Ordering::Greater) => Self::Up,
            Some(std::cmp::Ordering::Less) => Self::Down,
            Some(std::cmp::Ordering::Equal) | None => Self::Stable,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate over every report for one subgraph. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SubgraphSummary {
    pub name: String,
    /// Score of the most recent report by event timestamp.
    pub latest_score: f64,
    pub latest_report: DateTime<Utc>,
    pub report_count: u64,
    pub trend: Trend,
}

/// Composite dashboard view.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    /// Ordered by latest report timestamp, newest first.
    pub subgraphs: Vec<SubgraphSummary>,
    pub recent_reports: Vec<ReportSummary>,
    pub total_reports: u64,
}
