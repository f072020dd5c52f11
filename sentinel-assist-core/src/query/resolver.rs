use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

const HOUR: u64 = 3_600;
const DAY: u64 = 86_400;

/// A named lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub name: &'static str,
    pub duration: Duration,
    /// Argument for `ago()` in the query text.
    pub kql_ago: &'static str,
}

pub const TIME_WINDOWS: [TimeWindow; 6] = [
    TimeWindow {
        name: "last_1h",
        duration: Duration::from_secs(HOUR),
        kql_ago: "1h",
    },
    TimeWindow {
        name: "last_24h",
        duration: Duration::from_secs(24 * HOUR),
        kql_ago: "24h",
    },
    TimeWindow {
        name: "last_3d",
        duration: Duration::from_secs(3 * DAY),
        kql_ago: "3d",
    },
    TimeWindow {
        name: "last_7d",
        duration: Duration::from_secs(7 * DAY),
        kql_ago: "7d",
    },
    TimeWindow {
        name: "last_14d",
        duration: Duration::from_secs(14 * DAY),
        kql_ago: "14d",
    },
    TimeWindow {
        name: "last_30d",
        duration: Duration::from_secs(30 * DAY),
        kql_ago: "30d",
    },
];

/// Bucket sizes accepted for trend queries.
pub const BIN_SIZES: [&str; 4] = ["1h", "6h", "12h", "1d"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown time window '{name}', expected one of: {}", valid_windows())]
    UnknownWindow { name: String },
}

impl ResolveError {
    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::UnknownWindow { .. } => "unknown_window",
        }
    }
}

fn valid_windows() -> String {
    TIME_WINDOWS
        .iter()
        .map(|w| w.name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Unknown names are an error, never a silent default.
pub fn resolve_window(name: &str) -> Result<&'static TimeWindow, ResolveError> {
    TIME_WINDOWS
        .iter()
        .find(|window| window.name == name)
        .ok_or_else(|| ResolveError::UnknownWindow {
            name: name.to_string(),
        })
}

/// Hourly buckets for short windows, daily buckets otherwise.
pub fn default_bin_size(window: &TimeWindow) -> &'static str {
    if window.duration <= Duration::from_secs(24 * HOUR) {
        "1h"
    } else {
        "1d"
    }
}

/// Workspace severities in ascending order. There is no "Critical".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Informational,
    Low,
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Informational,
        Severity::Low,
        Severity::Medium,
        Severity::High,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Informational => "Informational",
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expand a minimum threshold into "this level and above".
///
/// Unrecognised input resolves to every level, unlike unknown time windows
/// which are rejected.
pub fn resolve_severity(min_level: &str) -> Vec<Severity> {
    let floor = Severity::parse(min_level).unwrap_or(Severity::Informational);
    Severity::ALL
        .into_iter()
        .filter(|level| *level >= floor)
        .collect()
}

/// Render levels as a quoted, comma-separated list for an `in (...)` clause.
pub fn severity_filter(levels: &[Severity]) -> String {
    levels
        .iter()
        .map(|level| format!("'{}'", level.as_str()))
        .collect::<Vec<_>>()
        .join(",")
}
