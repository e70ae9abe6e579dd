//! Report types and score aggregation.
//!
//! Every detector records its findings through a [`Scorecard`]; the final
//! score is always `clamp(100 - total deductions, 0, 100)`. No stage writes
//! the score directly.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// One detected anomaly with a severity and an approximate location.
/// The timestamp is free-form: "00:01:15", "1.000s - 5.000s", or "N/A".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub timestamp: String,
    pub description: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub score: u32,
    pub summary: String,
    pub issues: Vec<Issue>,
}

/// Accumulates point deductions and issues in detection order.
#[derive(Debug, Default)]
pub struct Scorecard {
    deductions: u32,
    issues: Vec<Issue>,
}

impl Scorecard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue carrying a point deduction.
    pub fn charge(
        &mut self,
        points: u32,
        severity: Severity,
        timestamp: impl Into<String>,
        description: impl Into<String>,
    ) {
        self.deductions += points;
        self.issues.push(Issue {
            timestamp: timestamp.into(),
            description: description.into(),
            severity,
        });
    }

    /// Record an informational issue with no deduction.
    pub fn note(
        &mut self,
        severity: Severity,
        timestamp: impl Into<String>,
        description: impl Into<String>,
    ) {
        self.charge(0, severity, timestamp, description);
    }

    pub fn deductions(&self) -> u32 {
        self.deductions
    }

    pub fn finish(self) -> AnalysisReport {
        let score = 100u32.saturating_sub(self.deductions);
        AnalysisReport {
            score,
            summary: summary_for_score(score).to_string(),
            issues: self.issues,
        }
    }
}

/// Summary text is a pure function of the clamped score.
pub fn summary_for_score(score: u32) -> &'static str {
    if score == 100 {
        "The video appears to be authentic. Metadata is valid and frame-to-frame analysis is consistent."
    } else if score >= 80 {
        "The video appears to be largely authentic. Some minor inconsistencies were found, but no direct evidence of tampering."
    } else if score >= 50 {
        "The video shows moderate inconsistencies that could indicate tampering. Manual review is recommended."
    } else {
        "The video shows significant inconsistencies that could indicate tampering. Manual review is highly recommended."
    }
}
