//! Structured response produced by the insight engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a key driver or recommendation. Declaration order is the
/// sort order: an ascending sort puts the most severe entries first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Critical,
    High,
    Medium,
    Low,
}

impl Impact {
    pub fn label(&self) -> &'static str {
        match self {
            Impact::Critical => "critical",
            Impact::High => "high",
            Impact::Medium => "medium",
            Impact::Low => "low",
        }
    }
}

/// A single labeled, severity-ranked contributing factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyDriver {
    pub label: String,
    pub detail: String,
    pub impact: Impact,
    /// The metric value that triggered the driver, preformatted.
    pub metric_value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub priority: Impact,
    pub estimated_effort: Option<String>,
    /// In-dashboard navigation target; attached to at most one entry.
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// Correlates a response with its log lines.
    pub trace_id: Uuid,
    /// Rule-match confidence in 0.0..=1.0.
    pub confidence: f64,
    /// Data sources the narrative drew from.
    pub sources: Vec<String>,
    pub generated_at: DateTime<Utc>,
    /// Scenario key of the matched rule (e.g. "bottleneck_explainer").
    pub scenario: String,
    pub processing_time_ms: u64,
}

/// The engine's complete answer to one prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiResponse {
    pub summary: String,
    pub key_drivers: Vec<KeyDriver>,
    pub recommendations: Vec<Recommendation>,
    pub suggested_prompts: Vec<String>,
    pub metadata: ResponseMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_sorts_most_severe_first() {
        let mut impacts = vec![Impact::Low, Impact::High, Impact::Critical, Impact::Medium];
        impacts.sort();
        assert_eq!(
            impacts,
            vec![Impact::Critical, Impact::High, Impact::Medium, Impact::Low]
        );
    }
}
