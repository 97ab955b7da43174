//! Entity records for the publishing pipeline.
//!
//! All records are generated once at startup and never mutated; "updates"
//! in the dashboard are derived views over this read-only set.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, FindingId, IncidentId, PublisherId, SubmissionId};

// ============================================================================
// Publisher
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publisher {
    pub id: PublisherId,
    pub name: String,
    pub tier: PublisherTier,
    pub region: String,
    pub support_plan: String,
    pub contact_email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublisherTier {
    Strategic,
    Standard,
    Emerging,
}

// ============================================================================
// Agent
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub agent_type: AgentType,
    pub category: String,
    pub publisher_id: PublisherId,
    pub distribution: DistributionMethod,
    pub status: AgentStatus,
    pub created_at: DateTime<Utc>,
    pub last_published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Declarative,
    CustomEngine,
    MessageExtension,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionMethod {
    Store,
    Organization,
    Sideload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Active,
    PendingReview,
    ActionRequired,
    Suspended,
    Draft,
}

impl AgentStatus {
    /// Statuses that count against a publisher's health assessment.
    pub fn is_at_risk(&self) -> bool {
        matches!(self, Self::ActionRequired | Self::Suspended)
    }
}

// ============================================================================
// Submission pipeline
// ============================================================================

/// One discrete pipeline state a submission occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Draft,
    Submitted,
    AutomatedChecks,
    HumanReview,
    ActionRequired,
    Approved,
    Published,
    Rejected,
}

impl Stage {
    /// Canonical pipeline ordering (terminal states last).
    pub const ALL: [Stage; 8] = [
        Stage::Draft,
        Stage::Submitted,
        Stage::AutomatedChecks,
        Stage::HumanReview,
        Stage::ActionRequired,
        Stage::Approved,
        Stage::Published,
        Stage::Rejected,
    ];

    /// Display label for narrative text and charts.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Draft => "Draft",
            Stage::Submitted => "Submitted",
            Stage::AutomatedChecks => "Automated Checks",
            Stage::HumanReview => "Human Review",
            Stage::ActionRequired => "Action Required",
            Stage::Approved => "Approved",
            Stage::Published => "Published",
            Stage::Rejected => "Rejected",
        }
    }

    /// Stable key matching the wire format ("human_review" etc.).
    pub fn key(&self) -> &'static str {
        match self {
            Stage::Draft => "draft",
            Stage::Submitted => "submitted",
            Stage::AutomatedChecks => "automated_checks",
            Stage::HumanReview => "human_review",
            Stage::ActionRequired => "action_required",
            Stage::Approved => "approved",
            Stage::Published => "published",
            Stage::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Approved | Stage::Published | Stage::Rejected)
    }

    /// Backlog = work waiting on people.
    pub fn is_backlog(&self) -> bool {
        matches!(self, Stage::HumanReview | Stage::ActionRequired)
    }
}

/// Time spent in a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDuration {
    pub stage: Stage,
    pub entered_at: DateTime<Utc>,
    pub exited_at: Option<DateTime<Utc>>,
    /// Days spent in the stage; populated once the stage is exited.
    pub duration_days: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub agent_id: AgentId,
    pub publisher_id: PublisherId,
    pub version: String,
    pub stage: Stage,
    /// One entry per stage visited, in entry order. Stage-monotonic: no
    /// stage appears twice, and the last entry's stage equals `self.stage`.
    pub stage_durations: Vec<StageDuration>,
    pub findings: Vec<ValidationFinding>,
    pub sla_target_days: u32,
    /// True only while in-flight past the SLA target.
    pub sla_breached: bool,
    pub resubmission_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub outcome: Option<SubmissionOutcome>,
}

impl Submission {
    pub fn is_completed(&self) -> bool {
        self.outcome.is_some()
    }

    /// Total elapsed days from creation to the last stage transition.
    pub fn elapsed_days(&self) -> f64 {
        let end = self
            .stage_durations
            .last()
            .and_then(|d| d.exited_at)
            .unwrap_or(self.updated_at);
        (end - self.created_at).num_seconds() as f64 / 86_400.0
    }
}

// ============================================================================
// Validation findings
// ============================================================================

/// Canonical failure categories for validation findings. Exactly nine;
/// every daily snapshot carries a count for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    ManifestMismatch,
    RaiViolation,
    AuthFailure,
    PerformanceRegression,
    MetadataIncomplete,
    SecurityVulnerability,
    PolicyViolation,
    BrokenFunctionality,
    AccessibilityIssue,
}

impl FailureCategory {
    pub const ALL: [FailureCategory; 9] = [
        FailureCategory::ManifestMismatch,
        FailureCategory::RaiViolation,
        FailureCategory::AuthFailure,
        FailureCategory::PerformanceRegression,
        FailureCategory::MetadataIncomplete,
        FailureCategory::SecurityVulnerability,
        FailureCategory::PolicyViolation,
        FailureCategory::BrokenFunctionality,
        FailureCategory::AccessibilityIssue,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FailureCategory::ManifestMismatch => "Manifest Mismatch",
            FailureCategory::RaiViolation => "RAI Violation",
            FailureCategory::AuthFailure => "Auth Failure",
            FailureCategory::PerformanceRegression => "Performance Regression",
            FailureCategory::MetadataIncomplete => "Metadata Incomplete",
            FailureCategory::SecurityVulnerability => "Security Vulnerability",
            FailureCategory::PolicyViolation => "Policy Violation",
            FailureCategory::BrokenFunctionality => "Broken Functionality",
            FailureCategory::AccessibilityIssue => "Accessibility Issue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSeverity {
    MustFix,
    ShouldFix,
    GoodToFix,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub id: FindingId,
    pub rule_id: String,
    pub category: FailureCategory,
    pub severity: FindingSeverity,
    pub message: String,
    pub remediation: String,
    pub rai_flag: bool,
}

// ============================================================================
// Incidents
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentSeverity {
    Sev0,
    Sev1,
    Sev2,
    Sev3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Open,
    Investigating,
    Resolved,
    Closed,
}

impl IncidentStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Open | Self::Investigating)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub id: IncidentId,
    pub agent_id: AgentId,
    pub severity: IncidentSeverity,
    pub title: String,
    pub cause_category: String,
    pub opened_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub status: IncidentStatus,
}

// ============================================================================
// Daily snapshots
// ============================================================================

/// One aggregated row per calendar day, precomputed so charts and the
/// trend analysis never rescan the submission set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    pub submissions: u32,
    pub approvals: u32,
    pub rejections: u32,
    pub backlog_by_stage: BTreeMap<Stage, u32>,
    pub avg_time_to_approve_days: f64,
    pub sla_breaches: u32,
    pub latency_p50_ms: f64,
    pub latency_p75_ms: f64,
    pub latency_p99_ms: f64,
    pub availability_pct: f64,
    pub rai_pass_rate: f64,
    pub incident_count: u32,
    /// Always carries all nine canonical categories, zero or not.
    pub failure_categories: BTreeMap<FailureCategory, u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_keys_are_snake_case() {
        for stage in Stage::ALL {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage.key()));
        }
    }

    #[test]
    fn test_terminal_and_backlog_partition() {
        assert!(Stage::Published.is_terminal());
        assert!(Stage::Rejected.is_terminal());
        assert!(Stage::HumanReview.is_backlog());
        assert!(Stage::ActionRequired.is_backlog());
        assert!(!Stage::HumanReview.is_terminal());
        assert!(!Stage::Published.is_backlog());
    }

    #[test]
    fn test_failure_category_count() {
        assert_eq!(FailureCategory::ALL.len(), 9);
    }
}
