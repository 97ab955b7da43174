//! Pulse Core: shared data model for the agent-publishing ops dashboard
//!
//! Entity records, branded identifiers, derived metrics, and the
//! context/response contract between the data layer and the insight engine.

pub mod ids;
pub mod entities;
pub mod metrics;
pub mod context;
pub mod response;
pub mod error;

pub use ids::{AgentId, FindingId, IncidentId, PublisherId, SubmissionId};
pub use entities::{
    Agent, AgentStatus, AgentType, DailySnapshot, DistributionMethod, FailureCategory,
    FindingSeverity, Incident, IncidentSeverity, IncidentStatus, Publisher, PublisherTier,
    Stage, StageDuration, Submission, SubmissionOutcome, ValidationFinding,
};
pub use metrics::ComputedMetrics;
pub use context::{DataContext, FilterState, Page, SelectedEntity};
pub use response::{AiResponse, Impact, KeyDriver, Recommendation, ResponseMetadata};
pub use error::PulseError;

/// Version reported by the API health endpoint.
pub const PULSE_VERSION: &str = "1.0.0";
