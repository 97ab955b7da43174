//! Pulse Insight: the deterministic copilot behind the ops dashboard.
//!
//! A prompt plus a `DataContext` goes in; a fully-populated `AiResponse`
//! comes out. Dispatch is a prioritized regex rule catalog, narrative text
//! is derived from computed metrics through a template library, and the
//! only nondeterminism is phrasing variety (swappable via
//! `TemplateSelector`).

pub mod handlers;
pub mod narrative;
pub mod prompts;
pub mod rules;
pub mod templates;

pub use narrative::{EntityHealth, NarrativeGenerator};
pub use prompts::PromptChip;
pub use rules::{RuleEngine, Scenario};
pub use templates::{FixedSelector, RandomSelector, TemplateSelector};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use pulse_core::{
        Agent, AgentStatus, AgentType, ComputedMetrics, DataContext, DistributionMethod, Page,
        SelectedEntity,
    };

    pub fn sample_agent() -> Agent {
        Agent {
            id: "agent-001".into(),
            name: "Contoso Sales Assistant".to_string(),
            agent_type: AgentType::Declarative,
            category: "Sales".to_string(),
            publisher_id: "pub-001".into(),
            distribution: DistributionMethod::Store,
            status: AgentStatus::ActionRequired,
            created_at: Utc::now(),
            last_published_at: None,
        }
    }

    pub fn agent_detail_context() -> DataContext {
        DataContext::new(Page::AgentDetail)
            .with_metrics(ComputedMetrics::default())
            .with_entity(SelectedEntity::Agent(sample_agent()))
    }
}
