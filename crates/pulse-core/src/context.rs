//! Request context handed to the insight engine.

use serde::{Deserialize, Serialize};

use crate::entities::{Agent, AgentStatus, DailySnapshot, Publisher};
use crate::ids::PublisherId;
use crate::metrics::ComputedMetrics;

/// Dashboard pages the engine can be asked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Overview,
    Funnel,
    Quality,
    Operations,
    Agents,
    AgentDetail,
    Publishers,
    PublisherDetail,
}

impl Page {
    pub fn key(&self) -> &'static str {
        match self {
            Page::Overview => "overview",
            Page::Funnel => "funnel",
            Page::Quality => "quality",
            Page::Operations => "operations",
            Page::Agents => "agents",
            Page::AgentDetail => "agent_detail",
            Page::Publishers => "publishers",
            Page::PublisherDetail => "publisher_detail",
        }
    }

    /// Parse a page key from the wire; unknown keys are rejected at the
    /// API boundary rather than silently mapped.
    pub fn parse(key: &str) -> Option<Page> {
        match key {
            "overview" => Some(Page::Overview),
            "funnel" => Some(Page::Funnel),
            "quality" => Some(Page::Quality),
            "operations" => Some(Page::Operations),
            "agents" => Some(Page::Agents),
            "agent_detail" => Some(Page::AgentDetail),
            "publishers" => Some(Page::Publishers),
            "publisher_detail" => Some(Page::PublisherDetail),
            _ => None,
        }
    }
}

/// Active dashboard filters carried into narrative variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterState {
    /// Trailing window in days.
    pub window_days: u32,
    pub publisher: Option<PublisherId>,
    pub status: Option<AgentStatus>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            window_days: 30,
            publisher: None,
            status: None,
        }
    }
}

/// Entity currently selected in the UI, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectedEntity {
    Agent(Agent),
    Publisher(Publisher),
}

impl SelectedEntity {
    pub fn name(&self) -> &str {
        match self {
            SelectedEntity::Agent(a) => &a.name,
            SelectedEntity::Publisher(p) => &p.name,
        }
    }
}

/// Everything the rule engine sees besides the prompt itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataContext {
    pub current_page: Page,
    #[serde(default)]
    pub filters: FilterState,
    pub metrics: Option<ComputedMetrics>,
    pub selected_entity: Option<SelectedEntity>,
    /// When the selected entity is a publisher: how many of its agents
    /// are suspended or blocked on required actions. Drives the
    /// three-tier portfolio assessment.
    #[serde(default)]
    pub at_risk_agents: usize,
    #[serde(default)]
    pub daily_trends: Vec<DailySnapshot>,
}

impl DataContext {
    pub fn new(page: Page) -> Self {
        Self {
            current_page: page,
            filters: FilterState::default(),
            metrics: None,
            selected_entity: None,
            at_risk_agents: 0,
            daily_trends: Vec::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: ComputedMetrics) -> Self {
        self.daily_trends = metrics.daily_trends.clone();
        self.metrics = Some(metrics);
        self
    }

    pub fn with_entity(mut self, entity: SelectedEntity) -> Self {
        self.selected_entity = Some(entity);
        self
    }

    pub fn with_at_risk_agents(mut self, count: usize) -> Self {
        self.at_risk_agents = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_parse_roundtrip() {
        for page in [
            Page::Overview,
            Page::Funnel,
            Page::Quality,
            Page::Operations,
            Page::Agents,
            Page::AgentDetail,
            Page::Publishers,
            Page::PublisherDetail,
        ] {
            assert_eq!(Page::parse(page.key()), Some(page));
        }
        assert_eq!(Page::parse("settings"), None);
    }
}
