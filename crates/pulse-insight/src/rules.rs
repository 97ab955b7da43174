//! Rule engine: prioritized pattern rules dispatching to scenario handlers.
//!
//! Rules are evaluated in stable priority order; within a rule the
//! patterns are OR'd; the first rule whose pattern and context predicate
//! both pass wins. No scoring or combination beyond ordinal priority.

use std::time::Instant;

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};

use pulse_core::{AiResponse, DataContext, Page, ResponseMetadata, SelectedEntity};

use crate::handlers;
use crate::narrative::NarrativeGenerator;
use crate::prompts;
use crate::templates::TemplateSelector;

/// Category label attached to a matched rule and its response; drives
/// follow-up selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    WeeklyUpdate,
    SubmissionTriage,
    PublisherCoaching,
    BottleneckExplainer,
    FailureAnalysis,
    AtRiskAgents,
    SlaAnalysis,
    QualityReadiness,
    RaiAnalysis,
    LatencyAnalysis,
    BacklogAnalysis,
    GeneralSummary,
}

impl Scenario {
    pub fn key(&self) -> &'static str {
        match self {
            Scenario::WeeklyUpdate => "weekly_update",
            Scenario::SubmissionTriage => "submission_triage",
            Scenario::PublisherCoaching => "publisher_coaching",
            Scenario::BottleneckExplainer => "bottleneck_explainer",
            Scenario::FailureAnalysis => "failure_analysis",
            Scenario::AtRiskAgents => "at_risk_agents",
            Scenario::SlaAnalysis => "sla_analysis",
            Scenario::QualityReadiness => "quality_readiness",
            Scenario::RaiAnalysis => "rai_analysis",
            Scenario::LatencyAnalysis => "latency_analysis",
            Scenario::BacklogAnalysis => "backlog_analysis",
            Scenario::GeneralSummary => "general_summary",
        }
    }
}

/// One pattern rule. Patterns are case-insensitive and OR'd.
pub struct Rule {
    pub id: &'static str,
    pub name: &'static str,
    pub patterns: Vec<Regex>,
    pub context_match: Option<fn(&DataContext) -> bool>,
    pub priority: i32,
    pub scenario: Scenario,
}

impl Rule {
    fn matches_prompt(&self, prompt: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(prompt))
    }

    fn matches_context(&self, context: &DataContext) -> bool {
        self.context_match.map_or(true, |predicate| predicate(context))
    }
}

fn patterns(raw: &[&str]) -> Vec<Regex> {
    raw.iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).expect("rule pattern compiles"))
        .collect()
}

fn on_agent_detail(ctx: &DataContext) -> bool {
    ctx.current_page == Page::AgentDetail
        && matches!(ctx.selected_entity, Some(SelectedEntity::Agent(_)))
}

fn on_publisher_context(ctx: &DataContext) -> bool {
    ctx.current_page == Page::PublisherDetail
        || (ctx.current_page == Page::Publishers
            && matches!(ctx.selected_entity, Some(SelectedEntity::Publisher(_))))
}

/// The rule catalog, in declaration order. Equal priorities are broken by
/// this order (the engine's sort is stable).
fn catalog() -> Vec<Rule> {
    vec![
        Rule {
            id: "weekly_update",
            name: "Weekly update generation",
            patterns: patterns(&[
                "weekly update",
                "week in review",
                "weekly report",
                "status report",
                "weekly summary",
            ]),
            context_match: None,
            priority: 100,
            scenario: Scenario::WeeklyUpdate,
        },
        Rule {
            id: "triage",
            name: "Submission triage",
            patterns: patterns(&[
                "triage",
                "what should i fix",
                "review this submission",
                "why.*(stuck|blocked)",
                "next step",
            ]),
            context_match: Some(on_agent_detail),
            priority: 100,
            scenario: Scenario::SubmissionTriage,
        },
        Rule {
            id: "coaching",
            name: "Publisher coaching",
            patterns: patterns(&[
                "coach",
                "how can this publisher improve",
                "improve.*(submission|quality)",
                "guidance",
                "advice",
            ]),
            context_match: Some(on_publisher_context),
            priority: 100,
            scenario: Scenario::PublisherCoaching,
        },
        Rule {
            id: "bottleneck",
            name: "Bottleneck analysis",
            patterns: patterns(&[
                "bottleneck",
                "slowest",
                "where.*(stuck|slow)",
                "taking so long",
                "longest stage",
            ]),
            context_match: None,
            priority: 90,
            scenario: Scenario::BottleneckExplainer,
        },
        Rule {
            id: "failure_analysis",
            name: "Failure analysis",
            patterns: patterns(&[
                "fail(ure|ing)?",
                "rejection reason",
                "why.*reject",
                "top.*(error|finding)",
            ]),
            context_match: None,
            priority: 85,
            scenario: Scenario::FailureAnalysis,
        },
        Rule {
            id: "at_risk_agents",
            name: "At-risk agent analysis",
            patterns: patterns(&[
                "at.risk",
                "which agents.*(attention|risk|struggling)",
                "agents need attention",
                "struggling",
                "incident",
            ]),
            context_match: None,
            priority: 80,
            scenario: Scenario::AtRiskAgents,
        },
        Rule {
            id: "sla_analysis",
            name: "SLA analysis",
            patterns: patterns(&[
                "\\bsla\\b",
                "service level",
                "breach",
                "overdue",
                "on time",
            ]),
            context_match: None,
            priority: 80,
            scenario: Scenario::SlaAnalysis,
        },
        Rule {
            id: "quality_readiness",
            name: "Quality and readiness analysis",
            patterns: patterns(&[
                "quality",
                "readiness",
                "ready to publish",
                "pass rate",
                "first.pass",
            ]),
            context_match: None,
            priority: 75,
            scenario: Scenario::QualityReadiness,
        },
        Rule {
            id: "rai_analysis",
            name: "RAI analysis",
            patterns: patterns(&[
                "\\brai\\b",
                "responsible ai",
                "safety",
                "violation",
            ]),
            context_match: None,
            priority: 75,
            scenario: Scenario::RaiAnalysis,
        },
        Rule {
            id: "latency_analysis",
            name: "Latency analysis",
            patterns: patterns(&[
                "latency",
                "p99",
                "response time",
                "slow response",
                "performance",
                "availability",
            ]),
            context_match: None,
            priority: 70,
            scenario: Scenario::LatencyAnalysis,
        },
        Rule {
            id: "backlog_analysis",
            name: "Backlog analysis",
            patterns: patterns(&[
                "backlog",
                "queue",
                "waiting",
                "pending review",
            ]),
            context_match: None,
            priority: 70,
            scenario: Scenario::BacklogAnalysis,
        },
        Rule {
            id: "summarize",
            name: "General summary",
            patterns: patterns(&[
                "summar",
                "overview",
                "what.*(happening|going on)",
                "how are we doing",
                "how is the pipeline",
                "tell me about",
            ]),
            context_match: None,
            priority: 10,
            scenario: Scenario::GeneralSummary,
        },
    ]
}

const MATCH_CONFIDENCE: f64 = 0.85;
const FALLBACK_CONFIDENCE: f64 = 0.55;

pub struct RuleEngine {
    rules: Vec<Rule>,
    narrative: NarrativeGenerator,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::with_selector(Box::new(crate::templates::RandomSelector))
    }

    /// Build the engine with an explicit template-selection strategy
    /// (tests pin a `FixedSelector` for golden output).
    pub fn with_selector(selector: Box<dyn TemplateSelector>) -> Self {
        let mut rules = catalog();
        // Stable sort: declaration order breaks priority ties.
        rules.sort_by_key(|r| std::cmp::Reverse(r.priority));
        Self {
            rules,
            narrative: NarrativeGenerator::new(selector),
        }
    }

    /// Match the prompt against the rule catalog and render a response.
    /// Total: every prompt yields a response; unmatched prompts fall back
    /// to the general summary scenario.
    pub fn process(&self, prompt: &str, context: &DataContext) -> AiResponse {
        let started = Instant::now();

        let matched = self
            .rules
            .iter()
            .find(|rule| rule.matches_prompt(prompt) && rule.matches_context(context));

        let (scenario, confidence, rule_id) = match matched {
            Some(rule) => (rule.scenario, MATCH_CONFIDENCE, rule.id),
            None => (Scenario::GeneralSummary, FALLBACK_CONFIDENCE, "fallback"),
        };
        tracing::debug!(rule = rule_id, scenario = scenario.key(), "prompt matched");

        let (summary, key_drivers, recommendations, sources) =
            handlers::handle(scenario, &self.narrative, prompt, context);

        AiResponse {
            summary,
            key_drivers,
            recommendations,
            suggested_prompts: prompts::follow_ups(scenario.key(), context.current_page),
            metadata: ResponseMetadata {
                trace_id: uuid::Uuid::new_v4(),
                confidence,
                sources,
                generated_at: Utc::now(),
                scenario: scenario.key().to_string(),
                processing_time_ms: started.elapsed().as_millis() as u64,
            },
        }
    }

    /// Catalog view, sorted as evaluated. Exposed for diagnostics.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::FixedSelector;
    use pulse_core::ComputedMetrics;

    fn engine() -> RuleEngine {
        RuleEngine::with_selector(Box::new(FixedSelector(0)))
    }

    fn ctx(page: Page) -> DataContext {
        DataContext::new(page).with_metrics(ComputedMetrics::default())
    }

    #[test]
    fn test_every_rule_id_unique() {
        let engine = engine();
        let mut ids: Vec<_> = engine.rules().iter().map(|r| r.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn test_prompt_routes_to_expected_scenario() {
        let engine = engine();
        let cases = [
            ("Draft my weekly update", "weekly_update"),
            ("What is the bottleneck?", "bottleneck_explainer"),
            ("Why are submissions failing?", "failure_analysis"),
            ("Which agents need attention?", "at_risk_agents"),
            ("Are we meeting our SLA?", "sla_analysis"),
            ("Are we ready to publish this wave?", "quality_readiness"),
            ("How is our RAI pass rate trending?", "rai_analysis"),
            ("Is p99 latency within budget?", "latency_analysis"),
            ("How big is the review backlog?", "backlog_analysis"),
            ("Give me an overview", "general_summary"),
        ];
        for (prompt, expected) in cases {
            let response = engine.process(prompt, &ctx(Page::Overview));
            assert_eq!(
                response.metadata.scenario, expected,
                "wrong scenario for prompt: {}",
                prompt
            );
        }
    }

    #[test]
    fn test_operations_chips_route_to_real_rules() {
        let engine = engine();
        let ops = ctx(Page::Operations);

        let response = engine.process("What incidents are open right now?", &ops);
        assert_eq!(response.metadata.scenario, "at_risk_agents");

        let response = engine.process("How is availability holding up?", &ops);
        assert_eq!(response.metadata.scenario, "latency_analysis");
    }

    #[test]
    fn test_unmatched_prompt_falls_back() {
        let response = engine().process("xyzzy plugh", &ctx(Page::Overview));
        assert_eq!(response.metadata.scenario, "general_summary");
        assert!(!response.summary.is_empty());
    }

    #[test]
    fn test_triage_requires_agent_detail_context() {
        let engine = engine();

        // Same prompt, wrong page: the context predicate rejects triage.
        let response = engine.process("Triage this submission", &ctx(Page::Overview));
        assert_ne!(response.metadata.scenario, "submission_triage");

        let detail_ctx = crate::test_support::agent_detail_context();
        let response = engine.process("Triage this submission", &detail_ctx);
        assert_eq!(response.metadata.scenario, "submission_triage");
    }

    #[test]
    fn test_equal_priority_tie_broken_by_declaration_order() {
        // Matches both weekly_update (priority 100, declared first) and
        // triage (priority 100) in a context where both are eligible.
        let detail_ctx = crate::test_support::agent_detail_context();
        let response = engine().process("Weekly update on triage next steps", &detail_ctx);
        assert_eq!(response.metadata.scenario, "weekly_update");
    }

    #[test]
    fn test_process_is_total_over_prompt_grid() {
        let engine = engine();
        let prompts = ["", "?", "a", "SLA!!!", "何がボトルネックですか", "fail fail fail"];
        let pages = [Page::Overview, Page::Funnel, Page::Quality, Page::Operations];
        for prompt in prompts {
            for page in pages {
                let response = engine.process(prompt, &ctx(page));
                assert!(
                    !response.summary.is_empty(),
                    "empty summary for {:?} on {:?}",
                    prompt,
                    page
                );
            }
        }
    }

    #[test]
    fn test_processing_time_recorded() {
        let response = engine().process("overview please", &ctx(Page::Overview));
        // Wall-clock duration; just has to be present and sane.
        assert!(response.metadata.processing_time_ms < 5_000);
    }
}
