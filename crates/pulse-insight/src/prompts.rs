//! Prompt chips: pre-authored questions filtered by page context, plus
//! per-scenario follow-up suggestions.

use lazy_static::lazy_static;
use pulse_core::{DataContext, Page};

/// One pre-authored suggested question.
#[derive(Debug, Clone)]
pub struct PromptChip {
    pub id: &'static str,
    pub text: &'static str,
    /// Cosmetic icon; the UI renders it next to the chip.
    pub icon: &'static str,
    pub relevant_pages: &'static [Page],
    /// Only surfaced when an agent/publisher is selected.
    pub requires_entity: bool,
    pub priority: i32,
}

const ALL_PAGES: &[Page] = &[
    Page::Overview,
    Page::Funnel,
    Page::Quality,
    Page::Operations,
    Page::Agents,
    Page::AgentDetail,
    Page::Publishers,
    Page::PublisherDetail,
];

lazy_static! {
    /// Static chip catalog, ordered by declaration. Ranking is a stable
    /// sort on priority, so equal priorities keep this order.
    pub static ref CATALOG: Vec<PromptChip> = vec![
        PromptChip { id: "weekly_update", text: "Draft my weekly update", icon: "📝", relevant_pages: &[Page::Overview], requires_entity: false, priority: 100 },
        PromptChip { id: "pipeline_health", text: "How is the pipeline doing?", icon: "📊", relevant_pages: ALL_PAGES, requires_entity: false, priority: 90 },
        PromptChip { id: "bottleneck", text: "What is the bottleneck?", icon: "🚧", relevant_pages: &[Page::Overview, Page::Funnel], requires_entity: false, priority: 85 },
        PromptChip { id: "top_failures", text: "What are the top failure reasons?", icon: "❌", relevant_pages: &[Page::Overview, Page::Quality], requires_entity: false, priority: 80 },
        PromptChip { id: "sla_risk", text: "Which submissions risk breaching SLA?", icon: "⏰", relevant_pages: &[Page::Overview, Page::Funnel, Page::Operations], requires_entity: false, priority: 78 },
        PromptChip { id: "at_risk_agents", text: "Which agents need attention?", icon: "⚠️", relevant_pages: &[Page::Overview, Page::Agents], requires_entity: false, priority: 75 },
        PromptChip { id: "rai_trend", text: "How is our RAI pass rate trending?", icon: "🛡️", relevant_pages: &[Page::Overview, Page::Quality], requires_entity: false, priority: 72 },
        PromptChip { id: "backlog_size", text: "How big is the review backlog?", icon: "📥", relevant_pages: &[Page::Funnel, Page::Operations], requires_entity: false, priority: 70 },
        PromptChip { id: "latency_check", text: "Is runtime latency within budget?", icon: "⚡", relevant_pages: &[Page::Operations], requires_entity: false, priority: 68 },
        PromptChip { id: "quality_readiness", text: "Are we ready to publish this wave?", icon: "✅", relevant_pages: &[Page::Quality], requires_entity: false, priority: 65 },
        PromptChip { id: "approval_trend", text: "Is first-pass approval improving?", icon: "📈", relevant_pages: &[Page::Overview, Page::Quality], requires_entity: false, priority: 62 },
        PromptChip { id: "incident_load", text: "What incidents are open right now?", icon: "🔥", relevant_pages: &[Page::Operations], requires_entity: false, priority: 60 },
        PromptChip { id: "funnel_drop", text: "Where do submissions drop out of the funnel?", icon: "🫗", relevant_pages: &[Page::Funnel], requires_entity: false, priority: 58 },
        PromptChip { id: "oldest_queue", text: "What is the oldest item waiting on review?", icon: "🐢", relevant_pages: &[Page::Funnel], requires_entity: false, priority: 55 },
        PromptChip { id: "rejection_reasons", text: "Why are submissions being rejected?", icon: "🚫", relevant_pages: &[Page::Quality], requires_entity: false, priority: 54 },
        PromptChip { id: "availability", text: "How is availability holding up?", icon: "🌐", relevant_pages: &[Page::Operations], requires_entity: false, priority: 52 },
        PromptChip { id: "publisher_overview", text: "Summarize our publisher inventory", icon: "🏢", relevant_pages: &[Page::Publishers], requires_entity: false, priority: 50 },
        PromptChip { id: "agent_overview", text: "Summarize the agent portfolio", icon: "🤖", relevant_pages: &[Page::Agents], requires_entity: false, priority: 50 },
        PromptChip { id: "triage_submission", text: "Triage this agent's submission", icon: "🩺", relevant_pages: &[Page::AgentDetail], requires_entity: true, priority: 100 },
        PromptChip { id: "agent_history", text: "What changed since this agent last published?", icon: "🕰️", relevant_pages: &[Page::AgentDetail], requires_entity: true, priority: 80 },
        PromptChip { id: "agent_findings", text: "Explain this agent's validation findings", icon: "🔍", relevant_pages: &[Page::AgentDetail], requires_entity: true, priority: 75 },
        PromptChip { id: "coach_publisher", text: "How can this publisher improve?", icon: "🎯", relevant_pages: &[Page::PublisherDetail, Page::Publishers], requires_entity: true, priority: 100 },
        PromptChip { id: "publisher_risk", text: "Is this publisher's portfolio at risk?", icon: "📉", relevant_pages: &[Page::PublisherDetail], requires_entity: true, priority: 80 },
        PromptChip { id: "publisher_velocity", text: "How fast does this publisher ship?", icon: "🚀", relevant_pages: &[Page::PublisherDetail], requires_entity: true, priority: 70 },
        PromptChip { id: "summarize_page", text: "Summarize what I'm looking at", icon: "🗒️", relevant_pages: ALL_PAGES, requires_entity: false, priority: 40 },
    ];
}

/// Filter the catalog by page and entity presence, stable-sort by
/// priority descending, and return the top `limit` (default 5).
pub fn rank(context: &DataContext, limit: Option<usize>) -> Vec<&'static PromptChip> {
    let limit = limit.unwrap_or(5);
    let has_entity = context.selected_entity.is_some();

    let mut chips: Vec<&PromptChip> = CATALOG
        .iter()
        .filter(|chip| chip.relevant_pages.contains(&context.current_page))
        .filter(|chip| !chip.requires_entity || has_entity)
        .collect();
    chips.sort_by_key(|chip| std::cmp::Reverse(chip.priority));
    chips.truncate(limit);
    chips
}

/// Up to three follow-up questions for the scenario that just answered.
/// Unrecognized scenario keys fall back to page-generic suggestions.
pub fn follow_ups(scenario_key: &str, page: Page) -> Vec<String> {
    let literals: &[&str] = match scenario_key {
        "weekly_update" => &[
            "What changed most since last week?",
            "Which driver should I act on first?",
            "Draft a shorter version for leadership",
        ],
        "bottleneck_explainer" => &[
            "How long has this stage been backed up?",
            "Which agents are stuck there?",
            "What would clearing the backlog take?",
        ],
        "failure_analysis" => &[
            "Show the trend for the top category",
            "Which publishers hit this failure most?",
            "How do we prevent these findings?",
        ],
        "at_risk_agents" => &[
            "What is blocking each one?",
            "Which has the oldest open submission?",
            "Draft outreach to the owners",
        ],
        "sla_analysis" => &[
            "Which submissions breach next?",
            "What is our average breach overshoot?",
            "How does this compare to last month?",
        ],
        "quality_readiness" => &[
            "What is holding back first-pass approval?",
            "Which checks fail most often?",
        ],
        "rai_analysis" => &[
            "Which agents drive the RAI failures?",
            "When did the pass rate start dropping?",
            "What does remediation involve?",
        ],
        "submission_triage" => &[
            "What should be fixed first?",
            "Has this agent failed this check before?",
            "Estimate time to approval",
        ],
        "publisher_coaching" => &[
            "Compare them to similar publishers",
            "What is their rejection history?",
            "Draft coaching notes for our next sync",
        ],
        "latency_analysis" => &[
            "Which agents are slowest?",
            "Is latency tied to a specific region?",
        ],
        "backlog_analysis" => &[
            "What is the oldest queued item?",
            "How fast is the queue growing?",
        ],
        _ => return page_generics(page),
    };
    literals.iter().take(3).map(|s| s.to_string()).collect()
}

fn page_generics(page: Page) -> Vec<String> {
    let literals: &[&str] = match page {
        Page::Funnel => &["What is the bottleneck?", "How big is the review backlog?"],
        Page::Quality => &["What are the top failure reasons?", "How is our RAI pass rate trending?"],
        Page::Operations => &["What incidents are open right now?", "Is runtime latency within budget?"],
        _ => &["How is the pipeline doing?", "What needs my attention today?"],
    };
    literals.iter().map(|s| s.to_string()).collect()
}
