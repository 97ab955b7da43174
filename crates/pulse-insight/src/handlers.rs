//! Per-scenario response assembly. Each handler renders a summary from
//! the template library and decides which drivers, recommendations, and
//! data sources accompany it.

use pulse_core::{
    ComputedMetrics, DataContext, KeyDriver, Recommendation, SelectedEntity, Stage,
};
use pulse_metrics::{determine_trend, Trend};

use crate::narrative::{format_number, NarrativeGenerator};
use crate::rules::Scenario;
use crate::templates::{self, interpolate, TemplateVars};

type HandlerOutput = (String, Vec<KeyDriver>, Vec<Recommendation>, Vec<String>);

fn sources(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Week-over-week direction word for a snapshot-derived series.
/// `higher_is_better` flips the vocabulary for latency-style metrics.
fn trend_word(
    context: &DataContext,
    extract: fn(&pulse_core::DailySnapshot) -> f64,
    threshold: f64,
    higher_is_better: bool,
) -> &'static str {
    let trends = &context.daily_trends;
    if trends.len() < 14 {
        return "steady";
    }
    let recent: f64 =
        trends[trends.len() - 7..].iter().map(extract).sum::<f64>() / 7.0;
    let prior: f64 = trends[trends.len() - 14..trends.len() - 7]
        .iter()
        .map(extract)
        .sum::<f64>()
        / 7.0;
    match (determine_trend(recent, prior, threshold), higher_is_better) {
        (Trend::Stable, _) => "steady",
        (Trend::Up, true) | (Trend::Down, false) => "improving",
        (Trend::Down, true) | (Trend::Up, false) => "worsening",
    }
}

pub fn handle(
    scenario: Scenario,
    narrative: &NarrativeGenerator,
    _prompt: &str,
    context: &DataContext,
) -> HandlerOutput {
    let metrics = context.metrics.clone().unwrap_or_default();
    match scenario {
        Scenario::WeeklyUpdate => weekly_update(narrative, &metrics, context),
        Scenario::SubmissionTriage => submission_triage(narrative, context),
        Scenario::PublisherCoaching => publisher_coaching(narrative, &metrics, context),
        Scenario::BottleneckExplainer => bottleneck(narrative, &metrics),
        Scenario::FailureAnalysis => failure_analysis(narrative, &metrics, context),
        Scenario::AtRiskAgents => at_risk_agents(narrative, &metrics, context),
        Scenario::SlaAnalysis => sla_analysis(narrative, &metrics, context),
        Scenario::QualityReadiness => quality_readiness(narrative, &metrics, context),
        Scenario::RaiAnalysis => rai_analysis(narrative, &metrics, context),
        Scenario::LatencyAnalysis => latency_analysis(narrative, &metrics, context),
        Scenario::BacklogAnalysis => backlog_analysis(narrative, &metrics, context),
        Scenario::GeneralSummary => general_summary(narrative, &metrics, context),
    }
}

fn weekly_update(
    narrative: &NarrativeGenerator,
    metrics: &ComputedMetrics,
    context: &DataContext,
) -> HandlerOutput {
    (
        narrative.weekly_update(metrics, &context.daily_trends, context),
        narrative.key_drivers(metrics, &context.daily_trends),
        narrative.recommendations(metrics, context),
        sources(&["submissions", "daily_snapshots", "incidents"]),
    )
}

fn submission_triage(narrative: &NarrativeGenerator, context: &DataContext) -> HandlerOutput {
    let assessment = match &context.selected_entity {
        Some(entity @ SelectedEntity::Agent(_)) => {
            let (_, text) = narrative.entity_assessment(entity, context.at_risk_agents);
            text
        }
        _ => "No agent is selected; open an agent to triage its latest submission.".to_string(),
    };
    let next_step = narrative.pick(templates::TRIAGE_NEXT_STEP);
    (
        format!("{} {}", assessment, next_step),
        Vec::new(),
        Vec::new(),
        sources(&["submissions", "validation_findings"]),
    )
}

fn publisher_coaching(
    narrative: &NarrativeGenerator,
    metrics: &ComputedMetrics,
    context: &DataContext,
) -> HandlerOutput {
    let summary = match &context.selected_entity {
        Some(SelectedEntity::Publisher(publisher)) => {
            let top_failure = metrics
                .top_failure_category()
                .map(|(category, _)| category.label())
                .unwrap_or("metadata completeness");
            let vars = TemplateVars::new()
                .set("name", &publisher.name)
                .set("tier", format!("{:?}", publisher.tier))
                .set("approval_rate", format_number(metrics.first_pass_approval_rate))
                .set("top_failure", top_failure);
            interpolate(narrative.pick(templates::COACHING), &vars)
        }
        _ => "No publisher is selected; open a publisher to get coaching guidance.".to_string(),
    };
    (
        summary,
        Vec::new(),
        narrative.recommendations(metrics, context),
        sources(&["publishers", "submissions", "validation_findings"]),
    )
}

fn bottleneck(narrative: &NarrativeGenerator, metrics: &ComputedMetrics) -> HandlerOutput {
    let summary = match metrics.bottleneck_stage() {
        Some((stage, count)) => {
            let days = metrics.avg_time_in_stage.get(&stage).copied().unwrap_or(0.0);
            let vars = TemplateVars::new()
                .set("stage_label", stage.label())
                .set("stage_count", count)
                .set("stage_days", format_number(days));
            interpolate(narrative.pick(templates::BOTTLENECK), &vars)
        }
        None => narrative.pick(templates::BOTTLENECK_NONE).to_string(),
    };
    (
        summary,
        Vec::new(),
        Vec::new(),
        sources(&["submissions", "stage_durations"]),
    )
}

fn failure_analysis(
    narrative: &NarrativeGenerator,
    metrics: &ComputedMetrics,
    context: &DataContext,
) -> HandlerOutput {
    (
        narrative.failure_analysis(&metrics.failure_categories),
        Vec::new(),
        narrative.recommendations(metrics, context),
        sources(&["daily_snapshots", "validation_findings"]),
    )
}

fn at_risk_agents(
    narrative: &NarrativeGenerator,
    metrics: &ComputedMetrics,
    context: &DataContext,
) -> HandlerOutput {
    let action_required = metrics
        .stage_distribution
        .get(&Stage::ActionRequired)
        .copied()
        .unwrap_or(0);
    let vars = TemplateVars::new()
        .set("action_required", action_required)
        .set("incidents", metrics.active_incidents);
    (
        interpolate(narrative.pick(templates::AT_RISK), &vars),
        narrative.key_drivers(metrics, &context.daily_trends),
        narrative.recommendations(metrics, context),
        sources(&["agents", "submissions", "incidents"]),
    )
}

fn sla_analysis(
    narrative: &NarrativeGenerator,
    metrics: &ComputedMetrics,
    context: &DataContext,
) -> HandlerOutput {
    let vars = TemplateVars::new()
        .set("sla_rate", format_number(metrics.sla_compliance_rate))
        .set("window", context.filters.window_days)
        .set("backlog", metrics.backlog_size)
        .set("oldest", format_number(metrics.oldest_in_queue_days));
    (
        interpolate(narrative.pick(templates::SLA), &vars),
        narrative.key_drivers(metrics, &context.daily_trends),
        narrative.recommendations(metrics, context),
        sources(&["submissions", "daily_snapshots"]),
    )
}

fn quality_readiness(
    narrative: &NarrativeGenerator,
    metrics: &ComputedMetrics,
    context: &DataContext,
) -> HandlerOutput {
    let top_failure = metrics
        .top_failure_category()
        .map(|(category, _)| category.label())
        .unwrap_or("(none)");
    let vars = TemplateVars::new()
        .set("approval_rate", format_number(metrics.first_pass_approval_rate))
        .set("rai_rate", format_number(metrics.rai_pass_rate))
        .set("top_failure", top_failure);
    (
        interpolate(narrative.pick(templates::QUALITY_READINESS), &vars),
        Vec::new(),
        narrative.recommendations(metrics, context),
        sources(&["submissions", "validation_findings", "daily_snapshots"]),
    )
}

fn rai_analysis(
    narrative: &NarrativeGenerator,
    metrics: &ComputedMetrics,
    context: &DataContext,
) -> HandlerOutput {
    let rai_count = metrics
        .failure_categories
        .get(&pulse_core::FailureCategory::RaiViolation)
        .copied()
        .unwrap_or(0);
    let vars = TemplateVars::new()
        .set("rai_rate", format_number(metrics.rai_pass_rate))
        .set("trend_word", trend_word(context, |s| s.rai_pass_rate, 0.5, true))
        .set("rai_count", rai_count);
    (
        interpolate(narrative.pick(templates::RAI), &vars),
        Vec::new(),
        narrative.recommendations(metrics, context),
        sources(&["daily_snapshots", "validation_findings"]),
    )
}

fn latency_analysis(
    narrative: &NarrativeGenerator,
    metrics: &ComputedMetrics,
    context: &DataContext,
) -> HandlerOutput {
    let vars = TemplateVars::new()
        .set("p50", format_number(metrics.latency_p50_ms))
        .set("p99", format_number(metrics.latency_p99_ms))
        .set(
            "trend_word",
            trend_word(context, |s| s.latency_p99_ms, 50.0, false),
        )
        .set("availability", format_number(metrics.availability_pct));
    (
        interpolate(narrative.pick(templates::LATENCY), &vars),
        Vec::new(),
        narrative.recommendations(metrics, context),
        sources(&["daily_snapshots"]),
    )
}

fn backlog_analysis(
    narrative: &NarrativeGenerator,
    metrics: &ComputedMetrics,
    context: &DataContext,
) -> HandlerOutput {
    let stage_label = metrics
        .stage_distribution
        .iter()
        .filter(|(stage, _)| stage.is_backlog())
        .max_by_key(|(_, count)| **count)
        .map(|(stage, _)| stage.label())
        .unwrap_or("(none)");
    let vars = TemplateVars::new()
        .set("backlog", metrics.backlog_size)
        .set("oldest", format_number(metrics.oldest_in_queue_days))
        .set("stage_label", stage_label);
    (
        interpolate(narrative.pick(templates::BACKLOG), &vars),
        narrative.key_drivers(metrics, &context.daily_trends),
        narrative.recommendations(metrics, context),
        sources(&["submissions"]),
    )
}

fn general_summary(
    narrative: &NarrativeGenerator,
    metrics: &ComputedMetrics,
    context: &DataContext,
) -> HandlerOutput {
    // Entity pages fold the selected entity's status into the summary.
    let summary = match &context.selected_entity {
        Some(entity) => {
            let (_, assessment) =
                narrative.entity_assessment(entity, context.at_risk_agents);
            format!("{} {}", narrative.page_summary(context), assessment)
        }
        None => narrative.page_summary(context),
    };
    (
        summary,
        narrative.key_drivers(metrics, &context.daily_trends),
        narrative.recommendations(metrics, context),
        sources(&["submissions", "daily_snapshots", "incidents"]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrative::NarrativeGenerator;
    use crate::templates::FixedSelector;
    use chrono::Utc;
    use pulse_core::{Page, Publisher, PublisherTier};
    use std::collections::BTreeMap;

    fn narrative() -> NarrativeGenerator {
        NarrativeGenerator::new(Box::new(FixedSelector(0)))
    }

    fn sample_publisher() -> Publisher {
        Publisher {
            id: "pub-001".into(),
            name: "Contoso Ltd".to_string(),
            tier: PublisherTier::Strategic,
            region: "EMEA".to_string(),
            support_plan: "premier".to_string(),
            contact_email: "ops@contoso.example".to_string(),
            created_at: Utc::now(),
        }
    }

    fn publisher_ctx(at_risk: usize) -> DataContext {
        DataContext::new(Page::PublisherDetail)
            .with_metrics(ComputedMetrics::default())
            .with_entity(SelectedEntity::Publisher(sample_publisher()))
            .with_at_risk_agents(at_risk)
    }

    #[test]
    fn test_bottleneck_summary_names_stage_and_count() {
        let mut metrics = ComputedMetrics::default();
        let mut dist = BTreeMap::new();
        dist.insert(Stage::HumanReview, 45u32);
        dist.insert(Stage::AutomatedChecks, 12u32);
        dist.insert(Stage::Published, 200u32);
        metrics.stage_distribution = dist;
        metrics.avg_time_in_stage.insert(Stage::HumanReview, 4.2);

        let (summary, _, _, _) = bottleneck(&narrative(), &metrics);
        assert!(summary.contains("Human Review"));
        assert!(summary.contains("45"));
    }

    #[test]
    fn test_bottleneck_without_stages_still_answers() {
        let (summary, _, _, _) = bottleneck(&narrative(), &ComputedMetrics::default());
        assert!(!summary.is_empty());
    }

    #[test]
    fn test_triage_without_entity_degrades_gracefully() {
        let ctx = DataContext::new(Page::AgentDetail);
        let (summary, _, _, _) = submission_triage(&narrative(), &ctx);
        assert!(summary.contains("No agent is selected"));
    }

    #[test]
    fn test_rai_summary_counts_violations() {
        let mut metrics = ComputedMetrics::default();
        metrics.rai_pass_rate = 96.5;
        metrics
            .failure_categories
            .insert(pulse_core::FailureCategory::RaiViolation, 7);
        let ctx = DataContext::new(Page::Quality).with_metrics(metrics.clone());
        let (summary, _, _, _) = rai_analysis(&narrative(), &metrics, &ctx);
        assert!(summary.contains("96.5"));
        assert!(summary.contains('7'));
    }

    #[test]
    fn test_publisher_with_blocked_agents_not_reported_healthy() {
        let ctx = publisher_ctx(1);
        let metrics = ctx.metrics.clone().unwrap();
        let (summary, _, _, _) = general_summary(&narrative(), &metrics, &ctx);
        assert!(!summary.contains("looks healthy"), "got: {}", summary);
        assert!(summary.contains("at risk"), "got: {}", summary);
        assert!(summary.contains("1 agent(s) need attention"), "got: {}", summary);
    }

    #[test]
    fn test_publisher_with_many_blocked_agents_is_critical() {
        let ctx = publisher_ctx(3);
        let metrics = ctx.metrics.clone().unwrap();
        let (summary, _, _, _) = general_summary(&narrative(), &metrics, &ctx);
        assert!(summary.contains("needs immediate attention"), "got: {}", summary);
        assert!(summary.contains("3 of its agents"), "got: {}", summary);
    }

    #[test]
    fn test_publisher_with_clear_portfolio_is_healthy() {
        let ctx = publisher_ctx(0);
        let metrics = ctx.metrics.clone().unwrap();
        let (summary, _, _, _) = general_summary(&narrative(), &metrics, &ctx);
        assert!(summary.contains("looks healthy"), "got: {}", summary);
    }

    #[test]
    fn test_every_scenario_produces_nonempty_summary() {
        let ctx = DataContext::new(Page::Overview).with_metrics(ComputedMetrics::default());
        let scenarios = [
            Scenario::WeeklyUpdate,
            Scenario::SubmissionTriage,
            Scenario::PublisherCoaching,
            Scenario::BottleneckExplainer,
            Scenario::FailureAnalysis,
            Scenario::AtRiskAgents,
            Scenario::SlaAnalysis,
            Scenario::QualityReadiness,
            Scenario::RaiAnalysis,
            Scenario::LatencyAnalysis,
            Scenario::BacklogAnalysis,
            Scenario::GeneralSummary,
        ];
        for scenario in scenarios {
            let (summary, _, _, srcs) = handle(scenario, &narrative(), "", &ctx);
            assert!(!summary.is_empty(), "empty summary for {:?}", scenario);
            assert!(!srcs.is_empty(), "no sources for {:?}", scenario);
        }
    }
}
