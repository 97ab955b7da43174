//! Narrative generation: data-to-text derivations shared by the scenario
//! handlers.
//!
//! Classification thresholds here are deterministic; only the phrasing
//! drawn from the template groups varies (behind `TemplateSelector`).

use std::collections::BTreeMap;

use pulse_core::{
    AgentStatus, ComputedMetrics, DailySnapshot, DataContext, FailureCategory, Impact,
    KeyDriver, Page, Recommendation, SelectedEntity,
};
use pulse_metrics::calculate_trend_percent;
use serde::{Deserialize, Serialize};

use crate::templates::{self, interpolate, TemplateSelector, TemplateVars};

/// Three-tier entity status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityHealth {
    Healthy,
    AtRisk,
    Critical,
}

/// Classification bucket for a metric's movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricChangeClass {
    Stable,
    PositiveModerate,
    PositiveStrong,
    NegativeModerate,
    NegativeStrong,
}

pub struct NarrativeGenerator {
    selector: Box<dyn TemplateSelector>,
}

impl Default for NarrativeGenerator {
    fn default() -> Self {
        Self::new(Box::new(templates::RandomSelector))
    }
}

impl NarrativeGenerator {
    pub fn new(selector: Box<dyn TemplateSelector>) -> Self {
        Self { selector }
    }

    pub(crate) fn pick(&self, group: &[&'static str]) -> &'static str {
        self.selector.select(group)
    }

    // ========================================================================
    // Metric change
    // ========================================================================

    /// Classify a metric's movement into one of five buckets.
    pub fn classify_change(current: f64, previous: f64) -> MetricChangeClass {
        if previous == 0.0 {
            return MetricChangeClass::Stable;
        }
        let pct = (current - previous) / previous * 100.0;
        if pct.abs() < 5.0 {
            MetricChangeClass::Stable
        } else if pct > 0.0 {
            if pct >= 15.0 {
                MetricChangeClass::PositiveStrong
            } else {
                MetricChangeClass::PositiveModerate
            }
        } else if pct <= -15.0 {
            MetricChangeClass::NegativeStrong
        } else {
            MetricChangeClass::NegativeModerate
        }
    }

    /// One sentence describing a metric's movement over a period.
    pub fn metric_change(
        &self,
        metric: &str,
        current: f64,
        previous: f64,
        unit: &str,
        period: &str,
    ) -> String {
        let group = match Self::classify_change(current, previous) {
            MetricChangeClass::Stable => templates::METRIC_STABLE,
            MetricChangeClass::PositiveModerate => templates::METRIC_POSITIVE_MODERATE,
            MetricChangeClass::PositiveStrong => templates::METRIC_POSITIVE_STRONG,
            MetricChangeClass::NegativeModerate => templates::METRIC_NEGATIVE_MODERATE,
            MetricChangeClass::NegativeStrong => templates::METRIC_NEGATIVE_STRONG,
        };
        let vars = TemplateVars::new()
            .set("metric", metric)
            .set("current", format_number(current))
            .set("previous", format_number(previous))
            .set("change", format_number(calculate_trend_percent(current, previous)))
            .set("unit", unit)
            .set("period", period);
        interpolate(self.pick(group), &vars)
    }

    // ========================================================================
    // Key drivers
    // ========================================================================

    /// Threshold battery over the computed metrics, most severe first.
    pub fn key_drivers(
        &self,
        metrics: &ComputedMetrics,
        trends: &[DailySnapshot],
    ) -> Vec<KeyDriver> {
        let mut drivers = Vec::new();

        if metrics.sla_compliance_rate < 90.0 {
            drivers.push(KeyDriver {
                label: "SLA compliance below target".to_string(),
                detail: format!(
                    "Only {:.1}% of completed submissions met their SLA window.",
                    metrics.sla_compliance_rate
                ),
                impact: Impact::Critical,
                metric_value: format!("{:.1}%", metrics.sla_compliance_rate),
            });
        } else if metrics.sla_compliance_rate < 95.0 {
            drivers.push(KeyDriver {
                label: "SLA compliance slipping".to_string(),
                detail: format!(
                    "SLA compliance is {:.1}%, under the 95% comfort band.",
                    metrics.sla_compliance_rate
                ),
                impact: Impact::High,
                metric_value: format!("{:.1}%", metrics.sla_compliance_rate),
            });
        }

        if metrics.backlog_size > 20 {
            drivers.push(KeyDriver {
                label: "Review backlog elevated".to_string(),
                detail: format!(
                    "{} submissions are waiting in human review or action required.",
                    metrics.backlog_size
                ),
                impact: Impact::High,
                metric_value: metrics.backlog_size.to_string(),
            });
        } else if metrics.backlog_size > 10 {
            drivers.push(KeyDriver {
                label: "Review backlog building".to_string(),
                detail: format!("{} submissions are queued for review.", metrics.backlog_size),
                impact: Impact::Medium,
                metric_value: metrics.backlog_size.to_string(),
            });
        }

        if metrics.rai_pass_rate < 90.0 {
            drivers.push(KeyDriver {
                label: "RAI pass rate degraded".to_string(),
                detail: format!(
                    "Responsible-AI checks pass only {:.1}% of sampled responses.",
                    metrics.rai_pass_rate
                ),
                impact: Impact::High,
                metric_value: format!("{:.1}%", metrics.rai_pass_rate),
            });
        } else if metrics.rai_pass_rate < 95.0 {
            drivers.push(KeyDriver {
                label: "RAI pass rate dipping".to_string(),
                detail: format!("RAI pass rate is {:.1}%.", metrics.rai_pass_rate),
                impact: Impact::Medium,
                metric_value: format!("{:.1}%", metrics.rai_pass_rate),
            });
        }

        if metrics.latency_p99_ms > 3000.0 {
            drivers.push(KeyDriver {
                label: "Tail latency out of budget".to_string(),
                detail: format!("p99 runtime latency is {:.0}ms.", metrics.latency_p99_ms),
                impact: Impact::High,
                metric_value: format!("{:.0}ms", metrics.latency_p99_ms),
            });
        }

        if metrics.active_incidents > 0 {
            let impact = if metrics.active_incidents > 3 {
                Impact::High
            } else {
                Impact::Medium
            };
            drivers.push(KeyDriver {
                label: "Active incidents open".to_string(),
                detail: format!(
                    "{} live-site incidents are open or under investigation.",
                    metrics.active_incidents
                ),
                impact,
                metric_value: metrics.active_incidents.to_string(),
            });
        }

        // Week-over-week approval swing, when enough history exists.
        if trends.len() >= 14 {
            let this_week: u32 = trends[trends.len() - 7..].iter().map(|s| s.approvals).sum();
            let prev_week: u32 = trends[trends.len() - 14..trends.len() - 7]
                .iter()
                .map(|s| s.approvals)
                .sum();
            let swing = calculate_trend_percent(this_week as f64, prev_week as f64);
            if swing > 20.0 {
                let declining = this_week < prev_week;
                drivers.push(KeyDriver {
                    label: if declining {
                        "Approval throughput dropped week over week".to_string()
                    } else {
                        "Approval throughput surged week over week".to_string()
                    },
                    detail: format!(
                        "Approvals moved from {} to {} ({:.0}% swing) between weeks.",
                        prev_week, this_week, swing
                    ),
                    impact: if declining { Impact::High } else { Impact::Medium },
                    metric_value: format!("{:.0}%", swing),
                });
            }
        }

        drivers.sort_by_key(|d| d.impact);
        drivers
    }

    // ========================================================================
    // Recommendations
    // ========================================================================

    /// Condition-driven recommendations, at most five; a navigation link
    /// is attached to the first entry only from the overview page.
    pub fn recommendations(
        &self,
        metrics: &ComputedMetrics,
        context: &DataContext,
    ) -> Vec<Recommendation> {
        // (recommendation, link target if it ends up first)
        let mut recs: Vec<(Recommendation, &'static str)> = Vec::new();

        if metrics.backlog_size > 15 {
            recs.push((
                Recommendation {
                    title: "Rebalance review capacity".to_string(),
                    description: format!(
                        "{} submissions are queued; add a reviewer rotation or batch the oldest items first.",
                        metrics.backlog_size
                    ),
                    priority: Impact::High,
                    estimated_effort: Some("1-2 days".to_string()),
                    link: None,
                },
                "/funnel",
            ));
        }

        if metrics.sla_compliance_rate < 90.0 {
            recs.push((
                Recommendation {
                    title: "Triage SLA-breaching submissions".to_string(),
                    description:
                        "Work the oldest in-flight submissions first; each cleared breach lifts compliance directly."
                            .to_string(),
                    priority: Impact::High,
                    estimated_effort: Some("This week".to_string()),
                    link: None,
                },
                "/operations",
            ));
        }

        if metrics.latency_p99_ms > 3000.0 || metrics.availability_pct < 99.0 {
            recs.push((
                Recommendation {
                    title: "Investigate runtime performance".to_string(),
                    description: format!(
                        "p99 latency is {:.0}ms with availability at {:.2}%; profile the slowest agents' downstream calls.",
                        metrics.latency_p99_ms, metrics.availability_pct
                    ),
                    priority: Impact::Medium,
                    estimated_effort: Some("2-3 days".to_string()),
                    link: None,
                },
                "/operations",
            ));
        }

        if metrics.rai_pass_rate < 95.0 {
            recs.push((
                Recommendation {
                    title: "Run an RAI remediation pass".to_string(),
                    description: format!(
                        "RAI pass rate is {:.1}%; audit grounding data and system prompts for the flagged agents.",
                        metrics.rai_pass_rate
                    ),
                    priority: Impact::High,
                    estimated_effort: Some("3-5 days".to_string()),
                    link: None,
                },
                "/quality",
            ));
        }

        if metrics.first_pass_approval_rate < 80.0 {
            recs.push((
                Recommendation {
                    title: "Publish a pre-submission checklist".to_string(),
                    description: format!(
                        "First-pass approval is {:.1}%; the top failure categories are avoidable with a validation checklist.",
                        metrics.first_pass_approval_rate
                    ),
                    priority: Impact::Medium,
                    estimated_effort: Some("1 day".to_string()),
                    link: None,
                },
                "/quality",
            ));
        }

        recs.sort_by_key(|(r, _)| r.priority);
        recs.truncate(5);

        let overview = context.current_page == Page::Overview;
        recs.into_iter()
            .enumerate()
            .map(|(idx, (mut rec, target))| {
                if idx == 0 && overview {
                    rec.link = Some(target.to_string());
                }
                rec
            })
            .collect()
    }

    // ========================================================================
    // Page summary
    // ========================================================================

    /// Overall page summary with a healthy/attention tone split.
    pub fn page_summary(&self, context: &DataContext) -> String {
        let metrics = context.metrics.clone().unwrap_or_default();
        let healthy = metrics.sla_compliance_rate >= 90.0
            && metrics.rai_pass_rate >= 95.0
            && metrics.backlog_size < 20;

        let (stage_label, stage_count) = metrics
            .bottleneck_stage()
            .map(|(stage, count)| (stage.label(), count))
            .unwrap_or(("(none)", 0));
        let top_failure = metrics
            .top_failure_category()
            .map(|(category, _)| category.label())
            .unwrap_or("(none)");

        let vars = TemplateVars::new()
            .set("window", context.filters.window_days)
            .set("approval_rate", format_number(metrics.first_pass_approval_rate))
            .set("sla_rate", format_number(metrics.sla_compliance_rate))
            .set("rai_rate", format_number(metrics.rai_pass_rate))
            .set("backlog", metrics.backlog_size)
            .set("incidents", metrics.active_incidents)
            .set("p99", format_number(metrics.latency_p99_ms))
            .set("availability", format_number(metrics.availability_pct))
            .set("stage_label", stage_label)
            .set("stage_count", stage_count)
            .set("top_failure", top_failure);

        let group = templates::page_summary_group(context.current_page, healthy);
        interpolate(self.pick(group), &vars)
    }

    // ========================================================================
    // Entity assessment
    // ========================================================================

    /// Three-tier status for a selected agent or publisher.
    /// `at_risk_agents` only matters for publishers (count of their agents
    /// in action-required or suspended states).
    pub fn entity_assessment(
        &self,
        entity: &SelectedEntity,
        at_risk_agents: usize,
    ) -> (EntityHealth, String) {
        let (health, detail) = match entity {
            SelectedEntity::Agent(agent) => match agent.status {
                AgentStatus::Suspended => (
                    EntityHealth::Critical,
                    "the agent is suspended and unavailable to users.".to_string(),
                ),
                AgentStatus::ActionRequired => (
                    EntityHealth::AtRisk,
                    "its latest submission has blocking findings awaiting fixes.".to_string(),
                ),
                _ => (
                    EntityHealth::Healthy,
                    format!("status is {:?} with no blocking findings.", agent.status),
                ),
            },
            SelectedEntity::Publisher(publisher) => {
                if at_risk_agents > 2 {
                    (
                        EntityHealth::Critical,
                        format!(
                            "{} of its agents are suspended or blocked on required actions.",
                            at_risk_agents
                        ),
                    )
                } else if at_risk_agents > 0 {
                    (
                        EntityHealth::AtRisk,
                        format!("{} agent(s) need attention.", at_risk_agents),
                    )
                } else {
                    (
                        EntityHealth::Healthy,
                        format!("all agents in the {:?} tier portfolio are clear.", publisher.tier),
                    )
                }
            }
        };

        let group = match health {
            EntityHealth::Healthy => templates::ENTITY_HEALTHY,
            EntityHealth::AtRisk => templates::ENTITY_AT_RISK,
            EntityHealth::Critical => templates::ENTITY_CRITICAL,
        };
        let vars = TemplateVars::new()
            .set("name", entity.name())
            .set("detail", &detail);
        (health, interpolate(self.pick(group), &vars))
    }

    // ========================================================================
    // Failure analysis
    // ========================================================================

    /// Rank failure categories and report the top category's share.
    pub fn failure_analysis(&self, counts: &BTreeMap<FailureCategory, u32>) -> String {
        let total: u32 = counts.values().sum();
        let top = counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .max_by_key(|(_, count)| **count);

        match top {
            Some((category, count)) if total > 0 => {
                let share = *count as f64 / total as f64 * 100.0;
                let vars = TemplateVars::new()
                    .set("top_label", category.label())
                    .set("top_count", count)
                    .set("top_share", format_number(share))
                    .set("total", total);
                interpolate(self.pick(templates::FAILURE_TOP), &vars)
            }
            _ => self.pick(templates::FAILURE_CLEAN).to_string(),
        }
    }

    // ========================================================================
    // Weekly update
    // ========================================================================

    /// Multi-line structured report: week-over-week deltas, top drivers,
    /// top recommendations, rendered through one large template.
    pub fn weekly_update(
        &self,
        metrics: &ComputedMetrics,
        trends: &[DailySnapshot],
        context: &DataContext,
    ) -> String {
        let (submissions_line, approvals_line) = if trends.len() >= 14 {
            let recent = &trends[trends.len() - 7..];
            let prior = &trends[trends.len() - 14..trends.len() - 7];
            let subs_now: u32 = recent.iter().map(|s| s.submissions).sum();
            let subs_prev: u32 = prior.iter().map(|s| s.submissions).sum();
            let appr_now: u32 = recent.iter().map(|s| s.approvals).sum();
            let appr_prev: u32 = prior.iter().map(|s| s.approvals).sum();
            (
                self.metric_change("Submissions", subs_now as f64, subs_prev as f64, "", "week"),
                self.metric_change("Approvals", appr_now as f64, appr_prev as f64, "", "week"),
            )
        } else {
            (
                "Not enough history for a week-over-week comparison.".to_string(),
                "Not enough history for a week-over-week comparison.".to_string(),
            )
        };

        let drivers_block = self
            .key_drivers(metrics, trends)
            .into_iter()
            .take(3)
            .map(|d| format!("• [{}] {}: {}", d.impact.label().to_uppercase(), d.label, d.detail))
            .collect::<Vec<_>>()
            .join("\n");
        let drivers_block = if drivers_block.is_empty() {
            "• No significant drivers this week.".to_string()
        } else {
            drivers_block
        };

        let recommendations_block = self
            .recommendations(metrics, context)
            .into_iter()
            .take(3)
            .map(|r| format!("• {}: {}", r.title, r.description))
            .collect::<Vec<_>>()
            .join("\n");
        let recommendations_block = if recommendations_block.is_empty() {
            "• Keep current cadence; no corrective action needed.".to_string()
        } else {
            recommendations_block
        };

        let vars = TemplateVars::new()
            .set("window", context.filters.window_days)
            .set("submissions_line", submissions_line)
            .set("approvals_line", approvals_line)
            .set("drivers_block", drivers_block)
            .set("recommendations_block", recommendations_block);
        interpolate(templates::WEEKLY_UPDATE, &vars)
    }
}

/// Trim trailing zeros so narrative numbers read naturally
/// (93.0 -> "93", 93.5 -> "93.5").
pub fn format_number(value: f64) -> String {
    if (value - value.round()).abs() < 0.05 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::FixedSelector;

    fn narrative() -> NarrativeGenerator {
        NarrativeGenerator::new(Box::new(FixedSelector(0)))
    }

    fn stressed_metrics() -> ComputedMetrics {
        ComputedMetrics {
            sla_compliance_rate: 85.0,
            backlog_size: 25,
            rai_pass_rate: 88.0,
            latency_p99_ms: 3500.0,
            active_incidents: 4,
            ..ComputedMetrics::default()
        }
    }

    #[test]
    fn test_change_classification_buckets() {
        assert_eq!(
            NarrativeGenerator::classify_change(102.0, 100.0),
            MetricChangeClass::Stable
        );
        assert_eq!(
            NarrativeGenerator::classify_change(110.0, 100.0),
            MetricChangeClass::PositiveModerate
        );
        assert_eq!(
            NarrativeGenerator::classify_change(120.0, 100.0),
            MetricChangeClass::PositiveStrong
        );
        assert_eq!(
            NarrativeGenerator::classify_change(90.0, 100.0),
            MetricChangeClass::NegativeModerate
        );
        assert_eq!(
            NarrativeGenerator::classify_change(80.0, 100.0),
            MetricChangeClass::NegativeStrong
        );
    }

    #[test]
    fn test_stressed_metrics_yield_expected_drivers() {
        let drivers = narrative().key_drivers(&stressed_metrics(), &[]);

        assert!(drivers.len() >= 5, "expected at least 5 drivers, got {}", drivers.len());
        assert!(drivers
            .iter()
            .any(|d| d.impact == Impact::Critical && d.label.contains("SLA")));
        assert!(drivers
            .iter()
            .any(|d| d.impact == Impact::High && d.label.contains("RAI")));

        // Sorted most severe first.
        for pair in drivers.windows(2) {
            assert!(pair[0].impact <= pair[1].impact);
        }
    }

    #[test]
    fn test_healthy_metrics_yield_no_drivers() {
        let metrics = ComputedMetrics {
            sla_compliance_rate: 98.0,
            backlog_size: 4,
            rai_pass_rate: 99.0,
            latency_p99_ms: 900.0,
            active_incidents: 0,
            ..ComputedMetrics::default()
        };
        assert!(narrative().key_drivers(&metrics, &[]).is_empty());
    }

    #[test]
    fn test_recommendations_link_only_on_overview() {
        let narrative = narrative();
        let metrics = stressed_metrics();

        let overview = DataContext::new(Page::Overview).with_metrics(metrics.clone());
        let recs = narrative.recommendations(&metrics, &overview);
        assert!(!recs.is_empty());
        assert!(recs[0].link.is_some());
        assert!(recs[1..].iter().all(|r| r.link.is_none()));

        let funnel = DataContext::new(Page::Funnel).with_metrics(metrics.clone());
        let recs = narrative.recommendations(&metrics, &funnel);
        assert!(recs.iter().all(|r| r.link.is_none()));
    }

    #[test]
    fn test_recommendations_capped_at_five() {
        let metrics = ComputedMetrics {
            first_pass_approval_rate: 60.0,
            availability_pct: 97.0,
            ..stressed_metrics()
        };
        let ctx = DataContext::new(Page::Overview).with_metrics(metrics.clone());
        assert!(narrative().recommendations(&metrics, &ctx).len() <= 5);
    }

    #[test]
    fn test_failure_analysis_reports_top_share() {
        let mut counts = BTreeMap::new();
        counts.insert(FailureCategory::ManifestMismatch, 6);
        counts.insert(FailureCategory::AuthFailure, 4);

        let text = narrative().failure_analysis(&counts);
        assert!(text.contains("Manifest Mismatch"));
        assert!(text.contains("60"), "expected a 60% share in: {}", text);
    }

    #[test]
    fn test_failure_analysis_clean_window() {
        let counts = BTreeMap::new();
        let text = narrative().failure_analysis(&counts);
        assert!(text.contains("No validation failures"));
    }

    #[test]
    fn test_page_summary_with_no_metrics_is_still_text() {
        let ctx = DataContext::new(Page::Overview);
        let text = narrative().page_summary(&ctx);
        assert!(!text.is_empty());
    }

    #[test]
    fn test_weekly_update_structure() {
        let metrics = stressed_metrics();
        let ctx = DataContext::new(Page::Overview).with_metrics(metrics.clone());
        let report = narrative().weekly_update(&metrics, &[], &ctx);
        assert!(report.contains("Weekly publishing update"));
        assert!(report.contains("Recommended next steps"));
    }
}
