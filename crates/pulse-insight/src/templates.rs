//! Template library: tone-scoped groups of `${var}` templates.
//!
//! Template selection is the one deliberately nondeterministic point in
//! the engine (phrasing variety); it sits behind `TemplateSelector` so
//! tests can pin it. Interpolation is strict about never failing: a
//! missing variable leaves the `${key}` placeholder in the output and
//! logs at debug level.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use rand::Rng;
use regex::{Captures, Regex};

use pulse_core::Page;

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\$\{([A-Za-z0-9_]+)\}").expect("placeholder regex");
}

/// Variables available to one interpolation pass.
#[derive(Debug, Clone, Default)]
pub struct TemplateVars(BTreeMap<String, String>);

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl ToString) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Replace every `${key}` with its variable. Unknown keys survive
/// verbatim; interpolation never fails.
pub fn interpolate(template: &str, vars: &TemplateVars) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => {
                tracing::debug!(placeholder = &caps[1], "unresolved template placeholder");
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Strategy for choosing among candidate templates.
pub trait TemplateSelector: Send + Sync {
    /// Pick one candidate. Callers guarantee a non-empty list.
    fn select<'a>(&self, candidates: &[&'a str]) -> &'a str;
}

/// Production selector: uniform random pick for phrasing variety.
#[derive(Debug, Default)]
pub struct RandomSelector;

impl TemplateSelector for RandomSelector {
    fn select<'a>(&self, candidates: &[&'a str]) -> &'a str {
        assert!(!candidates.is_empty(), "select called with no candidates");
        let idx = rand::thread_rng().gen_range(0..candidates.len());
        candidates[idx]
    }
}

/// Test selector: always the same index (modulo length) for golden output.
#[derive(Debug)]
pub struct FixedSelector(pub usize);

impl TemplateSelector for FixedSelector {
    fn select<'a>(&self, candidates: &[&'a str]) -> &'a str {
        assert!(!candidates.is_empty(), "select called with no candidates");
        candidates[self.0 % candidates.len()]
    }
}

// ============================================================================
// Metric-change templates, one group per classification bucket
// ============================================================================

pub const METRIC_STABLE: &[&str] = &[
    "${metric} held steady at ${current}${unit} over the ${period} (${change}% change).",
    "No meaningful movement in ${metric}: ${current}${unit}, within ${change}% of the prior ${period}.",
];

pub const METRIC_POSITIVE_MODERATE: &[&str] = &[
    "${metric} improved to ${current}${unit}, up ${change}% over the ${period}.",
    "${metric} is trending up: ${current}${unit}, a ${change}% gain this ${period}.",
];

pub const METRIC_POSITIVE_STRONG: &[&str] = &[
    "${metric} jumped ${change}% this ${period}, now at ${current}${unit}.",
    "Strong movement: ${metric} climbed ${change}% over the ${period} to ${current}${unit}.",
];

pub const METRIC_NEGATIVE_MODERATE: &[&str] = &[
    "${metric} slipped to ${current}${unit}, down ${change}% over the ${period}.",
    "${metric} is drifting down: ${current}${unit}, a ${change}% drop this ${period}.",
];

pub const METRIC_NEGATIVE_STRONG: &[&str] = &[
    "${metric} fell sharply, down ${change}% this ${period} to ${current}${unit}.",
    "Significant decline: ${metric} dropped ${change}% over the ${period}, now ${current}${unit}.",
];

// ============================================================================
// Page summaries, healthy vs needs-attention tone per page
// ============================================================================

const OVERVIEW_HEALTHY: &[&str] = &[
    "Your publishing pipeline is healthy over the last ${window} days: first-pass approval at ${approval_rate}%, SLA compliance at ${sla_rate}%, and ${backlog} submissions in review. RAI pass rate sits at ${rai_rate}%.",
    "Operations look steady: ${approval_rate}% first-pass approval, ${sla_rate}% SLA compliance, and a manageable review queue of ${backlog} over the ${window}-day window.",
];

const OVERVIEW_ATTENTION: &[&str] = &[
    "The pipeline needs attention: SLA compliance is at ${sla_rate}%, RAI pass rate at ${rai_rate}%, and ${backlog} submissions are waiting on review. First-pass approval stands at ${approval_rate}% over ${window} days.",
    "Several indicators are off target this ${window}-day window: ${sla_rate}% SLA compliance, ${rai_rate}% RAI pass rate, and a review backlog of ${backlog}.",
];

const FUNNEL_HEALTHY: &[&str] = &[
    "Submissions are flowing: ${stage_label} currently holds the most in-flight work (${stage_count}), but overall throughput is on track with ${approval_rate}% first-pass approval.",
];

const FUNNEL_ATTENTION: &[&str] = &[
    "Funnel pressure is building at ${stage_label} (${stage_count} submissions). SLA compliance is ${sla_rate}% and the backlog stands at ${backlog}.",
];

const QUALITY_HEALTHY: &[&str] = &[
    "Quality gates are holding: ${approval_rate}% of submissions clear on the first pass and the RAI pass rate is ${rai_rate}%. Top failure category is ${top_failure}.",
];

const QUALITY_ATTENTION: &[&str] = &[
    "Quality needs work: first-pass approval is ${approval_rate}% and RAI pass rate is ${rai_rate}%. ${top_failure} is the leading failure category this window.",
];

const OPERATIONS_HEALTHY: &[&str] = &[
    "Runtime health is good: p99 latency at ${p99}ms, availability ${availability}%, ${incidents} active incidents.",
];

const OPERATIONS_ATTENTION: &[&str] = &[
    "Runtime indicators need attention: p99 latency at ${p99}ms with ${incidents} active incidents and availability at ${availability}%.",
];

pub fn page_summary_group(page: Page, healthy: bool) -> &'static [&'static str] {
    match (page, healthy) {
        (Page::Funnel, true) => FUNNEL_HEALTHY,
        (Page::Funnel, false) => FUNNEL_ATTENTION,
        (Page::Quality, true) => QUALITY_HEALTHY,
        (Page::Quality, false) => QUALITY_ATTENTION,
        (Page::Operations, true) => OPERATIONS_HEALTHY,
        (Page::Operations, false) => OPERATIONS_ATTENTION,
        // Entity and list pages fall back to the overview phrasing.
        (_, true) => OVERVIEW_HEALTHY,
        (_, false) => OVERVIEW_ATTENTION,
    }
}

// ============================================================================
// Scenario templates
// ============================================================================

pub const BOTTLENECK: &[&str] = &[
    "The funnel's slowest point is ${stage_label}: ${stage_count} submissions are sitting there now, averaging ${stage_days} days each. Clearing it would do more for time-to-publish than any other change.",
    "${stage_label} is your bottleneck with ${stage_count} submissions in queue and an average dwell of ${stage_days} days.",
];

pub const BOTTLENECK_NONE: &[&str] = &[
    "No single stage is backing up right now; in-flight work is spread thin across the funnel.",
];

pub const FAILURE_TOP: &[&str] = &[
    "${top_label} is the leading failure category: ${top_count} findings, ${top_share}% of the ${total} recorded this window. Addressing it first gives the biggest first-pass gain.",
    "Of ${total} validation findings this window, ${top_count} (${top_share}%) are ${top_label} issues; that is the clear place to start.",
];

pub const FAILURE_CLEAN: &[&str] = &[
    "No validation failures were recorded in this window. Quality gates are clean.",
];

pub const ENTITY_HEALTHY: &[&str] = &[
    "${name} looks healthy: ${detail}",
];

pub const ENTITY_AT_RISK: &[&str] = &[
    "${name} is at risk: ${detail}",
];

pub const ENTITY_CRITICAL: &[&str] = &[
    "${name} needs immediate attention: ${detail}",
];

pub const AT_RISK: &[&str] = &[
    "${action_required} submissions are blocked in Action Required and ${incidents} incidents are active across the portfolio. Start with the agents carrying must-fix findings.",
    "Attention list: ${action_required} submissions awaiting publisher fixes, ${incidents} active incidents. The must-fix findings are the fastest unblock.",
];

pub const SLA: &[&str] = &[
    "SLA compliance sits at ${sla_rate}% over the last ${window} days. ${backlog} submissions are still in review and the oldest has waited ${oldest} days.",
    "Window compliance is ${sla_rate}% over ${window} days. Watch the review queue: ${backlog} in flight, oldest waiting ${oldest} days.",
];

pub const QUALITY_READINESS: &[&str] = &[
    "First-pass approval is ${approval_rate}% with a RAI pass rate of ${rai_rate}%. ${top_failure} is the most common blocker this window.",
    "Readiness check: ${approval_rate}% of submissions clear on first pass; RAI sits at ${rai_rate}%. The recurring blocker is ${top_failure}.",
];

pub const RAI: &[&str] = &[
    "RAI pass rate is ${rai_rate}%, ${trend_word} versus the prior week, with ${rai_count} violations recorded this window.",
    "Responsible-AI checks pass ${rai_rate}% of sampled responses (${trend_word} week over week). ${rai_count} violations were logged in the window.",
];

pub const LATENCY: &[&str] = &[
    "Runtime latency is at p50 ${p50}ms / p99 ${p99}ms, ${trend_word} week over week, with availability at ${availability}%.",
];

pub const BACKLOG: &[&str] = &[
    "${backlog} submissions are queued for review and the oldest has waited ${oldest} days. ${stage_label} holds the largest share.",
];

pub const TRIAGE_NEXT_STEP: &[&str] = &[
    "Start with the must-fix findings, rerun automated checks locally, then resubmit; history shows that clears most blocks in one pass.",
    "Clear the must-fix findings first and re-validate before resubmitting; resubmissions with open must-fix items are rejected outright.",
];

pub const COACHING: &[&str] = &[
    "${name} (${tier} tier): against a portfolio first-pass approval of ${approval_rate}%, the highest-leverage coaching topics are ${top_failure} prevention and pre-submission validation.",
    "Coaching focus for ${name}: their ${tier}-tier portfolio is most often blocked by ${top_failure}; walk them through the validation checklist before the next submission wave.",
];

/// Weekly update: a single large structured template.
pub const WEEKLY_UPDATE: &str = "\
Weekly publishing update (${window}-day window)

Throughput: ${submissions_line}
Approvals: ${approvals_line}

What's driving the numbers:
${drivers_block}

Recommended next steps:
${recommendations_block}";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_replaces_known_keys() {
        let vars = TemplateVars::new().set("name", "World");
        assert_eq!(interpolate("Hello ${name}", &vars), "Hello World");
    }

    #[test]
    fn test_interpolate_preserves_missing_keys() {
        let vars = TemplateVars::new();
        assert_eq!(interpolate("Hello ${missing}", &vars), "Hello ${missing}");
    }

    #[test]
    fn test_interpolate_numeric_values() {
        let vars = TemplateVars::new().set("count", 45).set("rate", 93.5);
        assert_eq!(
            interpolate("${count} items at ${rate}%", &vars),
            "45 items at 93.5%"
        );
    }

    #[test]
    fn test_interpolate_repeated_placeholder() {
        let vars = TemplateVars::new().set("x", "a");
        assert_eq!(interpolate("${x}${x}${y}", &vars), "aa${y}");
    }

    #[test]
    fn test_fixed_selector_wraps() {
        let selector = FixedSelector(3);
        let candidates = ["a", "b"];
        assert_eq!(selector.select(&candidates), "b");
    }

    #[test]
    fn test_random_selector_stays_in_bounds() {
        let selector = RandomSelector;
        let candidates = ["a", "b", "c"];
        for _ in 0..100 {
            assert!(candidates.contains(&selector.select(&candidates)));
        }
    }

    #[test]
    fn test_every_group_is_non_empty() {
        for page in [
            Page::Overview,
            Page::Funnel,
            Page::Quality,
            Page::Operations,
            Page::Agents,
            Page::PublisherDetail,
        ] {
            assert!(!page_summary_group(page, true).is_empty());
            assert!(!page_summary_group(page, false).is_empty());
        }
    }
}
