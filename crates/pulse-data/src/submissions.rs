//! Submission pipeline generator.
//!
//! 300 submissions over the trailing 60-day window. Distribution policy:
//! 70% approved end to end; of the rest, ~30% rejected and the remainder
//! still in flight at an automated/human/action stage. A 30% "slow path"
//! inflates human-review time to exercise bottleneck narratives.

use chrono::{DateTime, Duration, Utc};
use pulse_core::{
    Agent, FailureCategory, FindingId, FindingSeverity, Stage, StageDuration, Submission,
    SubmissionId, SubmissionOutcome, ValidationFinding,
};

use crate::seeded::SeededRandom;
use crate::WINDOW_DAYS;

const SUBMISSION_COUNT: usize = 300;

enum Disposition {
    Approved,
    Rejected,
    InFlight(Stage),
}

pub fn generate(
    rng: &mut SeededRandom,
    agents: &[Agent],
    now: DateTime<Utc>,
) -> Vec<Submission> {
    let mut submissions = Vec::with_capacity(SUBMISSION_COUNT);

    for i in 0..SUBMISSION_COUNT {
        let agent = rng.pick(agents).clone();
        let disposition = roll_disposition(rng);

        // Completed paths start earlier so their full stage history fits
        // inside the window.
        let created_at = match disposition {
            Disposition::InFlight(_) => {
                rng.date(now - Duration::days(WINDOW_DAYS), now - Duration::days(1))
            }
            _ => rng.date(now - Duration::days(WINDOW_DAYS), now - Duration::days(14)),
        };

        let path = stage_path(rng, &disposition);
        let visited_action_required = path.contains(&Stage::ActionRequired);
        let stage_durations = build_durations(rng, &path, created_at);
        let stage = path[path.len() - 1];

        let outcome = match disposition {
            Disposition::Approved => Some(SubmissionOutcome::Approved),
            Disposition::Rejected => Some(SubmissionOutcome::Rejected),
            Disposition::InFlight(_) => None,
        };

        let resubmission_count = if visited_action_required {
            rng.int(1, 2) as u32
        } else {
            0
        };

        let sla_target_days = *rng.pick(&[5u32, 7, 10]);
        let elapsed_days = (now - created_at).num_days();
        let sla_breached = outcome.is_none() && elapsed_days > sla_target_days as i64;

        let id = SubmissionId::new(format!("sub-{:03}", i + 1));
        let findings = generate_findings(rng, &id, &disposition, visited_action_required);

        let updated_at = stage_durations
            .last()
            .map(|d| d.entered_at)
            .unwrap_or(created_at);

        submissions.push(Submission {
            id,
            agent_id: agent.id.clone(),
            publisher_id: agent.publisher_id.clone(),
            version: format!("{}.{}.{}", rng.int(1, 3), rng.int(0, 9), rng.int(0, 9)),
            stage,
            stage_durations,
            findings,
            sla_target_days,
            sla_breached,
            resubmission_count,
            created_at,
            updated_at,
            outcome,
        });
    }

    submissions
}

fn roll_disposition(rng: &mut SeededRandom) -> Disposition {
    if rng.chance(0.70) {
        Disposition::Approved
    } else if rng.chance(0.30) {
        Disposition::Rejected
    } else {
        Disposition::InFlight(*rng.pick(&[
            Stage::AutomatedChecks,
            Stage::HumanReview,
            Stage::ActionRequired,
        ]))
    }
}

/// Stage sequence for one submission. Stage-monotonic: no stage repeats.
fn stage_path(rng: &mut SeededRandom, disposition: &Disposition) -> Vec<Stage> {
    let mut path = vec![Stage::Draft, Stage::Submitted, Stage::AutomatedChecks];

    match disposition {
        Disposition::Approved => {
            path.push(Stage::HumanReview);
            if rng.chance(0.25) {
                path.push(Stage::ActionRequired);
            }
            path.push(Stage::Approved);
            path.push(Stage::Published);
        }
        Disposition::Rejected => {
            path.push(Stage::HumanReview);
            if rng.chance(0.40) {
                path.push(Stage::ActionRequired);
            }
            path.push(Stage::Rejected);
        }
        Disposition::InFlight(stage) => match stage {
            Stage::AutomatedChecks => {}
            Stage::HumanReview => path.push(Stage::HumanReview),
            Stage::ActionRequired => {
                path.push(Stage::HumanReview);
                path.push(Stage::ActionRequired);
            }
            _ => unreachable!("in-flight stages are automated/human/action only"),
        },
    }

    path
}

/// Timestamps for each visited stage. Every entry except the last is
/// closed with an exit time and duration; the last is the current stage.
fn build_durations(
    rng: &mut SeededRandom,
    path: &[Stage],
    created_at: DateTime<Utc>,
) -> Vec<StageDuration> {
    let mut durations = Vec::with_capacity(path.len());
    let mut cursor = created_at;

    for (idx, stage) in path.iter().enumerate() {
        if idx == path.len() - 1 {
            durations.push(StageDuration {
                stage: *stage,
                entered_at: cursor,
                exited_at: None,
                duration_days: None,
            });
            break;
        }

        let days = stage_dwell_days(rng, *stage);
        let exited = cursor + Duration::seconds((days * 86_400.0) as i64);
        durations.push(StageDuration {
            stage: *stage,
            entered_at: cursor,
            exited_at: Some(exited),
            duration_days: Some(days),
        });
        cursor = exited;
    }

    durations
}

fn stage_dwell_days(rng: &mut SeededRandom, stage: Stage) -> f64 {
    match stage {
        Stage::Draft => rng.float(0.1, 1.5),
        Stage::Submitted => rng.float(0.05, 0.3),
        Stage::AutomatedChecks => rng.float(0.05, 0.5),
        // Slow path: 30% of reviews take days instead of hours.
        Stage::HumanReview => {
            if rng.chance(0.30) {
                rng.float(3.0, 8.0)
            } else {
                rng.float(0.2, 1.0)
            }
        }
        Stage::ActionRequired => rng.float(0.5, 3.0),
        Stage::Approved => rng.float(0.1, 0.5),
        Stage::Published | Stage::Rejected => 0.0,
    }
}

fn generate_findings(
    rng: &mut SeededRandom,
    submission_id: &SubmissionId,
    disposition: &Disposition,
    visited_action_required: bool,
) -> Vec<ValidationFinding> {
    let count = match disposition {
        Disposition::Rejected => rng.int(2, 5),
        Disposition::InFlight(Stage::ActionRequired) => rng.int(1, 4),
        _ if visited_action_required => rng.int(1, 4),
        _ => 0,
    } as usize;

    if count == 0 {
        return Vec::new();
    }

    let categories = rng.pick_multiple(&FailureCategory::ALL, count);
    let rai_flag_first = rng.chance(0.20);

    categories
        .into_iter()
        .enumerate()
        .map(|(idx, category)| {
            let severity = if idx == 0 {
                FindingSeverity::MustFix
            } else {
                *rng.weighted(
                    &[
                        FindingSeverity::ShouldFix,
                        FindingSeverity::GoodToFix,
                        FindingSeverity::MustFix,
                    ],
                    &[0.5, 0.3, 0.2],
                )
            };
            let (message, remediation) = finding_text(category);
            ValidationFinding {
                id: FindingId::new(format!("{}-f{}", submission_id, idx + 1)),
                rule_id: format!("VAL-{}", rng.int(1000, 1999)),
                category,
                severity,
                message: message.to_string(),
                remediation: remediation.to_string(),
                rai_flag: idx == 0 && rai_flag_first,
            }
        })
        .collect()
}

fn finding_text(category: FailureCategory) -> (&'static str, &'static str) {
    match category {
        FailureCategory::ManifestMismatch => (
            "Manifest version does not match the submitted package version.",
            "Regenerate the manifest and resubmit with matching version fields.",
        ),
        FailureCategory::RaiViolation => (
            "Agent response sampled during review violated responsible-AI guidelines.",
            "Review system prompt and grounding data against the RAI checklist.",
        ),
        FailureCategory::AuthFailure => (
            "OAuth token exchange failed during automated sign-in verification.",
            "Verify redirect URIs and consent scopes in the app registration.",
        ),
        FailureCategory::PerformanceRegression => (
            "Median response latency regressed beyond the allowed budget.",
            "Profile downstream calls and add caching for repeated lookups.",
        ),
        FailureCategory::MetadataIncomplete => (
            "Store listing metadata is missing required fields.",
            "Fill in the long description, privacy link, and screenshots.",
        ),
        FailureCategory::SecurityVulnerability => (
            "Dependency scan flagged a known vulnerable package version.",
            "Upgrade the flagged dependency and rerun the security scan.",
        ),
        FailureCategory::PolicyViolation => (
            "Submission conflicts with marketplace content policy.",
            "Remove the non-compliant capability or request a policy exception.",
        ),
        FailureCategory::BrokenFunctionality => (
            "A declared capability returned errors during smoke testing.",
            "Reproduce with the validation harness and fix the failing command.",
        ),
        FailureCategory::AccessibilityIssue => (
            "Adaptive card output fails contrast and screen-reader checks.",
            "Apply the accessible card template and re-run the a11y suite.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{agents, publishers};

    fn sample(seed: u64) -> Vec<Submission> {
        let publishers = publishers::generate();
        let mut rng = SeededRandom::new(seed);
        let agents = agents::generate(&mut rng, &publishers, Utc::now());
        generate(&mut rng, &agents, Utc::now())
    }

    #[test]
    fn test_stage_history_is_monotonic_and_consistent() {
        for sub in sample(42) {
            let mut seen = std::collections::HashSet::new();
            let mut last_entered = None;
            for record in &sub.stage_durations {
                assert!(seen.insert(record.stage), "stage revisited in {}", sub.id);
                if let Some(prev) = last_entered {
                    assert!(record.entered_at >= prev, "history out of order in {}", sub.id);
                }
                last_entered = Some(record.entered_at);
            }
            assert_eq!(
                sub.stage_durations.last().map(|d| d.stage),
                Some(sub.stage),
                "last history entry disagrees with current stage for {}",
                sub.id
            );
        }
    }

    #[test]
    fn test_sla_breach_only_when_in_flight() {
        for sub in sample(42) {
            if sub.sla_breached {
                assert!(!sub.is_completed(), "{} completed but breached", sub.id);
            }
        }
    }

    #[test]
    fn test_first_finding_is_must_fix() {
        for sub in sample(42) {
            if let Some(first) = sub.findings.first() {
                assert_eq!(first.severity, FindingSeverity::MustFix);
            }
        }
    }

    #[test]
    fn test_finding_categories_are_distinct_per_submission() {
        for sub in sample(42) {
            let mut cats: Vec<_> = sub.findings.iter().map(|f| f.category).collect();
            let before = cats.len();
            cats.sort();
            cats.dedup();
            assert_eq!(cats.len(), before, "duplicate category in {}", sub.id);
        }
    }

    #[test]
    fn test_disposition_mix_is_roughly_as_configured() {
        let subs = sample(42);
        let approved = subs
            .iter()
            .filter(|s| s.outcome == Some(SubmissionOutcome::Approved))
            .count();
        let rejected = subs
            .iter()
            .filter(|s| s.outcome == Some(SubmissionOutcome::Rejected))
            .count();
        let in_flight = subs.iter().filter(|s| s.outcome.is_none()).count();

        assert_eq!(approved + rejected + in_flight, 300);
        assert!(approved > 180, "approvals unexpectedly low: {}", approved);
        assert!(in_flight > 30, "in-flight unexpectedly low: {}", in_flight);
        assert!(rejected > 10, "rejections unexpectedly low: {}", rejected);
    }
}
