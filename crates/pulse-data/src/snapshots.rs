//! Daily snapshot generator.
//!
//! One aggregated row per day over the trailing 61 days (today inclusive).
//! Days with no submission activity get randomized fallback values so the
//! trend charts never show hard zeros.
//!
//! Two scenarios are injected on purpose and relied on by the narrative
//! fixtures: latency inflates by 30% during weeks 3-4 of the window, and
//! RAI pass rates degrade over the most recent 15 days. Keep both if this
//! dataset is reused for engine tests.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use pulse_core::{
    DailySnapshot, FailureCategory, Incident, Stage, Submission, SubmissionOutcome,
};

use crate::seeded::SeededRandom;
use crate::WINDOW_DAYS;

/// Days, counted back from today, over which the RAI degradation runs.
const RAI_DEGRADE_DAYS: i64 = 15;

pub fn generate(
    rng: &mut SeededRandom,
    submissions: &[Submission],
    incidents: &[Incident],
    now: DateTime<Utc>,
) -> Vec<DailySnapshot> {
    let mut snapshots = Vec::with_capacity(WINDOW_DAYS as usize + 1);

    for offset in (0..=WINDOW_DAYS).rev() {
        let date = (now - Duration::days(offset)).date_naive();
        let day_index = WINDOW_DAYS - offset;

        let created: Vec<&Submission> = submissions
            .iter()
            .filter(|s| s.created_at.date_naive() == date)
            .collect();
        let approved: Vec<&Submission> = submissions
            .iter()
            .filter(|s| {
                s.outcome == Some(SubmissionOutcome::Approved)
                    && s.updated_at.date_naive() == date
            })
            .collect();
        let rejected = submissions
            .iter()
            .filter(|s| {
                s.outcome == Some(SubmissionOutcome::Rejected)
                    && s.updated_at.date_naive() == date
            })
            .count() as u32;

        let submissions_count = if created.is_empty() {
            rng.int(2, 8) as u32
        } else {
            created.len() as u32
        };
        let approvals = if approved.is_empty() {
            rng.int(1, 5) as u32
        } else {
            approved.len() as u32
        };
        let rejections = if rejected == 0 {
            rng.int(0, 2) as u32
        } else {
            rejected
        };

        let avg_time_to_approve_days = if approved.is_empty() {
            rng.float(2.5, 5.5)
        } else {
            approved.iter().map(|s| s.elapsed_days()).sum::<f64>() / approved.len() as f64
        };

        let mut backlog_by_stage = BTreeMap::new();
        for stage in [Stage::AutomatedChecks, Stage::HumanReview, Stage::ActionRequired] {
            backlog_by_stage.insert(stage, in_stage_on(submissions, stage, date));
        }

        let sla_breaches = submissions
            .iter()
            .filter(|s| s.sla_breached && s.created_at.date_naive() <= date)
            .count() as u32;

        // Latency scenario: a 30% inflation bump over weeks 3-4 of the
        // window, feeding the bottleneck/latency narratives.
        let latency_scale = if (14..28).contains(&day_index) { 1.3 } else { 1.0 };
        let latency_p50_ms = rng.float(120.0, 200.0) * latency_scale;
        let latency_p75_ms = rng.float(250.0, 420.0) * latency_scale;
        let latency_p99_ms = rng.float(900.0, 2600.0) * latency_scale;

        let incident_count = incidents
            .iter()
            .filter(|i| {
                i.opened_at.date_naive() <= date
                    && i.resolved_at.map_or(true, |r| r.date_naive() >= date)
            })
            .count() as u32;

        let availability_pct =
            (rng.float(99.2, 99.98) - 0.15 * incident_count as f64).max(97.5);

        // RAI scenario: pass rate degrades over the most recent 15 days.
        let rai_pass_rate = if offset < RAI_DEGRADE_DAYS {
            rng.float(86.0, 93.0)
        } else {
            rng.float(95.5, 99.3)
        };

        let failure_categories =
            day_failure_categories(rng, &created, offset < RAI_DEGRADE_DAYS);

        snapshots.push(DailySnapshot {
            date,
            submissions: submissions_count,
            approvals,
            rejections,
            backlog_by_stage,
            avg_time_to_approve_days,
            sla_breaches,
            latency_p50_ms,
            latency_p75_ms,
            latency_p99_ms,
            availability_pct,
            rai_pass_rate,
            incident_count,
            failure_categories,
        });
    }

    snapshots
}

/// Submissions whose visit to `stage` spans the given day.
fn in_stage_on(submissions: &[Submission], stage: Stage, date: NaiveDate) -> u32 {
    submissions
        .iter()
        .filter(|s| {
            s.stage_durations.iter().any(|d| {
                d.stage == stage
                    && d.entered_at.date_naive() <= date
                    && d.exited_at.map_or(true, |e| e.date_naive() >= date)
            })
        })
        .count() as u32
}

/// Per-day failure-category counts. Every one of the nine canonical
/// categories is present, zero or not.
fn day_failure_categories(
    rng: &mut SeededRandom,
    created: &[&Submission],
    rai_degraded: bool,
) -> BTreeMap<FailureCategory, u32> {
    let mut counts: BTreeMap<FailureCategory, u32> =
        FailureCategory::ALL.iter().map(|c| (*c, 0)).collect();

    for submission in created {
        for finding in &submission.findings {
            *counts.entry(finding.category).or_insert(0) += 1;
        }
    }

    // Light background noise so quiet days still chart.
    let noisy = *rng.pick(&FailureCategory::ALL);
    *counts.entry(noisy).or_insert(0) += rng.int(0, 2) as u32;

    if rai_degraded {
        *counts.entry(FailureCategory::RaiViolation).or_insert(0) += rng.int(1, 4) as u32;
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{agents, incidents, publishers, submissions};

    fn sample() -> Vec<DailySnapshot> {
        let now = Utc::now();
        let publishers = publishers::generate();
        let mut rng = SeededRandom::new(42);
        let agents = agents::generate(&mut rng, &publishers, now);
        let subs = submissions::generate(&mut rng, &agents, now);
        let incs = incidents::generate(&mut rng, &agents, now);
        generate(&mut rng, &subs, &incs, now)
    }

    #[test]
    fn test_one_row_per_day_today_inclusive() {
        let snapshots = sample();
        assert_eq!(snapshots.len(), WINDOW_DAYS as usize + 1);
        assert_eq!(snapshots.last().unwrap().date, Utc::now().date_naive());
        for pair in snapshots.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
    }

    #[test]
    fn test_all_nine_categories_present_every_day() {
        for snapshot in sample() {
            assert_eq!(snapshot.failure_categories.len(), 9);
            for category in FailureCategory::ALL {
                assert!(snapshot.failure_categories.contains_key(&category));
            }
        }
    }

    #[test]
    fn test_no_hard_zero_submission_counts() {
        for snapshot in sample() {
            assert!(snapshot.submissions > 0, "hard zero on {}", snapshot.date);
            assert!(snapshot.approvals > 0, "hard zero on {}", snapshot.date);
        }
    }

    #[test]
    fn test_rai_scenario_degrades_recent_days() {
        let snapshots = sample();
        let recent: Vec<&DailySnapshot> =
            snapshots.iter().rev().take(RAI_DEGRADE_DAYS as usize).collect();
        let older: Vec<&DailySnapshot> =
            snapshots.iter().take(20).collect();

        let recent_avg: f64 =
            recent.iter().map(|s| s.rai_pass_rate).sum::<f64>() / recent.len() as f64;
        let older_avg: f64 =
            older.iter().map(|s| s.rai_pass_rate).sum::<f64>() / older.len() as f64;

        assert!(
            recent_avg < older_avg - 3.0,
            "RAI degradation scenario missing: recent {} vs older {}",
            recent_avg,
            older_avg
        );
    }

    #[test]
    fn test_latency_scenario_inflates_mid_window() {
        let snapshots = sample();
        // Window days 14..28 carry the inflation.
        let inflated: f64 = snapshots[14..28].iter().map(|s| s.latency_p99_ms).sum::<f64>() / 14.0;
        let baseline: f64 = snapshots[0..14].iter().map(|s| s.latency_p99_ms).sum::<f64>() / 14.0;
        assert!(
            inflated > baseline,
            "latency scenario missing: {} vs {}",
            inflated,
            baseline
        );
    }
}
