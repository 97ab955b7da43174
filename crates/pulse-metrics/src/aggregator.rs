//! Metrics aggregation over a trailing window.
//!
//! Most figures are window-filtered. The funnel stage distribution is
//! deliberately computed over the ENTIRE submission set: the funnel shows
//! where work sits right now, not where it sat inside the window, and the
//! bottleneck narrative depends on those full-set counts.

use std::collections::BTreeMap;

use chrono::Duration;
use pulse_core::{ComputedMetrics, Stage, Submission, SubmissionOutcome};
use pulse_data::Dataset;

/// Fallback rates when a window contains no completed submissions.
/// Explicit literals rather than NaN from a zero denominator.
const DEFAULT_APPROVAL_RATE: f64 = 68.0;
const DEFAULT_SLA_COMPLIANCE: f64 = 82.0;

/// Compute the dashboard KPI aggregate over the trailing `window_days`,
/// anchored at the dataset's generation instant.
pub fn compute_metrics(dataset: &Dataset, window_days: u32) -> ComputedMetrics {
    let now = dataset.generated_at;
    let from = now - Duration::days(window_days as i64);

    // === Funnel (full set, see module docs) ===
    let mut stage_distribution: BTreeMap<Stage, u32> = BTreeMap::new();
    for submission in &dataset.submissions {
        *stage_distribution.entry(submission.stage).or_insert(0) += 1;
    }

    let avg_time_in_stage = average_time_in_stage(&dataset.submissions);

    // === Backlog ===
    let backlog: Vec<&Submission> = dataset
        .submissions
        .iter()
        .filter(|s| s.stage.is_backlog())
        .collect();
    let backlog_size = backlog.len() as u32;
    let oldest_in_queue_days = backlog
        .iter()
        .map(|s| (now - s.created_at).num_seconds() as f64 / 86_400.0)
        .fold(0.0, f64::max);

    // === Completion rates (window-filtered) ===
    let completed: Vec<&Submission> = dataset
        .submissions
        .iter()
        .filter(|s| s.is_completed() && s.updated_at >= from)
        .collect();

    let first_pass_approval_rate = if completed.is_empty() {
        DEFAULT_APPROVAL_RATE
    } else {
        let first_pass = completed.iter().filter(|s| s.resubmission_count == 0).count();
        first_pass as f64 / completed.len() as f64 * 100.0
    };

    let sla_compliance_rate = if completed.is_empty() {
        DEFAULT_SLA_COMPLIANCE
    } else {
        let within = completed
            .iter()
            .filter(|s| s.elapsed_days() <= s.sla_target_days as f64)
            .count();
        within as f64 / completed.len() as f64 * 100.0
    };

    // === Time to publish ===
    let mut publish_times: Vec<f64> = completed
        .iter()
        .filter(|s| s.outcome == Some(SubmissionOutcome::Approved))
        .map(|s| s.elapsed_days())
        .collect();
    publish_times.sort_by(|a, b| a.total_cmp(b));

    // === Snapshot-derived figures ===
    let in_range: Vec<_> = dataset
        .snapshots
        .iter()
        .filter(|s| s.date >= from.date_naive() && s.date <= now.date_naive())
        .cloned()
        .collect();
    let latest = in_range.last();

    let mut failure_categories: BTreeMap<_, u32> = BTreeMap::new();
    for snapshot in &in_range {
        for (category, count) in &snapshot.failure_categories {
            *failure_categories.entry(*category).or_insert(0) += count;
        }
    }

    let active_incidents = dataset
        .incidents
        .iter()
        .filter(|i| i.status.is_active())
        .count() as u32;

    tracing::debug!(
        window_days,
        completed = completed.len(),
        backlog = backlog_size,
        "metrics computed"
    );

    ComputedMetrics {
        first_pass_approval_rate,
        sla_compliance_rate,
        rai_pass_rate: latest.map_or(100.0, |s| s.rai_pass_rate),
        active_incidents,
        time_to_publish_p50_days: percentile(&publish_times, 50.0),
        time_to_publish_p75_days: percentile(&publish_times, 75.0),
        time_to_publish_p99_days: percentile(&publish_times, 99.0),
        stage_distribution,
        avg_time_in_stage,
        backlog_size,
        oldest_in_queue_days,
        latency_p50_ms: latest.map_or(0.0, |s| s.latency_p50_ms),
        latency_p75_ms: latest.map_or(0.0, |s| s.latency_p75_ms),
        latency_p99_ms: latest.map_or(0.0, |s| s.latency_p99_ms),
        availability_pct: latest.map_or(100.0, |s| s.availability_pct),
        failure_categories,
        daily_trends: in_range,
    }
}

/// Mean of positive, completed per-stage durations across all submissions.
fn average_time_in_stage(submissions: &[Submission]) -> BTreeMap<Stage, f64> {
    let mut sums: BTreeMap<Stage, (f64, u32)> = BTreeMap::new();
    for submission in submissions {
        for record in &submission.stage_durations {
            if let Some(days) = record.duration_days {
                if days > 0.0 {
                    let entry = sums.entry(record.stage).or_insert((0.0, 0));
                    entry.0 += days;
                    entry.1 += 1;
                }
            }
        }
    }
    sums.into_iter()
        .map(|(stage, (sum, count))| (stage, sum / count as f64))
        .collect()
}

/// Nearest-rank percentile over a pre-sorted slice; 0 when empty.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pulse_core::FailureCategory;

    fn dataset() -> Dataset {
        let anchor = Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap();
        Dataset::generate_at(42, anchor)
    }

    #[test]
    fn test_rates_are_finite_percentages() {
        let metrics = compute_metrics(&dataset(), 30);
        for rate in [
            metrics.first_pass_approval_rate,
            metrics.sla_compliance_rate,
            metrics.rai_pass_rate,
        ] {
            assert!(rate.is_finite());
            assert!((0.0..=100.0).contains(&rate), "rate out of range: {}", rate);
        }
    }

    #[test]
    fn test_empty_window_falls_back_to_defaults() {
        // A zero-day window has no completed submissions in range.
        let metrics = compute_metrics(&dataset(), 0);
        assert_eq!(metrics.first_pass_approval_rate, DEFAULT_APPROVAL_RATE);
        assert_eq!(metrics.sla_compliance_rate, DEFAULT_SLA_COMPLIANCE);
    }

    #[test]
    fn test_stage_distribution_covers_full_set() {
        let data = dataset();
        let metrics = compute_metrics(&data, 7);
        let total: u32 = metrics.stage_distribution.values().sum();
        assert_eq!(total as usize, data.submissions.len());
    }

    #[test]
    fn test_backlog_counts_review_stages_only() {
        let data = dataset();
        let metrics = compute_metrics(&data, 30);
        let expected = data
            .submissions
            .iter()
            .filter(|s| matches!(s.stage, Stage::HumanReview | Stage::ActionRequired))
            .count() as u32;
        assert_eq!(metrics.backlog_size, expected);
        if expected > 0 {
            assert!(metrics.oldest_in_queue_days > 0.0);
        }
    }

    #[test]
    fn test_failure_categories_summed_over_window() {
        let metrics = compute_metrics(&dataset(), 30);
        // RAI degradation scenario guarantees recent violations.
        assert!(
            metrics
                .failure_categories
                .get(&FailureCategory::RaiViolation)
                .copied()
                .unwrap_or(0)
                > 0
        );
    }

    #[test]
    fn test_percentiles_ordered() {
        let metrics = compute_metrics(&dataset(), 60);
        assert!(metrics.time_to_publish_p50_days <= metrics.time_to_publish_p75_days);
        assert!(metrics.time_to_publish_p75_days <= metrics.time_to_publish_p99_days);
    }

    #[test]
    fn test_daily_trends_match_window() {
        let metrics = compute_metrics(&dataset(), 14);
        assert_eq!(metrics.daily_trends.len(), 15);
    }
}
