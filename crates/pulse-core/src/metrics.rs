//! Derived metrics over a date window.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::{DailySnapshot, FailureCategory, Stage};

/// Non-persisted aggregate computed from submissions and snapshots for a
/// requested window. Rates are percentages in 0..=100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputedMetrics {
    // === KPIs ===
    pub first_pass_approval_rate: f64,
    pub sla_compliance_rate: f64,
    pub rai_pass_rate: f64,
    pub active_incidents: u32,
    pub time_to_publish_p50_days: f64,
    pub time_to_publish_p75_days: f64,
    pub time_to_publish_p99_days: f64,

    // === Funnel ===
    /// Current-stage counts over the entire submission set (not
    /// window-filtered; see the aggregator docs).
    pub stage_distribution: BTreeMap<Stage, u32>,
    /// Mean days spent per stage, from completed stage visits only.
    pub avg_time_in_stage: BTreeMap<Stage, f64>,

    // === Backlog ===
    pub backlog_size: u32,
    pub oldest_in_queue_days: f64,

    // === Operations ===
    pub latency_p50_ms: f64,
    pub latency_p75_ms: f64,
    pub latency_p99_ms: f64,
    pub availability_pct: f64,

    // === Quality ===
    pub failure_categories: BTreeMap<FailureCategory, u32>,

    /// Snapshot rows inside the window, oldest first.
    pub daily_trends: Vec<DailySnapshot>,
}

impl Default for ComputedMetrics {
    fn default() -> Self {
        Self {
            first_pass_approval_rate: 0.0,
            sla_compliance_rate: 0.0,
            rai_pass_rate: 0.0,
            active_incidents: 0,
            time_to_publish_p50_days: 0.0,
            time_to_publish_p75_days: 0.0,
            time_to_publish_p99_days: 0.0,
            stage_distribution: BTreeMap::new(),
            avg_time_in_stage: BTreeMap::new(),
            backlog_size: 0,
            oldest_in_queue_days: 0.0,
            latency_p50_ms: 0.0,
            latency_p75_ms: 0.0,
            latency_p99_ms: 0.0,
            availability_pct: 100.0,
            failure_categories: BTreeMap::new(),
            daily_trends: Vec::new(),
        }
    }
}

impl ComputedMetrics {
    /// The non-terminal stage holding the most submissions, if any.
    pub fn bottleneck_stage(&self) -> Option<(Stage, u32)> {
        self.stage_distribution
            .iter()
            .filter(|(stage, _)| !stage.is_terminal())
            .max_by_key(|(_, count)| **count)
            .map(|(stage, count)| (*stage, *count))
    }

    /// The failure category with the highest count, if any are non-zero.
    pub fn top_failure_category(&self) -> Option<(FailureCategory, u32)> {
        self.failure_categories
            .iter()
            .filter(|(_, count)| **count > 0)
            .max_by_key(|(_, count)| **count)
            .map(|(cat, count)| (*cat, *count))
    }
}
