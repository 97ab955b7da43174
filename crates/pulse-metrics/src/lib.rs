//! Pulse Metrics: derived KPIs over a date window.
//!
//! Turns the immutable dataset into a `ComputedMetrics` aggregate for a
//! trailing window, plus the small trend-math helpers the narrative layer
//! classifies against.

pub mod aggregator;
pub mod trend;

pub use aggregator::compute_metrics;
pub use trend::{calculate_trend_percent, determine_trend, Trend};
