//! Trend direction and magnitude helpers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Stable,
    Down,
}

impl Trend {
    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Stable => "▬",
            Trend::Down => "▼",
        }
    }
}

/// Percent change magnitude between two values. Sign is dropped; the
/// direction comes from `determine_trend`. Zero previous yields zero
/// rather than a division blow-up.
pub fn calculate_trend_percent(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    ((current - previous).abs() / previous) * 100.0
}

/// Direction of change, with a dead band of `threshold` (absolute units)
/// around "no change".
pub fn determine_trend(current: f64, previous: f64, threshold: f64) -> Trend {
    let diff = current - previous;
    if diff.abs() <= threshold {
        Trend::Stable
    } else if diff > 0.0 {
        Trend::Up
    } else {
        Trend::Down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_percent_magnitude_only() {
        assert_eq!(calculate_trend_percent(110.0, 100.0), 10.0);
        assert_eq!(calculate_trend_percent(90.0, 100.0), 10.0);
    }

    #[test]
    fn test_trend_percent_zero_previous() {
        assert_eq!(calculate_trend_percent(55.0, 0.0), 0.0);
    }

    #[test]
    fn test_determine_trend_directions() {
        assert_eq!(determine_trend(105.0, 100.0, 0.5), Trend::Up);
        assert_eq!(determine_trend(100.3, 100.0, 0.5), Trend::Stable);
        assert_eq!(determine_trend(94.0, 100.0, 0.5), Trend::Down);
    }
}
