//! Live-site incident generator.

use chrono::{DateTime, Duration, Utc};
use pulse_core::{Agent, Incident, IncidentId, IncidentSeverity, IncidentStatus};

use crate::seeded::SeededRandom;
use crate::WINDOW_DAYS;

const INCIDENT_COUNT: usize = 25;

const TITLES: [&str; 8] = [
    "Elevated error rate on message handler",
    "Token refresh failures for delegated auth",
    "Latency spike in grounding data fetch",
    "Webhook delivery backlog",
    "Throttling from downstream connector",
    "Manifest CDN serving stale versions",
    "Certificate rotation missed",
    "Search index lagging behind updates",
];

const CAUSE_CATEGORIES: [&str; 5] = [
    "deployment",
    "dependency_outage",
    "quota_exhaustion",
    "certificate_expiry",
    "config_drift",
];

pub fn generate(
    rng: &mut SeededRandom,
    agents: &[Agent],
    now: DateTime<Utc>,
) -> Vec<Incident> {
    let mut incidents = Vec::with_capacity(INCIDENT_COUNT);

    for i in 0..INCIDENT_COUNT {
        let agent = rng.pick(agents);
        let severity = *rng.weighted(
            &[
                IncidentSeverity::Sev3,
                IncidentSeverity::Sev2,
                IncidentSeverity::Sev1,
                IncidentSeverity::Sev0,
            ],
            &[0.40, 0.35, 0.20, 0.05],
        );

        let opened_at = rng.date(now - Duration::days(WINDOW_DAYS), now);
        // 75% resolve within a week of opening; resolution can't be in
        // the future, so late openings stay active.
        let resolution = if rng.chance(0.75) {
            let resolved = opened_at + Duration::seconds((rng.float(1.0, 7.0) * 86_400.0) as i64);
            (resolved <= now).then_some(resolved)
        } else {
            None
        };

        let status = match resolution {
            Some(_) => *rng.weighted(
                &[IncidentStatus::Resolved, IncidentStatus::Closed],
                &[0.6, 0.4],
            ),
            None => *rng.weighted(
                &[IncidentStatus::Open, IncidentStatus::Investigating],
                &[0.5, 0.5],
            ),
        };

        incidents.push(Incident {
            id: IncidentId::new(format!("inc-{:03}", i + 1)),
            agent_id: agent.id.clone(),
            severity,
            title: rng.pick(&TITLES).to_string(),
            cause_category: rng.pick(&CAUSE_CATEGORIES).to_string(),
            opened_at,
            resolved_at: resolution,
            status,
        });
    }

    incidents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{agents, publishers};

    #[test]
    fn test_resolution_follows_status() {
        let publishers = publishers::generate();
        let mut rng = SeededRandom::new(42);
        let now = Utc::now();
        let agents = agents::generate(&mut rng, &publishers, now);
        let incidents = generate(&mut rng, &agents, now);

        assert_eq!(incidents.len(), INCIDENT_COUNT);
        for incident in &incidents {
            match incident.status {
                IncidentStatus::Resolved | IncidentStatus::Closed => {
                    assert!(incident.resolved_at.is_some(), "{} has no end", incident.id);
                }
                IncidentStatus::Open | IncidentStatus::Investigating => {
                    assert!(incident.resolved_at.is_none(), "{} has an end", incident.id);
                }
            }
            if let Some(resolved) = incident.resolved_at {
                assert!(resolved >= incident.opened_at);
            }
        }
    }
}
