//! Agent inventory generator.

use chrono::{DateTime, Duration, Utc};
use pulse_core::{Agent, AgentId, AgentStatus, AgentType, DistributionMethod, Publisher};

use crate::seeded::SeededRandom;

const AGENT_COUNT: usize = 40;

const NAME_PREFIXES: [&str; 10] = [
    "Sales", "Support", "HR", "Finance", "Legal", "Ops", "Marketing", "Security", "Field",
    "Onboarding",
];

const NAME_SUFFIXES: [&str; 6] = [
    "Copilot", "Assistant", "Advisor", "Triage", "Concierge", "Navigator",
];

const CATEGORIES: [&str; 6] = [
    "productivity",
    "crm",
    "itsm",
    "human_resources",
    "finance",
    "developer_tools",
];

pub fn generate(
    rng: &mut SeededRandom,
    publishers: &[Publisher],
    now: DateTime<Utc>,
) -> Vec<Agent> {
    let mut agents = Vec::with_capacity(AGENT_COUNT);

    for i in 0..AGENT_COUNT {
        let publisher = rng.pick(publishers);
        let prefix = *rng.pick(&NAME_PREFIXES);
        let suffix = *rng.pick(&NAME_SUFFIXES);

        let agent_type = *rng.weighted(
            &[
                AgentType::Declarative,
                AgentType::CustomEngine,
                AgentType::MessageExtension,
            ],
            &[0.5, 0.3, 0.2],
        );
        let status = *rng.weighted(
            &[
                AgentStatus::Active,
                AgentStatus::PendingReview,
                AgentStatus::ActionRequired,
                AgentStatus::Draft,
                AgentStatus::Suspended,
            ],
            &[0.55, 0.15, 0.12, 0.10, 0.08],
        );
        let distribution = *rng.weighted(
            &[
                DistributionMethod::Store,
                DistributionMethod::Organization,
                DistributionMethod::Sideload,
            ],
            &[0.6, 0.3, 0.1],
        );

        let created_at = rng.date(now - Duration::days(400), now - Duration::days(30));
        let last_published_at = match status {
            AgentStatus::Active | AgentStatus::ActionRequired | AgentStatus::Suspended => {
                Some(rng.date(created_at, now))
            }
            _ => None,
        };

        agents.push(Agent {
            id: AgentId::new(format!("agent-{:03}", i + 1)),
            name: format!("{} {} {}", publisher.name, prefix, suffix),
            agent_type,
            category: rng.pick(&CATEGORIES).to_string(),
            publisher_id: publisher.id.clone(),
            distribution,
            status,
            created_at,
            last_published_at,
        });
    }

    agents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publishers;

    #[test]
    fn test_agents_reference_known_publishers() {
        let publishers = publishers::generate();
        let mut rng = SeededRandom::new(42);
        let agents = generate(&mut rng, &publishers, Utc::now());

        assert_eq!(agents.len(), AGENT_COUNT);
        for agent in &agents {
            assert!(
                publishers.iter().any(|p| p.id == agent.publisher_id),
                "agent {} points at unknown publisher {}",
                agent.id,
                agent.publisher_id
            );
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let publishers = publishers::generate();
        let now = Utc::now();

        let mut a = SeededRandom::new(7);
        let mut b = SeededRandom::new(7);
        let first = generate(&mut a, &publishers, now);
        let second = generate(&mut b, &publishers, now);

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
