//! The generated dataset as one explicit, shareable value.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use pulse_core::{
    Agent, AgentId, DailySnapshot, Incident, Publisher, PublisherId, Submission,
};

use crate::seeded::SeededRandom;
use crate::{agents, incidents, publishers, snapshots, submissions, DEFAULT_SEED};

/// Process-wide default dataset, generated on first use with the default
/// seed. Prefer passing an explicit `Dataset` where you can; tests build
/// isolated ones with `Dataset::generate`.
pub static SHARED: Lazy<Dataset> = Lazy::new(|| Dataset::generate(DEFAULT_SEED));

/// Immutable synthetic dataset. Generated once; never mutated.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub seed: u64,
    pub generated_at: DateTime<Utc>,
    pub publishers: Vec<Publisher>,
    pub agents: Vec<Agent>,
    pub submissions: Vec<Submission>,
    pub incidents: Vec<Incident>,
    pub snapshots: Vec<DailySnapshot>,
}

impl Dataset {
    /// Generate the full dataset anchored at the current instant.
    pub fn generate(seed: u64) -> Self {
        Self::generate_at(seed, Utc::now())
    }

    /// Generate with an explicit anchor, for reproducible tests.
    pub fn generate_at(seed: u64, now: DateTime<Utc>) -> Self {
        let mut rng = SeededRandom::new(seed);

        let publishers = publishers::generate();
        let agents = agents::generate(&mut rng, &publishers, now);
        let submissions = submissions::generate(&mut rng, &agents, now);
        let incidents = incidents::generate(&mut rng, &agents, now);
        let snapshots = snapshots::generate(&mut rng, &submissions, &incidents, now);

        tracing::debug!(
            seed,
            agents = agents.len(),
            submissions = submissions.len(),
            incidents = incidents.len(),
            "dataset generated"
        );

        Self {
            seed,
            generated_at: now,
            publishers,
            agents,
            submissions,
            incidents,
            snapshots,
        }
    }

    pub fn agent(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| &a.id == id)
    }

    pub fn publisher(&self, id: &PublisherId) -> Option<&Publisher> {
        self.publishers.iter().find(|p| &p.id == id)
    }

    /// Agents owned by one publisher.
    pub fn agents_of(&self, publisher: &PublisherId) -> Vec<&Agent> {
        self.agents
            .iter()
            .filter(|a| &a.publisher_id == publisher)
            .collect()
    }
}
