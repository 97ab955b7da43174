//! Hand-authored publisher roster.
//!
//! Eight fixed records, deliberately not randomized: they anchor the rest
//! of the dataset and keep demo narratives stable.

use chrono::{DateTime, TimeZone, Utc};
use pulse_core::{Publisher, PublisherId, PublisherTier};

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn generate() -> Vec<Publisher> {
    vec![
        Publisher {
            id: PublisherId::from("pub-001"),
            name: "Contoso Ltd".to_string(),
            tier: PublisherTier::Strategic,
            region: "North America".to_string(),
            support_plan: "premier".to_string(),
            contact_email: "platform@contoso.example".to_string(),
            created_at: day(2022, 3, 14),
        },
        Publisher {
            id: PublisherId::from("pub-002"),
            name: "Fabrikam Inc".to_string(),
            tier: PublisherTier::Strategic,
            region: "Europe".to_string(),
            support_plan: "premier".to_string(),
            contact_email: "devops@fabrikam.example".to_string(),
            created_at: day(2022, 7, 2),
        },
        Publisher {
            id: PublisherId::from("pub-003"),
            name: "Adventure Works".to_string(),
            tier: PublisherTier::Standard,
            region: "North America".to_string(),
            support_plan: "standard".to_string(),
            contact_email: "apps@adventure-works.example".to_string(),
            created_at: day(2023, 1, 19),
        },
        Publisher {
            id: PublisherId::from("pub-004"),
            name: "Northwind Traders".to_string(),
            tier: PublisherTier::Standard,
            region: "Europe".to_string(),
            support_plan: "standard".to_string(),
            contact_email: "publishing@northwind.example".to_string(),
            created_at: day(2023, 5, 8),
        },
        Publisher {
            id: PublisherId::from("pub-005"),
            name: "Proseware".to_string(),
            tier: PublisherTier::Standard,
            region: "Asia Pacific".to_string(),
            support_plan: "standard".to_string(),
            contact_email: "release@proseware.example".to_string(),
            created_at: day(2023, 9, 27),
        },
        Publisher {
            id: PublisherId::from("pub-006"),
            name: "Tailspin Toys".to_string(),
            tier: PublisherTier::Emerging,
            region: "North America".to_string(),
            support_plan: "basic".to_string(),
            contact_email: "dev@tailspin.example".to_string(),
            created_at: day(2024, 2, 11),
        },
        Publisher {
            id: PublisherId::from("pub-007"),
            name: "Wide World Importers".to_string(),
            tier: PublisherTier::Emerging,
            region: "South America".to_string(),
            support_plan: "basic".to_string(),
            contact_email: "tech@wideworld.example".to_string(),
            created_at: day(2024, 6, 30),
        },
        Publisher {
            id: PublisherId::from("pub-008"),
            name: "Lamplight Labs".to_string(),
            tier: PublisherTier::Emerging,
            region: "Asia Pacific".to_string(),
            support_plan: "basic".to_string(),
            contact_email: "hello@lamplight.example".to_string(),
            created_at: day(2024, 11, 5),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_is_fixed() {
        let publishers = generate();
        assert_eq!(publishers.len(), 8);
        assert_eq!(publishers[0].id.as_str(), "pub-001");
        // Two calls are identical: no randomness involved.
        let again = generate();
        assert_eq!(
            serde_json::to_string(&publishers).unwrap(),
            serde_json::to_string(&again).unwrap()
        );
    }
}
