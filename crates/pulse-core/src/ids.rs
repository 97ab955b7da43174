//! Branded identifier newtypes.
//!
//! Each entity family gets its own string-payload wrapper so an `AgentId`
//! can never be handed to an API expecting a `PublisherId`. The brand is a
//! compile-time contract only; no runtime validation of the payload.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! branded_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

branded_id!(
    /// Identifier of a publisher record.
    PublisherId
);
branded_id!(
    /// Identifier of an agent record.
    AgentId
);
branded_id!(
    /// Identifier of a submission record.
    SubmissionId
);
branded_id!(
    /// Identifier of an incident record.
    IncidentId
);
branded_id!(
    /// Identifier of a validation finding.
    FindingId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = AgentId::new("agent-001");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"agent-001\"");

        let back: AgentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_display_roundtrip() {
        let id = SubmissionId::from("sub-042");
        assert_eq!(id.to_string(), "sub-042");
        assert_eq!(id.as_str(), "sub-042");
    }
}
