//! Unified error model. The `AREA/detail` display form feeds log lines
//! and API error bodies.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    /// Malformed or unusable caller input.
    #[error("BADREQ/{0}")]
    BadRequest(String),

    #[error("NOTFOUND/{0}")]
    NotFound(String),

    /// Internal failure surfaced at the API boundary.
    #[error("API/{0}")]
    Api(String),
}

impl PulseError {
    pub fn not_found(kind: &str, id: &str) -> Self {
        Self::NotFound(format!("{} '{}'", kind, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_area_prefix() {
        let err = PulseError::not_found("agent", "agent-099");
        assert_eq!(err.to_string(), "NOTFOUND/agent 'agent-099'");
    }
}
