//! Preload session state machine

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Tab alive, idle timer running
    Active,
    /// Tab handed to the caller
    Consumed,
    /// Idle timer fired, tab destroyed
    Expired,
    /// Explicitly discarded, tab destroyed
    Discarded,
}

impl SessionState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        match (self, target) {
            // Touch keeps the session active
            (SessionState::Active, SessionState::Active) => true,
            (SessionState::Active, SessionState::Consumed) => true,
            (SessionState::Active, SessionState::Expired) => true,
            (SessionState::Active, SessionState::Discarded) => true,
            // Consumed, Expired and Discarded are terminal
            _ => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionState::Active)
    }

    /// Returns true if the tab was destroyed rather than handed off
    pub fn destroys_tab(&self) -> bool {
        matches!(self, SessionState::Expired | SessionState::Discarded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Active => "active",
            SessionState::Consumed => "consumed",
            SessionState::Expired => "expired",
            SessionState::Discarded => "discarded",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
