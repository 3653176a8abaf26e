//! Session identity and focus types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a registered session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a session's router pair currently owns the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusState {
    /// Input is dropped and output is discarded
    Inactive,
    /// Input is delivered and output reaches the screen
    Active,
}

impl FocusState {
    /// True for [`FocusState::Active`].
    pub fn is_active(self) -> bool {
        self == FocusState::Active
    }
}

impl From<bool> for FocusState {
    fn from(active: bool) -> Self {
        if active {
            FocusState::Active
        } else {
            FocusState::Inactive
        }
    }
}

/// Snapshot of a registered session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Session identifier
    pub id: SessionId,
    /// Display name
    pub name: String,
    /// Position in registration order
    pub index: usize,
    /// Current focus
    pub focus: FocusState,
}
