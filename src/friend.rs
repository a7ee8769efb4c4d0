use serde::{Deserialize, Serialize};
use std::fmt;

/// Weakest allowed relationship coefficient.
pub const MIN_COEFFICIENT: f64 = 0.1;

/// Strongest allowed relationship coefficient.
pub const MAX_COEFFICIENT: f64 = 1.0;

/// Opaque identifier of a [`Friend`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FriendId(String);

impl FriendId {
    /// Generate a fresh identifier (`friend_<uuid>`).
    pub fn generate() -> Self {
        FriendId(format!("friend_{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FriendId {
    fn from(s: &str) -> Self {
        FriendId(s.to_string())
    }
}

impl From<String> for FriendId {
    fn from(s: String) -> Self {
        FriendId(s)
    }
}

impl fmt::Display for FriendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Someone in the user's network.
///
/// The coefficient (ρ, 0.1–1.0) scales how much of a shared good fortune
/// flows back through this friend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Friend {
    pub id: FriendId,
    pub name: String,
    #[serde(rename = "relationshipCoefficient")]
    pub coefficient: f64,
}

impl Friend {
    /// Create a friend with a fresh id. No range checks.
    pub fn new(name: impl Into<String>, coefficient: f64) -> Self {
        Friend {
            id: FriendId::generate(),
            name: name.into(),
            coefficient,
        }
    }

    pub fn with_id(mut self, id: impl Into<FriendId>) -> Self {
        self.id = id.into();
        self
    }
}
