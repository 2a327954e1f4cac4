/// Value objects for the jobs domain
use serde::{Deserialize, Serialize};

/// A logical partition of the advisory-lock namespace.
///
/// Each space maps to a fixed 64-bit key that every process in the fleet
/// agrees on out of band; the key is the lock identity inside PostgreSQL.
/// New spaces may be added, but an existing key must never be reassigned:
/// two deployments disagreeing on a key would silently stop excluding each
/// other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Space {
    Worker,
    Brain,
    Web,
    Crawler,
}

impl Space {
    pub const ALL: [Space; 4] = [Space::Worker, Space::Brain, Space::Web, Space::Crawler];

    /// The stable advisory-lock key for this space.
    pub fn oid(self) -> i64 {
        match self {
            Space::Worker => 1,
            Space::Brain => 2,
            Space::Web => 3,
            Space::Crawler => 4,
        }
    }

    /// Reverse lookup, used when reading audit rows back.
    pub fn from_oid(oid: i64) -> Option<Space> {
        Space::ALL.iter().copied().find(|space| space.oid() == oid)
    }
}

impl std::fmt::Display for Space {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Space::Worker => write!(f, "worker"),
            Space::Brain => write!(f, "brain"),
            Space::Web => write!(f, "web"),
            Space::Crawler => write!(f, "crawler"),
        }
    }
}

impl std::str::FromStr for Space {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "worker" => Ok(Space::Worker),
            "brain" => Ok(Space::Brain),
            "web" => Ok(Space::Web),
            "crawler" => Ok(Space::Crawler),
            _ => Err(format!("Invalid space: {}", s)),
        }
    }
}
