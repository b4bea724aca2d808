//! Generation identifiers used to correlate a call with caller-side traces.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenerationId(pub Uuid);

impl GenerationId {
    /// Create a new random generation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a generation ID from a specific UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for GenerationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GenerationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
