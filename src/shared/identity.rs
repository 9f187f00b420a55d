//! Voter Identity
//!
//! A stable per-store identifier used to stop the same client from voting
//! twice on one record. Generated once and persisted by the local store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Locally persisted user/voter identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterIdentity {
    /// Opaque voter id
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl VoterIdentity {
    /// Generate a fresh anonymous identity
    pub fn generate() -> Self {
        Self {
            id: format!("voter_{}", Uuid::new_v4().simple()),
            name: None,
            email: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = VoterIdentity::generate();
        let b = VoterIdentity::generate();
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("voter_"));
    }
}
