//! Voter identity persistence
//!
//! One JSON object under the identity key. Read before every vote.

use crate::client::local_db::PendingStore;
use crate::shared::identity::VoterIdentity;

impl PendingStore {
    /// Stored identity, if any
    pub async fn get_identity(&self) -> Option<VoterIdentity> {
        let raw = match self.store.get(&self.identity_key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Failed to read voter identity: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::warn!("Discarding corrupt voter identity: {}", e);
                None
            }
        }
    }

    pub async fn save_identity(&self, identity: &VoterIdentity) {
        let json = match serde_json::to_string(identity) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize voter identity: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(&self.identity_key, &json).await {
            tracing::warn!("Failed to save voter identity: {}", e);
        }
    }

    pub async fn clear_identity(&self) {
        if let Err(e) = self.store.remove(&self.identity_key).await {
            tracing::warn!("Failed to clear voter identity: {}", e);
        }
    }

    /// Stable voter id, generated and saved on first use
    ///
    /// If the identity cannot be persisted the generated id is still
    /// returned, so voting works for the rest of the session.
    pub async fn voter_id(&self) -> String {
        if let Some(identity) = self.get_identity().await {
            return identity.id;
        }
        let identity = VoterIdentity::generate();
        self.save_identity(&identity).await;
        tracing::debug!("Generated voter identity {}", identity.id);
        identity.id
    }
}
