//! Per-user preference document operations

use tracing::debug;

use crate::domain::preference::{Preference, PreferenceDraft, PreferencePatch, PreferenceResponse};
use crate::domain::storage::Entity;
use crate::domain::{DomainError, EntityId};

use super::cached::CachedRepository;

impl CachedRepository<Preference> {
    /// Reads the preference document of a user
    pub async fn read_for_user(&self, user_id: &EntityId) -> Result<PreferenceResponse, DomainError> {
        self.read_by_parent(user_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::not_found(format!("No preference found for user {}", user_id)))
    }

    /// Creates the user's preference document, or merges the draft into the
    /// existing one. Either path ends with the regular refresh sweep.
    pub async fn upsert_for_user(
        &self,
        draft: PreferenceDraft,
    ) -> Result<PreferenceResponse, DomainError> {
        let user_id = serde_json::Value::String(draft.user_id.to_string());
        let existing = self.store.find_by_field("user_id", &user_id).await?;

        match existing.first() {
            Some(preference) => {
                debug!(user_id = %draft.user_id, id = %preference.id(), "Updating existing preference");
                let id = preference.id().clone();
                self.update(&id, PreferencePatch::from(draft)).await
            }
            None => {
                debug!(user_id = %draft.user_id, "Creating preference");
                self.create(draft).await
            }
        }
    }
}
