//! Per-user draft slot on the recipe platform

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{ApiError, DraftPayload, RecipeApi};

/// Thin wrapper over the draft endpoints of `RecipeApi`
#[derive(Clone)]
pub struct DraftClient {
    api: Arc<dyn RecipeApi>,
}

impl DraftClient {
    pub fn new(api: Arc<dyn RecipeApi>) -> Self {
        Self { api }
    }

    /// Upsert the user's draft; the previous one is overwritten
    pub async fn save(&self, draft: &DraftPayload) -> Result<(), ApiError> {
        debug!(step = ?draft.step, "Saving draft");
        match self.api.save_draft(draft).await {
            Ok(()) => {
                info!(step = ?draft.step, "Draft saved");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to save draft");
                Err(e)
            }
        }
    }

    /// Fetch the user's draft; `Ok(None)` when there is none
    pub async fn load(&self) -> Result<Option<DraftPayload>, ApiError> {
        match self.api.load_draft().await {
            Ok(Some(draft)) => {
                info!(step = ?draft.step, "Resuming draft");
                Ok(Some(draft))
            }
            Ok(None) => {
                debug!("No draft stored");
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load draft");
                Err(e)
            }
        }
    }

    /// Remove the user's draft; succeeds when none exists
    pub async fn delete(&self) -> Result<(), ApiError> {
        match self.api.delete_draft().await {
            Ok(()) => {
                info!("Draft deleted");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to delete draft");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockCall, MockRecipeApi};
    use crate::wizard::types::{WizardState, WizardStep};

    fn draft(step: WizardStep, title: &str) -> DraftPayload {
        DraftPayload {
            step,
            state: WizardState {
                title: title.to_string(),
                ..WizardState::default()
            },
        }
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_draft() {
        let api = Arc::new(MockRecipeApi::new());
        let client = DraftClient::new(api.clone());

        client.save(&draft(WizardStep::Description, "First")).await.unwrap();
        client.save(&draft(WizardStep::Steps, "Second")).await.unwrap();

        let stored = client.load().await.unwrap().unwrap();
        assert_eq!(stored.step, WizardStep::Steps);
        assert_eq!(stored.state.title, "Second");
    }

    #[tokio::test]
    async fn test_load_without_draft_is_none() {
        let api = Arc::new(MockRecipeApi::new());
        let client = DraftClient::new(api.clone());
        assert!(client.load().await.unwrap().is_none());
        assert_eq!(api.calls(), vec![MockCall::LoadDraft]);
    }

    #[tokio::test]
    async fn test_delete_is_safe_without_draft() {
        let api = Arc::new(MockRecipeApi::new());
        let client = DraftClient::new(api.clone());
        assert!(client.delete().await.is_ok());
    }

    #[tokio::test]
    async fn test_save_failure_is_returned() {
        let api = Arc::new(MockRecipeApi::new());
        api.fail("save_draft", ApiError::network("recipes", "connection reset"));
        let client = DraftClient::new(api.clone());

        let err = client
            .save(&draft(WizardStep::Category, ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Network { .. }));
        assert!(api.stored_draft().is_none());
    }
}
