//! In-memory recipe API and image host for tests

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::error::ApiError;
use super::types::{
    DraftPayload, RecipePayload, RecipeRecord, RecipeSummary, SearchKind, SearchResponse,
    UserSummary,
};
use super::{ImageHost, RecipeApi};

/// A call recorded by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    LoadDraft,
    SaveDraft,
    DeleteDraft,
    CreateRecipe,
    UpdateRecipe(String),
    Search(String, SearchKind),
    UsersByIds(Vec<String>),
    RecipesByIds(Vec<String>),
    Upload(String),
}

impl MockCall {
    /// Whether this call touched the draft store
    pub fn is_draft_call(&self) -> bool {
        matches!(
            self,
            MockCall::LoadDraft | MockCall::SaveDraft | MockCall::DeleteDraft
        )
    }
}

/// Mock implementation of `RecipeApi`
#[derive(Default)]
pub struct MockRecipeApi {
    /// The single draft slot
    pub draft: Arc<Mutex<Option<DraftPayload>>>,
    /// Known users, for search and bulk lookup
    pub users: Arc<Mutex<Vec<UserSummary>>>,
    /// Known recipes, for search and bulk lookup
    pub recipes: Arc<Mutex<Vec<RecipeSummary>>>,
    /// Published recipes by id
    pub published: Arc<Mutex<HashMap<String, RecipeRecord>>>,
    /// Errors to return, keyed by operation name ("load_draft", "create_recipe", ...)
    pub failures: Arc<Mutex<HashMap<&'static str, ApiError>>>,
    /// Record of calls executed
    pub call_log: Arc<Mutex<Vec<MockCall>>>,
    next_id: Arc<Mutex<u64>>,
}

impl MockRecipeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a stored draft
    pub fn with_draft(draft: DraftPayload) -> Self {
        let mock = Self::new();
        *mock.draft.lock().unwrap() = Some(draft);
        mock
    }

    pub fn add_user(&self, id: &str, name: &str) {
        self.users.lock().unwrap().push(UserSummary {
            id: id.to_string(),
            name: name.to_string(),
            avatar_url: None,
        });
    }

    pub fn add_recipe(&self, id: &str, title: &str) {
        self.recipes.lock().unwrap().push(RecipeSummary {
            id: id.to_string(),
            title: title.to_string(),
            image_url: None,
        });
    }

    /// Make `operation` fail with `error` until cleared
    pub fn fail(&self, operation: &'static str, error: ApiError) {
        self.failures.lock().unwrap().insert(operation, error);
    }

    pub fn clear_failure(&self, operation: &'static str) {
        self.failures.lock().unwrap().remove(operation);
    }

    pub fn stored_draft(&self) -> Option<DraftPayload> {
        self.draft.lock().unwrap().clone()
    }

    /// Get the call log
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of calls that touched the draft store
    pub fn draft_calls(&self) -> usize {
        self.calls().iter().filter(|c| c.is_draft_call()).count()
    }

    fn record(&self, call: MockCall) {
        self.call_log.lock().unwrap().push(call);
    }

    fn check(&self, operation: &'static str) -> Result<(), ApiError> {
        match self.failures.lock().unwrap().get(operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn to_record(&self, id: String, payload: &RecipePayload) -> RecipeRecord {
        RecipeRecord {
            id,
            author_id: Some("mock-user".to_string()),
            category: payload.category,
            method: payload.method,
            title: payload.title.clone(),
            description: payload.description.clone(),
            ingredients: payload.ingredients.clone(),
            steps: payload.steps.clone(),
            minutes: payload.minutes,
            images: payload.images.clone(),
            co_cooks: payload.co_cooks.clone(),
            linked_recipes: payload.linked_recipes.clone(),
            external_video_url: payload.external_video_url.clone(),
            co_cook_summaries: None,
            linked_recipe_summaries: None,
        }
    }
}

#[async_trait]
impl RecipeApi for MockRecipeApi {
    async fn load_draft(&self) -> Result<Option<DraftPayload>, ApiError> {
        self.record(MockCall::LoadDraft);
        self.check("load_draft")?;
        Ok(self.draft.lock().unwrap().clone())
    }

    async fn save_draft(&self, draft: &DraftPayload) -> Result<(), ApiError> {
        self.record(MockCall::SaveDraft);
        self.check("save_draft")?;
        *self.draft.lock().unwrap() = Some(draft.clone());
        Ok(())
    }

    async fn delete_draft(&self) -> Result<(), ApiError> {
        self.record(MockCall::DeleteDraft);
        self.check("delete_draft")?;
        *self.draft.lock().unwrap() = None;
        Ok(())
    }

    async fn create_recipe(&self, payload: &RecipePayload) -> Result<RecipeRecord, ApiError> {
        self.record(MockCall::CreateRecipe);
        self.check("create_recipe")?;
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            format!("recipe-{}", *next)
        };
        let record = self.to_record(id.clone(), payload);
        self.published.lock().unwrap().insert(id, record.clone());
        Ok(record)
    }

    async fn update_recipe(
        &self,
        id: &str,
        payload: &RecipePayload,
    ) -> Result<RecipeRecord, ApiError> {
        self.record(MockCall::UpdateRecipe(id.to_string()));
        self.check("update_recipe")?;
        let record = self.to_record(id.to_string(), payload);
        self.published
            .lock()
            .unwrap()
            .insert(id.to_string(), record.clone());
        Ok(record)
    }

    async fn search(&self, query: &str, kind: SearchKind) -> Result<SearchResponse, ApiError> {
        self.record(MockCall::Search(query.to_string(), kind));
        self.check("search")?;
        let needle = query.to_lowercase();
        let mut response = SearchResponse::default();
        match kind {
            SearchKind::People => {
                response.users = self
                    .users
                    .lock()
                    .unwrap()
                    .iter()
                    .filter(|u| u.name.to_lowercase().contains(&needle))
                    .cloned()
                    .collect();
            }
            SearchKind::Recipes => {
                response.recipes = self
                    .recipes
                    .lock()
                    .unwrap()
                    .iter()
                    .filter(|r| r.title.to_lowercase().contains(&needle))
                    .cloned()
                    .collect();
            }
        }
        Ok(response)
    }

    async fn users_by_ids(&self, ids: &[String]) -> Result<Vec<UserSummary>, ApiError> {
        self.record(MockCall::UsersByIds(ids.to_vec()));
        self.check("users_by_ids")?;
        let users = self.users.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| users.iter().find(|u| &u.id == id).cloned())
            .collect())
    }

    async fn recipes_by_ids(&self, ids: &[String]) -> Result<Vec<RecipeSummary>, ApiError> {
        self.record(MockCall::RecipesByIds(ids.to_vec()));
        self.check("recipes_by_ids")?;
        let recipes = self.recipes.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| recipes.iter().find(|r| &r.id == id).cloned())
            .collect())
    }
}

/// Mock implementation of `ImageHost` that hands out predictable URLs
#[derive(Default)]
pub struct MockImageHost {
    pub uploads: Arc<Mutex<Vec<String>>>,
    pub failure: Arc<Mutex<Option<ApiError>>>,
}

impl MockImageHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageHost for MockImageHost {
    async fn upload(&self, file: &Path) -> Result<String, ApiError> {
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.uploads.lock().unwrap().push(name.clone());
        Ok(format!("https://images.example/{}", name))
    }
}
