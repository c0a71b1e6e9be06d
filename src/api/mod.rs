//! Collaborators consumed by the wizard: the recipe platform API and the image host.

pub mod error;
pub mod http;
pub mod mock;
pub mod types;

pub use error::{ApiError, FieldViolation};
pub use http::{HttpImageHost, HttpRecipeApi};
pub use mock::{MockCall, MockImageHost, MockRecipeApi};
pub use types::{
    DraftPayload, RecipePayload, RecipeRecord, RecipeSummary, SearchKind, SearchResponse,
    SearchResult, UserSummary,
};

use std::path::Path;

use async_trait::async_trait;

/// The recipe platform as seen by the wizard
#[async_trait]
pub trait RecipeApi: Send + Sync {
    /// Fetch the signed-in user's draft (`GET /draft`); `None` when there is none
    async fn load_draft(&self) -> Result<Option<DraftPayload>, ApiError>;

    /// Create or overwrite the user's draft (`POST /draft`)
    async fn save_draft(&self, draft: &DraftPayload) -> Result<(), ApiError>;

    /// Remove the user's draft (`DELETE /draft`); succeeds when none exists
    async fn delete_draft(&self) -> Result<(), ApiError>;

    /// Publish a new recipe (`POST /recipes`)
    async fn create_recipe(&self, payload: &RecipePayload) -> Result<RecipeRecord, ApiError>;

    /// Update a published recipe (`PATCH /recipe/{id}`)
    async fn update_recipe(
        &self,
        id: &str,
        payload: &RecipePayload,
    ) -> Result<RecipeRecord, ApiError>;

    /// Related-content search (`GET /search?q=&type=`)
    async fn search(&self, query: &str, kind: SearchKind) -> Result<SearchResponse, ApiError>;

    /// Bulk user lookup (`GET /users/multiple?ids=`)
    async fn users_by_ids(&self, ids: &[String]) -> Result<Vec<UserSummary>, ApiError>;

    /// Bulk recipe lookup (`GET /recipes/multiple?ids=`)
    async fn recipes_by_ids(&self, ids: &[String]) -> Result<Vec<RecipeSummary>, ApiError>;
}

/// External asset host that stores an image and hands back a stable URL
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, file: &Path) -> Result<String, ApiError>;
}
