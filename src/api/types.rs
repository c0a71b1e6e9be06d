//! Wire types exchanged with the recipe platform

use serde::{Deserialize, Serialize};

use crate::wizard::types::{Category, CookingMethod, WizardState, WizardStep};

/// Server-side snapshot of an in-progress recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPayload {
    /// Step the author was on when the draft was saved
    pub step: WizardStep,
    /// Field values, with committed ingredient/step lists
    pub state: WizardState,
}

/// Materialized body of `POST /recipes` and `PATCH /recipe/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePayload {
    pub category: Option<Category>,
    pub method: Option<CookingMethod>,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub minutes: u32,
    /// Dense, ordered image URLs
    pub images: Vec<String>,
    pub co_cooks: Vec<String>,
    pub linked_recipes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_video_url: Option<String>,
}

/// A published recipe as returned by the lifecycle endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRecord {
    pub id: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub method: Option<CookingMethod>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub images: Vec<String>,
    /// Co-cook user ids
    #[serde(default)]
    pub co_cooks: Vec<String>,
    /// Linked recipe ids
    #[serde(default)]
    pub linked_recipes: Vec<String>,
    #[serde(default)]
    pub external_video_url: Option<String>,
    /// Embedded display data for `co_cooks`, when the server includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co_cook_summaries: Option<Vec<UserSummary>>,
    /// Embedded display data for `linked_recipes`, when the server includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_recipe_summaries: Option<Vec<RecipeSummary>>,
}

/// Display data for a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Display data for a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Which of the two related-content sets a search or selection targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    #[default]
    People,
    Recipes,
}

impl SearchKind {
    /// Value of the `type` query parameter on `GET /search`
    pub fn query_value(&self) -> &'static str {
        match self {
            SearchKind::People => "users",
            SearchKind::Recipes => "recipes",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SearchKind::People => "co-cooks",
            SearchKind::Recipes => "linked recipes",
        }
    }
}

/// A single related-content hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchResult {
    Person(UserSummary),
    Recipe(RecipeSummary),
}

impl SearchResult {
    pub fn id(&self) -> &str {
        match self {
            SearchResult::Person(user) => &user.id,
            SearchResult::Recipe(recipe) => &recipe.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SearchResult::Person(user) => &user.name,
            SearchResult::Recipe(recipe) => &recipe.title,
        }
    }

    pub fn kind(&self) -> SearchKind {
        match self {
            SearchResult::Person(_) => SearchKind::People,
            SearchResult::Recipe(_) => SearchKind::Recipes,
        }
    }

    /// Placeholder used when only the id is known
    pub fn placeholder(kind: SearchKind, id: &str) -> Self {
        match kind {
            SearchKind::People => SearchResult::Person(UserSummary {
                id: id.to_string(),
                name: id.to_string(),
                avatar_url: None,
            }),
            SearchKind::Recipes => SearchResult::Recipe(RecipeSummary {
                id: id.to_string(),
                title: id.to_string(),
                image_url: None,
            }),
        }
    }
}

/// Body of `GET /search`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub users: Vec<UserSummary>,
    #[serde(default)]
    pub recipes: Vec<RecipeSummary>,
}

impl SearchResponse {
    /// Flatten into tagged results for one kind
    pub fn into_results(self, kind: SearchKind) -> Vec<SearchResult> {
        match kind {
            SearchKind::People => self.users.into_iter().map(SearchResult::Person).collect(),
            SearchKind::Recipes => self
                .recipes
                .into_iter()
                .map(SearchResult::Recipe)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_identity() {
        let result = SearchResult::Person(UserSummary {
            id: "u-1".to_string(),
            name: "Ada".to_string(),
            avatar_url: None,
        });
        assert_eq!(result.id(), "u-1");
        assert_eq!(result.label(), "Ada");
        assert_eq!(result.kind(), SearchKind::People);
    }

    #[test]
    fn test_search_result_tagged_on_the_wire() {
        let result = SearchResult::Recipe(RecipeSummary {
            id: "r-9".to_string(),
            title: "Shakshuka".to_string(),
            image_url: None,
        });
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["kind"], "recipe");
        assert_eq!(value["title"], "Shakshuka");
    }

    #[test]
    fn test_search_response_keeps_only_requested_kind() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"users":[{"id":"u-1","name":"Ada"}],"recipes":[{"id":"r-1","title":"Soup"}]}"#,
        )
        .unwrap();
        let results = response.into_results(SearchKind::Recipes);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind(), SearchKind::Recipes);
    }

    #[test]
    fn test_search_kind_query_value() {
        assert_eq!(SearchKind::People.query_value(), "users");
        assert_eq!(SearchKind::Recipes.query_value(), "recipes");
    }

    #[test]
    fn test_record_without_summaries_parses() {
        let record: RecipeRecord =
            serde_json::from_str(r#"{"id":"r-1","title":"Soup","coCooks":["u-1"]}"#).unwrap();
        assert_eq!(record.co_cooks, vec!["u-1".to_string()]);
        assert!(record.co_cook_summaries.is_none());
    }
}
