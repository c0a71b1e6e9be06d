//! Turning a stored draft or a published recipe into initial wizard state

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::api::{
    DraftPayload, RecipeApi, RecipeRecord, RecipeSummary, SearchKind, SearchResult, UserSummary,
};

use super::types::{InitialSource, WizardState, WizardStep, IMAGE_SLOTS};

/// Everything needed to seed a wizard, gathered before it is applied
#[derive(Debug, Clone)]
pub struct Hydrated {
    pub source: InitialSource,
    pub step: WizardStep,
    pub state: WizardState,
    /// Display entries for `state.co_cooks`, same order
    pub co_cooks: Vec<SearchResult>,
    /// Display entries for `state.linked_recipes`, same order
    pub linked_recipes: Vec<SearchResult>,
}

/// Copy a published recipe field for field into wizard state
pub fn state_from_record(record: &RecipeRecord) -> WizardState {
    let mut images: [Option<String>; IMAGE_SLOTS] = Default::default();
    for (slot, url) in record.images.iter().take(IMAGE_SLOTS).enumerate() {
        images[slot] = Some(url.clone());
    }

    WizardState {
        category: record.category,
        method: record.method,
        images,
        title: record.title.clone(),
        description: record.description.clone(),
        ingredients: record.ingredients.clone(),
        steps: record.steps.clone(),
        minutes: record.minutes,
        co_cooks: record.co_cooks.clone(),
        linked_recipes: record.linked_recipes.clone(),
        external_video_url: record.external_video_url.clone(),
    }
}

/// Seed from a published recipe. Always restarts at the first step.
pub async fn hydrate_edit(api: &dyn RecipeApi, record: &RecipeRecord) -> Hydrated {
    let state = state_from_record(record);
    let co_cooks = resolve_people(api, &state.co_cooks, record.co_cook_summaries.as_deref()).await;
    let linked_recipes = resolve_recipes(
        api,
        &state.linked_recipes,
        record.linked_recipe_summaries.as_deref(),
    )
    .await;

    Hydrated {
        source: InitialSource::Edit,
        step: WizardStep::Category,
        state,
        co_cooks,
        linked_recipes,
    }
}

/// Seed from a stored draft, resuming at its step. Drafts only carry ids, so
/// display entries always come from the bulk lookups.
pub async fn hydrate_draft(api: &dyn RecipeApi, draft: DraftPayload) -> Hydrated {
    let co_cooks = resolve_people(api, &draft.state.co_cooks, None).await;
    let linked_recipes = resolve_recipes(api, &draft.state.linked_recipes, None).await;

    Hydrated {
        source: InitialSource::Draft,
        step: draft.step,
        state: draft.state,
        co_cooks,
        linked_recipes,
    }
}

async fn resolve_people(
    api: &dyn RecipeApi,
    ids: &[String],
    embedded: Option<&[UserSummary]>,
) -> Vec<SearchResult> {
    if ids.is_empty() {
        return Vec::new();
    }
    let found = match embedded {
        Some(summaries) => summaries.to_vec(),
        None => match api.users_by_ids(ids).await {
            Ok(users) => users,
            Err(e) => {
                warn!(error = %e, count = ids.len(), "User lookup failed, showing ids");
                Vec::new()
            }
        },
    };
    arrange(SearchKind::People, ids, found, |u| &u.id, SearchResult::Person)
}

async fn resolve_recipes(
    api: &dyn RecipeApi,
    ids: &[String],
    embedded: Option<&[RecipeSummary]>,
) -> Vec<SearchResult> {
    if ids.is_empty() {
        return Vec::new();
    }
    let found = match embedded {
        Some(summaries) => summaries.to_vec(),
        None => match api.recipes_by_ids(ids).await {
            Ok(recipes) => recipes,
            Err(e) => {
                warn!(error = %e, count = ids.len(), "Recipe lookup failed, showing ids");
                Vec::new()
            }
        },
    };
    arrange(SearchKind::Recipes, ids, found, |r| &r.id, SearchResult::Recipe)
}

/// Order summaries by the id list; ids without a summary get a placeholder
fn arrange<T>(
    kind: SearchKind,
    ids: &[String],
    found: Vec<T>,
    id_of: impl Fn(&T) -> &String,
    wrap: impl Fn(T) -> SearchResult,
) -> Vec<SearchResult> {
    let mut by_id: HashMap<String, T> = found
        .into_iter()
        .map(|item| (id_of(&item).clone(), item))
        .collect();

    ids.iter()
        .map(|id| match by_id.remove(id) {
            Some(item) => wrap(item),
            None => {
                debug!(id = %id, kind = ?kind, "No summary for related item");
                SearchResult::placeholder(kind, id)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, MockCall, MockRecipeApi};
    use crate::wizard::types::{Category, CookingMethod};

    fn record() -> RecipeRecord {
        RecipeRecord {
            id: "r-1".to_string(),
            author_id: Some("u-0".to_string()),
            category: Some(Category::Dinner),
            method: Some(CookingMethod::Oven),
            title: "Lasagne".to_string(),
            description: "Layers".to_string(),
            ingredients: vec!["pasta".to_string(), "ragu".to_string()],
            steps: vec!["layer".to_string(), "bake".to_string()],
            minutes: 90,
            images: vec!["https://img/1".to_string(), "https://img/2".to_string()],
            co_cooks: vec!["u-1".to_string(), "u-2".to_string()],
            linked_recipes: vec!["r-9".to_string()],
            external_video_url: None,
            co_cook_summaries: None,
            linked_recipe_summaries: None,
        }
    }

    #[test]
    fn test_state_from_record_copies_every_field() {
        let state = state_from_record(&record());
        assert_eq!(state.category, Some(Category::Dinner));
        assert_eq!(state.method, Some(CookingMethod::Oven));
        assert_eq!(state.ingredients, vec!["pasta", "ragu"]);
        assert_eq!(state.minutes, 90);
        assert_eq!(state.images[1].as_deref(), Some("https://img/2"));
        assert!(state.images[2].is_none());
        assert_eq!(state.co_cooks, vec!["u-1", "u-2"]);
    }

    #[tokio::test]
    async fn test_embedded_summaries_skip_lookup() {
        let api = MockRecipeApi::new();
        let mut record = record();
        record.co_cook_summaries = Some(vec![
            UserSummary {
                id: "u-2".to_string(),
                name: "Bea".to_string(),
                avatar_url: None,
            },
            UserSummary {
                id: "u-1".to_string(),
                name: "Ada".to_string(),
                avatar_url: None,
            },
        ]);

        let hydrated = hydrate_edit(&api, &record).await;

        assert_eq!(hydrated.step, WizardStep::Category);
        let labels: Vec<&str> = hydrated.co_cooks.iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["Ada", "Bea"]);
        assert!(!api.calls().iter().any(|c| matches!(c, MockCall::UsersByIds(_))));
        assert!(api.calls().contains(&MockCall::RecipesByIds(vec!["r-9".to_string()])));
    }

    #[tokio::test]
    async fn test_draft_resolves_ids_by_lookup() {
        let api = MockRecipeApi::new();
        api.add_user("u-1", "Ada");
        let draft = DraftPayload {
            step: WizardStep::Images,
            state: WizardState {
                co_cooks: vec!["u-1".to_string(), "u-404".to_string()],
                ..WizardState::default()
            },
        };

        let hydrated = hydrate_draft(&api, draft).await;

        assert_eq!(hydrated.source, InitialSource::Draft);
        assert_eq!(hydrated.step, WizardStep::Images);
        assert_eq!(hydrated.co_cooks[0].label(), "Ada");
        assert_eq!(hydrated.co_cooks[1].label(), "u-404");
        assert!(hydrated.linked_recipes.is_empty());
    }

    #[tokio::test]
    async fn test_failed_lookup_keeps_ids() {
        let api = MockRecipeApi::new();
        api.fail("recipes_by_ids", ApiError::http("recipes", 500, "boom"));

        let hydrated = hydrate_edit(&api, &record()).await;

        assert_eq!(hydrated.linked_recipes.len(), 1);
        assert_eq!(hydrated.linked_recipes[0].id(), "r-9");
        assert_eq!(hydrated.state.linked_recipes, vec!["r-9"]);
    }
}
