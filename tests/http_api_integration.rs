//! Integration tests for the HTTP collaborators and the wizard running on them
//!
//! Each test starts a small fake recipe platform with axum on an ephemeral
//! local port, so no external services or environment variables are needed.
//!
//! ```bash
//! cargo test --test http_api_integration -- --nocapture
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::header::{AUTHORIZATION, RETRY_AFTER};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;

use recipe_wizard::api::{
    ApiError, DraftPayload, HttpImageHost, HttpRecipeApi, ImageHost, RecipeApi, SearchKind,
};
use recipe_wizard::config::{RuntimeEnv, WizardConfig};
use recipe_wizard::wizard::{InitialSource, RecipeWizard, WizardMode, WizardState, WizardStep};
use recipe_wizard::RecipeFile;

const TOKEN: &str = "secret";

// ─── Fake platform ────────────────────────────────────────────────────────────

#[derive(Default)]
struct Platform {
    draft: Option<Value>,
    draft_saves: usize,
    recipes: Vec<Value>,
    uploads: Vec<String>,
}

type Shared = Arc<Mutex<Platform>>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

async fn get_draft(State(platform): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let draft = platform.lock().unwrap().draft.clone();
    match draft {
        Some(draft) => Json(draft).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn save_draft(
    State(platform): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut platform = platform.lock().unwrap();
    platform.draft = Some(body);
    platform.draft_saves += 1;
    StatusCode::OK.into_response()
}

async fn delete_draft(State(platform): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let removed = platform.lock().unwrap().draft.take();
    match removed {
        Some(_) => StatusCode::OK.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn reject_blank_title(body: &Value) -> Option<Response> {
    let title = body.get("title").and_then(Value::as_str).unwrap_or("");
    if title.trim().is_empty() {
        let errors = json!({ "errors": [{ "field": "title", "message": "is required" }] });
        return Some((StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response());
    }
    None
}

async fn create_recipe(
    State(platform): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if let Some(rejection) = reject_blank_title(&body) {
        return rejection;
    }
    let mut platform = platform.lock().unwrap();
    body["id"] = json!(format!("r-{}", 100 + platform.recipes.len()));
    platform.recipes.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_recipe(
    State(platform): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    body["id"] = json!(id);
    platform.lock().unwrap().recipes.push(body.clone());
    Json(body).into_response()
}

async fn search(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let q = params.get("q").cloned().unwrap_or_default().to_lowercase();
    let body = match params.get("type").map(String::as_str) {
        Some("users") => {
            let users: Vec<Value> = [("u-1", "Ada Lovelace"), ("u-2", "Grace Hopper")]
                .iter()
                .filter(|(_, name)| name.to_lowercase().contains(&q))
                .map(|(id, name)| json!({ "id": id, "name": name }))
                .collect();
            json!({ "users": users, "recipes": [] })
        }
        Some("recipes") => json!({ "users": [], "recipes": [{ "id": "r-1", "title": "Cornbread" }] }),
        _ => return StatusCode::BAD_REQUEST.into_response(),
    };
    Json(body).into_response()
}

async fn users_multiple(Query(params): Query<HashMap<String, String>>) -> Response {
    let ids = params.get("ids").cloned().unwrap_or_default();
    let users: Vec<Value> = ids
        .split(',')
        .filter(|id| id.starts_with("u-"))
        .map(|id| json!({ "id": id, "name": format!("Cook {}", id) }))
        .collect();
    Json(users).into_response()
}

async fn recipes_multiple() -> Response {
    (StatusCode::TOO_MANY_REQUESTS, [(RETRY_AFTER, "7")]).into_response()
}

async fn upload(State(platform): State<Shared>, mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("image").to_string();
        if field.bytes().await.is_err() {
            return StatusCode::BAD_REQUEST.into_response();
        }
        platform.lock().unwrap().uploads.push(name.clone());
        return Json(json!({ "url": format!("https://cdn.test/{}", name) })).into_response();
    }
    StatusCode::BAD_REQUEST.into_response()
}

struct TestPlatform {
    base_url: String,
    state: Shared,
}

impl TestPlatform {
    async fn start() -> Self {
        let state = Shared::default();
        let app = Router::new()
            .route(
                "/api/draft",
                get(get_draft).post(save_draft).delete(delete_draft),
            )
            .route("/api/recipes", post(create_recipe))
            .route("/api/recipe/:id", patch(update_recipe))
            .route("/api/search", get(search))
            .route("/api/users/multiple", get(users_multiple))
            .route("/api/recipes/multiple", get(recipes_multiple))
            .route("/uploads", post(upload))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    fn api(&self) -> HttpRecipeApi {
        HttpRecipeApi::new(format!("{}/api/", self.base_url), Some(TOKEN.to_string()))
    }

    fn image_host(&self) -> HttpImageHost {
        HttpImageHost::new(format!("{}/uploads", self.base_url), None)
    }
}

fn sample_draft() -> DraftPayload {
    DraftPayload {
        step: WizardStep::Ingredients,
        state: WizardState {
            title: "Weeknight chili".to_string(),
            ingredients: vec!["beans".to_string(), "tomatoes".to_string()],
            co_cooks: vec!["u-1".to_string()],
            ..WizardState::default()
        },
    }
}

// ─── Draft store ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_draft_lifecycle() {
    let platform = TestPlatform::start().await;
    let api = platform.api();

    assert_eq!(api.load_draft().await.unwrap(), None);

    api.save_draft(&sample_draft()).await.unwrap();
    assert_eq!(api.load_draft().await.unwrap(), Some(sample_draft()));

    api.delete_draft().await.unwrap();
    // Deleting a missing draft is not an error
    api.delete_draft().await.unwrap();
    assert_eq!(api.load_draft().await.unwrap(), None);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let platform = TestPlatform::start().await;
    let api = HttpRecipeApi::new(format!("{}/api", platform.base_url), None);

    let err = api.load_draft().await.unwrap_err();
    assert!(err.is_auth_error());
    assert!(matches!(err, ApiError::Unauthorized { .. }));
}

// ─── Recipe lifecycle ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_validation_errors_are_field_scoped() {
    let platform = TestPlatform::start().await;
    let api = platform.api();

    let payload = recipe_wizard::api::RecipePayload {
        category: None,
        method: None,
        title: String::new(),
        description: String::new(),
        ingredients: Vec::new(),
        steps: Vec::new(),
        minutes: 0,
        images: Vec::new(),
        co_cooks: Vec::new(),
        linked_recipes: Vec::new(),
        external_video_url: None,
    };
    let err = api.create_recipe(&payload).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(err.field_errors().len(), 1);
    assert_eq!(err.field_errors()[0].field, "title");
    assert!(platform.state.lock().unwrap().recipes.is_empty());
}

// ─── Search and lookups ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_search_by_kind() {
    let platform = TestPlatform::start().await;
    let api = platform.api();

    let people = api
        .search("grace", SearchKind::People)
        .await
        .unwrap()
        .into_results(SearchKind::People);
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].label(), "Grace Hopper");

    let recipes = api
        .search("corn", SearchKind::Recipes)
        .await
        .unwrap()
        .into_results(SearchKind::Recipes);
    assert_eq!(recipes[0].id(), "r-1");
}

#[tokio::test]
async fn test_bulk_lookups() {
    let platform = TestPlatform::start().await;
    let api = platform.api();

    let users = api
        .users_by_ids(&["u-1".to_string(), "u-7".to_string()])
        .await
        .unwrap();
    let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["u-1", "u-7"]);

    let err = api.recipes_by_ids(&["r-1".to_string()]).await.unwrap_err();
    assert_eq!(err.retry_after(), Some(7));

    // No ids, no request
    assert!(api.recipes_by_ids(&[]).await.unwrap().is_empty());
}

// ─── Image host ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_image_upload_returns_url() {
    let platform = TestPlatform::start().await;
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("chili.jpg");
    std::fs::write(&path, b"not really a jpeg").unwrap();

    let url = platform.image_host().upload(&path).await.unwrap();
    assert_eq!(url, "https://cdn.test/chili.jpg");

    let missing = platform
        .image_host()
        .upload(&temp_dir.path().join("missing.jpg"))
        .await
        .unwrap_err();
    assert!(matches!(missing, ApiError::Io { .. }));
}

// ─── Wizard over HTTP ─────────────────────────────────────────────────────────

fn production_config() -> WizardConfig {
    WizardConfig {
        runtime: RuntimeEnv::Production,
        search_debounce_ms: 0,
        submit_cooldown_ms: 0,
        ..WizardConfig::default()
    }
}

#[tokio::test]
async fn test_wizard_publishes_and_clears_draft() {
    let platform = TestPlatform::start().await;
    let temp_dir = TempDir::new().unwrap();
    let photo = temp_dir.path().join("chili.jpg");
    std::fs::write(&photo, b"jpeg bytes").unwrap();

    let recipe: RecipeFile = toml::from_str(&format!(
        r#"
category = "dinner"
method = "stovetop"
title = "Weeknight chili"
description = "Beans, tomatoes and patience"
minutes = 45
ingredients = ["beans", "tomatoes"]
steps = ["Simmer for 40 minutes"]
co_cooks = ["u-1"]
images = [{:?}]
"#,
        photo.to_string_lossy()
    ))
    .unwrap();

    let mut wizard = RecipeWizard::new(
        production_config(),
        Arc::new(platform.api()),
        Arc::new(platform.image_host()),
    );
    assert_eq!(wizard.open(WizardMode::Create).await, Some(InitialSource::Fresh));

    recipe.fill(&mut wizard).await.unwrap();
    assert_eq!(wizard.step(), WizardStep::Images);
    // One auto-save per forward move from CATEGORY to IMAGES
    assert_eq!(platform.state.lock().unwrap().draft_saves, 6);

    let record = match wizard.submit().await {
        recipe_wizard::WizardOutcome::Submitted(record) => record,
        other => panic!("expected Submitted, got {:?}", other),
    };
    assert_eq!(record.id, "r-100");
    assert_eq!(record.images, vec!["https://cdn.test/chili.jpg"]);
    assert_eq!(record.co_cooks, vec!["u-1"]);

    let state = platform.state.lock().unwrap();
    assert!(state.draft.is_none());
    assert_eq!(state.uploads, vec!["chili.jpg"]);
}

#[tokio::test]
async fn test_wizard_resumes_server_draft() {
    let platform = TestPlatform::start().await;
    platform.api().save_draft(&sample_draft()).await.unwrap();

    let mut wizard = RecipeWizard::new(
        production_config(),
        Arc::new(platform.api()),
        Arc::new(platform.image_host()),
    );
    assert_eq!(wizard.open(WizardMode::Create).await, Some(InitialSource::Draft));

    assert_eq!(wizard.step(), WizardStep::Ingredients);
    assert_eq!(
        wizard.ingredients().slots(),
        &["beans".to_string(), "tomatoes".to_string()]
    );
    let co_cooks = wizard.related().selected(SearchKind::People);
    assert_eq!(co_cooks[0].label(), "Cook u-1");
}
