//! reqwest-backed implementations of the recipe API and image host

use std::env;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::error::{ApiError, FieldViolation};
use super::types::{
    DraftPayload, RecipePayload, RecipeRecord, RecipeSummary, SearchKind, SearchResponse,
    UserSummary,
};
use super::{ImageHost, RecipeApi};
use crate::config::ApiConfig;

const SERVICE_NAME: &str = "recipes";
const IMAGE_SERVICE_NAME: &str = "images";

/// HTTP client for the recipe platform
pub struct HttpRecipeApi {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl HttpRecipeApi {
    /// Create a client for `base_url` with an optional bearer token
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self::with_client(base_url, token, Client::new())
    }

    fn with_client(base_url: impl Into<String>, token: Option<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token,
            client,
        }
    }

    /// Create from config; the token is read from the env var named in `token_env`
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let token = env::var(&config.token_env).ok().filter(|t| !t.is_empty());
        if token.is_none() {
            debug!(env = %config.token_env, "No API token set, requests will be anonymous");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::network(SERVICE_NAME, e.to_string()))?;

        Ok(Self::with_client(config.base_url.clone(), token, client))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, resource: &str) -> Result<Response, ApiError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| ApiError::network(SERVICE_NAME, e.to_string()))?;

        check_status(SERVICE_NAME, resource, response).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<T, ApiError> {
        let response = self.send(request, resource).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::decode(SERVICE_NAME, e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ValidationBody {
    #[serde(default)]
    errors: Vec<FieldViolation>,
}

/// Map a non-success response onto an `ApiError`; pass successful ones through
async fn check_status(
    service: &str,
    resource: &str,
    response: Response,
) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();

    match status {
        StatusCode::UNAUTHORIZED => Err(ApiError::unauthorized(service)),
        StatusCode::FORBIDDEN => Err(ApiError::forbidden(service)),
        StatusCode::NOT_FOUND => Err(ApiError::not_found(service, resource)),
        StatusCode::TOO_MANY_REQUESTS => Err(ApiError::rate_limited(service, retry_after)),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            match serde_json::from_str::<ValidationBody>(&body) {
                Ok(parsed) if !parsed.errors.is_empty() => {
                    Err(ApiError::validation(service, parsed.errors))
                }
                _ => Err(ApiError::http(service, status.as_u16(), body)),
            }
        }
        _ => Err(ApiError::http(service, status.as_u16(), body)),
    }
}

#[async_trait]
impl RecipeApi for HttpRecipeApi {
    async fn load_draft(&self) -> Result<Option<DraftPayload>, ApiError> {
        debug!("GET /draft");
        let request = self.client.get(self.url("/draft"));
        let response = match self.send(request, "draft").await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::network(SERVICE_NAME, e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str::<Option<DraftPayload>>(&body)
            .map_err(|e| ApiError::decode(SERVICE_NAME, e.to_string()))
    }

    async fn save_draft(&self, draft: &DraftPayload) -> Result<(), ApiError> {
        debug!(step = ?draft.step, "POST /draft");
        let request = self.client.post(self.url("/draft")).json(draft);
        self.send(request, "draft").await?;
        Ok(())
    }

    async fn delete_draft(&self) -> Result<(), ApiError> {
        debug!("DELETE /draft");
        let request = self.client.delete(self.url("/draft"));
        match self.send(request, "draft").await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn create_recipe(&self, payload: &RecipePayload) -> Result<RecipeRecord, ApiError> {
        debug!(title = %payload.title, "POST /recipes");
        let request = self.client.post(self.url("/recipes")).json(payload);
        self.send_json(request, "recipes").await
    }

    async fn update_recipe(
        &self,
        id: &str,
        payload: &RecipePayload,
    ) -> Result<RecipeRecord, ApiError> {
        debug!(id, "PATCH /recipe/{{id}}");
        let path = format!("/recipe/{}", id);
        let request = self.client.patch(self.url(&path)).json(payload);
        self.send_json(request, &format!("recipe {}", id)).await
    }

    async fn search(&self, query: &str, kind: SearchKind) -> Result<SearchResponse, ApiError> {
        debug!(query, kind = kind.query_value(), "GET /search");
        let request = self
            .client
            .get(self.url("/search"))
            .query(&[("q", query), ("type", kind.query_value())]);
        self.send_json(request, "search").await
    }

    async fn users_by_ids(&self, ids: &[String]) -> Result<Vec<UserSummary>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        debug!(count = ids.len(), "GET /users/multiple");
        let request = self
            .client
            .get(self.url("/users/multiple"))
            .query(&[("ids", ids.join(","))]);
        self.send_json(request, "users").await
    }

    async fn recipes_by_ids(&self, ids: &[String]) -> Result<Vec<RecipeSummary>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        debug!(count = ids.len(), "GET /recipes/multiple");
        let request = self
            .client
            .get(self.url("/recipes/multiple"))
            .query(&[("ids", ids.join(","))]);
        self.send_json(request, "recipes").await
    }
}

/// Multipart uploader for the external image host
pub struct HttpImageHost {
    upload_url: String,
    token: Option<String>,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

impl HttpImageHost {
    pub fn new(upload_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            upload_url: upload_url.into(),
            token,
            client: Client::new(),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let token = env::var(&config.token_env).ok().filter(|t| !t.is_empty());
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::network(IMAGE_SERVICE_NAME, e.to_string()))?;
        Ok(Self {
            upload_url: config.image_host_url.clone(),
            token,
            client,
        })
    }
}

#[async_trait]
impl ImageHost for HttpImageHost {
    async fn upload(&self, file: &Path) -> Result<String, ApiError> {
        let bytes = tokio::fs::read(file).await.map_err(|e| {
            ApiError::io(
                IMAGE_SERVICE_NAME,
                format!("Cannot read {}: {}", file.display(), e),
            )
        })?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());

        debug!(file = %file_name, size = bytes.len(), "Uploading image");

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let mut request = self.client.post(&self.upload_url).multipart(form);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::network(IMAGE_SERVICE_NAME, e.to_string()))?;
        let response = check_status(IMAGE_SERVICE_NAME, "upload", response).await?;

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| ApiError::decode(IMAGE_SERVICE_NAME, e.to_string()))?;

        if body.url.is_empty() {
            warn!("Image host returned an empty URL");
            return Err(ApiError::decode(IMAGE_SERVICE_NAME, "empty URL in response"));
        }

        Ok(body.url)
    }
}
