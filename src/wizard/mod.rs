//! Multi-step recipe authoring wizard
//!
//! `RecipeWizard` owns the current step and the in-progress recipe, delegates
//! per-step checks to the field registry, and talks to the platform through the
//! `RecipeApi` and `ImageHost` collaborators. It renders nothing; hosts read its
//! state and drain its notices.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::api::{
    ApiError, DraftPayload, ImageHost, RecipeApi, RecipePayload, SearchKind, SearchResult,
};
use crate::config::WizardConfig;

pub mod draft;
pub mod fields;
pub mod hydrate;
pub mod images;
pub mod list;
pub mod notice;
pub mod related;
pub mod types;

pub use draft::DraftClient;
pub use fields::{FieldError, FieldErrorKind, FieldName, FieldRegistry};
pub use hydrate::Hydrated;
pub use images::{ImageChain, ImageChainError};
pub use list::{BoundedList, ListError};
pub use notice::{Notice, NoticeLevel, Notices};
pub use related::{ApplyResult, RelatedSelector, SearchOutcome, SearchRequest, SelectError};
pub use types::*;


/// Where the wizard is in its open/close cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Hydrating { epoch: u64 },
    Ready,
}

/// An open in progress: fetch the initial source without holding the wizard
pub struct PendingOpen {
    epoch: u64,
    mode: WizardMode,
    drafts: DraftClient,
    api: Arc<dyn RecipeApi>,
}

impl PendingOpen {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Load the draft (create mode) or hydrate the edited recipe (edit mode)
    pub async fn fetch(self) -> FetchedSource {
        let result = match &self.mode {
            WizardMode::Create => match self.drafts.load().await {
                Ok(Some(draft)) => Ok(Some(hydrate::hydrate_draft(self.api.as_ref(), draft).await)),
                Ok(None) => Ok(None),
                Err(e) => Err(e),
            },
            WizardMode::Edit(record) => {
                Ok(Some(hydrate::hydrate_edit(self.api.as_ref(), record).await))
            }
        };
        FetchedSource {
            epoch: self.epoch,
            result,
        }
    }
}

/// Result of `PendingOpen::fetch`, applied with `RecipeWizard::finish_open`
pub struct FetchedSource {
    epoch: u64,
    result: Result<Option<Hydrated>, ApiError>,
}

impl FetchedSource {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// The authoring wizard
pub struct RecipeWizard {
    config: WizardConfig,
    api: Arc<dyn RecipeApi>,
    image_host: Arc<dyn ImageHost>,
    drafts: DraftClient,
    fields: FieldRegistry,
    mode: WizardMode,
    lifecycle: Lifecycle,
    /// Bumped by every open so late results can be recognised
    epoch: u64,
    source: Option<InitialSource>,
    step: WizardStep,
    /// Scalar fields; lists, images and related ids live in their managers
    state: WizardState,
    ingredients: BoundedList,
    steps: BoundedList,
    related: RelatedSelector,
    images: ImageChain,
    notices: Notices,
    busy_until: Option<Instant>,
}

impl RecipeWizard {
    pub fn new(
        config: WizardConfig,
        api: Arc<dyn RecipeApi>,
        image_host: Arc<dyn ImageHost>,
    ) -> Self {
        let fields = FieldRegistry::from_config(&config);
        Self {
            ingredients: Self::empty_ingredients(&config),
            steps: Self::empty_steps(&config),
            related: RelatedSelector::new(Duration::from_millis(config.search_debounce_ms)),
            drafts: DraftClient::new(Arc::clone(&api)),
            config,
            api,
            image_host,
            fields,
            mode: WizardMode::Create,
            lifecycle: Lifecycle::Uninitialized,
            epoch: 0,
            source: None,
            step: WizardStep::Category,
            state: WizardState::default(),
            images: ImageChain::new(),
            notices: Notices::default(),
            busy_until: None,
        }
    }

    fn empty_ingredients(config: &WizardConfig) -> BoundedList {
        BoundedList::new(config.max_ingredients, "ingredients", "ingredient")
    }

    fn empty_steps(config: &WizardConfig) -> BoundedList {
        BoundedList::new(config.max_steps, "steps", "step")
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn mode(&self) -> &WizardMode {
        &self.mode
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Whether the wizard has finished loading and accepts navigation
    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    /// Whether an open is waiting on its draft or edit data
    pub fn is_loading(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Hydrating { .. })
    }

    /// Where the current session's initial state came from
    pub fn source(&self) -> Option<InitialSource> {
        self.source
    }

    pub fn ingredients(&self) -> &BoundedList {
        &self.ingredients
    }

    pub fn steps(&self) -> &BoundedList {
        &self.steps
    }

    pub fn related(&self) -> &RelatedSelector {
        &self.related
    }

    pub fn images(&self) -> &ImageChain {
        &self.images
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    /// Whether the submit action is still cooling down
    pub fn is_busy(&self) -> bool {
        self.busy_until
            .map(|until| Instant::now() < until)
            .unwrap_or(false)
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }

    /// Full state as it would be drafted: lists committed from their current
    /// slots, image slots from the chain and ids from the selector
    pub fn state(&self) -> WizardState {
        let mut state = self.state.clone();
        state.ingredients = self.ingredients.draft_values();
        state.steps = self.steps.draft_values();
        state.images = self.images.slots().clone();
        state.co_cooks = self.related.selected_ids(SearchKind::People).to_vec();
        state.linked_recipes = self.related.selected_ids(SearchKind::Recipes).to_vec();
        state
    }

    /// Draft body for the current step and state
    pub fn snapshot(&self) -> DraftPayload {
        DraftPayload {
            step: self.step,
            state: self.state(),
        }
    }

    /// Materialized create/update body
    pub fn payload(&self) -> RecipePayload {
        RecipePayload {
            category: self.state.category,
            method: self.state.method,
            title: self.state.title.trim().to_string(),
            description: self.state.description.trim().to_string(),
            ingredients: self.ingredients.commit(),
            steps: self.steps.commit(),
            minutes: self.state.minutes,
            images: self.images.filled(),
            co_cooks: self.related.selected_ids(SearchKind::People).to_vec(),
            linked_recipes: self.related.selected_ids(SearchKind::Recipes).to_vec(),
            external_video_url: self
                .state
                .external_video_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
        }
    }

    // ─── Open / close ───────────────────────────────────────────────────────

    /// Reset and start opening in `mode`. The returned `PendingOpen` borrows
    /// nothing, so the host may await it inline or on a local task.
    pub fn begin_open(&mut self, mode: WizardMode) -> PendingOpen {
        self.reset();
        self.epoch += 1;
        self.lifecycle = Lifecycle::Hydrating { epoch: self.epoch };
        self.mode = mode.clone();
        info!(epoch = self.epoch, edit = mode.is_edit(), "Opening recipe wizard");

        PendingOpen {
            epoch: self.epoch,
            mode,
            drafts: self.drafts.clone(),
            api: Arc::clone(&self.api),
        }
    }

    /// Apply fetched initial state. Returns false when the result belongs to an
    /// open that was closed or superseded meanwhile.
    pub fn finish_open(&mut self, fetched: FetchedSource) -> bool {
        if self.lifecycle != (Lifecycle::Hydrating { epoch: fetched.epoch }) {
            debug!(
                epoch = fetched.epoch,
                current = self.epoch,
                "Discarding initial state for a stale open"
            );
            return false;
        }

        match fetched.result {
            Ok(Some(hydrated)) => self.apply_hydrated(hydrated),
            Ok(None) => {
                self.source = Some(InitialSource::Fresh);
            }
            Err(e) => {
                self.notices
                    .warning(format!("Could not load your draft: {}", e));
                self.source = Some(InitialSource::Fresh);
            }
        }
        self.lifecycle = Lifecycle::Ready;
        info!(source = ?self.source, step = ?self.step, "Recipe wizard ready");
        true
    }

    /// Open and wait for the initial state
    pub async fn open(&mut self, mode: WizardMode) -> Option<InitialSource> {
        let pending = self.begin_open(mode);
        let fetched = pending.fetch().await;
        self.finish_open(fetched);
        self.source
    }

    /// Discard everything and return to create-mode defaults. Any open still
    /// in flight is ignored when it lands.
    pub fn close(&mut self) {
        if self.lifecycle != Lifecycle::Uninitialized {
            info!("Closing recipe wizard");
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.lifecycle = Lifecycle::Uninitialized;
        self.mode = WizardMode::Create;
        self.source = None;
        self.step = WizardStep::Category;
        self.state = WizardState::default();
        self.ingredients = Self::empty_ingredients(&self.config);
        self.steps = Self::empty_steps(&self.config);
        self.related.reset();
        self.images = ImageChain::new();
        self.busy_until = None;
    }

    fn apply_hydrated(&mut self, hydrated: Hydrated) {
        self.ingredients = BoundedList::from_values(
            &hydrated.state.ingredients,
            self.config.max_ingredients,
            "ingredients",
            "ingredient",
        );
        self.steps = BoundedList::from_values(
            &hydrated.state.steps,
            self.config.max_steps,
            "steps",
            "step",
        );
        self.images = ImageChain::from_slots(&hydrated.state.images);
        self.related.seed(SearchKind::People, hydrated.co_cooks);
        self.related.seed(SearchKind::Recipes, hydrated.linked_recipes);
        self.step = hydrated.step;
        self.state = hydrated.state;
        self.source = Some(hydrated.source);
    }

    // ─── Navigation ─────────────────────────────────────────────────────────

    /// Validate the current step and move forward. On IMAGES this submits.
    pub async fn next(&mut self) -> WizardOutcome {
        if !self.is_ready() {
            return WizardOutcome::NotReady;
        }

        let leaving = self.step;
        let Some(target) = leaving.next() else {
            return self.dispatch_submission().await;
        };

        let errors = self.validate_step(leaving);
        if !errors.is_empty() {
            debug!(step = ?leaving, errors = errors.len(), "Step validation failed");
            return WizardOutcome::Invalid(errors);
        }

        self.step = target;
        debug!(from = ?leaving, to = ?target, "Wizard advanced");

        if !self.mode.is_edit() && self.config.autosave_enabled() {
            self.autosave().await;
        }

        WizardOutcome::Moved(target)
    }

    /// Same as `next`: advances on earlier steps, submits on IMAGES
    pub async fn submit(&mut self) -> WizardOutcome {
        self.next().await
    }

    /// One step back, clamped at CATEGORY. Nothing is committed or checked.
    pub fn back(&mut self) -> WizardOutcome {
        if !self.is_ready() {
            return WizardOutcome::NotReady;
        }
        self.step = self.step.prev();
        WizardOutcome::Moved(self.step)
    }

    /// Jump back to the current or an earlier step. Forward moves go through
    /// `next` so every step in between is checked.
    pub fn goto(&mut self, step: WizardStep) -> bool {
        if !self.is_ready() || step.index() > self.step.index() {
            return false;
        }
        self.step = step;
        true
    }

    fn validate_step(&self, step: WizardStep) -> Vec<FieldError> {
        let fields = &self.fields;
        let state = &self.state;
        let mut errors = Vec::new();
        match step {
            WizardStep::Category => {
                errors.extend(fields.check_choice(FieldName::Category, state.category.as_ref()).err());
            }
            WizardStep::Description => {
                errors.extend(fields.check_text(FieldName::Title, &state.title).err());
                errors.extend(
                    fields
                        .check_text(FieldName::Description, &state.description)
                        .err(),
                );
                errors.extend(fields.check_minutes(state.minutes).err());
            }
            WizardStep::Ingredients => {
                errors.extend(fields.check_list(FieldName::Ingredients, self.ingredients.slots()));
            }
            WizardStep::Steps => {
                errors.extend(fields.check_list(FieldName::Steps, self.steps.slots()));
            }
            WizardStep::Methods => {
                errors.extend(fields.check_choice(FieldName::Method, state.method.as_ref()).err());
            }
            WizardStep::RelatedContent => {
                errors.extend(
                    fields
                        .check_url(
                            FieldName::ExternalVideoUrl,
                            state.external_video_url.as_deref(),
                        )
                        .err(),
                );
            }
            WizardStep::Images => {
                errors.extend(fields.check_images(self.images.filled_count()).err());
            }
        }
        errors
    }

    // ─── Submission ─────────────────────────────────────────────────────────

    async fn dispatch_submission(&mut self) -> WizardOutcome {
        if self.is_busy() {
            return WizardOutcome::Busy;
        }

        let errors = self.validate_step(WizardStep::Images);
        if !errors.is_empty() {
            for error in &errors {
                self.notices.error(error.to_string());
            }
            return WizardOutcome::Invalid(errors);
        }

        self.busy_until =
            Some(Instant::now() + Duration::from_millis(self.config.submit_cooldown_ms));
        let payload = self.payload();

        let result = match self.mode.recipe_id() {
            None => self.api.create_recipe(&payload).await,
            Some(id) => {
                let id = id.to_string();
                self.api.update_recipe(&id, &payload).await
            }
        };

        match result {
            Ok(record) => {
                if self.mode.is_edit() {
                    info!(recipe_id = %record.id, "Recipe updated");
                    self.notices.info("Recipe updated");
                } else {
                    info!(recipe_id = %record.id, "Recipe published");
                    if let Err(e) = self.drafts.delete().await {
                        self.notices
                            .warning(format!("Recipe published, but the draft could not be removed: {}", e));
                    }
                    self.notices.info("Recipe published");
                }
                self.close();
                WizardOutcome::Submitted(record)
            }
            Err(e) => {
                warn!(error = %e, "Submission rejected");
                if e.is_validation() {
                    for violation in e.field_errors() {
                        self.notices
                            .error(format!("{}: {}", violation.field, violation.message));
                    }
                } else {
                    self.notices.error(format!("Could not save recipe: {}", e));
                }
                WizardOutcome::SubmitFailed(e)
            }
        }
    }

    // ─── Drafts ─────────────────────────────────────────────────────────────

    async fn autosave(&mut self) {
        let draft = self.snapshot();
        if let Err(e) = self.drafts.save(&draft).await {
            self.notices
                .warning(format!("Could not save your draft: {}", e));
        }
    }

    /// Save the current step and state as the user's draft. Refused in edit mode.
    pub async fn save_for_later(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        if self.mode.is_edit() {
            self.notices
                .warning("Drafts are not available while editing a published recipe");
            return false;
        }

        let draft = self.snapshot();
        match self.drafts.save(&draft).await {
            Ok(()) => {
                self.notices.info("Draft saved");
                true
            }
            Err(e) => {
                self.notices
                    .error(format!("Could not save your draft: {}", e));
                false
            }
        }
    }

    /// Delete the user's draft and start over. Refused in edit mode.
    pub async fn discard_draft(&mut self) -> bool {
        if self.mode.is_edit() {
            self.notices
                .warning("Drafts are not available while editing a published recipe");
            return false;
        }

        match self.drafts.delete().await {
            Ok(()) => {
                self.notices.info("Draft discarded");
                self.close();
                true
            }
            Err(e) => {
                self.notices
                    .error(format!("Could not discard your draft: {}", e));
                false
            }
        }
    }

    // ─── Field setters ──────────────────────────────────────────────────────

    pub fn set_category(&mut self, category: Category) {
        self.state.category = Some(category);
    }

    pub fn set_method(&mut self, method: CookingMethod) {
        self.state.method = Some(method);
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.state.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.state.description = description.into();
    }

    pub fn set_minutes(&mut self, minutes: u32) {
        self.state.minutes = minutes;
    }

    /// Empty input clears the link
    pub fn set_external_video_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.state.external_video_url = if url.trim().is_empty() {
            None
        } else {
            Some(url)
        };
    }

    // ─── Ingredient and step slots ──────────────────────────────────────────

    pub fn add_ingredient(&mut self) -> Option<usize> {
        let result = self.ingredients.add();
        self.notice_on_list_error(result)
    }

    pub fn remove_ingredient(&mut self, index: usize) -> bool {
        let result = self.ingredients.remove(index);
        self.notice_on_list_error(result).is_some()
    }

    pub fn set_ingredient(&mut self, index: usize, value: impl Into<String>) -> bool {
        let result = self.ingredients.set(index, value);
        self.notice_on_list_error(result).is_some()
    }

    pub fn add_step(&mut self) -> Option<usize> {
        let result = self.steps.add();
        self.notice_on_list_error(result)
    }

    pub fn remove_step(&mut self, index: usize) -> bool {
        let result = self.steps.remove(index);
        self.notice_on_list_error(result).is_some()
    }

    pub fn set_step(&mut self, index: usize, value: impl Into<String>) -> bool {
        let result = self.steps.set(index, value);
        self.notice_on_list_error(result).is_some()
    }

    fn notice_on_list_error<T>(&mut self, result: Result<T, ListError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.notices.warning(e.to_string());
                None
            }
        }
    }

    // ─── Images ─────────────────────────────────────────────────────────────

    /// Place an already hosted image URL in `slot`
    pub fn set_image(&mut self, slot: usize, url: impl Into<String>) -> bool {
        match self.images.set(slot, url) {
            Ok(()) => true,
            Err(e) => {
                self.notices.warning(e.to_string());
                false
            }
        }
    }

    pub fn clear_image(&mut self, slot: usize) -> bool {
        match self.images.clear(slot) {
            Ok(_) => true,
            Err(e) => {
                self.notices.warning(e.to_string());
                false
            }
        }
    }

    /// Upload `file` to the image host and store its URL in `slot`. A slot the
    /// chain would refuse never reaches the host.
    pub async fn upload_image(&mut self, slot: usize, file: &Path) -> bool {
        if let Err(e) = self.images.can_set(slot) {
            self.notices.warning(e.to_string());
            return false;
        }

        let host = Arc::clone(&self.image_host);
        match host.upload(file).await {
            Ok(url) => {
                debug!(slot, url = %url, "Image uploaded");
                self.set_image(slot, url)
            }
            Err(e) => {
                self.notices.error(format!("Image upload failed: {}", e));
                false
            }
        }
    }

    // ─── Related content ────────────────────────────────────────────────────

    pub fn set_search_kind(&mut self, kind: SearchKind) {
        self.related.set_kind(kind);
    }

    /// Register a query; dispatch the returned request and feed its outcome to
    /// `apply_search`
    pub fn begin_search(&mut self, query: &str) -> Option<SearchRequest> {
        self.related.begin_query(query)
    }

    pub fn apply_search(&mut self, outcome: SearchOutcome) {
        if let ApplyResult::Failed(e) = self.related.apply(outcome) {
            self.notices.warning(format!("Search failed: {}", e));
        }
    }

    /// Debounce, search and apply in one go
    pub async fn search(&mut self, query: &str) {
        let Some(request) = self.begin_search(query) else {
            return;
        };
        let api = Arc::clone(&self.api);
        let outcome = request.run(api.as_ref()).await;
        self.apply_search(outcome);
    }

    pub fn select(&mut self, item: SearchResult) -> bool {
        match self.related.select(item) {
            Ok(()) => true,
            Err(e) => {
                self.notices.warning(e.to_string());
                false
            }
        }
    }

    pub fn deselect(&mut self, kind: SearchKind, id: &str) {
        self.related.deselect(kind, id);
    }
}
