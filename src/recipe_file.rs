//! Recipe files: a TOML description of a recipe that can drive the wizard
//! from start to finish without a user interface.
//!
//! ```toml
//! category = "dinner"
//! method = "stovetop"
//! title = "Weeknight chili"
//! description = "Beans, tomatoes and patience"
//! minutes = 45
//! ingredients = ["beans", "tomatoes"]
//! steps = ["Simmer for 40 minutes"]
//! co_cooks = ["u-1"]
//! images = ["photos/chili.jpg", "https://cdn.example/chili-2.jpg"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{SearchKind, SearchResult};
use crate::wizard::{
    BoundedList, Category, CookingMethod, RecipeWizard, WizardOutcome, WizardStep,
};

/// Field values to feed into the wizard. Anything left out keeps whatever the
/// wizard already holds (a resumed draft or the recipe being edited).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeFile {
    pub category: Option<Category>,
    pub method: Option<CookingMethod>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub minutes: Option<u32>,
    pub ingredients: Option<Vec<String>>,
    pub steps: Option<Vec<String>>,
    /// Co-cook user ids
    pub co_cooks: Option<Vec<String>>,
    /// Linked recipe ids
    pub linked_recipes: Option<Vec<String>>,
    pub external_video_url: Option<String>,
    /// Image URLs or local files to upload, in slot order
    pub images: Option<Vec<String>>,
}

impl RecipeFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recipe file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse recipe file {}", path.display()))
    }

    /// Fill in each step and advance until IMAGES is reached, then place the
    /// images. Fails with the validation messages of the first step that
    /// refuses to advance.
    pub async fn fill(&self, wizard: &mut RecipeWizard) -> Result<()> {
        while wizard.step() != WizardStep::Images {
            let step = wizard.step();
            self.fill_step(wizard, step);
            match wizard.next().await {
                WizardOutcome::Moved(to) => debug!(from = ?step, to = ?to, "Recipe file advanced"),
                WizardOutcome::Invalid(errors) => {
                    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
                    bail!("{} step is incomplete: {}", step.title(), messages.join("; "));
                }
                WizardOutcome::NotReady => bail!("Wizard is not open"),
                other => bail!("Unexpected outcome on {} step: {:?}", step.title(), other),
            }
        }
        self.fill_images(wizard).await
    }

    /// Apply this file's values for one step without advancing
    pub fn fill_step(&self, wizard: &mut RecipeWizard, step: WizardStep) {
        match step {
            WizardStep::Category => {
                if let Some(category) = self.category {
                    wizard.set_category(category);
                }
            }
            WizardStep::Description => {
                if let Some(title) = &self.title {
                    wizard.set_title(title.clone());
                }
                if let Some(description) = &self.description {
                    wizard.set_description(description.clone());
                }
                if let Some(minutes) = self.minutes {
                    wizard.set_minutes(minutes);
                }
            }
            WizardStep::Ingredients => {
                if let Some(values) = &self.ingredients {
                    fill_slots(
                        wizard,
                        values,
                        |w| w.ingredients(),
                        RecipeWizard::add_ingredient,
                        RecipeWizard::remove_ingredient,
                        |w, i, v| w.set_ingredient(i, v),
                    );
                }
            }
            WizardStep::Steps => {
                if let Some(values) = &self.steps {
                    fill_slots(
                        wizard,
                        values,
                        |w| w.steps(),
                        RecipeWizard::add_step,
                        RecipeWizard::remove_step,
                        |w, i, v| w.set_step(i, v),
                    );
                }
            }
            WizardStep::Methods => {
                if let Some(method) = self.method {
                    wizard.set_method(method);
                }
            }
            WizardStep::RelatedContent => {
                if let Some(ids) = &self.co_cooks {
                    replace_selection(wizard, SearchKind::People, ids);
                }
                if let Some(ids) = &self.linked_recipes {
                    replace_selection(wizard, SearchKind::Recipes, ids);
                }
                if let Some(url) = &self.external_video_url {
                    wizard.set_external_video_url(url.clone());
                }
            }
            WizardStep::Images => {}
        }
    }

    async fn fill_images(&self, wizard: &mut RecipeWizard) -> Result<()> {
        let Some(images) = &self.images else {
            return Ok(());
        };

        // Empty the chain back to front before placing the new images
        for slot in (0..wizard.images().filled_count()).rev() {
            wizard.clear_image(slot);
        }

        for (slot, image) in images.iter().enumerate() {
            let placed = if image.starts_with("http://") || image.starts_with("https://") {
                wizard.set_image(slot, image.clone())
            } else {
                wizard.upload_image(slot, &PathBuf::from(image)).await
            };
            if !placed {
                bail!("Could not place image {} ({})", slot + 1, image);
            }
        }
        Ok(())
    }
}

/// Make a slot list hold exactly `values`
fn fill_slots(
    wizard: &mut RecipeWizard,
    values: &[String],
    list: impl Fn(&RecipeWizard) -> &BoundedList,
    add: impl Fn(&mut RecipeWizard) -> Option<usize>,
    remove: impl Fn(&mut RecipeWizard, usize) -> bool,
    set: impl Fn(&mut RecipeWizard, usize, String) -> bool,
) {
    for (index, value) in values.iter().enumerate() {
        if index >= list(wizard).len() && add(wizard).is_none() {
            break;
        }
        set(wizard, index, value.clone());
    }
    while list(wizard).len() > values.len().max(1) {
        let last = list(wizard).len() - 1;
        if !remove(wizard, last) {
            break;
        }
    }
    if values.is_empty() {
        set(wizard, 0, String::new());
    }
}

fn replace_selection(wizard: &mut RecipeWizard, kind: SearchKind, ids: &[String]) {
    let current: Vec<String> = wizard.related().selected_ids(kind).to_vec();
    for id in current.iter().filter(|id| !ids.contains(id)) {
        wizard.deselect(kind, id);
    }
    for id in ids {
        if !wizard.related().selected_ids(kind).contains(id) {
            wizard.select(SearchResult::placeholder(kind, id));
        }
    }
}
