//! Type definitions for the recipe wizard

use serde::{Deserialize, Serialize};

use crate::api::RecipeRecord;

/// Number of image slots a recipe can carry
pub const IMAGE_SLOTS: usize = 4;

/// Maximum number of co-cooks on one recipe
pub const MAX_CO_COOKS: usize = 4;

/// Maximum number of linked recipes on one recipe
pub const MAX_LINKED_RECIPES: usize = 2;

/// Steps in the authoring flow, strictly linear
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardStep {
    /// Pick the recipe category
    #[default]
    Category,
    /// Title, description and total time
    Description,
    /// Ingredient list
    Ingredients,
    /// Preparation steps
    Steps,
    /// Cooking method
    Methods,
    /// Co-cooks, linked recipes and an external video
    RelatedContent,
    /// Image upload and submission
    Images,
}

impl WizardStep {
    const ALL: [Self; 7] = [
        Self::Category,
        Self::Description,
        Self::Ingredients,
        Self::Steps,
        Self::Methods,
        Self::RelatedContent,
        Self::Images,
    ];

    pub fn all() -> &'static [WizardStep] {
        &Self::ALL
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Category => 0,
            Self::Description => 1,
            Self::Ingredients => 2,
            Self::Steps => 3,
            Self::Methods => 4,
            Self::RelatedContent => 5,
            Self::Images => 6,
        }
    }

    /// Step after this one, `None` at the terminal step
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// Step before this one, clamped at the first step
    pub fn prev(self) -> Self {
        if self.index() == 0 {
            self
        } else {
            Self::ALL[self.index() - 1]
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Images)
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Description => "Description",
            Self::Ingredients => "Ingredients",
            Self::Steps => "Steps",
            Self::Methods => "Method",
            Self::RelatedContent => "Related content",
            Self::Images => "Images",
        }
    }
}

/// Recipe category chosen on the first step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Breakfast,
    Lunch,
    Dinner,
    Dessert,
    Snack,
    Drink,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::Breakfast,
            Category::Lunch,
            Category::Dinner,
            Category::Dessert,
            Category::Snack,
            Category::Drink,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Breakfast => "Breakfast",
            Category::Lunch => "Lunch",
            Category::Dinner => "Dinner",
            Category::Dessert => "Dessert",
            Category::Snack => "Snack",
            Category::Drink => "Drink",
        }
    }
}

/// Preparation method chosen on the METHODS step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CookingMethod {
    Oven,
    Stovetop,
    Grill,
    Microwave,
    AirFryer,
    SlowCooker,
    NoCook,
}

impl CookingMethod {
    pub fn all() -> &'static [CookingMethod] {
        &[
            CookingMethod::Oven,
            CookingMethod::Stovetop,
            CookingMethod::Grill,
            CookingMethod::Microwave,
            CookingMethod::AirFryer,
            CookingMethod::SlowCooker,
            CookingMethod::NoCook,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            CookingMethod::Oven => "Oven",
            CookingMethod::Stovetop => "Stovetop",
            CookingMethod::Grill => "Grill",
            CookingMethod::Microwave => "Microwave",
            CookingMethod::AirFryer => "Air fryer",
            CookingMethod::SlowCooker => "Slow cooker",
            CookingMethod::NoCook => "No cook",
        }
    }
}

/// Everything the author has entered so far.
///
/// `ingredients` and `steps` hold committed lists; while the wizard is open the
/// editable slots live in its list managers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub method: Option<CookingMethod>,
    #[serde(default)]
    pub images: [Option<String>; IMAGE_SLOTS],
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
    /// Co-cook user ids, in selection order
    #[serde(default)]
    pub co_cooks: Vec<String>,
    /// Linked recipe ids, in selection order
    #[serde(default)]
    pub linked_recipes: Vec<String>,
    #[serde(default)]
    pub external_video_url: Option<String>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            category: None,
            method: None,
            images: Default::default(),
            title: String::new(),
            description: String::new(),
            ingredients: vec![String::new()],
            steps: vec![String::new()],
            minutes: 0,
            co_cooks: Vec::new(),
            linked_recipes: Vec::new(),
            external_video_url: None,
        }
    }
}

/// How the wizard was opened
#[derive(Debug, Clone, Default)]
pub enum WizardMode {
    /// Author a new recipe, resuming the user's draft if one exists
    #[default]
    Create,
    /// Modify a published recipe; never touches the draft store
    Edit(Box<RecipeRecord>),
}

impl WizardMode {
    pub fn is_edit(&self) -> bool {
        matches!(self, WizardMode::Edit(_))
    }

    /// Id of the recipe being edited
    pub fn recipe_id(&self) -> Option<&str> {
        match self {
            WizardMode::Create => None,
            WizardMode::Edit(record) => Some(&record.id),
        }
    }
}

/// Where the initial state came from after `open`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialSource {
    Fresh,
    Draft,
    Edit,
}

/// Result of a navigation or submit action
#[derive(Debug, Clone)]
pub enum WizardOutcome {
    /// Now on this step
    Moved(WizardStep),
    /// Local validation failed; still on the same step
    Invalid(Vec<super::fields::FieldError>),
    /// A submission is still being processed
    Busy,
    /// The wizard is not open or still hydrating
    NotReady,
    /// Recipe created or updated; the wizard has closed
    Submitted(RecipeRecord),
    /// The server rejected the submission; still on IMAGES
    SubmitFailed(crate::api::ApiError),
}

impl WizardOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, WizardOutcome::Submitted(_))
    }
}
