//! Recipe Wizard - headless multi-step recipe authoring
//!
//! The library holds the wizard state machine and its collaborators; the
//! `recipe-wizard` binary drives it from recipe files.

pub mod api;
pub mod config;
pub mod logging;
pub mod recipe_file;
pub mod wizard;

pub use api::{ApiError, HttpImageHost, HttpRecipeApi, ImageHost, RecipeApi};
pub use config::Config;
pub use recipe_file::RecipeFile;
pub use wizard::{RecipeWizard, WizardMode, WizardOutcome, WizardState, WizardStep};
