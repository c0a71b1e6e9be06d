use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub wizard: WizardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Recipe platform endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the recipe API (draft, recipes, search, lookups)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upload endpoint of the image host
    #[serde(default = "default_image_host_url")]
    pub image_host_url: String,
    /// Name of the environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,
    /// Per-request timeout (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_image_host_url() -> String {
    "http://localhost:8080/uploads".to_string()
}

fn default_token_env() -> String {
    "RECIPE_WIZARD_API_TOKEN".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            image_host_url: default_image_host_url(),
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Runtime the wizard is embedded in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeEnv {
    #[default]
    Production,
    Development,
    Test,
}

/// Limits and behavior of the authoring flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Ceiling on ingredient slots (default: 30)
    #[serde(default = "default_list_max")]
    pub max_ingredients: usize,
    /// Ceiling on step slots (default: 30)
    #[serde(default = "default_list_max")]
    pub max_steps: usize,
    #[serde(default = "default_title_max_length")]
    pub title_max_length: usize,
    #[serde(default = "default_description_max_length")]
    pub description_max_length: usize,
    #[serde(default = "default_ingredient_max_length")]
    pub ingredient_max_length: usize,
    #[serde(default = "default_step_max_length")]
    pub step_max_length: usize,
    /// Whether submission needs at least one image (disable for automated tests)
    #[serde(default = "default_true")]
    pub require_image: bool,
    /// Draft auto-save on forward navigation only happens in production
    #[serde(default)]
    pub runtime: RuntimeEnv,
    /// Quiet period before a search query is dispatched
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    /// How long the submit action stays disabled after dispatch
    #[serde(default = "default_submit_cooldown_ms")]
    pub submit_cooldown_ms: u64,
}

fn default_list_max() -> usize {
    30
}

fn default_title_max_length() -> usize {
    100
}

fn default_description_max_length() -> usize {
    500
}

fn default_ingredient_max_length() -> usize {
    150
}

fn default_step_max_length() -> usize {
    500
}

fn default_true() -> bool {
    true
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_submit_cooldown_ms() -> u64 {
    2000
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            max_ingredients: default_list_max(),
            max_steps: default_list_max(),
            title_max_length: default_title_max_length(),
            description_max_length: default_description_max_length(),
            ingredient_max_length: default_ingredient_max_length(),
            step_max_length: default_step_max_length(),
            require_image: default_true(),
            runtime: RuntimeEnv::default(),
            search_debounce_ms: default_search_debounce_ms(),
            submit_cooldown_ms: default_submit_cooldown_ms(),
        }
    }
}

impl WizardConfig {
    /// Whether forward navigation saves a draft
    pub fn autosave_enabled(&self) -> bool {
        self.runtime == RuntimeEnv::Production
    }

    /// Settings suited to automated tests: no autosave, no image requirement,
    /// no debounce or cooldown delays
    pub fn for_tests() -> Self {
        Self {
            require_image: false,
            runtime: RuntimeEnv::Test,
            search_debounce_ms: 0,
            submit_cooldown_ms: 0,
            ..Self::default()
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write logs to a file under `dir` instead of stderr
    #[serde(default)]
    pub to_file: bool,

    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|d| d.join("recipe-wizard").join("logs"))
        .unwrap_or_else(|| PathBuf::from(".recipe-wizard/logs"))
        .to_string_lossy()
        .to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: false,
            dir: default_log_dir(),
        }
    }
}

impl Config {
    /// Project-local config file
    pub fn local_config_path() -> PathBuf {
        PathBuf::from("recipe-wizard.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so the wizard works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        let local_config = Self::local_config_path();
        if local_config.exists() {
            builder = builder.add_source(config::File::from(local_config));
        }

        // User config in ~/.config/recipe-wizard/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("recipe-wizard").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables with RECIPE_WIZARD_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("RECIPE_WIZARD")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Write config as TOML to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create config directory")?;
            }
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        std::fs::write(path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.logging.dir);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }
}
