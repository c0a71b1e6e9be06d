use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use recipe_wizard::api::{
    DraftPayload, HttpImageHost, HttpRecipeApi, RecipeApi, RecipeRecord, SearchKind,
};
use recipe_wizard::config::Config;
use recipe_wizard::logging;
use recipe_wizard::wizard::{
    DraftClient, InitialSource, Notice, NoticeLevel, RecipeWizard, WizardMode, WizardOutcome,
};
use recipe_wizard::RecipeFile;

#[derive(Parser)]
#[command(name = "recipe-wizard")]
#[command(about = "Author and publish recipes step by step")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or discard the saved draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },

    /// Search people or recipes to link
    Search {
        /// Search text (at least 2 characters)
        query: String,

        /// What to search for
        #[arg(short, long, value_enum, default_value_t = KindArg::People)]
        kind: KindArg,
    },

    /// Walk a recipe file through the wizard and publish it
    Publish {
        /// Recipe file (TOML)
        #[arg(short, long)]
        file: PathBuf,

        /// Published recipe (JSON) to edit instead of creating a new one
        #[arg(long)]
        edit: Option<PathBuf>,

        /// Save a draft after filling in the recipe instead of publishing
        #[arg(long)]
        save_only: bool,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum DraftAction {
    /// Print the saved draft as JSON
    Show,
    /// Delete the saved draft
    Discard,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    People,
    Recipes,
}

impl From<KindArg> for SearchKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::People => SearchKind::People,
            KindArg::Recipes => SearchKind::Recipes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let logging_handle = logging::init_logging(&config, cli.debug)?;

    let result = match cli.command {
        Commands::Draft { action } => cmd_draft(&config, action).await,
        Commands::Search { query, kind } => cmd_search(&config, &query, kind.into()).await,
        Commands::Publish {
            file,
            edit,
            save_only,
        } => cmd_publish(&config, &file, edit.as_deref(), save_only).await,
        Commands::Config { action } => cmd_config(&config, action),
    };

    if let Some(log_path) = logging_handle.log_file_path {
        if result.is_err() && log_path.exists() {
            eprintln!("Session log: {}", log_path.display());
        }
    }

    result
}

fn recipe_api(config: &Config) -> Result<Arc<dyn RecipeApi>> {
    let api = HttpRecipeApi::from_config(&config.api).context("Failed to create API client")?;
    Ok(Arc::new(api))
}

fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        let prefix = match notice.level {
            NoticeLevel::Info => "",
            NoticeLevel::Warning => "warning: ",
            NoticeLevel::Error => "error: ",
        };
        eprintln!("{}{}", prefix, notice.message);
    }
}

async fn cmd_draft(config: &Config, action: DraftAction) -> Result<()> {
    let drafts = DraftClient::new(recipe_api(config)?);

    match action {
        DraftAction::Show => match drafts.load().await? {
            Some(draft) => print_draft(&draft)?,
            None => println!("No draft"),
        },
        DraftAction::Discard => {
            drafts.delete().await?;
            println!("Draft discarded");
        }
    }
    Ok(())
}

fn print_draft(draft: &DraftPayload) -> Result<()> {
    let json = serde_json::to_string_pretty(draft).context("Failed to serialize draft")?;
    println!("{}", json);
    Ok(())
}

async fn cmd_search(config: &Config, query: &str, kind: SearchKind) -> Result<()> {
    let api = recipe_api(config)?;
    let results = api.search(query, kind).await?.into_results(kind);

    if results.is_empty() {
        println!("No {} match \"{}\"", kind.display_name(), query);
        return Ok(());
    }

    println!("{} ({} results)", kind.display_name(), results.len());
    println!("{}", "─".repeat(60));
    for result in &results {
        println!("{:<24} {}", result.id(), result.label());
    }
    Ok(())
}

fn load_record(path: &Path) -> Result<RecipeRecord> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read recipe record {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse recipe record {}", path.display()))
}

async fn cmd_publish(
    config: &Config,
    file: &Path,
    edit: Option<&Path>,
    save_only: bool,
) -> Result<()> {
    let recipe = RecipeFile::load(file)?;
    let mode = match edit {
        Some(path) => WizardMode::Edit(Box::new(load_record(path)?)),
        None => WizardMode::Create,
    };
    if save_only && mode.is_edit() {
        anyhow::bail!("--save-only cannot be combined with --edit: drafts are only kept for new recipes");
    }

    let image_host =
        HttpImageHost::from_config(&config.api).context("Failed to create image host client")?;
    let mut wizard = RecipeWizard::new(
        config.wizard.clone(),
        recipe_api(config)?,
        Arc::new(image_host),
    );

    match wizard.open(mode).await {
        Some(InitialSource::Draft) => eprintln!("Resuming saved draft at {}", wizard.step().title()),
        Some(InitialSource::Edit) => eprintln!("Editing published recipe"),
        Some(InitialSource::Fresh) | None => {}
    }
    print_notices(wizard.take_notices());

    if save_only {
        // Get as far as the file allows, then save wherever that is
        if let Err(e) = recipe.fill(&mut wizard).await {
            eprintln!("Stopped at {}: {}", wizard.step().title(), e);
        }
        let saved = wizard.save_for_later().await;
        print_notices(wizard.take_notices());
        if !saved {
            anyhow::bail!("Draft was not saved");
        }
        return Ok(());
    }

    let filled = recipe.fill(&mut wizard).await;
    print_notices(wizard.take_notices());
    filled?;

    let outcome = wizard.submit().await;
    print_notices(wizard.take_notices());
    match outcome {
        WizardOutcome::Submitted(record) => {
            println!("{}", record.id);
            Ok(())
        }
        WizardOutcome::Invalid(errors) => {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            anyhow::bail!("Recipe not submitted: {}", messages.join("; "))
        }
        WizardOutcome::SubmitFailed(e) => Err(e).context("Recipe not submitted"),
        other => anyhow::bail!("Recipe not submitted: {:?}", other),
    }
}

fn cmd_config(config: &Config, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml = toml::to_string_pretty(config).context("Failed to serialize config")?;
            print!("{}", toml);
        }
    }
    Ok(())
}
