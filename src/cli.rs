// src/cli.rs
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::core::database::{API_KEY_STORAGE_KEY, FORM_DATA_KEY};
use crate::core::{ConfigManager, Database, GeminiClient, PromptEngine};
use crate::generator::{GenerationResult, LetterGenerator};
use crate::types::{GenerationKind, JobApplication};
use crate::{docx, utils};

#[derive(Parser)]
#[command(name = "jobmatch")]
#[command(about = "Tailored cover letters and résumé rewrites via a hosted generation endpoint")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP API server
    Serve {
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// Generate a tailored cover letter
    Letter {
        #[command(flatten)]
        fields: ApplicationArgs,
        /// Prompt template pack to use instead of the built-ins
        #[arg(long)]
        template: Option<String>,
        /// Also write the result into the output directory
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Override the stored API key for this call
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Rewrite the résumé against the job requirements
    Enhance {
        #[command(flatten)]
        fields: ApplicationArgs,
        #[arg(long)]
        template: Option<String>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Re-export a stored generation as a document
    Export {
        /// History entry id
        id: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Docx)]
        format: OutputFormat,
    },
    /// Extract plain text from a .docx résumé
    Extract { file: PathBuf },
    /// Manage the saved form-field draft
    Draft {
        #[command(subcommand)]
        command: DraftCommand,
    },
    /// Manage the generation API key
    Key {
        #[command(subcommand)]
        command: KeyCommand,
    },
    /// Browse past generations
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
    /// List available prompt template packs
    Templates,
}

/// Form fields, each inline or `@file`. Fields left out fall back to the
/// saved draft.
#[derive(Args)]
pub struct ApplicationArgs {
    /// Résumé/CV content
    #[arg(long)]
    pub cv: Option<String>,
    /// Company name
    #[arg(long)]
    pub company: Option<String>,
    /// Position title
    #[arg(long)]
    pub position: Option<String>,
    /// Job requirements
    #[arg(long)]
    pub requirements: Option<String>,
    /// Job description
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Subcommand)]
pub enum DraftCommand {
    /// Save the given fields as the draft (merging over any existing one)
    Save {
        #[command(flatten)]
        fields: ApplicationArgs,
    },
    /// Print the saved draft
    Show,
    /// Remove the saved draft
    Clear,
}

#[derive(Subcommand)]
pub enum KeyCommand {
    /// Store the generation API key
    Save { api_key: String },
    /// Report whether a key is stored
    Status,
    /// Remove the stored key
    Clear,
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List stored generations, newest first
    List {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Print one stored generation
    Show { id: String },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Txt,
    Docx,
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = ConfigManager::load()?;
    config.ensure_directories().await?;

    let database = Database::new(&config.environment.database_path).await?;

    match cli.command {
        Command::Serve { port } => crate::web::start_web_server(&config, database, port).await,
        Command::Letter {
            fields,
            template,
            format,
            api_key,
        } => {
            handle_generate(
                GenerationKind::CoverLetter,
                fields,
                template,
                format,
                api_key,
                &config,
                &database,
            )
            .await
        }
        Command::Enhance {
            fields,
            template,
            format,
            api_key,
        } => {
            handle_generate(
                GenerationKind::EnhancedCv,
                fields,
                template,
                format,
                api_key,
                &config,
                &database,
            )
            .await
        }
        Command::Export { id, format } => handle_export(&id, format, &config, &database).await,
        Command::Extract { file } => handle_extract(&file).await,
        Command::Draft { command } => handle_draft(command, &database).await,
        Command::Key { command } => handle_key(command, &database).await,
        Command::History { command } => handle_history(command, &database).await,
        Command::Templates => handle_templates(&config),
    }
}

async fn resolve_application(
    fields: ApplicationArgs,
    database: &Database,
) -> Result<JobApplication> {
    // Start from the saved draft, then apply whatever was passed
    let mut application = match database.storage().get(FORM_DATA_KEY).await? {
        Some(value) => serde_json::from_str(&value).context("Stored draft could not be parsed")?,
        None => JobApplication::default(),
    };

    if let Some(cv) = fields.cv {
        application.cv_content = utils::read_text_argument(&cv).await?;
    }
    if let Some(company) = fields.company {
        application.company_name = company;
    }
    if let Some(position) = fields.position {
        application.position_title = position;
    }
    if let Some(requirements) = fields.requirements {
        application.job_requirements = utils::read_text_argument(&requirements).await?;
    }
    if let Some(description) = fields.description {
        application.job_description = utils::read_text_argument(&description).await?;
    }

    Ok(application)
}

async fn handle_generate(
    kind: GenerationKind,
    fields: ApplicationArgs,
    template: Option<String>,
    format: Option<OutputFormat>,
    api_key: Option<String>,
    config: &ConfigManager,
    database: &Database,
) -> Result<()> {
    let application = resolve_application(fields, database).await?;

    let api_key = match api_key {
        Some(key) => key,
        None => database
            .storage()
            .get(API_KEY_STORAGE_KEY)
            .await?
            .filter(|key| !key.trim().is_empty())
            .context("Please enter your Gemini API key first. Save one with: jobmatch key save <key>")?,
    };

    let prompts = PromptEngine::new(config.environment.templates_path.clone())?;
    let client = GeminiClient::new(api_key, &config.generation)?;
    let generator = LetterGenerator::new(prompts, client);

    let result = match kind {
        GenerationKind::CoverLetter => {
            generator
                .generate_cover_letter(&application, template.as_deref())
                .await?
        }
        GenerationKind::EnhancedCv => {
            generator.enhance_cv(&application, template.as_deref()).await?
        }
    };

    let record = database
        .generations()
        .record(kind, &application, &result.content)
        .await?;

    println!("{}\n", result.title);
    println!("{}", result.content);
    println!("\n✓ Saved to history as {}", record.id);

    if let Some(format) = format {
        let path = write_export(
            &result,
            &application.export_stem(kind),
            format,
            &config.environment.output_path,
        )
        .await?;
        println!("✓ Written to {}", path.display());
    }

    Ok(())
}

async fn write_export(
    result: &GenerationResult,
    stem: &str,
    format: OutputFormat,
    output_dir: &std::path::Path,
) -> Result<PathBuf> {
    let (bytes, extension) = match format {
        OutputFormat::Txt => (result.content.clone().into_bytes(), "txt"),
        OutputFormat::Docx => (docx::document_for(result.kind, &result.content)?, "docx"),
    };

    let path = utils::output_file_path(output_dir, stem, extension);
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("Failed to write export: {}", path.display()))?;
    Ok(path)
}

async fn handle_export(
    id: &str,
    format: OutputFormat,
    config: &ConfigManager,
    database: &Database,
) -> Result<()> {
    let record = database
        .generations()
        .get(id)
        .await?
        .with_context(|| format!("No generation with id: {}", id))?;

    let kind = record
        .generation_kind()
        .with_context(|| format!("Stored generation has unknown kind: {}", record.kind))?;

    let stem = match kind {
        GenerationKind::CoverLetter => {
            format!("cover-letter-{}", utils::company_slug(&record.company_name))
        }
        GenerationKind::EnhancedCv => {
            let slug = utils::company_slug(&record.company_name);
            if slug.is_empty() {
                "enhanced-cv".to_string()
            } else {
                format!("enhanced-cv-{}", slug)
            }
        }
    };

    let result = GenerationResult {
        kind,
        title: record.title.clone(),
        content: record.content.clone(),
    };
    let path = write_export(&result, &stem, format, &config.environment.output_path).await?;
    println!("✓ Written to {}", path.display());
    Ok(())
}

async fn handle_extract(file: &std::path::Path) -> Result<()> {
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .context("Invalid file name")?;
    utils::validate_file_extension(name, &["docx"])?;

    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    println!("{}", docx::extract_text(&bytes)?);
    Ok(())
}

async fn handle_draft(command: DraftCommand, database: &Database) -> Result<()> {
    match command {
        DraftCommand::Save { fields } => {
            let application = resolve_application(fields, database).await?;
            let serialized = serde_json::to_string(&application)?;
            database.storage().set(FORM_DATA_KEY, &serialized).await?;
            println!("✓ Draft saved");
        }
        DraftCommand::Show => match database.storage().get(FORM_DATA_KEY).await? {
            Some(value) => {
                let application: JobApplication =
                    serde_json::from_str(&value).context("Stored draft could not be parsed")?;
                println!("{}", serde_json::to_string_pretty(&application)?);
            }
            None => println!("No draft saved."),
        },
        DraftCommand::Clear => {
            if database.storage().remove(FORM_DATA_KEY).await? {
                println!("✓ Draft cleared");
            } else {
                println!("No draft saved.");
            }
        }
    }
    Ok(())
}

async fn handle_key(command: KeyCommand, database: &Database) -> Result<()> {
    match command {
        KeyCommand::Save { api_key } => {
            if api_key.trim().is_empty() {
                anyhow::bail!("API key is required");
            }
            database
                .storage()
                .set(API_KEY_STORAGE_KEY, &api_key)
                .await?;
            println!("✓ API key saved");
        }
        KeyCommand::Status => {
            if database.storage().contains(API_KEY_STORAGE_KEY).await? {
                println!("An API key is stored.");
            } else {
                println!("No API key stored.");
            }
        }
        KeyCommand::Clear => {
            if database.storage().remove(API_KEY_STORAGE_KEY).await? {
                println!("✓ API key removed");
            } else {
                println!("No API key stored.");
            }
        }
    }
    Ok(())
}

async fn handle_history(command: HistoryCommand, database: &Database) -> Result<()> {
    match command {
        HistoryCommand::List { limit } => {
            let records = database.generations().list(limit).await?;
            if records.is_empty() {
                println!("No generations yet.");
                return Ok(());
            }

            println!(
                "{:<36} {:<13} {:<17} {}",
                "ID", "Kind", "Created", "Title"
            );
            println!("{}", "-".repeat(90));
            for record in records {
                println!(
                    "{:<36} {:<13} {:<17} {}",
                    record.id,
                    record.kind,
                    record.created_at.format("%Y-%m-%d %H:%M"),
                    record.title
                );
            }
        }
        HistoryCommand::Show { id } => {
            let record = database
                .generations()
                .get(&id)
                .await?
                .with_context(|| format!("No generation with id: {}", id))?;
            println!("{}\n", record.title);
            println!("{}", record.content);
        }
    }
    Ok(())
}

fn handle_templates(config: &ConfigManager) -> Result<()> {
    let engine = PromptEngine::new(config.environment.templates_path.clone())?;

    println!("default - Built-in cover letter and CV rewrite prompts");
    for pack in engine.list_packs() {
        let description = pack
            .manifest
            .description
            .as_deref()
            .unwrap_or(&pack.manifest.name);
        println!("{} - {}", pack.id, description);
    }
    Ok(())
}
