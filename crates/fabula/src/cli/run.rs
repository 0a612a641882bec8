//! Command handlers: wire the concrete services and drive the orchestrator.

use crate::cli::Commands;
use crate::config::FabulaConfig;
use crate::progress::LogProgress;
use fabula_compositor::{DocumentCompositor, FontSet};
use fabula_core::{Book, BookId};
use fabula_error::{ConfigError, FabulaResult, StorageError, StorageErrorKind};
use fabula_interface::BookStore;
use fabula_models::{GeminiImageGenerator, GeminiStoryGenerator};
use fabula_pipeline::{BookOrchestrator, RetryPolicy};
use fabula_rate_limit::ImageCallGate;
use fabula_storage::{AssetKind, AssetStore, FileSystemStorage, JsonBookStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Execute one CLI command.
pub async fn run(command: Commands) -> FabulaResult<()> {
    let config = FabulaConfig::load()?;

    match command {
        Commands::Submit {
            name,
            age,
            interests,
            photo,
            pages,
        } => submit(&config, name, age, interests, photo, pages).await,
        Commands::Preview { id } => {
            build_orchestrator(&config)?
                .start_preview(&parse_id(&id)?)
                .await
        }
        Commands::RegenerateCover { id } => {
            build_orchestrator(&config)?
                .regenerate_cover(&parse_id(&id)?)
                .await
        }
        Commands::Pay { id } => {
            build_orchestrator(&config)?
                .mark_paid(&parse_id(&id)?)
                .await
        }
        Commands::Complete { id } => {
            build_orchestrator(&config)?
                .start_completion(&parse_id(&id)?)
                .await
        }
        Commands::RegeneratePage { id, page } => {
            build_orchestrator(&config)?
                .regenerate_page(&parse_id(&id)?, page)
                .await
        }
        Commands::Status { id } => status(&config, &id).await,
    }
}

async fn submit(
    config: &FabulaConfig,
    name: String,
    age: u8,
    interests: String,
    photo: PathBuf,
    pages: Option<u8>,
) -> FabulaResult<()> {
    let assets = FileSystemStorage::new(config.storage().asset_dir())?;
    let store = JsonBookStore::new(config.storage().book_dir())?;

    let data = tokio::fs::read(&photo).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileRead(format!(
            "{}: {}",
            photo.display(),
            e
        )))
    })?;
    let handle = assets.store(&data, AssetKind::Image).await?;

    let mut book = Book::submit(name, age, interests, handle.as_str());
    book.page_count = pages.unwrap_or(*config.generation().page_count());
    store.save(&book).await?;

    println!("{}", book.id);
    Ok(())
}

async fn status(config: &FabulaConfig, id: &str) -> FabulaResult<()> {
    let store = JsonBookStore::new(config.storage().book_dir())?;
    let book = store.load(&parse_id(id)?).await?;

    println!("status:   {}", book.status);
    println!(
        "progress: {}% {}",
        book.progress_percentage, book.current_step
    );
    if let Some(message) = &book.error_message {
        println!("error:    {message}");
    }
    if let Some(handle) = &book.assets.document {
        println!("document: {}", handle.as_str());
    }
    Ok(())
}

fn parse_id(id: &str) -> FabulaResult<BookId> {
    let uuid = Uuid::parse_str(id)
        .map_err(|e| ConfigError::new(format!("invalid book id {id}: {e}")))?;
    Ok(BookId(uuid))
}

fn load_fonts(config: &FabulaConfig) -> FabulaResult<FontSet> {
    match (config.fonts().bold(), config.fonts().regular()) {
        (Some(bold), Some(regular)) => FontSet::load(bold, regular),
        _ => FontSet::load_default(),
    }
}

fn build_orchestrator(config: &FabulaConfig) -> FabulaResult<BookOrchestrator> {
    let generation = config.generation();

    let store = Arc::new(JsonBookStore::new(config.storage().book_dir())?);
    let assets = Arc::new(FileSystemStorage::new(config.storage().asset_dir())?);
    let story = Arc::new(GeminiStoryGenerator::new(generation.text_model().clone())?);
    let gate = ImageCallGate::new(generation.min_image_interval());
    let images = Arc::new(GeminiImageGenerator::new(
        generation.image_model().clone(),
        gate,
    )?);
    let assembler = Arc::new(DocumentCompositor::new(load_fonts(config)?));

    let mut orchestrator = BookOrchestrator::new(
        store,
        assets,
        story,
        images,
        Arc::new(LogProgress),
        assembler,
    )
    .with_retry_policy(RetryPolicy::new(
        *generation.retry_attempts(),
        generation.retry_delay(),
    ));

    match load_fonts(config) {
        Ok(fonts) => orchestrator = orchestrator.with_caption_fonts(fonts),
        Err(e) => warn!(error = %e, "Caption fonts unavailable, covers stay uncaptioned"),
    }

    Ok(orchestrator)
}
