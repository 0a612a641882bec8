//! The book generation orchestrator.
//!
//! Drives a book through its lifecycle by calling the capability traits
//! in order, persisting the aggregate after every milestone so a crashed
//! process leaves an accurate record behind. All collaborators are
//! injected; the orchestrator itself performs no I/O beyond what they
//! provide.

use crate::guard::ActiveRuns;
use crate::progress;
use crate::prompts;
use crate::retry::{retry_asset, RetryPolicy};
use chrono::Utc;
use fabula_compositor::{add_cover_caption, FontSet};
use fabula_core::{conform_narrative, Book, BookId, BookStatus, Page, Premise};
use fabula_error::{FabulaError, FabulaResult, PipelineError, PipelineErrorKind};
use fabula_interface::{
    AspectRatio, BookStore, DocumentAssembler, ImageGenerator, ImageInput, ImageRequest,
    PremiseRequest, ProgressSink, StoryGenerator,
};
use fabula_storage::{AssetKind, AssetStore};
use std::sync::Arc;
use tracing::{instrument, warn};

fn invalid_state(operation: &str, status: BookStatus) -> FabulaError {
    PipelineError::new(PipelineErrorKind::InvalidState {
        operation: operation.to_string(),
        status: status.to_string(),
    })
    .into()
}

fn missing(artifact: &str) -> FabulaError {
    PipelineError::new(PipelineErrorKind::MissingArtifact(artifact.to_string())).into()
}

fn image_input(data: Vec<u8>) -> ImageInput {
    // Generated assets are PNG unless the bytes say otherwise
    if data.starts_with(&[0xFF, 0xD8]) {
        ImageInput::jpeg(data)
    } else {
        ImageInput::png(data)
    }
}

/// Orchestrates preview and completion pipelines over injected services.
pub struct BookOrchestrator {
    store: Arc<dyn BookStore>,
    assets: Arc<dyn AssetStore>,
    story: Arc<dyn StoryGenerator>,
    images: Arc<dyn ImageGenerator>,
    progress: Arc<dyn ProgressSink>,
    assembler: Arc<dyn DocumentAssembler>,
    retry: RetryPolicy,
    active: ActiveRuns,
    caption_fonts: Option<FontSet>,
}

impl BookOrchestrator {
    /// Create an orchestrator with the default retry policy and no cover
    /// caption fonts.
    pub fn new(
        store: Arc<dyn BookStore>,
        assets: Arc<dyn AssetStore>,
        story: Arc<dyn StoryGenerator>,
        images: Arc<dyn ImageGenerator>,
        progress: Arc<dyn ProgressSink>,
        assembler: Arc<dyn DocumentAssembler>,
    ) -> Self {
        Self {
            store,
            assets,
            story,
            images,
            progress,
            assembler,
            retry: RetryPolicy::default(),
            active: ActiveRuns::new(),
            caption_fonts: None,
        }
    }

    /// Override the per-asset retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Enable the "A book for: {name}" caption on generated covers.
    pub fn with_caption_fonts(mut self, fonts: FontSet) -> Self {
        self.caption_fonts = Some(fonts);
        self
    }

    /// Generate the fast preview: minimal premise plus illustrated cover.
    ///
    /// Requires `PreviewPending` (or `PreviewError`, for a retry). Any
    /// failure moves the book to `PreviewError` with a message.
    #[instrument(skip(self), fields(book_id = %book_id))]
    pub async fn start_preview(&self, book_id: &BookId) -> FabulaResult<()> {
        let _token = self.active.begin(*book_id)?;
        let mut book = self.store.load(book_id).await?;

        match book.status {
            BookStatus::PreviewPending | BookStatus::PreviewError => {}
            status => return Err(invalid_state("start_preview", status)),
        }
        book.clear_error();

        match self.run_preview(&mut book).await {
            Ok(()) => Ok(()),
            Err(e) => {
                book.fail(BookStatus::PreviewError, e.to_string());
                self.store.save(&book).await?;
                Err(e)
            }
        }
    }

    /// Regenerate only the preview cover.
    ///
    /// Requires a stored premise. On success the previous cover asset is
    /// deleted; on failure it is retained and the book moves to
    /// `PreviewError`.
    #[instrument(skip(self), fields(book_id = %book_id))]
    pub async fn regenerate_cover(&self, book_id: &BookId) -> FabulaResult<()> {
        let _token = self.active.begin(*book_id)?;
        let mut book = self.store.load(book_id).await?;

        let premise = book.premise.clone().ok_or_else(|| missing("premise"))?;
        book.clear_error();
        book.status = BookStatus::GeneratingCover;
        let (step, percent) = progress::COVER_REGEN;
        self.update(&mut book, step, percent).await?;

        let result = self.run_cover_regen(&mut book, &premise).await;
        if let Err(e) = result {
            // The previous cover stays in place
            book.fail(BookStatus::PreviewError, format!("Cover regeneration failed: {e}"));
            self.store.save(&book).await?;
            return Err(e);
        }
        Ok(())
    }

    /// Record payment, unlocking full generation.
    #[instrument(skip(self), fields(book_id = %book_id))]
    pub async fn mark_paid(&self, book_id: &BookId) -> FabulaResult<()> {
        let _token = self.active.begin(*book_id)?;
        let mut book = self.store.load(book_id).await?;

        if book.status != BookStatus::PreviewReady {
            return Err(invalid_state("mark_paid", book.status));
        }
        book.status = BookStatus::Paid;
        self.store.save(&book).await
    }

    /// Generate the complete book: full narrative, reference sheets, every
    /// page image, and the final document.
    ///
    /// Requires `Paid` (or `Error`, for a retry). Completion is
    /// all-or-nothing: if any page exhausts its retries the remaining
    /// pages are still attempted so the error can name every failed page,
    /// then the run aborts without producing a document.
    #[instrument(skip(self), fields(book_id = %book_id))]
    pub async fn start_completion(&self, book_id: &BookId) -> FabulaResult<()> {
        let _token = self.active.begin(*book_id)?;
        let mut book = self.store.load(book_id).await?;

        match book.status {
            BookStatus::Paid | BookStatus::Error => {}
            status => return Err(invalid_state("start_completion", status)),
        }
        book.clear_error();
        book.status = BookStatus::Generating;
        let (step, percent) = progress::COMPLETION_START;
        self.update(&mut book, step, percent).await?;

        match self.run_completion(&mut book).await {
            Ok(()) => Ok(()),
            Err(e) => {
                book.fail(BookStatus::Error, e.to_string());
                self.store.save(&book).await?;
                Err(e)
            }
        }
    }

    /// Regenerate a single page image and reassemble the document.
    ///
    /// Requires `Completed`, a valid page number, and both reference
    /// sheets still present in storage; all of that is checked before any
    /// generation call. On failure the book stays `Completed` untouched.
    #[instrument(skip(self), fields(book_id = %book_id, page = page_number))]
    pub async fn regenerate_page(&self, book_id: &BookId, page_number: u32) -> FabulaResult<()> {
        let _token = self.active.begin(*book_id)?;
        let mut book = self.store.load(book_id).await?;

        if book.status != BookStatus::Completed {
            return Err(invalid_state("regenerate_page", book.status));
        }
        let narrative = book.narrative.clone().ok_or_else(|| missing("narrative"))?;
        let total = narrative.pages.len() as u32;
        if page_number < 1 || page_number > total {
            return Err(PipelineError::new(PipelineErrorKind::InvalidPage {
                page: page_number,
                total,
            })
            .into());
        }

        let character_handle = book
            .assets
            .character_sheet
            .clone()
            .ok_or_else(|| missing("character sheet"))?;
        let scene_handle = book
            .assets
            .scene_sheet
            .clone()
            .ok_or_else(|| missing("scene sheet"))?;
        let cover_handle = book.assets.cover.clone().ok_or_else(|| missing("cover"))?;

        if !self.assets.exists(&character_handle).await? {
            return Err(missing("character sheet"));
        }
        if !self.assets.exists(&scene_handle).await? {
            return Err(missing("scene sheet"));
        }

        let character_ref = image_input(self.assets.retrieve(&character_handle).await?);
        let scene_ref = image_input(self.assets.retrieve(&scene_handle).await?);

        let page = &narrative.pages[(page_number - 1) as usize];
        let image = self.generate_page(page, &character_ref, &scene_ref).await?;
        let handle = self.assets.store(&image, AssetKind::Image).await?;
        book.assets.pages.insert(page_number, handle);

        let cover = self.assets.retrieve(&cover_handle).await?;
        let mut page_images = Vec::with_capacity(narrative.pages.len());
        for page in &narrative.pages {
            let handle = book
                .assets
                .pages
                .get(&page.number)
                .cloned()
                .ok_or_else(|| missing(&format!("page {} image", page.number)))?;
            page_images.push(self.assets.retrieve(&handle).await?);
        }

        let document = self.assembler.assemble(&narrative, &cover, &page_images).await?;
        book.assets.document = Some(self.assets.store(&document, AssetKind::Document).await?);
        self.store.save(&book).await
    }

    async fn run_preview(&self, book: &mut Book) -> FabulaResult<()> {
        let (step, percent) = progress::PREVIEW_PREMISE;
        self.update(book, step, percent).await?;

        let photo = image_input(self.assets.retrieve(&book.photo).await?);
        let premise = self
            .story
            .minimal_premise(&PremiseRequest {
                photo: photo.clone(),
                child_name: book.child_name.clone(),
                age: book.age,
                interests: book.interests.clone(),
            })
            .await?;

        let (step, percent) = progress::PREVIEW_COVER;
        self.update(book, step, percent).await?;
        let cover = self.generate_cover(&premise, book.age, &photo).await?;
        let cover = self.decorate_cover(cover, &book.child_name);
        let handle = self.assets.store(&cover, AssetKind::Image).await?;

        book.premise = Some(premise);
        book.assets.cover = Some(handle);
        book.status = BookStatus::PreviewReady;
        let (step, percent) = progress::PREVIEW_READY;
        self.update(book, step, percent).await
    }

    async fn run_cover_regen(&self, book: &mut Book, premise: &Premise) -> FabulaResult<()> {
        let photo = image_input(self.assets.retrieve(&book.photo).await?);
        let cover = self.generate_cover(premise, book.age, &photo).await?;
        let cover = self.decorate_cover(cover, &book.child_name);
        let handle = self.assets.store(&cover, AssetKind::Image).await?;

        let previous = book.assets.cover.replace(handle.clone());
        if let Some(previous) = previous {
            // Content addressing can make regeneration a no-op
            if previous != handle {
                if let Err(e) = self.assets.delete(&previous).await {
                    warn!(error = %e, "Failed to delete the previous cover asset");
                }
            }
        }

        book.status = BookStatus::PreviewReady;
        let (step, percent) = progress::PREVIEW_READY;
        self.update(book, step, percent).await
    }

    async fn run_completion(&self, book: &mut Book) -> FabulaResult<()> {
        let premise = book.premise.clone().ok_or_else(|| missing("premise"))?;
        let cover_handle = book.assets.cover.clone().ok_or_else(|| missing("cover"))?;

        let (step, percent) = progress::COMPLETION_EXPAND;
        self.update(book, step, percent).await?;

        let mut narrative = self.story.expand_story(&premise, book.page_count).await?;
        let padded = conform_narrative(&mut narrative, &premise, book.page_count);
        if padded > 0 {
            warn!(padded, "Narrative came back short, padded with synthetic pages");
        }
        book.narrative = Some(narrative.clone());
        self.store.save(book).await?;

        let cover = self.assets.retrieve(&cover_handle).await?;

        let (step, percent) = progress::COMPLETION_CHARACTERS;
        self.update(book, step, percent).await?;
        let sheet_prompt = prompts::character_sheet_prompt(&narrative);
        let character_sheet = retry_asset(&self.retry, "character sheet", || {
            let request = ImageRequest::new(sheet_prompt.clone(), AspectRatio::Wide)
                .with_reference(image_input(cover.clone()));
            async move { self.images.generate_image(&request).await }
        })
        .await?;
        book.assets.character_sheet =
            Some(self.assets.store(&character_sheet, AssetKind::Image).await?);
        self.store.save(book).await?;

        let (step, percent) = progress::COMPLETION_SCENES;
        self.update(book, step, percent).await?;
        let scene_prompt = prompts::scene_sheet_prompt(&narrative);
        let scene_sheet = retry_asset(&self.retry, "scene sheet", || {
            let request = ImageRequest::new(scene_prompt.clone(), AspectRatio::Wide);
            async move { self.images.generate_image(&request).await }
        })
        .await?;
        book.assets.scene_sheet = Some(self.assets.store(&scene_sheet, AssetKind::Image).await?);
        self.store.save(book).await?;

        let character_ref = image_input(character_sheet);
        let scene_ref = image_input(scene_sheet);
        let total = narrative.pages.len() as u32;
        let mut page_images: Vec<Vec<u8>> = Vec::with_capacity(narrative.pages.len());
        let mut failed_pages: Vec<u32> = Vec::new();

        for page in &narrative.pages {
            let step = progress::page_step(page.number, total);
            self.update(book, &step, progress::page_progress(page.number, total))
                .await?;

            match self.generate_page(page, &character_ref, &scene_ref).await {
                Ok(image) => {
                    let handle = self.assets.store(&image, AssetKind::Image).await?;
                    book.assets.pages.insert(page.number, handle);
                    self.store.save(book).await?;
                    page_images.push(image);
                }
                Err(e) => {
                    warn!(page = page.number, error = %e, "Page exhausted all attempts");
                    failed_pages.push(page.number);
                }
            }
        }

        // All-or-nothing: a single failed page aborts completion, after
        // every page has had its chance so the message is complete.
        if !failed_pages.is_empty() {
            let list = failed_pages
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(PipelineError::new(PipelineErrorKind::FailedPages(list)).into());
        }

        let (step, percent) = progress::COMPLETION_DOCUMENT;
        self.update(book, step, percent).await?;
        let document = self.assembler.assemble(&narrative, &cover, &page_images).await?;
        book.assets.document = Some(self.assets.store(&document, AssetKind::Document).await?);

        book.status = BookStatus::Completed;
        book.completed_at = Some(Utc::now());
        let (step, percent) = progress::COMPLETION_DONE;
        self.update(book, step, percent).await
    }

    async fn generate_cover(
        &self,
        premise: &Premise,
        age: u8,
        photo: &ImageInput,
    ) -> FabulaResult<Vec<u8>> {
        let prompt = prompts::cover_prompt(premise, age);
        retry_asset(&self.retry, "cover", || {
            let request = ImageRequest::new(prompt.clone(), AspectRatio::Square)
                .with_reference(photo.clone());
            async move { self.images.generate_image(&request).await }
        })
        .await
    }

    async fn generate_page(
        &self,
        page: &Page,
        character_ref: &ImageInput,
        scene_ref: &ImageInput,
    ) -> FabulaResult<Vec<u8>> {
        let prompt = prompts::page_prompt(page);
        let label = format!("page {}", page.number);
        retry_asset(&self.retry, &label, || {
            let request = ImageRequest::new(prompt.clone(), AspectRatio::Square)
                .with_reference(character_ref.clone())
                .with_reference(scene_ref.clone());
            async move { self.images.generate_image(&request).await }
        })
        .await
    }

    fn decorate_cover(&self, cover: Vec<u8>, child_name: &str) -> Vec<u8> {
        let Some(fonts) = &self.caption_fonts else {
            return cover;
        };
        match add_cover_caption(&cover, child_name, fonts) {
            Ok(captioned) => captioned,
            Err(e) => {
                warn!(error = %e, "Cover caption failed, keeping the raw cover");
                cover
            }
        }
    }

    async fn update(&self, book: &mut Book, step: &str, percent: u8) -> FabulaResult<()> {
        book.set_progress(step, percent);
        self.progress.set_progress(&book.id, step, percent).await;
        self.store.save(book).await
    }
}
