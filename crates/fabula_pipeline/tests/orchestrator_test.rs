//! End-to-end orchestrator tests against in-memory collaborators.

use async_trait::async_trait;
use fabula_core::{test_support, AssetHandle, Book, BookId, BookStatus, Narrative, Premise, Protagonist};
use fabula_error::{FabulaResult, ImageGenError, ImageGenErrorKind, StorageError, StorageErrorKind};
use fabula_interface::{
    BookStore, DocumentAssembler, ImageGenerator, ImageRequest, PremiseRequest, ProgressSink,
    StoryGenerator,
};
use fabula_pipeline::{BookOrchestrator, RetryPolicy};
use fabula_storage::{AssetKind, AssetStore};
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct MemoryStore {
    books: Mutex<HashMap<BookId, Book>>,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            books: Mutex::new(HashMap::new()),
        }
    }

    fn insert(&self, book: Book) {
        self.books.lock().unwrap().insert(book.id, book);
    }

    fn get(&self, id: &BookId) -> Book {
        self.books.lock().unwrap().get(id).cloned().unwrap()
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn load(&self, book_id: &BookId) -> FabulaResult<Book> {
        self.books
            .lock()
            .unwrap()
            .get(book_id)
            .cloned()
            .ok_or_else(|| {
                StorageError::new(StorageErrorKind::BookNotFound(book_id.to_string())).into()
            })
    }

    async fn save(&self, book: &Book) -> FabulaResult<()> {
        self.books.lock().unwrap().insert(book.id, book.clone());
        Ok(())
    }
}

struct MemoryAssets {
    blobs: Mutex<HashMap<AssetHandle, Vec<u8>>>,
}

impl MemoryAssets {
    fn new() -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
        }
    }

    fn seed(&self, handle: impl Into<String>, data: Vec<u8>) -> AssetHandle {
        let handle = AssetHandle::new(handle);
        self.blobs.lock().unwrap().insert(handle.clone(), data);
        handle
    }

    fn contains(&self, handle: &AssetHandle) -> bool {
        self.blobs.lock().unwrap().contains_key(handle)
    }
}

#[async_trait]
impl AssetStore for MemoryAssets {
    async fn store(&self, data: &[u8], kind: AssetKind) -> FabulaResult<AssetHandle> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let handle = AssetHandle::new(format!("{kind}-{:016x}", hasher.finish()));
        self.blobs
            .lock()
            .unwrap()
            .insert(handle.clone(), data.to_vec());
        Ok(handle)
    }

    async fn retrieve(&self, handle: &AssetHandle) -> FabulaResult<Vec<u8>> {
        self.blobs
            .lock()
            .unwrap()
            .get(handle)
            .cloned()
            .ok_or_else(|| {
                StorageError::new(StorageErrorKind::NotFound(handle.as_str().to_string())).into()
            })
    }

    async fn delete(&self, handle: &AssetHandle) -> FabulaResult<()> {
        self.blobs.lock().unwrap().remove(handle);
        Ok(())
    }

    async fn exists(&self, handle: &AssetHandle) -> FabulaResult<bool> {
        Ok(self.contains(handle))
    }
}

struct MockStory {
    pages_returned: usize,
}

#[async_trait]
impl StoryGenerator for MockStory {
    async fn minimal_premise(&self, request: &PremiseRequest) -> FabulaResult<Premise> {
        Ok(Premise {
            title: format!("The Adventures of {}", request.child_name),
            theme: "adventure".to_string(),
            summary: "A short magical journey".to_string(),
            world_description: "Floating islands above a violet sea".to_string(),
            protagonist: Protagonist::new(request.child_name.clone(), "curly red hair".to_string()),
        })
    }

    async fn expand_story(&self, _premise: &Premise, _page_count: u8) -> FabulaResult<Narrative> {
        Ok(test_support::narrative(self.pages_returned))
    }
}

/// Scripted image generator: fails every attempt whose prompt contains the
/// marker, returns unique bytes otherwise, and counts all calls.
struct MockImages {
    calls: AtomicU32,
    fail_marker: Option<String>,
}

impl MockImages {
    fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
            fail_marker: None,
        }
    }

    fn failing_on(marker: &str) -> Self {
        Self {
            calls: AtomicU32::new(0),
            fail_marker: Some(marker.to_string()),
        }
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for MockImages {
    async fn generate_image(&self, request: &ImageRequest) -> FabulaResult<Vec<u8>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(marker) = &self.fail_marker {
            if request.prompt.contains(marker) {
                return Err(ImageGenError::new(ImageGenErrorKind::NoImageData).into());
            }
        }
        Ok(format!("image-{n}").into_bytes())
    }
}

struct NullProgress;

#[async_trait]
impl ProgressSink for NullProgress {
    async fn set_progress(&self, _book_id: &BookId, _step: &str, _percent: u8) {}
}

struct MockAssembler;

#[async_trait]
impl DocumentAssembler for MockAssembler {
    async fn assemble(
        &self,
        narrative: &Narrative,
        _cover: &[u8],
        pages: &[Vec<u8>],
    ) -> FabulaResult<Vec<u8>> {
        assert_eq!(pages.len(), narrative.pages.len());
        Ok(b"%PDF-mock".to_vec())
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    assets: Arc<MemoryAssets>,
    images: Arc<MockImages>,
    orchestrator: BookOrchestrator,
}

fn harness(pages_returned: usize, images: MockImages) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let assets = Arc::new(MemoryAssets::new());
    let images = Arc::new(images);

    let orchestrator = BookOrchestrator::new(
        Arc::clone(&store) as Arc<dyn BookStore>,
        Arc::clone(&assets) as Arc<dyn AssetStore>,
        Arc::new(MockStory { pages_returned }),
        Arc::clone(&images) as Arc<dyn ImageGenerator>,
        Arc::new(NullProgress),
        Arc::new(MockAssembler),
    )
    .with_retry_policy(RetryPolicy::new(3, Duration::ZERO));

    Harness {
        store,
        assets,
        images,
        orchestrator,
    }
}

fn premise() -> Premise {
    Premise {
        title: "The Starlight Voyage".to_string(),
        theme: "adventure".to_string(),
        summary: "A journey across a sky full of islands".to_string(),
        world_description: "Floating islands above a violet sea".to_string(),
        protagonist: Protagonist::new("Luna".to_string(), "curly red hair".to_string()),
    }
}

fn submitted_book(h: &Harness) -> Book {
    let mut book = Book::submit("Luna", 6, "dragons and stars", "photos/luna.jpg");
    book.photo = h.assets.seed("photos/luna.jpg", b"\x89PNG-photo".to_vec());
    h.store.insert(book.clone());
    book
}

async fn paid_book(h: &Harness, page_count: u8) -> Book {
    let mut book = submitted_book(h);
    book.premise = Some(premise());
    book.assets.cover = h.assets.store(b"cover-image", AssetKind::Image).await.ok();
    book.status = BookStatus::Paid;
    book.page_count = page_count;
    h.store.insert(book.clone());
    book
}

#[tokio::test]
async fn preview_produces_premise_and_cover() {
    let h = harness(3, MockImages::new());
    let book = submitted_book(&h);

    h.orchestrator.start_preview(&book.id).await.unwrap();

    let book = h.store.get(&book.id);
    assert_eq!(book.status, BookStatus::PreviewReady);
    assert!(book.premise.is_some());
    assert_eq!(book.progress_percentage, 100);
    assert_eq!(book.current_step, "Preview ready");

    let cover = book.assets.cover.expect("cover stored");
    assert!(h.assets.contains(&cover));
    // One image call: the cover.
    assert_eq!(h.images.call_count(), 1);
}

#[tokio::test]
async fn preview_rejects_wrong_state() {
    let h = harness(3, MockImages::new());
    let mut book = submitted_book(&h);
    book.status = BookStatus::Completed;
    h.store.insert(book.clone());

    let err = h.orchestrator.start_preview(&book.id).await.unwrap_err();
    assert!(format!("{err}").contains("start_preview"));
    assert_eq!(h.images.call_count(), 0);
}

#[tokio::test]
async fn completion_generates_sheets_pages_and_document() {
    let h = harness(3, MockImages::new());
    let book = paid_book(&h, 3).await;

    h.orchestrator.start_completion(&book.id).await.unwrap();

    let book = h.store.get(&book.id);
    assert_eq!(book.status, BookStatus::Completed);
    assert_eq!(book.progress_percentage, 100);
    assert!(book.completed_at.is_some());
    assert!(book.narrative.is_some());

    assert!(book.assets.character_sheet.is_some());
    assert!(book.assets.scene_sheet.is_some());
    assert_eq!(book.assets.pages.len(), 3);
    assert!(book.assets.pages_complete(3));

    let document = book.assets.document.expect("document stored");
    assert!(h.assets.contains(&document));
    // Two sheets plus three pages.
    assert_eq!(h.images.call_count(), 5);
}

#[tokio::test]
async fn short_narrative_is_padded_to_page_count() {
    let h = harness(2, MockImages::new());
    let book = paid_book(&h, 4).await;

    h.orchestrator.start_completion(&book.id).await.unwrap();

    let book = h.store.get(&book.id);
    assert_eq!(book.status, BookStatus::Completed);
    let narrative = book.narrative.unwrap();
    assert_eq!(narrative.pages.len(), 4);
    assert_eq!(book.assets.pages.len(), 4);
}

#[tokio::test]
async fn failed_page_aborts_after_attempting_every_page() {
    // Page 2's prompt carries its scene description, so the mock can
    // target just that page across all retry attempts.
    let h = harness(3, MockImages::failing_on("Page 2 scene"));
    let book = paid_book(&h, 3).await;

    let err = h.orchestrator.start_completion(&book.id).await.unwrap_err();
    assert!(format!("{err}").contains("Failed pages: 2"));

    let book = h.store.get(&book.id);
    assert_eq!(book.status, BookStatus::Error);
    let message = book.error_message.expect("error recorded");
    assert!(message.contains("2"));
    // No document on a partial run; the other pages were still stored.
    assert!(book.assets.document.is_none());
    assert_eq!(book.assets.pages.len(), 2);
    // Two sheets, pages 1 and 3 once each, page 2 three times.
    assert_eq!(h.images.call_count(), 7);
}

#[tokio::test]
async fn completion_rejects_wrong_state() {
    let h = harness(3, MockImages::new());
    let book = submitted_book(&h);

    let err = h.orchestrator.start_completion(&book.id).await.unwrap_err();
    assert!(format!("{err}").contains("start_completion"));
    assert_eq!(h.images.call_count(), 0);
    assert_eq!(h.store.get(&book.id).status, BookStatus::PreviewPending);
}

#[tokio::test]
async fn completion_retries_from_error_state() {
    let h = harness(3, MockImages::new());
    let mut book = paid_book(&h, 3).await;
    book.fail(BookStatus::Error, "Failed pages: 2");
    h.store.insert(book.clone());

    h.orchestrator.start_completion(&book.id).await.unwrap();

    let book = h.store.get(&book.id);
    assert_eq!(book.status, BookStatus::Completed);
    assert!(book.error_message.is_none());
}

#[tokio::test]
async fn mark_paid_requires_preview_ready() {
    let h = harness(3, MockImages::new());
    let mut book = submitted_book(&h);

    assert!(h.orchestrator.mark_paid(&book.id).await.is_err());

    book.status = BookStatus::PreviewReady;
    h.store.insert(book.clone());
    h.orchestrator.mark_paid(&book.id).await.unwrap();
    assert_eq!(h.store.get(&book.id).status, BookStatus::Paid);
}

#[tokio::test]
async fn cover_regen_replaces_and_deletes_previous_cover() {
    let h = harness(3, MockImages::new());
    let mut book = submitted_book(&h);
    book.premise = Some(premise());
    let old_cover = h
        .assets
        .store(b"old-cover", AssetKind::Image)
        .await
        .unwrap();
    book.assets.cover = Some(old_cover.clone());
    book.status = BookStatus::PreviewReady;
    h.store.insert(book.clone());

    h.orchestrator.regenerate_cover(&book.id).await.unwrap();

    let book = h.store.get(&book.id);
    assert_eq!(book.status, BookStatus::PreviewReady);
    let new_cover = book.assets.cover.expect("cover present");
    assert_ne!(new_cover, old_cover);
    assert!(h.assets.contains(&new_cover));
    assert!(!h.assets.contains(&old_cover));
}

#[tokio::test]
async fn cover_regen_without_premise_makes_no_image_calls() {
    let h = harness(3, MockImages::new());
    let book = submitted_book(&h);

    let err = h.orchestrator.regenerate_cover(&book.id).await.unwrap_err();
    assert!(format!("{err}").contains("premise"));
    assert_eq!(h.images.call_count(), 0);
    assert_eq!(h.store.get(&book.id).status, BookStatus::PreviewPending);
}

#[tokio::test]
async fn failed_cover_regen_keeps_the_previous_cover() {
    let h = harness(3, MockImages::failing_on("CHILDREN'S BOOK COVER"));
    let mut book = submitted_book(&h);
    book.premise = Some(premise());
    let old_cover = h
        .assets
        .store(b"old-cover", AssetKind::Image)
        .await
        .unwrap();
    book.assets.cover = Some(old_cover.clone());
    book.status = BookStatus::PreviewReady;
    h.store.insert(book.clone());

    let err = h.orchestrator.regenerate_cover(&book.id).await.unwrap_err();
    assert!(format!("{err}").contains("Retries exhausted"));

    let book = h.store.get(&book.id);
    assert_eq!(book.status, BookStatus::PreviewError);
    assert_eq!(book.assets.cover, Some(old_cover.clone()));
    assert!(h.assets.contains(&old_cover));
}

async fn completed_book(h: &Harness) -> Book {
    let book = paid_book(h, 3).await;
    h.orchestrator.start_completion(&book.id).await.unwrap();
    h.store.get(&book.id)
}

#[tokio::test]
async fn regenerate_page_swaps_the_image_and_reassembles() {
    let h = harness(3, MockImages::new());
    let book = completed_book(&h).await;
    let old_page = book.assets.pages.get(&2).cloned().unwrap();
    let old_document = book.assets.document.clone().unwrap();

    h.orchestrator.regenerate_page(&book.id, 2).await.unwrap();

    let book = h.store.get(&book.id);
    assert_eq!(book.status, BookStatus::Completed);
    let new_page = book.assets.pages.get(&2).cloned().unwrap();
    assert_ne!(new_page, old_page);
    assert!(h.assets.contains(&new_page));
    // The document handle may coincide only if the assembler output did.
    assert!(book.assets.document.is_some());
    assert!(h.assets.contains(&old_document) || book.assets.document != Some(old_document));
}

#[tokio::test]
async fn regenerate_page_validates_the_page_number() {
    let h = harness(3, MockImages::new());
    let book = completed_book(&h).await;
    let calls_before = h.images.call_count();

    let err = h.orchestrator.regenerate_page(&book.id, 0).await.unwrap_err();
    assert!(format!("{err}").contains("Invalid page number 0"));
    let err = h.orchestrator.regenerate_page(&book.id, 9).await.unwrap_err();
    assert!(format!("{err}").contains("Invalid page number 9"));
    assert_eq!(h.images.call_count(), calls_before);
}

#[tokio::test]
async fn regenerate_page_requires_sheets_before_any_generation() {
    let h = harness(3, MockImages::new());
    let mut book = completed_book(&h).await;
    let sheet = book.assets.character_sheet.clone().unwrap();
    h.assets.delete(&sheet).await.unwrap();
    let calls_before = h.images.call_count();

    let err = h.orchestrator.regenerate_page(&book.id, 1).await.unwrap_err();
    assert!(format!("{err}").contains("character sheet"));
    assert_eq!(h.images.call_count(), calls_before);

    // The book is untouched.
    book = h.store.get(&book.id);
    assert_eq!(book.status, BookStatus::Completed);
    assert!(book.error_message.is_none());
}

#[tokio::test]
async fn regenerate_page_requires_completed_status() {
    let h = harness(3, MockImages::new());
    let book = paid_book(&h, 3).await;

    let err = h.orchestrator.regenerate_page(&book.id, 1).await.unwrap_err();
    assert!(format!("{err}").contains("regenerate_page"));
    assert_eq!(h.images.call_count(), 0);
}
