//! JSON-file persistence for the book aggregate.

use fabula_core::{Book, BookId};
use fabula_error::{FabulaResult, JsonError, StorageError, StorageErrorKind};
use fabula_interface::BookStore;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Book store keeping one JSON file per book under a base directory.
///
/// Writes are atomic (temp file + rename), so a crash mid-save leaves the
/// previous record intact rather than a truncated file.
#[derive(Debug, Clone)]
pub struct JsonBookStore {
    base_dir: PathBuf,
}

impl JsonBookStore {
    /// Create a store rooted at `base_dir`, creating it if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> FabulaResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();

        if !base_dir.exists() {
            std::fs::create_dir_all(&base_dir).map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    base_dir.display(),
                    e
                )))
            })?;
        }

        debug!(path = %base_dir.display(), "Initialized book store");
        Ok(Self { base_dir })
    }

    fn book_path(&self, book_id: &BookId) -> PathBuf {
        self.base_dir.join(format!("{}.json", book_id))
    }
}

#[async_trait::async_trait]
impl BookStore for JsonBookStore {
    async fn load(&self, book_id: &BookId) -> FabulaResult<Book> {
        let path = self.book_path(book_id);

        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::BookNotFound(book_id.to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        let book = serde_json::from_str(&contents)
            .map_err(|e| JsonError::new(format!("book record {}: {}", path.display(), e)))?;

        debug!(book_id = %book_id, "Loaded book record");
        Ok(book)
    }

    async fn save(&self, book: &Book) -> FabulaResult<()> {
        let path = self.book_path(&book.id);
        let contents = serde_json::to_string_pretty(book)
            .map_err(|e| JsonError::new(format!("serialize book {}: {}", book.id, e)))?;

        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &contents).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        debug!(book_id = %book.id, status = %book.status, "Saved book record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabula_core::BookStatus;

    fn sample_book() -> Book {
        Book::submit("Luna", 6, "dragons and stars", "photos/luna.jpg")
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonBookStore::new(dir.path()).unwrap();

        let book = sample_book();
        store.save(&book).await.unwrap();

        let loaded = store.load(&book.id).await.unwrap();
        assert_eq!(loaded, book);
    }

    #[tokio::test]
    async fn save_overwrites_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonBookStore::new(dir.path()).unwrap();

        let mut book = sample_book();
        store.save(&book).await.unwrap();

        book.status = BookStatus::PreviewReady;
        book.set_progress("Preview ready", 100);
        store.save(&book).await.unwrap();

        let loaded = store.load(&book.id).await.unwrap();
        assert_eq!(loaded.status, BookStatus::PreviewReady);
        assert_eq!(loaded.progress_percentage, 100);
    }

    #[tokio::test]
    async fn missing_book_reports_book_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonBookStore::new(dir.path()).unwrap();

        let id = BookId::generate();
        let err = store.load(&id).await.unwrap_err();
        assert!(format!("{err}").contains("Book not found"));
    }
}
